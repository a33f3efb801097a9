pub mod board;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod params;
pub mod parsers;
pub mod report;
pub mod units;
pub mod writer;
pub mod zone;

use board::Board;
use error::ViaToolError;
use log::{info, warn};
use parsers::kicad::KicadPcb;
use std::path::Path;

pub use engine::{run, select_vias};
pub use params::{Action, FilterParams, NetFilter};
pub use report::ActionReport;
pub use zone::ContainmentMode;

/// Only KiCad board files are understood.
fn check_format(path: &Path) -> Result<(), ViaToolError> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("kicad_pcb") => Ok(()),
        other => Err(ViaToolError::UnsupportedFormat(
            other.unwrap_or("(none)").to_string(),
        )),
    }
}

/// Load a board file. Via presets come from the sibling `.kicad_pro` when
/// it defines any, otherwise from the board's own setup section.
pub fn open_board(path: &Path) -> Result<(KicadPcb, Board), ViaToolError> {
    check_format(path)?;
    let data = std::fs::read(path)?;
    let (pcb, mut board) = parsers::kicad::parse(&data)?;

    let project = parsers::kicad_project::project_path(path);
    if project.exists() {
        match parsers::kicad_project::parse(&std::fs::read(&project)?) {
            Ok(presets) if !presets.is_empty() => board.via_presets = presets,
            Ok(_) => {}
            Err(e) => warn!("Ignoring project file {}: {e}", project.display()),
        }
    }
    Ok((pcb, board))
}

/// Write the board back, changing only what the board model changed.
pub fn save_board(path: &Path, pcb: &KicadPcb, board: &Board) -> Result<(), ViaToolError> {
    std::fs::write(path, writer::render(pcb, board))?;
    info!("Written to {}", path.display());
    Ok(())
}
