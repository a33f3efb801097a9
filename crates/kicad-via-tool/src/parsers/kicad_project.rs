//! Via presets from a KiCad project file (`.kicad_pro`, JSON).

use crate::board::ViaDimension;
use crate::error::ViaToolError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
struct Project {
    #[serde(default)]
    board: ProjectBoard,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectBoard {
    #[serde(default)]
    design_settings: DesignSettings,
}

#[derive(Debug, Default, Deserialize)]
struct DesignSettings {
    #[serde(default)]
    via_dimensions: Vec<ViaDimensionEntry>,
}

/// Millimetres. The first entry KiCad writes is a 0/0 placeholder.
#[derive(Debug, Deserialize)]
struct ViaDimensionEntry {
    diameter: f64,
    drill: f64,
}

/// The project file that belongs to a board file.
pub fn project_path(board_path: &Path) -> PathBuf {
    board_path.with_extension("kicad_pro")
}

pub fn parse(data: &[u8]) -> Result<Vec<ViaDimension>, ViaToolError> {
    let project: Project = serde_json::from_slice(data)?;
    Ok(project
        .board
        .design_settings
        .via_dimensions
        .into_iter()
        .filter(|entry| entry.diameter > 0.0 && entry.drill > 0.0)
        .map(|entry| ViaDimension::from_mm(entry.diameter, entry.drill))
        .collect())
}
