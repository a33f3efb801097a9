use clap::{Parser, ValueEnum};
use kicad_via_tool::board::Board;
use kicad_via_tool::error::ViaToolError;
use kicad_via_tool::params::{default_size_range, is_preset, SizeSpec, ALL_NETS};
use kicad_via_tool::{open_board, run, save_board, Action, ContainmentMode, FilterParams, NetFilter};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ActionArg {
    Highlight,
    Delete,
    ChangeSize,
}

#[derive(Parser)]
#[command(
    name = "kicad-via-tool",
    about = "Select, delete or resize the vias of a KiCad board by net, size and zone"
)]
struct Cli {
    /// Input board file (.kicad_pcb)
    board: PathBuf,

    /// Net name, or "All" for every net
    #[arg(short, long, default_value = ALL_NETS)]
    net: String,

    /// Only vias under this zone (zone name, uuid or index from --list)
    #[arg(short, long)]
    zone: Option<String>,

    /// How zones with several outlines are tested
    #[arg(long, value_enum, default_value_t)]
    zone_mode: ContainmentMode,

    /// Minimum via diameter in mm (default: smallest preset)
    #[arg(long)]
    min: Option<f64>,

    /// Maximum via diameter in mm (default: largest preset)
    #[arg(long)]
    max: Option<f64>,

    /// What to do with the matched vias
    #[arg(short, long, value_enum, default_value_t = ActionArg::Highlight)]
    action: ActionArg,

    /// New size for change-size, as DIAMETER/DRILL in mm (e.g. 0.6/0.3)
    #[arg(long, conflicts_with = "preset")]
    new_size: Option<SizeSpec>,

    /// New size for change-size, as a preset index from --list
    #[arg(long)]
    preset: Option<usize>,

    /// Output board file (the input is overwritten if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report what would change without writing the board
    #[arg(long)]
    dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, requires = "json")]
    pretty: bool,

    /// List nets, zones and via presets, then exit
    #[arg(long)]
    list: bool,
}

fn build_params(cli: &Cli, board: &Board) -> Result<FilterParams, ViaToolError> {
    let (default_min, default_max) = default_size_range(&board.via_presets);

    let action = match cli.action {
        ActionArg::Highlight => Action::Highlight,
        ActionArg::Delete => Action::Delete,
        ActionArg::ChangeSize => {
            let size = match (cli.new_size, cli.preset) {
                (Some(size), _) => size,
                (None, Some(index)) => board
                    .via_presets
                    .get(index)
                    .copied()
                    .map(SizeSpec::from)
                    .ok_or_else(|| {
                        ViaToolError::InvalidParameters(format!(
                            "preset {index} does not exist ({} presets)",
                            board.via_presets.len()
                        ))
                    })?,
                (None, None) => {
                    return Err(ViaToolError::InvalidParameters(
                        "change-size needs --new-size or --preset".to_string(),
                    ))
                }
            };
            if !board.via_presets.is_empty() && !is_preset(&board.via_presets, size) {
                warn!(
                    "New size {} / {} mm is not one of the board's presets",
                    size.diameter_mm, size.drill_mm
                );
            }
            Action::ChangeSize {
                diameter_mm: size.diameter_mm,
                drill_mm: size.drill_mm,
            }
        }
    };

    let params = FilterParams {
        net: NetFilter::from(cli.net.as_str()),
        use_zone: cli.zone.is_some(),
        min_size_mm: cli.min.unwrap_or(default_min),
        max_size_mm: cli.max.unwrap_or(default_max),
        action,
    };
    params.validate()?;
    Ok(params)
}

fn print_listing(board: &Board) {
    println!("Nets:");
    println!("  {ALL_NETS}");
    for (name, code) in &board.nets {
        println!("  {name:?} ({code})");
    }
    println!("Zones:");
    for zone in &board.zones {
        println!(
            "  [{}] {} on {}",
            zone.id.0,
            zone.label(),
            zone.layers.join(", ")
        );
    }
    println!("Via presets:");
    for (index, preset) in board.via_presets.iter().enumerate() {
        println!("  [{index}] {preset}");
    }
}

fn execute(cli: &Cli) -> Result<(), ViaToolError> {
    let (pcb, mut board) = open_board(&cli.board)?;
    if cli.list {
        print_listing(&board);
        return Ok(());
    }

    if let Some(selector) = &cli.zone {
        board.select_zones(selector)?;
    }
    let params = build_params(cli, &board)?;
    let report = run(&mut board, &params, cli.zone_mode)?;

    if cli.json {
        let json = if cli.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        }?;
        println!("{json}");
    } else {
        print!("{report}");
    }

    if report.mutated() {
        if cli.dry_run {
            info!("Dry run, board not written");
        } else {
            let output = cli.output.as_ref().unwrap_or(&cli.board);
            save_board(output, &pcb, &board)?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = execute(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(if e.is_user_error() { 2 } else { 1 });
    }
}
