use kicad_via_tool::board::ViaDimension;
use kicad_via_tool::error::ViaToolError;
use kicad_via_tool::{
    open_board, run, save_board, Action, ContainmentMode, FilterParams, NetFilter,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// GND: three 0.6 mm vias, VCC: two 0.8 mm vias, one GND zone around the
/// first two GND vias with a cut-out over the second.
const BOARD: &str = r#"(kicad_pcb (version 20240108) (generator "pcbnew")
	(general (thickness 1.6))
	(net 0 "")
	(net 1 "GND")
	(net 2 "VCC")
	(segment (start 10 10) (end 20 10) (width 0.25) (layer "F.Cu") (net 1) (uuid "s1"))
	(via (at 10 10) (size 0.6) (drill 0.3) (layers "F.Cu" "B.Cu") (net 1) (uuid "g1"))
	(via (at 20 10) (size 0.6) (drill 0.3) (layers "F.Cu" "B.Cu") (net 1) (uuid "g2"))
	(via (at 60 10) (size 0.6) (drill 0.3) (layers "F.Cu" "B.Cu") (net 1) (uuid "g3"))
	(via (at 10 40) (size 0.8) (drill 0.4) (layers "F.Cu" "B.Cu") (net 2) (uuid "p1"))
	(via (at 20 40) (size 0.8) (drill 0.4) (layers "F.Cu" "B.Cu") (net 2) (uuid "p2"))
	(zone (net 1) (net_name "GND") (layer "F.Cu") (uuid "z1") (name "gnd-pour")
		(polygon
			(pts (xy 0 0) (xy 30 0) (xy 30 20) (xy 0 20))
		)
		(polygon
			(pts (xy 18 8) (xy 22 8) (xy 22 12) (xy 18 12))
		)
	)
)
"#;

const PROJECT: &str = r#"{
  "board": {
    "design_settings": {
      "via_dimensions": [
        { "diameter": 0.0, "drill": 0.0 },
        { "diameter": 0.5, "drill": 0.3 },
        { "diameter": 0.6, "drill": 0.3 },
        { "diameter": 0.8, "drill": 0.4 }
      ]
    }
  }
}"#;

fn write_project(dir: &TempDir, with_project: bool) -> PathBuf {
    let board = dir.path().join("demo.kicad_pcb");
    fs::write(&board, BOARD).unwrap();
    if with_project {
        fs::write(dir.path().join("demo.kicad_pro"), PROJECT).unwrap();
    }
    board
}

fn params(net: &str, action: Action) -> FilterParams {
    FilterParams {
        net: NetFilter::from(net),
        use_zone: false,
        min_size_mm: 0.5,
        max_size_mm: 0.7,
        action,
    }
}

fn via_uuids(path: &Path) -> Vec<String> {
    let (_, board) = open_board(path).unwrap();
    board.vias().filter_map(|v| v.uuid.clone()).collect()
}

#[test]
fn presets_come_from_the_project_file() {
    let dir = TempDir::new().unwrap();
    let path = write_project(&dir, true);
    let (_, board) = open_board(&path).unwrap();
    assert_eq!(
        board.via_presets,
        vec![
            ViaDimension::from_mm(0.5, 0.3),
            ViaDimension::from_mm(0.6, 0.3),
            ViaDimension::from_mm(0.8, 0.4),
        ]
    );
}

#[test]
fn missing_project_file_means_no_presets() {
    let dir = TempDir::new().unwrap();
    let path = write_project(&dir, false);
    let (_, board) = open_board(&path).unwrap();
    assert!(board.via_presets.is_empty());
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("demo.brd");
    fs::write(&path, BOARD).unwrap();
    assert!(matches!(
        open_board(&path),
        Err(ViaToolError::UnsupportedFormat(_))
    ));
}

#[test]
fn highlight_leaves_the_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = write_project(&dir, true);
    let (pcb, mut board) = open_board(&path).unwrap();

    let report = run(
        &mut board,
        &params("GND", Action::Highlight),
        ContainmentMode::EvenOdd,
    )
    .unwrap();
    assert_eq!(report.matched.len(), 3);
    assert!(!report.mutated());

    let out = dir.path().join("out.kicad_pcb");
    save_board(&out, &pcb, &board).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), BOARD);
}

#[test]
fn delete_removes_exactly_the_matched_vias() {
    let dir = TempDir::new().unwrap();
    let path = write_project(&dir, true);
    let (pcb, mut board) = open_board(&path).unwrap();

    run(&mut board, &params("GND", Action::Delete), ContainmentMode::EvenOdd).unwrap();
    save_board(&path, &pcb, &board).unwrap();

    assert_eq!(via_uuids(&path), vec!["p1", "p2"]);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("(segment (start 10 10)"));
    assert!(text.contains("(name \"gnd-pour\")"));
}

#[test]
fn change_size_persists_new_dimensions() {
    let dir = TempDir::new().unwrap();
    let path = write_project(&dir, true);
    let (pcb, mut board) = open_board(&path).unwrap();

    let action = Action::ChangeSize {
        diameter_mm: 0.5,
        drill_mm: 0.3,
    };
    run(&mut board, &params("GND", action), ContainmentMode::EvenOdd).unwrap();
    save_board(&path, &pcb, &board).unwrap();

    let (_, reloaded) = open_board(&path).unwrap();
    for via in reloaded.vias() {
        if via.net == Some(1) {
            assert_eq!(via.diameter, Some(500_000));
            assert_eq!(via.drill, Some(300_000));
        } else {
            assert_eq!(via.diameter, Some(800_000));
            assert_eq!(via.drill, Some(400_000));
        }
    }
}

#[test]
fn unknown_net_leaves_the_board_alone() {
    let dir = TempDir::new().unwrap();
    let path = write_project(&dir, true);
    let (_, mut board) = open_board(&path).unwrap();

    let err = run(
        &mut board,
        &params("Unknown", Action::Delete),
        ContainmentMode::EvenOdd,
    )
    .unwrap_err();
    assert!(matches!(err, ViaToolError::NetNotFound(_)));
    assert_eq!(board.via_count(), 5);
}

#[test]
fn zone_restriction_honours_cut_outs() {
    let dir = TempDir::new().unwrap();
    let path = write_project(&dir, true);

    let mut p = params("GND", Action::Delete);
    p.use_zone = true;

    // Without a selected zone nothing runs
    let (_, mut board) = open_board(&path).unwrap();
    assert!(matches!(
        run(&mut board, &p, ContainmentMode::EvenOdd),
        Err(ViaToolError::NoZoneSelected)
    ));
    assert_eq!(board.via_count(), 5);

    // g2 sits in the cut-out, g3 outside the zone
    let (pcb, mut board) = open_board(&path).unwrap();
    board.select_zones("gnd-pour").unwrap();
    let report = run(&mut board, &p, ContainmentMode::EvenOdd).unwrap();
    assert_eq!(report.matched.len(), 1);
    save_board(&path, &pcb, &board).unwrap();
    assert_eq!(via_uuids(&path), vec!["g2", "g3", "p1", "p2"]);
}
