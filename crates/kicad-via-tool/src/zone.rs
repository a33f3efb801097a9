use crate::board::{Board, Zone, ZoneId};
use crate::error::ViaToolError;
use crate::geometry::{point_in_polygon, Point};
use clap::ValueEnum;

/// How a zone outline with several loops is tested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ContainmentMode {
    /// Inside an odd number of loops. Holes cut out their area.
    #[default]
    EvenOdd,
    /// All loops concatenated into one vertex list.
    Flattened,
}

/// All outline vertices of a zone, loops concatenated in order.
pub fn zone_vertices(zone: &Zone) -> Vec<Point> {
    zone.outline.iter().flatten().copied().collect()
}

pub fn zone_contains(zone: &Zone, point: Point, mode: ContainmentMode) -> bool {
    match mode {
        ContainmentMode::EvenOdd => {
            zone.outline
                .iter()
                .filter(|outline| point_in_polygon(point, outline))
                .count()
                % 2
                == 1
        }
        ContainmentMode::Flattened => point_in_polygon(point, &zone_vertices(zone)),
    }
}

/// The one zone currently selected on the board.
pub fn selected_zone(board: &Board) -> Result<ZoneId, ViaToolError> {
    let selected: Vec<&Zone> = board.zones.iter().filter(|zone| zone.selected).collect();
    match selected.as_slice() {
        [] => Err(ViaToolError::NoZoneSelected),
        [zone] => Ok(zone.id),
        many => Err(ViaToolError::AmbiguousZoneSelection(many.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    fn zone_with(outline: Vec<Vec<Point>>) -> Zone {
        let mut board = Board::new();
        board.add_zone("z", outline);
        board.zones.remove(0)
    }

    #[test]
    fn test_vertices_are_concatenated_in_loop_order() {
        let zone = zone_with(vec![rect(0, 0, 10, 10), rect(2, 2, 4, 4)]);
        let vertices = zone_vertices(&zone);
        assert_eq!(vertices.len(), 8);
        assert_eq!(vertices[0], Point::new(0, 0));
        assert_eq!(vertices[4], Point::new(2, 2));
    }

    #[test]
    fn test_empty_outline_contains_nothing() {
        let zone = zone_with(Vec::new());
        assert!(zone_vertices(&zone).is_empty());
        for mode in [ContainmentMode::EvenOdd, ContainmentMode::Flattened] {
            assert!(!zone_contains(&zone, Point::new(0, 0), mode));
        }
    }

    #[test]
    fn test_single_loop_modes_agree() {
        let zone = zone_with(vec![rect(0, 0, 100, 100)]);
        for mode in [ContainmentMode::EvenOdd, ContainmentMode::Flattened] {
            assert!(zone_contains(&zone, Point::new(50, 50), mode));
            assert!(!zone_contains(&zone, Point::new(150, 50), mode));
        }
    }

    #[test]
    fn test_even_odd_excludes_holes() {
        let zone = zone_with(vec![rect(0, 0, 100, 100), rect(40, 40, 60, 60)]);
        assert!(zone_contains(&zone, Point::new(20, 20), ContainmentMode::EvenOdd));
        assert!(!zone_contains(&zone, Point::new(50, 50), ContainmentMode::EvenOdd));
    }

    #[test]
    fn test_flattened_hole_zone_follows_the_joined_outline() {
        // Joined outline: outer square, a seam from (0, 100) into the hole,
        // the hole, then the closing seam from (40, 60) back to (0, 0).
        let zone = zone_with(vec![rect(0, 0, 100, 100), rect(40, 40, 60, 60)]);

        assert!(!zone_contains(&zone, Point::new(50, 50), ContainmentMode::Flattened));
        assert!(zone_contains(&zone, Point::new(20, 20), ContainmentMode::Flattened));
        assert!(zone_contains(&zone, Point::new(50, 90), ContainmentMode::Flattened));

        // The wedge between the two seams drops out of the joined outline
        assert!(!zone_contains(&zone, Point::new(10, 50), ContainmentMode::Flattened));
        assert!(zone_contains(&zone, Point::new(10, 50), ContainmentMode::EvenOdd));
    }

    #[test]
    fn test_even_odd_includes_disjoint_loops() {
        let zone = zone_with(vec![rect(0, 0, 10, 10), rect(100, 0, 110, 10)]);
        assert!(zone_contains(&zone, Point::new(5, 5), ContainmentMode::EvenOdd));
        assert!(zone_contains(&zone, Point::new(105, 5), ContainmentMode::EvenOdd));
        assert!(!zone_contains(&zone, Point::new(50, 5), ContainmentMode::EvenOdd));
    }

    #[test]
    fn test_selected_zone_requires_exactly_one() {
        let mut board = Board::new();
        board.add_zone("a", vec![rect(0, 0, 10, 10)]);
        let b = board.add_zone("b", vec![rect(0, 0, 10, 10)]);

        assert!(matches!(
            selected_zone(&board),
            Err(ViaToolError::NoZoneSelected)
        ));

        board.zones[1].selected = true;
        assert_eq!(selected_zone(&board).unwrap(), b);

        board.zones[0].selected = true;
        assert!(matches!(
            selected_zone(&board),
            Err(ViaToolError::AmbiguousZoneSelection(2))
        ));
    }
}
