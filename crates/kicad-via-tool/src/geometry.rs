use crate::units::{nm_to_mm, Nm};
use serde::Serialize;

/// Board position in nanometres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: Nm,
    pub y: Nm,
}

impl Point {
    pub const fn new(x: Nm, y: Nm) -> Self {
        Self { x, y }
    }

    pub fn to_mm(self) -> [f64; 2] {
        [nm_to_mm(self.x), nm_to_mm(self.y)]
    }
}

/// Even-odd ray casting. The polygon is closed implicitly (last vertex
/// connects to the first). Fewer than three vertices is never inside.
/// Points exactly on an edge may land on either side.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let (x, y) = (point.x as f64, point.y as f64);
    let mut inside = false;
    let mut p1 = polygon[polygon.len() - 1];
    for &p2 in polygon {
        let (x1, y1) = (p1.x as f64, p1.y as f64);
        let (x2, y2) = (p2.x as f64, p2.y as f64);
        p1 = p2;

        // Horizontal edges never straddle the ray.
        if y1 == y2 {
            continue;
        }
        if y <= y1.min(y2) || y > y1.max(y2) || x > x1.max(x2) {
            continue;
        }
        let crossing = x1 == x2 || x <= (y - y1) * (x2 - x1) / (y2 - y1) + x1;
        if crossing {
            inside = !inside;
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(points: &[(Nm, Nm)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn square() -> Vec<Point> {
        poly(&[(0, 0), (10, 0), (10, 10), (0, 10)])
    }

    #[test]
    fn test_square_inside_and_outside() {
        let sq = square();
        assert!(point_in_polygon(Point::new(5, 5), &sq));
        assert!(point_in_polygon(Point::new(1, 9), &sq));
        assert!(!point_in_polygon(Point::new(15, 5), &sq));
        assert!(!point_in_polygon(Point::new(-1, 5), &sq));
        assert!(!point_in_polygon(Point::new(5, 11), &sq));
        assert!(!point_in_polygon(Point::new(5, -3), &sq));
    }

    #[test]
    fn test_winding_order_does_not_matter() {
        let mut sq = square();
        sq.reverse();
        assert!(point_in_polygon(Point::new(5, 5), &sq));
        assert!(!point_in_polygon(Point::new(20, 5), &sq));
    }

    #[test]
    fn test_degenerate_polygons_are_never_inside() {
        assert!(!point_in_polygon(Point::new(0, 0), &[]));
        assert!(!point_in_polygon(Point::new(0, 0), &poly(&[(0, 0)])));
        assert!(!point_in_polygon(Point::new(1, 1), &poly(&[(0, 0), (2, 2)])));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening upward
        let u = poly(&[(0, 0), (30, 0), (30, 30), (20, 30), (20, 10), (10, 10), (10, 30), (0, 30)]);
        assert!(point_in_polygon(Point::new(5, 20), &u));
        assert!(point_in_polygon(Point::new(25, 20), &u));
        assert!(point_in_polygon(Point::new(15, 5), &u));
        assert!(!point_in_polygon(Point::new(15, 20), &u));
    }

    #[test]
    fn test_triangle_with_sloped_edges() {
        let tri = poly(&[(0, 0), (100, 0), (50, 100)]);
        assert!(point_in_polygon(Point::new(50, 50), &tri));
        assert!(!point_in_polygon(Point::new(10, 80), &tri));
        assert!(!point_in_polygon(Point::new(90, 80), &tri));
    }

    /// Horizontal edges are skipped rather than reusing an intercept from a
    /// previous edge. A query ray level with a horizontal edge still counts
    /// the adjoining edges exactly once.
    #[test]
    fn test_horizontal_edges_are_skipped() {
        // Staircase: several horizontal edges between vertical ones.
        let stairs = poly(&[(0, 0), (40, 0), (40, 10), (30, 10), (30, 20), (0, 20)]);
        assert!(point_in_polygon(Point::new(35, 5), &stairs));
        assert!(point_in_polygon(Point::new(10, 15), &stairs));
        assert!(!point_in_polygon(Point::new(35, 15), &stairs));
        // Ray level with the horizontal step at y = 10.
        assert!(point_in_polygon(Point::new(5, 10), &stairs));
        assert!(!point_in_polygon(Point::new(45, 10), &stairs));
    }

    #[test]
    fn test_nanometre_scale_coordinates() {
        let mm = 1_000_000;
        let board_outline = poly(&[(0, 0), (100 * mm, 0), (100 * mm, 80 * mm), (0, 80 * mm)]);
        assert!(point_in_polygon(Point::new(50 * mm, 40 * mm), &board_outline));
        assert!(!point_in_polygon(Point::new(101 * mm, 40 * mm), &board_outline));
    }
}
