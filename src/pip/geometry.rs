//! Region geometry and the point-in-polygon test.

use std::sync::Arc;

use crate::models::Point;

/// A closed ring of cell-local points. The last point connects back to the first.
pub type Ring = Vec<Point>;

/// The areas one region (country or subdivision) covers within one raster cell.
///
/// Holes are not tied to a particular outer ring: a point is covered if it lies in
/// more outer rings than inner rings.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryAreas {
    pub id: Arc<str>,
    pub outer: Vec<Ring>,
    pub inner: Vec<Ring>,
}

impl CountryAreas {
    pub fn new(id: impl Into<Arc<str>>, outer: Vec<Ring>, inner: Vec<Ring>) -> Self {
        Self {
            id: id.into(),
            outer,
            inner,
        }
    }

    /// Whether this region covers the given point
    pub fn covers(&self, point: Point) -> bool {
        let outer = self.outer.iter().filter(|r| is_in_ring(point, r)).count();
        let inner = self.inner.iter().filter(|r| is_in_ring(point, r)).count();
        outer > inner
    }
}

/// Winding number test.
///
/// Only the upper and left edges of a ring count as inside, so rings that share an
/// edge never both contain a point on it.
///
/// Adapted from Dan Sunday's `wn_PnPoly`, http://geomalgorithms.com/a03-_inclusion.html
/// (Copyright 2000 softSurfer, 2012 Dan Sunday; may be freely used and modified for
/// any purpose providing that this copyright notice is included with it).
fn is_in_ring(point: Point, ring: &[Point]) -> bool {
    let Some(&last) = ring.last() else {
        return false;
    };

    let mut winding = 0i32;
    let mut a = last;
    for &b in ring {
        if a.y <= point.y {
            // upward crossing
            if b.y > point.y && point.is_left_of(a, b) > 0 {
                winding += 1;
            }
        } else if b.y <= point.y && point.is_left_of(a, b) < 0 {
            // downward crossing
            winding -= 1;
        }
        a = b;
    }
    winding != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: u16, y: u16) -> Point {
        Point::new(x, y)
    }

    fn big_square() -> Ring {
        vec![p(0, 0), p(0, 10), p(10, 10), p(10, 0)]
    }

    fn hole() -> Ring {
        vec![p(2, 2), p(2, 8), p(8, 8), p(8, 2)]
    }

    fn small_square() -> Ring {
        vec![p(4, 4), p(4, 6), p(6, 6), p(6, 4)]
    }

    #[test]
    fn test_covers_simple_polygon() {
        let areas = CountryAreas::new("A", vec![big_square()], vec![]);
        assert!(areas.covers(p(5, 5)));
        assert!(!areas.covers(p(11, 5)));
    }

    #[test]
    fn test_does_not_cover_hole() {
        let areas = CountryAreas::new("A", vec![big_square()], vec![hole()]);
        assert!(!areas.covers(p(5, 5)));
        assert!(areas.covers(p(1, 1)));
    }

    #[test]
    fn test_covers_polygon_in_hole() {
        let areas = CountryAreas::new("A", vec![big_square(), small_square()], vec![hole()]);
        assert!(areas.covers(p(5, 5)));
        assert!(!areas.covers(p(3, 3)));
    }

    #[test]
    fn test_only_upper_left_edge_counts_as_inside() {
        let areas = CountryAreas::new("A", vec![big_square()], vec![]);

        assert!(areas.covers(p(0, 0)));
        assert!(areas.covers(p(5, 0)));
        assert!(areas.covers(p(0, 5)));
        assert!(!areas.covers(p(0, 10)));
        assert!(!areas.covers(p(10, 0)));
        assert!(!areas.covers(p(5, 10)));
        assert!(!areas.covers(p(10, 5)));
        assert!(!areas.covers(p(10, 10)));
    }

    #[test]
    fn test_winding_is_orientation_independent() {
        let mut reversed = big_square();
        reversed.reverse();
        let areas = CountryAreas::new("A", vec![reversed], vec![]);
        assert!(areas.covers(p(5, 5)));
    }

    #[test]
    fn test_empty_ring_covers_nothing() {
        let areas = CountryAreas::new("A", vec![vec![]], vec![]);
        assert!(!areas.covers(p(0, 0)));
    }

    #[test]
    fn test_full_cell_ring_at_coordinate_limits() {
        let max = u16::MAX;
        let ring = vec![p(0, 0), p(0, max), p(max, max), p(max, 0)];
        let areas = CountryAreas::new("A", vec![ring], vec![]);
        assert!(areas.covers(p(max / 2, max / 2)));
        assert!(areas.covers(p(0, 0)));
        assert!(!areas.covers(p(max, max)));
    }
}
