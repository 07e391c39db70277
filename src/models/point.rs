//! Geographic and cell-local point types.

use serde::{Deserialize, Serialize};

/// Position inside one raster cell, scaled to `0..=0xffff` on both axes.
///
/// `x` grows eastward from the cell's western edge, `y` grows northward from the
/// cell's southern edge. Only comparable to points of the same cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Sign of the cross product of `a -> b` and `a -> self`.
    /// Positive if this point lies left of the line through `a` and `b`.
    pub(crate) fn is_left_of(&self, a: Point, b: Point) -> i64 {
        // i64 since the product of two 17-bit differences overflows i32
        (i64::from(b.x) - i64::from(a.x)) * (i64::from(self.y) - i64::from(a.y))
            - (i64::from(self.x) - i64::from(a.x)) * (i64::from(b.y) - i64::from(a.y))
    }
}

/// Geographic point (lon/lat in degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.x(), point.y())
    }
}
