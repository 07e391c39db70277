//! Bounding box used by area queries.

use serde::{Deserialize, Serialize};

use crate::error::{BoundariesError, Result};

/// Bounding box in degrees.
///
/// `min_lon > max_lon` is a box that wraps around the 180th meridian, e.g.
/// `170,0,-170,1` spans 20 degrees across the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Parse bbox string "minLon,minLat,maxLon,maxLat"
    pub fn parse(s: &str) -> Result<Self> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|e| BoundariesError::InvalidInput(format!("bbox '{}': {}", s, e)))?;

        match parts.as_slice() {
            [min_lon, min_lat, max_lon, max_lat] => {
                Ok(Self::new(*min_lon, *min_lat, *max_lon, *max_lat))
            }
            _ => Err(BoundariesError::InvalidInput(format!(
                "bbox '{}' must have 4 comma-separated values",
                s
            ))),
        }
    }

    /// Whether this box crosses the antimeridian.
    pub fn wraps_antimeridian(&self) -> bool {
        self.min_lon > self.max_lon
    }
}

/// A `Rect` is always normalized (min <= max), so the result never wraps.
impl From<geo::Rect<f64>> for BoundingBox {
    fn from(rect: geo::Rect<f64>) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, Rect};

    #[test]
    fn test_parse_bbox() {
        let bbox = BoundingBox::parse("170, 0,-170,1.5").unwrap();
        assert_eq!(bbox, BoundingBox::new(170.0, 0.0, -170.0, 1.5));
        assert!(bbox.wraps_antimeridian());
    }

    #[test]
    fn test_parse_bbox_rejects_garbage() {
        assert!(BoundingBox::parse("1,2,3").is_err());
        assert!(BoundingBox::parse("1,2,3,4,5").is_err());
        assert!(BoundingBox::parse("a,2,3,4").is_err());
    }

    #[test]
    fn test_from_rect_is_normalized() {
        let rect = Rect::new(coord! { x: 10.0, y: 5.0 }, coord! { x: -10.0, y: -5.0 });
        let bbox = BoundingBox::from(rect);
        assert_eq!(bbox, BoundingBox::new(-10.0, -5.0, 10.0, 5.0));
        assert!(!bbox.wraps_antimeridian());
    }
}
