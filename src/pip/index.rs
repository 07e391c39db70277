//! Raster spatial index for fast country boundary lookups.
//!
//! The world is divided into `raster_width x raster_height` equally sized cells in
//! lon/lat space. A lookup selects the cell, converts the position into the cell's
//! local fixed-point coordinates and lets the cell answer.

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};

use super::CountryBoundariesCell;
use crate::error::{BoundariesError, Result};
use crate::models::{BoundingBox, GeoPoint, Point};

/// Extent of the cell-local coordinate space on each axis
const LOCAL_SCALE: f64 = u16::MAX as f64;

/// Result of a bounding box query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BboxQueryResult<'a> {
    /// Regions guaranteed to contain the whole bbox
    pub containing_ids: HashSet<&'a str>,
    /// Regions that may intersect the bbox
    pub intersecting_ids: HashSet<&'a str>,
}

/// Spatial index to look up in which country (or subdivision) a position lies.
///
/// Immutable once built, so it can be shared between threads (e.g. in an `Arc`)
/// without locking.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryBoundaries {
    raster: Vec<CountryBoundariesCell>,
    raster_width: usize,
    raster_height: usize,
    geometry_sizes: HashMap<Arc<str>, f64>,
}

impl CountryBoundaries {
    /// Build an index from a row-major raster starting at the north-west corner.
    ///
    /// Fails if `raster_width` is zero or the raster is not a whole number of rows.
    pub fn new(
        raster: Vec<CountryBoundariesCell>,
        raster_width: usize,
        geometry_sizes: HashMap<Arc<str>, f64>,
    ) -> Result<Self> {
        if raster_width == 0 {
            return Err(BoundariesError::InvalidRaster(
                "raster width must be positive".into(),
            ));
        }
        if raster.is_empty() || raster.len() % raster_width != 0 {
            return Err(BoundariesError::InvalidRaster(format!(
                "{} cells do not fill rows of width {}",
                raster.len(),
                raster_width
            )));
        }

        let raster_height = raster.len() / raster_width;
        Ok(Self {
            raster,
            raster_width,
            raster_height,
            geometry_sizes,
        })
    }

    pub fn raster_width(&self) -> usize {
        self.raster_width
    }

    pub fn raster_height(&self) -> usize {
        self.raster_height
    }

    pub fn cell_count(&self) -> usize {
        self.raster.len()
    }

    /// Cells in row-major order, northernmost row first
    pub fn raster(&self) -> &[CountryBoundariesCell] {
        &self.raster
    }

    pub fn geometry_sizes(&self) -> &HashMap<Arc<str>, f64> {
        &self.geometry_sizes
    }

    /// Size metric used to order lookup results
    pub fn geometry_size(&self, id: &str) -> Option<f64> {
        self.geometry_sizes.get(id).copied()
    }

    /// Whether the position is in any of the regions with the given ids.
    ///
    /// Fails if a coordinate is not finite or the latitude is outside -90..=90.
    pub fn is_in_any<S: AsRef<str>>(
        &self,
        longitude: f64,
        latitude: f64,
        ids: &[S],
    ) -> Result<bool> {
        let (cell, point) = self.locate(longitude, latitude)?;
        Ok(cell.is_in_any(point, ids))
    }

    /// Whether the position is in the region with the given id
    pub fn is_in(&self, longitude: f64, latitude: f64, id: &str) -> Result<bool> {
        self.is_in_any(longitude, latitude, &[id])
    }

    /// Ids of the regions the position is in, smallest region first.
    ///
    /// Regions without a known size sort first.
    pub fn get_ids(&self, longitude: f64, latitude: f64) -> Result<Vec<&str>> {
        let (cell, point) = self.locate(longitude, latitude)?;
        let mut ids = cell.get_ids(point);
        ids.sort_by(|a, b| {
            let size_a = self.geometry_size(a).unwrap_or(0.0);
            let size_b = self.geometry_size(b).unwrap_or(0.0);
            size_a.total_cmp(&size_b)
        });
        Ok(ids)
    }

    pub fn get_ids_at(&self, point: GeoPoint) -> Result<Vec<&str>> {
        self.get_ids(point.lon, point.lat)
    }

    /// Ids of the regions guaranteed to contain the whole bounding box.
    ///
    /// The box may wrap around the 180th meridian (`min_longitude > max_longitude`).
    /// Fails if a coordinate is not finite, a latitude is outside -90..=90 or
    /// `min_latitude > max_latitude`.
    pub fn get_containing_ids(
        &self,
        min_longitude: f64,
        min_latitude: f64,
        max_longitude: f64,
        max_latitude: f64,
    ) -> Result<HashSet<&str>> {
        let cells = self.cells_in(min_longitude, min_latitude, max_longitude, max_latitude)?;
        Ok(containing_ids(cells))
    }

    /// Ids of the regions that may intersect the bounding box.
    ///
    /// Answered at cell granularity: every region present in a touched cell is
    /// returned, whether or not its geometry actually reaches into the box.
    pub fn get_intersecting_ids(
        &self,
        min_longitude: f64,
        min_latitude: f64,
        max_longitude: f64,
        max_latitude: f64,
    ) -> Result<HashSet<&str>> {
        let cells = self.cells_in(min_longitude, min_latitude, max_longitude, max_latitude)?;
        Ok(cells.flat_map(|cell| cell.get_all_ids()).collect())
    }

    /// Containing and intersecting ids of a bounding box in one call
    pub fn query_bbox(&self, bbox: &BoundingBox) -> Result<BboxQueryResult<'_>> {
        let cells: Vec<&CountryBoundariesCell> = self
            .cells_in(bbox.min_lon, bbox.min_lat, bbox.max_lon, bbox.max_lat)?
            .collect();

        Ok(BboxQueryResult {
            containing_ids: containing_ids(cells.iter().copied()),
            intersecting_ids: cells.iter().flat_map(|&cell| cell.get_all_ids()).collect(),
        })
    }

    fn locate(&self, longitude: f64, latitude: f64) -> Result<(&CountryBoundariesCell, Point)> {
        validate_position(longitude, latitude)?;
        let longitude = normalize_longitude(longitude);
        let cell_x = self.longitude_to_cell_x(longitude);
        let cell_y = self.latitude_to_cell_y(latitude);
        let point = Point::new(
            self.longitude_to_local_x(cell_x, longitude),
            self.latitude_to_local_y(cell_y, latitude),
        );
        Ok((self.cell(cell_x, cell_y), point))
    }

    fn cells_in(
        &self,
        min_longitude: f64,
        min_latitude: f64,
        max_longitude: f64,
        max_latitude: f64,
    ) -> Result<CellsIn<'_>> {
        validate_bounds(min_longitude, min_latitude, max_longitude, max_latitude)?;
        let min_x = self.longitude_to_cell_x(normalize_longitude(min_longitude));
        let max_x = self.longitude_to_cell_x(normalize_longitude(max_longitude));
        // north is row 0
        let min_y = self.latitude_to_cell_y(max_latitude);
        let max_y = self.latitude_to_cell_y(min_latitude);

        // might wrap around
        let steps_x = if min_x > max_x {
            self.raster_width - min_x + max_x
        } else {
            max_x - min_x
        };

        Ok(CellsIn {
            boundaries: self,
            min_x,
            steps_x,
            min_y,
            max_y,
            x_step: 0,
            y: min_y,
        })
    }

    fn cell(&self, x: usize, y: usize) -> &CountryBoundariesCell {
        &self.raster[y * self.raster_width + x]
    }

    fn longitude_to_cell_x(&self, longitude: f64) -> usize {
        let x = (self.raster_width as f64 * (180.0 + longitude) / 360.0).floor() as usize;
        x.min(self.raster_width - 1)
    }

    fn latitude_to_cell_y(&self, latitude: f64) -> usize {
        let y = (self.raster_height as f64 * (90.0 - latitude) / 180.0).ceil() as i64 - 1;
        y.max(0) as usize
    }

    fn longitude_to_local_x(&self, cell_x: usize, longitude: f64) -> u16 {
        let cell_longitude = -180.0 + 360.0 * cell_x as f64 / self.raster_width as f64;
        ((longitude - cell_longitude) * self.raster_width as f64 * LOCAL_SCALE / 360.0) as u16
    }

    fn latitude_to_local_y(&self, cell_y: usize, latitude: f64) -> u16 {
        let cell_latitude = 90.0 - 180.0 * (cell_y + 1) as f64 / self.raster_height as f64;
        ((latitude - cell_latitude) * self.raster_height as f64 * LOCAL_SCALE / 180.0) as u16
    }
}

/// Intersection of the containing ids of all cells, stopping once it is empty
fn containing_ids<'a>(
    cells: impl IntoIterator<Item = &'a CountryBoundariesCell>,
) -> HashSet<&'a str> {
    let mut cells = cells.into_iter();
    let Some(first) = cells.next() else {
        return HashSet::new();
    };

    let mut ids: HashSet<&str> = first.containing_ids.iter().map(|id| id.as_ref()).collect();
    for cell in cells {
        if ids.is_empty() {
            break;
        }
        ids.retain(|id| cell.containing_ids.iter().any(|c| c.as_ref() == *id));
    }
    ids
}

/// Cells touched by a bounding box, column by column walking east from the
/// western edge and wrapping at the antimeridian.
struct CellsIn<'a> {
    boundaries: &'a CountryBoundaries,
    min_x: usize,
    steps_x: usize,
    min_y: usize,
    max_y: usize,
    x_step: usize,
    y: usize,
}

impl<'a> Iterator for CellsIn<'a> {
    type Item = &'a CountryBoundariesCell;

    fn next(&mut self) -> Option<Self::Item> {
        if self.x_step > self.steps_x {
            return None;
        }

        let x = (self.min_x + self.x_step) % self.boundaries.raster_width;
        let cell = self.boundaries.cell(x, self.y);

        if self.y == self.max_y {
            self.y = self.min_y;
            self.x_step += 1;
        } else {
            self.y += 1;
        }
        Some(cell)
    }
}

fn validate_position(longitude: f64, latitude: f64) -> Result<()> {
    require(longitude.is_finite(), "longitude must be finite")?;
    require(latitude.is_finite(), "latitude must be finite")?;
    require((-90.0..=90.0).contains(&latitude), "latitude is out of bounds")
}

fn validate_bounds(
    min_longitude: f64,
    min_latitude: f64,
    max_longitude: f64,
    max_latitude: f64,
) -> Result<()> {
    require(min_longitude.is_finite(), "minLongitude must be finite")?;
    require(min_latitude.is_finite(), "minLatitude must be finite")?;
    require(max_longitude.is_finite(), "maxLongitude must be finite")?;
    require(max_latitude.is_finite(), "maxLatitude must be finite")?;
    require((-90.0..=90.0).contains(&min_latitude), "minLatitude is out of bounds")?;
    require((-90.0..=90.0).contains(&max_latitude), "maxLatitude is out of bounds")?;
    require(
        min_latitude <= max_latitude,
        "maxLatitude is smaller than minLatitude",
    )
}

fn require(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(BoundariesError::InvalidInput(message.to_string()))
    }
}

/// Normalize into -180..180; +180 maps to -180
fn normalize_longitude(longitude: f64) -> f64 {
    let mut longitude = longitude % 360.0;
    if longitude < -180.0 {
        longitude += 360.0;
    } else if longitude >= 180.0 {
        longitude -= 360.0;
    }
    longitude
}
