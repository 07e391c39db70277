//! Country Boundaries - offline lookup of the countries and subdivisions at a position
//!
//! This library loads a precomputed raster index of region polygons once and answers
//! point and bounding box queries against it without further I/O.

pub mod codec;
pub mod error;
pub mod models;
pub mod pip;

pub use error::{BoundariesError, Result};
pub use models::{BoundingBox, GeoPoint, Point};
pub use pip::{
    BboxQueryResult, CountryAreas, CountryBoundaries, CountryBoundariesCell, LookupResult,
    PipService,
};
