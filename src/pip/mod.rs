//! Point-in-Polygon (PIP) country boundary lookups.
//!
//! A uniform lon/lat raster narrows each lookup down to one cell, which either
//! knows the answer outright or tests the few region geometries crossing it.

mod cell;
mod geometry;
mod index;
mod service;

pub use cell::CountryBoundariesCell;
pub use geometry::{CountryAreas, Ring};
pub use index::{BboxQueryResult, CountryBoundaries};
pub use service::{LookupResult, PipService};
