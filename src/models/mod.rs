//! Core data models shared by the index, the codec and the query binary.

pub mod bbox;
pub mod point;

pub use bbox::BoundingBox;
pub use point::{GeoPoint, Point};
