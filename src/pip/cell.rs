//! One cell of the country boundaries raster.

use std::sync::Arc;

use super::CountryAreas;
use crate::models::Point;

/// Regions that fully cover this cell, plus the geometry of regions that only
/// partly cover it. An id never appears in both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryBoundariesCell {
    pub containing_ids: Vec<Arc<str>>,
    pub intersecting_areas: Vec<Arc<CountryAreas>>,
}

impl CountryBoundariesCell {
    pub fn new(containing_ids: Vec<Arc<str>>, intersecting_areas: Vec<Arc<CountryAreas>>) -> Self {
        Self {
            containing_ids,
            intersecting_areas,
        }
    }

    /// Whether the point is in any of the regions with the given ids
    pub fn is_in_any<S: AsRef<str>>(&self, point: Point, ids: &[S]) -> bool {
        let wanted = |id: &str| ids.iter().any(|i| i.as_ref() == id);

        self.containing_ids.iter().any(|id| wanted(id.as_ref()))
            || self
                .intersecting_areas
                .iter()
                .any(|areas| wanted(areas.id.as_ref()) && areas.covers(point))
    }

    /// Ids of all regions covering the point: fully containing ones first, then
    /// intersecting ones in stored order.
    pub fn get_ids(&self, point: Point) -> Vec<&str> {
        self.containing_ids
            .iter()
            .map(|id| id.as_ref())
            .chain(
                self.intersecting_areas
                    .iter()
                    .filter(|areas| areas.covers(point))
                    .map(|areas| areas.id.as_ref()),
            )
            .collect()
    }

    /// Ids of all regions that completely or partly cover this cell
    pub fn get_all_ids(&self) -> impl Iterator<Item = &str> {
        self.containing_ids
            .iter()
            .map(|id| id.as_ref())
            .chain(self.intersecting_areas.iter().map(|areas| areas.id.as_ref()))
    }
}
