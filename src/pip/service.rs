//! PIP service for looking up many points against one shared index.

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::CountryBoundaries;
use crate::error::Result;
use crate::models::GeoPoint;

/// Ids of the regions at one position, smallest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResult {
    pub lon: f64,
    pub lat: f64,
    pub ids: Vec<String>,
}

/// Point-in-Polygon lookup service
#[derive(Debug, Clone)]
pub struct PipService {
    index: Arc<CountryBoundaries>,
}

impl PipService {
    /// Create a new PIP service from a spatial index
    pub fn new(index: Arc<CountryBoundaries>) -> Self {
        Self { index }
    }

    /// Look up the regions at a single point
    pub fn lookup(&self, point: GeoPoint) -> Result<LookupResult> {
        let ids = self.index.get_ids_at(point)?;
        Ok(LookupResult {
            lon: point.lon,
            lat: point.lat,
            ids: ids.into_iter().map(String::from).collect(),
        })
    }

    /// Look up many points in parallel. Results keep the input order; an invalid
    /// point only fails its own entry.
    pub fn lookup_many(&self, points: &[GeoPoint]) -> Vec<Result<LookupResult>> {
        debug!("PIP batch lookup of {} points", points.len());
        points.par_iter().map(|&point| self.lookup(point)).collect()
    }

    /// Get the spatial index (for stats/debugging)
    pub fn index(&self) -> &CountryBoundaries {
        &self.index
    }
}
