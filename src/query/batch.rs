//! CSV batch lookups.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use country_boundaries::{GeoPoint, PipService};

#[derive(Debug, Deserialize)]
struct PointRecord {
    lon: f64,
    lat: f64,
}

#[derive(Debug, Serialize)]
struct IdsRecord {
    lon: f64,
    lat: f64,
    /// Region ids joined by ';', smallest region first
    ids: String,
    error: Option<String>,
}

#[derive(Debug, Default, PartialEq)]
pub struct BatchStats {
    pub points: usize,
    pub failed: usize,
}

/// Look up every `lon,lat` row of `input` and write `lon,lat,ids,error` rows to `output`
pub fn run_batch<R: Read, W: Write>(service: &PipService, input: R, output: W) -> Result<BatchStats> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let points = csv_reader
        .deserialize::<PointRecord>()
        .map(|record| record.map(|r| GeoPoint::new(r.lon, r.lat)))
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to parse input CSV (expected columns lon,lat)")?;

    let results = service.lookup_many(&points);

    let mut stats = BatchStats {
        points: points.len(),
        failed: 0,
    };
    let mut csv_writer = WriterBuilder::new().from_writer(output);
    for (point, result) in points.iter().zip(results) {
        let record = match result {
            Ok(lookup) => IdsRecord {
                lon: point.lon,
                lat: point.lat,
                ids: lookup.ids.join(";"),
                error: None,
            },
            Err(e) => {
                stats.failed += 1;
                IdsRecord {
                    lon: point.lon,
                    lat: point.lat,
                    ids: String::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use country_boundaries::{CountryBoundaries, CountryBoundariesCell};
    use hashbrown::HashMap;
    use std::sync::Arc;

    fn service() -> PipService {
        let raster = vec![
            CountryBoundariesCell::new(vec![Arc::from("W"), Arc::from("X")], vec![]),
            CountryBoundariesCell::new(vec![Arc::from("E")], vec![]),
        ];
        PipService::new(Arc::new(CountryBoundaries::new(raster, 2, HashMap::new()).unwrap()))
    }

    #[test]
    fn test_batch_lookup() {
        let input = "lon,lat\n-10.5,20\n 10, -20\n0,95\n";
        let mut output = Vec::new();

        let stats = run_batch(&service(), input.as_bytes(), &mut output).unwrap();
        assert_eq!(stats, BatchStats { points: 3, failed: 1 });

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "lon,lat,ids,error");
        assert_eq!(lines[1], "-10.5,20.0,W;X,");
        assert_eq!(lines[2], "10.0,-20.0,E,");
        assert!(lines[3].starts_with("0.0,95.0,,"));
        assert!(lines[3].contains("latitude is out of bounds"));
    }

    #[test]
    fn test_batch_rejects_malformed_csv() {
        let mut output = Vec::new();
        assert!(run_batch(&service(), "lon,lat\nabc,1\n".as_bytes(), &mut output).is_err());
        assert!(output.is_empty());
    }
}
