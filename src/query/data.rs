//! Loading the serialized boundaries file.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use tracing::info;

use country_boundaries::CountryBoundaries;

/// Load boundaries from a file, gunzipping it first if it ends in `.gz`
pub fn load_boundaries(path: &Path) -> Result<CountryBoundaries> {
    info!("Loading country boundaries from {}", path.display());

    let file = File::open(path)
        .with_context(|| format!("Failed to open boundaries file {}", path.display()))?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    CountryBoundaries::deserialize_from(reader)
        .with_context(|| format!("Failed to read boundaries from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use country_boundaries::CountryBoundariesCell;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use hashbrown::HashMap;
    use std::sync::Arc;

    fn boundaries() -> CountryBoundaries {
        let cell = CountryBoundariesCell::new(vec![Arc::from("AQ")], vec![]);
        CountryBoundaries::new(vec![cell], 1, HashMap::new()).unwrap()
    }

    #[test]
    fn test_load_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boundaries.ser");
        boundaries().serialize_to(File::create(&path).unwrap()).unwrap();

        let loaded = load_boundaries(&path).unwrap();
        assert_eq!(loaded, boundaries());
    }

    #[test]
    fn test_load_gzipped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boundaries.ser.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        boundaries().serialize_to(&mut encoder).unwrap();
        encoder.finish().unwrap();

        let loaded = load_boundaries(&path).unwrap();
        assert_eq!(loaded.get_ids(0.0, -89.0).unwrap(), vec!["AQ"]);
    }

    #[test]
    fn test_load_corrupt_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boundaries.ser");
        std::fs::write(&path, [0u8, 1, 0, 0]).unwrap();

        let err = load_boundaries(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("version"));
    }
}
