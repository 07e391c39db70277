//! Binary serialization format of the country boundaries index.
//!
//! All numbers are big-endian, strings are a `u16` byte length followed by UTF-8.
//!
//! ```text
//! u16   version (2)
//! i32   size count        { utf id, f64 size }*
//! i32   raster width
//! i32   cell count        { cell }*
//!
//! cell:    u8 count { utf id }*  u8 count { areas }*
//! areas:   utf id  polygons(outer)  polygons(inner)
//! polygons: u8 count { i32 count { u16 x, u16 y }* }*
//! ```

mod reader;
mod writer;

use std::io::{Read, Write};

pub use reader::deserialize;
pub use writer::{encode, serialize};

use crate::error::Result;
use crate::pip::CountryBoundaries;

/// Version of the serialization format this crate reads and writes
pub const FORMAT_VERSION: u16 = 2;

impl CountryBoundaries {
    /// Create a new index by deserializing from the given reader
    pub fn deserialize_from<R: Read>(reader: R) -> Result<Self> {
        deserialize(reader)
    }

    /// Serialize this index to the given writer
    pub fn serialize_to<W: Write>(&self, writer: W) -> Result<()> {
        serialize(self, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;
    use crate::pip::{CountryAreas, CountryBoundariesCell};
    use hashbrown::HashMap;
    use std::sync::Arc;

    fn p(x: u16, y: u16) -> Point {
        Point::new(x, y)
    }

    fn ids(ids: &[&str]) -> Vec<Arc<str>> {
        ids.iter().map(|&id| Arc::from(id)).collect()
    }

    #[test]
    fn test_serialization_round_trip() {
        let sizes: HashMap<Arc<str>, f64> =
            [(Arc::from("A"), 123.0), (Arc::from("B"), 64.4)].into_iter().collect();
        let a = vec![p(0, 0), p(0, 1), p(1, 0)];
        let b = vec![p(0, 0), p(0, 3), p(3, 3), p(3, 0)];
        let b_hole = vec![p(1, 1), p(2, 1), p(2, 2), p(1, 2)];

        let boundaries = CountryBoundaries::new(
            vec![
                CountryBoundariesCell::default(),
                CountryBoundariesCell::new(ids(&["A", "B"]), vec![]),
                CountryBoundariesCell::new(
                    ids(&["B"]),
                    vec![Arc::new(CountryAreas::new("A", vec![a.clone()], vec![]))],
                ),
                CountryBoundariesCell::new(
                    vec![],
                    vec![
                        Arc::new(CountryAreas::new("B", vec![b.clone()], vec![b_hole.clone()])),
                        Arc::new(CountryAreas::new("C", vec![b, a], vec![b_hole])),
                    ],
                ),
            ],
            2,
            sizes,
        )
        .unwrap();

        let mut buf = Vec::new();
        boundaries.serialize_to(&mut buf).unwrap();
        let restored = CountryBoundaries::deserialize_from(buf.as_slice()).unwrap();

        assert_eq!(restored.raster_width(), 2);
        assert_eq!(restored.geometry_sizes(), boundaries.geometry_sizes());
        assert_eq!(restored.raster(), boundaries.raster());
        assert_eq!(restored, boundaries);
    }

    #[test]
    fn test_round_trip_answers_queries_alike() {
        let max = u16::MAX;
        let south_half = Arc::new(CountryAreas::new(
            "S",
            vec![vec![p(0, 0), p(0, max / 2), p(max, max / 2), p(max, 0)]],
            vec![],
        ));
        let boundaries = CountryBoundaries::new(
            vec![
                CountryBoundariesCell::new(ids(&["N"]), vec![south_half]),
                CountryBoundariesCell::new(ids(&["N"]), vec![]),
            ],
            2,
            HashMap::new(),
        )
        .unwrap();

        let restored = deserialize(encode(&boundaries).unwrap().as_slice()).unwrap();
        for (lon, lat) in [(-90.0, 10.0), (-90.0, -80.0), (90.0, 0.0), (180.0, -45.0)] {
            assert_eq!(
                restored.get_ids(lon, lat).unwrap(),
                boundaries.get_ids(lon, lat).unwrap()
            );
        }
        assert_eq!(restored.get_ids(-90.0, -80.0).unwrap(), vec!["N", "S"]);
        assert_eq!(restored.get_ids(-90.0, 10.0).unwrap(), vec!["N"]);
    }
}
