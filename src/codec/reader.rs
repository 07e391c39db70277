//! Deserialization of a country boundaries index.

use std::io::{ErrorKind, Read};
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use tracing::info;

use super::FORMAT_VERSION;
use crate::error::{BoundariesError, Result};
use crate::models::Point;
use crate::pip::{CountryAreas, CountryBoundaries, CountryBoundariesCell, Ring};

/// Upper bound for allocation sized by an untrusted length field
const MAX_PREALLOCATION: usize = 1 << 16;

/// Read a country boundaries index from a stream.
///
/// The stream is consumed forward only. Any failure discards everything read so far.
pub fn deserialize<R: Read>(reader: R) -> Result<CountryBoundaries> {
    let mut reader = IndexReader::new(reader);

    let version = reader.read_u16()?;
    if version != FORMAT_VERSION {
        return Err(BoundariesError::Decode(format!(
            "Wrong version number '{}' of the file serialization format (expected: '{}'). \
             You may need to get the current version of the data.",
            version, FORMAT_VERSION
        )));
    }

    let sizes_count = reader.read_len("geometry size count")?;
    let mut geometry_sizes = HashMap::with_capacity(sizes_count.min(MAX_PREALLOCATION));
    for _ in 0..sizes_count {
        let id = reader.read_utf()?;
        let size = reader.read_f64()?;
        geometry_sizes.insert(id, size);
    }

    let raster_width = reader.read_len("raster width")?;
    let cell_count = reader.read_len("raster cell count")?;
    if raster_width == 0 || cell_count == 0 || cell_count % raster_width != 0 {
        return Err(BoundariesError::Decode(format!(
            "{} cells do not fill rows of width {}",
            cell_count, raster_width
        )));
    }

    let mut raster = Vec::with_capacity(cell_count.min(MAX_PREALLOCATION));
    for _ in 0..cell_count {
        raster.push(reader.read_cell()?);
    }

    info!(
        "Deserialized country boundaries: {}x{} cells, {} distinct ids, {} sized regions",
        raster_width,
        cell_count / raster_width,
        reader.strings.len(),
        geometry_sizes.len()
    );

    CountryBoundaries::new(raster, raster_width, geometry_sizes)
        .map_err(|e| BoundariesError::Decode(e.to_string()))
}

/// Big-endian primitive reader with a per-stream string pool.
struct IndexReader<R> {
    inner: R,
    /// Ids repeat across hundreds of cells; share one allocation per distinct id.
    strings: HashSet<Arc<str>>,
    buf: Vec<u8>,
}

impl<R: Read> IndexReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            strings: HashSet::new(),
            buf: Vec::new(),
        }
    }

    fn read_cell(&mut self) -> Result<CountryBoundariesCell> {
        let containing_count = self.read_u8()?;
        let mut containing_ids = Vec::with_capacity(containing_count as usize);
        for _ in 0..containing_count {
            containing_ids.push(self.read_utf()?);
        }

        let intersecting_count = self.read_u8()?;
        let mut intersecting_areas = Vec::with_capacity(intersecting_count as usize);
        for _ in 0..intersecting_count {
            intersecting_areas.push(Arc::new(self.read_areas()?));
        }

        Ok(CountryBoundariesCell::new(containing_ids, intersecting_areas))
    }

    fn read_areas(&mut self) -> Result<CountryAreas> {
        let id = self.read_utf()?;
        let outer = self.read_polygons()?;
        let inner = self.read_polygons()?;
        Ok(CountryAreas { id, outer, inner })
    }

    fn read_polygons(&mut self) -> Result<Vec<Ring>> {
        let count = self.read_u8()?;
        (0..count).map(|_| self.read_ring()).collect()
    }

    fn read_ring(&mut self) -> Result<Ring> {
        let count = self.read_len("ring point count")?;
        let mut ring = Vec::with_capacity(count.min(MAX_PREALLOCATION));
        for _ in 0..count {
            let x = self.read_u16()?;
            let y = self.read_u16()?;
            ring.push(Point::new(x, y));
        }
        Ok(ring)
    }

    /// `u16` byte length followed by UTF-8, as written by `DataOutput.writeUTF`
    /// for plain (non-modified) UTF-8 input.
    fn read_utf(&mut self) -> Result<Arc<str>> {
        let len = self.read_u16()? as usize;
        self.buf.resize(len, 0);
        read_exact(&mut self.inner, &mut self.buf)?;

        let s = std::str::from_utf8(&self.buf)
            .map_err(|e| BoundariesError::Decode(format!("Invalid UTF-8 in id: {}", e)))?;

        if let Some(interned) = self.strings.get(s) {
            return Ok(Arc::clone(interned));
        }
        let interned: Arc<str> = Arc::from(s);
        self.strings.insert(Arc::clone(&interned));
        Ok(interned)
    }

    /// Non-negative `i32` length field
    fn read_len(&mut self, what: &str) -> Result<usize> {
        let len = self.read_i32()?;
        usize::try_from(len)
            .map_err(|_| BoundariesError::Decode(format!("Invalid data: negative {} {}", what, len)))
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(u8::from_be_bytes(self.read_array()?))
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut bytes = [0u8; N];
        read_exact(&mut self.inner, &mut bytes)?;
        Ok(bytes)
    }
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => BoundariesError::Decode("Unexpected end of data".into()),
        _ => BoundariesError::Io(e),
    })
}
