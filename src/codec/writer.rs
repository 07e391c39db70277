//! Serialization of a country boundaries index.

use std::io::Write;

use tracing::debug;

use super::FORMAT_VERSION;
use crate::error::{BoundariesError, Result};
use crate::pip::{CountryAreas, CountryBoundaries, CountryBoundariesCell, Ring};

/// Write a country boundaries index to a stream.
///
/// The whole index is encoded in memory first, so nothing reaches the stream if
/// any part of it does not fit the format.
pub fn serialize<W: Write>(boundaries: &CountryBoundaries, mut writer: W) -> Result<()> {
    let bytes = encode(boundaries)?;
    debug!("Serialized country boundaries to {} bytes", bytes.len());
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Encode a country boundaries index into bytes
pub fn encode(boundaries: &CountryBoundaries) -> Result<Vec<u8>> {
    let mut out = IndexWriter::default();

    out.write_u16(FORMAT_VERSION);

    // sorted so the same index always yields the same bytes
    let mut sizes: Vec<_> = boundaries.geometry_sizes().iter().collect();
    sizes.sort_by(|a, b| a.0.cmp(b.0));

    out.write_len(sizes.len(), "geometry sizes")?;
    for (id, size) in sizes {
        out.write_utf(id)?;
        out.write_f64(*size);
    }

    out.write_len(boundaries.raster_width(), "raster width")?;
    out.write_len(boundaries.cell_count(), "raster cells")?;
    for cell in boundaries.raster() {
        out.write_cell(cell)?;
    }

    Ok(out.buf)
}

/// Big-endian primitive writer
#[derive(Default)]
struct IndexWriter {
    buf: Vec<u8>,
}

impl IndexWriter {
    fn write_cell(&mut self, cell: &CountryBoundariesCell) -> Result<()> {
        self.write_count(
            cell.containing_ids.len(),
            "At most 255 different areas per cell are supported (try a bigger raster)",
        )?;
        for id in &cell.containing_ids {
            self.write_utf(id)?;
        }

        self.write_count(
            cell.intersecting_areas.len(),
            "At most 255 different areas per cell are supported (try a bigger raster)",
        )?;
        for areas in &cell.intersecting_areas {
            self.write_areas(areas)?;
        }
        Ok(())
    }

    fn write_areas(&mut self, areas: &CountryAreas) -> Result<()> {
        self.write_utf(&areas.id)?;
        self.write_polygons(&areas.outer)?;
        self.write_polygons(&areas.inner)
    }

    fn write_polygons(&mut self, rings: &[Ring]) -> Result<()> {
        self.write_count(
            rings.len(),
            "At most 255 different polygons are supported per area (try a bigger raster)",
        )?;
        for ring in rings {
            self.write_len(ring.len(), "ring points")?;
            for point in ring {
                self.write_u16(point.x);
                self.write_u16(point.y);
            }
        }
        Ok(())
    }

    fn write_utf(&mut self, s: &str) -> Result<()> {
        let len = u16::try_from(s.len())
            .map_err(|_| BoundariesError::Encode(format!("ID too long: {} bytes", s.len())))?;
        self.write_u16(len);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    /// `u8` count field
    fn write_count(&mut self, count: usize, message: &str) -> Result<()> {
        let count = u8::try_from(count).map_err(|_| BoundariesError::Encode(message.to_string()))?;
        self.buf.push(count);
        Ok(())
    }

    /// `i32` length field
    fn write_len(&mut self, len: usize, what: &str) -> Result<()> {
        let len = i32::try_from(len)
            .map_err(|_| BoundariesError::Encode(format!("Too many {}: {}", what, len)))?;
        self.buf.extend_from_slice(&len.to_be_bytes());
        Ok(())
    }

    fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }
}
