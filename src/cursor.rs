//! Minimal cursor over a byte source.
//!
//! All on-disk integers in the supported layouts are fixed-width
//! little-endian. The cursor never panics on short reads: every read
//! returns a `Result`, and a failed read leaves the caller free to
//! degrade to a partial or empty result.

use crate::error::InspectResult;
use std::io::{Read, Seek, SeekFrom};

/// Forward-only reader with fixed-width little-endian decoding.
///
/// Wraps any `Read + Seek` source (a `File` in practice, a `Cursor<Vec<u8>>`
/// in tests). Skipping uses a relative seek rather than read-and-discard, so
/// scanning a graph for stats never materializes neighbor bytes.
#[derive(Debug)]
pub struct ByteCursor<R> {
    inner: R,
}

impl<R: Read + Seek> ByteCursor<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read a little-endian `u32`.
    pub fn read_u32(&mut self) -> InspectResult<u32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Read a little-endian `i32`.
    pub fn read_i32(&mut self) -> InspectResult<i32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Read a little-endian `u64`.
    pub fn read_u64(&mut self) -> InspectResult<u64> {
        let mut buf = [0u8; 8];
        self.inner.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Fill `buf` completely or fail.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> InspectResult<()> {
        self.inner.read_exact(buf)?;
        Ok(())
    }

    /// Skip `n` bytes forward without reading them.
    ///
    /// Seeking past end-of-file succeeds on most platforms; the next read
    /// is what reports the truncation.
    pub fn skip(&mut self, n: u64) -> InspectResult<()> {
        self.inner.seek(SeekFrom::Current(n as i64))?;
        Ok(())
    }

    /// Seek to an absolute offset from the start of the source.
    pub fn seek_to(&mut self, offset: u64) -> InspectResult<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
}
