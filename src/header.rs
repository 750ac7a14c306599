//! Header resolution for the three supported index layouts.
//!
//! Two independently evolved serializations of the same logical graph are
//! in play:
//!
//! - **Sequential** (raw graph file, or the graph sub-stream embedded in a
//!   single-file unified index): a 24-byte header followed by
//!   variable-length adjacency records.
//! - **Paged** (SSD-resident disk index): a 5-field geometry header, with
//!   node records packed into fixed 4096-byte pages starting at offset 4096.
//!   Two historical encodings of the geometry header exist (one prefixed
//!   with an unrelated 8-byte `(npts, ndims)` tag, one bare) and the file
//!   itself carries no discriminator, so resolution is heuristic (see
//!   [`PagedHeader::resolve`]).
//!
//! Resolution is all-or-nothing: a short read anywhere in a header yields an
//! error, never a partially populated header.

use crate::cursor::ByteCursor;
use crate::error::{InspectError, InspectResult};
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek};

/// Size of the sequential-layout graph header:
/// `expected_total_size:u64, width:u32, entry_point:u32, frozen_count:u64`.
pub const GRAPH_HEADER_SIZE: u64 = 24;

/// Fixed page length of the paged layout. Also the body offset: the first
/// data page starts immediately after one metadata page.
pub const PAGE_LEN: usize = 4096;

/// Byte offset of the first data page in a paged index file.
pub const PAGED_BODY_OFFSET: u64 = 4096;

/// Coordinate element encoding of a paged index.
///
/// The element size is a property of how the index was built and is not
/// stored in the file; the caller must supply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// 32-bit float coordinates
    Float,
    /// Unsigned 8-bit coordinates
    Uint8,
    /// Signed 8-bit coordinates
    Int8,
}

impl DataType {
    /// Bytes per coordinate element.
    pub fn element_size(self) -> u64 {
        match self {
            DataType::Float => 4,
            DataType::Uint8 | DataType::Int8 => 1,
        }
    }
}

/// Header of the sequential (raw graph / embedded graph) layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequentialHeader {
    /// Total bytes the writer claims the graph stream occupies,
    /// header included. The scanner treats this as advisory.
    pub expected_total_size: u64,
    /// Maximum out-degree the builder was configured with.
    pub width: u32,
    /// Default traversal origin.
    pub entry_point: u32,
    /// Points present in the graph but excluded from search routing.
    pub frozen_count: u64,
}

impl SequentialHeader {
    /// Read the 24-byte header at the cursor's current position.
    pub fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> InspectResult<Self> {
        let expected_total_size = cursor.read_u64()?;
        let width = cursor.read_u32()?;
        let entry_point = cursor.read_u32()?;
        let frozen_count = cursor.read_u64()?;
        Ok(Self {
            expected_total_size,
            width,
            entry_point,
            frozen_count,
        })
    }
}

/// Which historical encoding of the paged geometry header was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagedVariant {
    /// 8-byte `(npts:i32, ndims:i32)` tag, then the five u64 fields.
    Tagged,
    /// The five u64 fields directly at offset 0.
    Untagged,
}

/// Geometry header of the paged layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagedHeader {
    pub n_nodes: u64,
    pub n_dims: u64,
    /// Entry point; called the medoid by the engine that builds these files.
    pub medoid_id: u64,
    /// Fixed on-disk length of one node record, padding included.
    pub max_record_len: u64,
    /// Records packed into each page. Zero means records larger than a
    /// page, stored across multiple pages; a variant this inspector
    /// rejects as unsupported.
    pub records_per_page: u64,
    pub variant: PagedVariant,
}

impl PagedHeader {
    /// Resolve the geometry header, trying the tagged encoding first.
    ///
    /// The tag's leading field is a record count written by whatever tool
    /// produced the file; we commit to the tagged encoding only when it
    /// reads cleanly as an `i32 >= 5` (the five geometry fields that must
    /// follow). An untagged file whose first four bytes happen to decode
    /// to a value >= 5 would be misread as tagged; that false-positive
    /// risk is inherited from the format and logged, not resolved.
    pub fn resolve<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> InspectResult<Self> {
        let tagged = match (cursor.read_i32(), cursor.read_i32()) {
            (Ok(npts_meta), Ok(_ndims_meta)) => npts_meta >= 5,
            _ => false,
        };

        let variant = if tagged {
            tracing::debug!("paged header: tagged encoding (npts tag >= 5)");
            tracing::warn!(
                "tag heuristic committed to the tagged encoding; an untagged \
                 file can coincidentally match"
            );
            PagedVariant::Tagged
        } else {
            tracing::debug!("paged header: untagged encoding, rewinding to offset 0");
            cursor.seek_to(0)?;
            PagedVariant::Untagged
        };

        let n_nodes = cursor.read_u64()?;
        let n_dims = cursor.read_u64()?;
        let medoid_id = cursor.read_u64()?;
        let max_record_len = cursor.read_u64()?;
        let records_per_page = cursor.read_u64()?;

        Ok(Self {
            n_nodes,
            n_dims,
            medoid_id,
            max_record_len,
            records_per_page,
            variant,
        })
    }

    /// Check the geometry invariant against the caller-supplied element size.
    ///
    /// A record must hold `n_dims` coordinates plus a 4-byte degree field,
    /// and must fit in one page. Violation means the file is not this
    /// layout and must be rejected.
    pub fn validate(&self, data_type: DataType) -> InspectResult<()> {
        let min_len = self
            .n_dims
            .saturating_mul(data_type.element_size())
            .saturating_add(4);
        if self.max_record_len < min_len || self.max_record_len > PAGE_LEN as u64 {
            return Err(InspectError::Format(format!(
                "max_record_len {} outside [{}, {}]",
                self.max_record_len, min_len, PAGE_LEN
            )));
        }
        Ok(())
    }

    /// Byte offset of the degree field inside a record: coordinates first,
    /// then `degree:u32`, then the neighbor ids.
    pub fn neighborhood_offset(&self, data_type: DataType) -> u64 {
        self.n_dims * data_type.element_size()
    }
}

/// Resolve where the graph sub-stream starts inside a single-file unified
/// index.
///
/// The file opens with a 5×u64 metadata block; its first field is the
/// graph offset (always one metadata page) and its second the total index
/// size. Anything else means the file is not a unified index.
pub fn resolve_embedded_graph_offset<R: Read + Seek>(
    cursor: &mut ByteCursor<R>,
) -> InspectResult<u64> {
    let mut meta = [0u64; 5];
    for slot in meta.iter_mut() {
        *slot = cursor.read_u64()?;
    }
    if meta[0] != PAGED_BODY_OFFSET || meta[1] <= meta[0] {
        return Err(InspectError::Format(format!(
            "not a single-file unified index (graph offset {}, index size {})",
            meta[0], meta[1]
        )));
    }
    Ok(meta[0])
}

/// Open `path` and resolve the embedded graph offset of a single-file
/// unified index (see [`resolve_embedded_graph_offset`]).
pub fn unified_index_graph_offset(path: impl AsRef<std::path::Path>) -> InspectResult<u64> {
    let mut cursor = ByteCursor::new(std::fs::File::open(path)?);
    resolve_embedded_graph_offset(&mut cursor)
}
