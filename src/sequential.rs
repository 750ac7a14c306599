//! Scanner for the sequential graph layout (raw graph files and the graph
//! sub-stream embedded in a single-file unified index).
//!
//! The body is an implicit linked structure serialized flat: each record is
//! `degree:u32` followed by `degree` neighbor ids, so each record's length
//! determines the offset of the next. The scanner owns that running
//! byte-offset invariant; stats, adjacency samples and small-graph views all
//! consume the same iterator instead of re-implementing the walk.

use crate::cursor::ByteCursor;
use crate::error::InspectResult;
use crate::header::{SequentialHeader, GRAPH_HEADER_SIZE};
use crate::sample::{NeighborCapture, NodeRecord};
use crate::stats::{DegreeAccumulator, GraphStats, DEFAULT_WEAK_THRESHOLD};
use smallvec::SmallVec;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Iterator over the records of a sequential graph stream.
///
/// Terminates when the running byte counter reaches the header's
/// `expected_total_size`, or on the first failed read, whichever comes
/// first. A size field that disagrees with the actual record stream (seen
/// with corrupt or hand-edited files) is tolerated silently.
pub struct SequentialScanner<R> {
    cursor: ByteCursor<R>,
    header: SequentialHeader,
    capture: NeighborCapture,
    bytes_read: u64,
    next_node_id: u64,
    done: bool,
}

impl SequentialScanner<File> {
    /// Open a graph file and read its header. `body_offset` is 0 for a raw
    /// graph file, or the resolved sub-stream offset for a unified index.
    pub fn open(
        path: impl AsRef<Path>,
        body_offset: u64,
        capture: NeighborCapture,
    ) -> InspectResult<Self> {
        Self::new(File::open(path)?, body_offset, capture)
    }
}

impl<R: Read + Seek> SequentialScanner<R> {
    /// Wrap an already-open byte source; seeks to `body_offset` and reads
    /// the 24-byte header.
    pub fn new(source: R, body_offset: u64, capture: NeighborCapture) -> InspectResult<Self> {
        let mut cursor = ByteCursor::new(source);
        cursor.seek_to(body_offset)?;
        let header = SequentialHeader::read(&mut cursor)?;
        Ok(Self {
            cursor,
            header,
            capture,
            bytes_read: GRAPH_HEADER_SIZE,
            next_node_id: 0,
            done: false,
        })
    }

    pub fn header(&self) -> &SequentialHeader {
        &self.header
    }

    /// Nodes yielded so far.
    pub fn nodes_read(&self) -> u64 {
        self.next_node_id
    }
}

impl<R: Read + Seek> Iterator for SequentialScanner<R> {
    type Item = NodeRecord;

    fn next(&mut self) -> Option<NodeRecord> {
        if self.done || self.bytes_read == self.header.expected_total_size {
            return None;
        }

        let degree = match self.cursor.read_u32() {
            Ok(d) => d,
            Err(_) => {
                // Truncated mid-body: graceful stop, never a fabricated
                // degree for an unreadable record.
                self.done = true;
                tracing::debug!(
                    nodes_read = self.next_node_id,
                    "sequential scan stopped early (short read)"
                );
                return None;
            }
        };

        let want = self.capture.want(degree);
        let mut neighbors: SmallVec<[u32; 32]> = SmallVec::with_capacity(want);
        for _ in 0..want {
            match self.cursor.read_u32() {
                Ok(id) => neighbors.push(id),
                Err(_) => {
                    // The record's neighbor list is unreadable; the node is
                    // not reported.
                    self.done = true;
                    return None;
                }
            }
        }

        // Remaining neighbor bytes are skipped, not read: stats-only scans
        // must not materialize the adjacency list.
        let remaining = u64::from(degree) - want as u64;
        if remaining > 0 && self.cursor.skip(remaining * 4).is_err() {
            self.done = true;
        }

        self.bytes_read += 4 + u64::from(degree) * 4;
        let node_id = self.next_node_id;
        self.next_node_id += 1;

        Some(NodeRecord {
            node_id,
            degree,
            neighbors,
        })
    }
}

fn try_stats(path: &Path, body_offset: u64) -> InspectResult<GraphStats> {
    let mut scanner = SequentialScanner::open(path, body_offset, NeighborCapture::Skip)?;
    let header = *scanner.header();

    let mut acc = DegreeAccumulator::new(DEFAULT_WEAK_THRESHOLD);
    for record in scanner.by_ref() {
        acc.observe(u64::from(record.degree));
    }

    let nodes = acc.nodes();
    Ok(acc.finish(
        nodes.saturating_sub(header.frozen_count),
        header.frozen_count,
        header.entry_point,
    ))
}

/// Compute [`GraphStats`] from a sequential graph file in one forward pass.
///
/// `body_offset` is 0 for a raw graph file; for a single-file unified index
/// pass the offset resolved from its metadata block. Any failure to open or
/// parse collapses to all-zero stats; truncation mid-body yields partial
/// stats over the nodes that were read.
pub fn compute_stats_from_sequential_file(path: impl AsRef<Path>, body_offset: u64) -> GraphStats {
    match try_stats(path.as_ref(), body_offset) {
        Ok(stats) => stats,
        Err(e) => {
            tracing::debug!(
                path = %path.as_ref().display(),
                error = %e,
                "sequential stats unavailable"
            );
            GraphStats::default()
        }
    }
}
