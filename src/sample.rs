//! Bounded-memory adjacency sampling and human-inspectable views.
//!
//! Both scanners (sequential and paged) yield the same record shape, so the
//! sampled-subgraph construction and the line-oriented rendering are written
//! once and fed by either layout.
//!
//! The reverse-edge ("referenced_by") view is reconstructed over the sampled
//! prefix only: storage is two arrays of `N` growable lists indexed by
//! position, never a map keyed by arbitrary node id, so an edge pointing
//! outside the sample has no slot to land in by construction.

use crate::header::DataType;
use crate::paged::PagedScanner;
use crate::sequential::SequentialScanner;
use smallvec::SmallVec;
use std::fmt::Write;
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;

/// What a scanner does with each record's neighbor ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborCapture {
    /// Skip neighbor bytes with a forward seek; stats only.
    Skip,
    /// Materialize up to the given number of neighbors (0 = all).
    First(usize),
}

impl NeighborCapture {
    /// How many of `degree` neighbors to materialize.
    pub(crate) fn want(self, degree: u32) -> usize {
        match self {
            NeighborCapture::Skip => 0,
            NeighborCapture::First(0) => degree as usize,
            NeighborCapture::First(cap) => (degree as usize).min(cap),
        }
    }
}

/// One node record produced by a scanner.
///
/// `degree` is always the stored degree field; `neighbors` holds whatever
/// the capture policy (and, for the paged layout, the page boundary)
/// allowed to be materialized, and may be shorter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub node_id: u64,
    pub degree: u32,
    pub neighbors: SmallVec<[u32; 32]>,
}

/// Selects the file layout for the render entry points.
#[derive(Debug, Clone, Copy)]
pub enum GraphSource<'a> {
    /// Raw graph file, or the graph sub-stream of a single-file unified
    /// index (pass the resolved offset).
    Sequential { path: &'a Path, offset: u64 },
    /// Sector-paged disk index.
    Paged { path: &'a Path, data_type: DataType },
}

impl GraphSource<'_> {
    fn path(&self) -> &Path {
        match self {
            GraphSource::Sequential { path, .. } => path,
            GraphSource::Paged { path, .. } => path,
        }
    }
}

/// The first `N` nodes of a graph with their out-edges and the in-edges
/// among those same nodes.
#[derive(Debug, Clone, Default)]
pub struct SampledSubgraph {
    /// Traversal origin reported by the header (medoid for paged indexes).
    pub entry_point: u64,
    /// Out-neighbor list per sampled node, indexed by position.
    pub out_neighbors: Vec<Vec<u32>>,
    /// Sampled nodes that list this node as an out-neighbor.
    pub referenced_by: Vec<Vec<u32>>,
}

impl SampledSubgraph {
    /// Number of nodes actually sampled (may be below the requested size
    /// when the underlying scan terminated early).
    pub fn len(&self) -> usize {
        self.out_neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out_neighbors.is_empty()
    }

    /// Build from a record stream, keeping at most `sample_size` nodes.
    ///
    /// Memory is `O(sample_size)` lists regardless of the graph's size.
    pub fn collect<I>(records: I, sample_size: usize, entry_point: u64) -> Self
    where
        I: Iterator<Item = NodeRecord>,
    {
        let mut out_neighbors: Vec<Vec<u32>> = vec![Vec::new(); sample_size];
        let mut referenced_by: Vec<Vec<u32>> = vec![Vec::new(); sample_size];

        let mut read = 0usize;
        for record in records.take(sample_size) {
            out_neighbors[read] = record.neighbors.into_vec();
            for &target in &out_neighbors[read] {
                if (target as usize) < sample_size {
                    referenced_by[target as usize].push(read as u32);
                }
            }
            read += 1;
        }

        // Early termination shrinks the sample; reverse lists recorded for
        // never-read positions go with it.
        out_neighbors.truncate(read);
        referenced_by.truncate(read);

        Self {
            entry_point,
            out_neighbors,
            referenced_by,
        }
    }
}

fn write_id_list(out: &mut String, ids: &[u32]) {
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            let _ = write!(out, ", ");
        }
        let _ = write!(out, "{id}");
    }
}

fn write_neighbor_list(out: &mut String, shown: &[u32], total: u64, max_shown: usize) {
    let _ = write!(out, "[");
    write_id_list(out, shown);
    // max_shown == 0 means show all; no indicator in that case.
    if max_shown > 0 && total > max_shown as u64 {
        let _ = write!(out, ", ... ({total} total)");
    }
    let _ = write!(out, "]");
}

/// Render the out-neighbor lists of the first `sample_size` nodes.
///
/// One line per node, `  node_id: [n1, n2, ...]`, with
/// `, ... (K total)` appended when `max_shown` truncates the display
/// (`max_shown == 0` shows everything). The textual shape is parsed by
/// external tooling and must stay stable.
pub fn render_adjacency_sample(
    source: &GraphSource<'_>,
    sample_size: usize,
    max_shown: usize,
) -> String {
    let mut out = String::new();
    let file = match File::open(source.path()) {
        Ok(f) => f,
        Err(_) => {
            let _ = writeln!(out, "Could not open file: {}", source.path().display());
            return out;
        }
    };

    let capture = NeighborCapture::First(max_shown);
    match source {
        GraphSource::Sequential { offset, .. } => {
            let mut file = file;
            // A failed seek is reported; an unreadable header is silent.
            if file.seek(SeekFrom::Start(*offset)).is_err() {
                let _ = writeln!(out, "Seek failed");
                return out;
            }
            let mut scanner = match SequentialScanner::new(file, *offset, capture) {
                Ok(s) => s,
                Err(e) => {
                    tracing::debug!(error = %e, "adjacency sample: unreadable header");
                    return out;
                }
            };
            let _ = writeln!(
                out,
                "Adjacency sample (first {} nodes, entry_point={}):",
                sample_size,
                scanner.header().entry_point
            );
            for record in scanner.by_ref().take(sample_size) {
                let _ = write!(out, "  {}: ", record.node_id);
                write_neighbor_list(&mut out, &record.neighbors, record.degree as u64, max_shown);
                out.push('\n');
            }
        }
        GraphSource::Paged { data_type, .. } => {
            let mut scanner = match PagedScanner::new(file, *data_type, capture) {
                Ok(s) => s,
                Err(e) => {
                    tracing::debug!(error = %e, "adjacency sample: unusable paged index");
                    return out;
                }
            };
            let _ = writeln!(
                out,
                "Adjacency sample (first {} nodes, entry_point={}):",
                sample_size,
                scanner.header().medoid_id
            );
            for record in scanner.by_ref().take(sample_size) {
                let _ = write!(out, "  {}: ", record.node_id);
                write_neighbor_list(&mut out, &record.neighbors, record.degree as u64, max_shown);
                out.push('\n');
            }
        }
    }
    out
}

/// Render the first `sample_size` nodes with out-neighbors and the
/// referenced-by view within the sample.
///
/// Neighbor lists are materialized in full here (the reverse edges need
/// them); `max_shown` only truncates the display of the out lists.
pub fn render_small_graph(
    source: &GraphSource<'_>,
    sample_size: usize,
    max_shown: usize,
) -> String {
    let mut out = String::new();
    let file = match File::open(source.path()) {
        Ok(f) => f,
        Err(_) => {
            let _ = writeln!(out, "Could not open file: {}", source.path().display());
            return out;
        }
    };

    let sample = match source {
        GraphSource::Sequential { offset, .. } => {
            let mut file = file;
            if file.seek(SeekFrom::Start(*offset)).is_err() {
                let _ = writeln!(out, "Seek failed");
                return out;
            }
            let mut scanner =
                match SequentialScanner::new(file, *offset, NeighborCapture::First(0)) {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::debug!(error = %e, "small graph: unreadable header");
                        return out;
                    }
                };
            let entry_point = u64::from(scanner.header().entry_point);
            SampledSubgraph::collect(scanner.by_ref(), sample_size, entry_point)
        }
        GraphSource::Paged { data_type, .. } => {
            let mut scanner = match PagedScanner::new(file, *data_type, NeighborCapture::First(0)) {
                Ok(s) => s,
                Err(e) => {
                    tracing::debug!(error = %e, "small graph: unusable paged index");
                    return out;
                }
            };
            let entry_point = scanner.header().medoid_id;
            let n = (scanner.header().n_nodes).min(sample_size as u64) as usize;
            SampledSubgraph::collect(scanner.by_ref(), n, entry_point)
        }
    };

    render_sampled_subgraph(&sample, max_shown)
}

/// Render an already-built [`SampledSubgraph`].
pub fn render_sampled_subgraph(sample: &SampledSubgraph, max_shown: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Small graph (first {} nodes, entry_point={}): out-neighbors and referenced_by within sample",
        sample.len(),
        sample.entry_point
    );
    for (i, neighbors) in sample.out_neighbors.iter().enumerate() {
        let shown = match max_shown {
            0 => neighbors.len(),
            cap => neighbors.len().min(cap),
        };
        let _ = write!(out, "  {i}: out ");
        write_neighbor_list(&mut out, &neighbors[..shown], neighbors.len() as u64, max_shown);
        let _ = write!(out, "  referenced_by [");
        write_id_list(&mut out, &sample.referenced_by[i]);
        let _ = write!(out, "]");
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn record(node_id: u64, neighbors: &[u32]) -> NodeRecord {
        NodeRecord {
            node_id,
            degree: neighbors.len() as u32,
            neighbors: SmallVec::from_slice(neighbors),
        }
    }

    #[test]
    fn reverse_edges_stay_within_sample() {
        // 0 -> 1, 1 -> 2, 2 -> 0, and 0 -> 5 which is outside the sample.
        let records = vec![
            record(0, &[1, 5]),
            record(1, &[2]),
            record(2, &[0]),
        ];
        let sample = SampledSubgraph::collect(records.into_iter(), 3, 0);
        assert_eq!(sample.len(), 3);
        assert_eq!(sample.referenced_by[1], vec![0]);
        assert_eq!(sample.referenced_by[2], vec![1]);
        assert_eq!(sample.referenced_by[0], vec![2]);
        // Node 5 has no slot anywhere.
        assert!(sample.out_neighbors.iter().all(|l| l.len() <= 2));
    }

    #[test]
    fn early_termination_truncates_sample() {
        let records = vec![record(0, &[2]), record(1, &[0])];
        let sample = SampledSubgraph::collect(records.into_iter(), 5, 0);
        assert_eq!(sample.len(), 2);
        assert_eq!(sample.referenced_by.len(), 2);
        // The edge 0 -> 2 targeted a slot that was never read.
        assert_eq!(sample.referenced_by[0], vec![1]);
    }

    #[test]
    fn rendering_shows_truncation_indicator() {
        let sample = SampledSubgraph {
            entry_point: 0,
            out_neighbors: vec![vec![1, 2, 3, 4]],
            referenced_by: vec![vec![]],
        };
        let text = render_sampled_subgraph(&sample, 2);
        assert!(text.contains("  0: out [1, 2, ... (4 total)]  referenced_by []"));

        let text = render_sampled_subgraph(&sample, 0);
        assert!(text.contains("  0: out [1, 2, 3, 4]  referenced_by []"));
    }

    #[test]
    fn capture_policy_limits() {
        assert_eq!(NeighborCapture::Skip.want(10), 0);
        assert_eq!(NeighborCapture::First(0).want(10), 10);
        assert_eq!(NeighborCapture::First(3).want(10), 3);
        assert_eq!(NeighborCapture::First(30).want(10), 10);
    }

    #[test]
    fn smallvec_record_equality() {
        let a = record(1, &[2, 3]);
        let b = NodeRecord {
            node_id: 1,
            degree: 2,
            neighbors: smallvec![2, 3],
        };
        assert_eq!(a, b);
    }
}
