//! proximetry: structural inspection of on-disk proximity-graph indexes.
//!
//! A disk-resident ANN engine persists its directed proximity graph (each
//! node a data point with a bounded list of out-neighbors) in two
//! independently evolved binary layouts:
//!
//! - **Sequential**: a 24-byte header followed by variable-length records
//!   (`degree:u32`, then `degree` neighbor ids), either at offset 0 of a
//!   raw graph file or embedded at a stored offset inside a single-file
//!   unified index.
//! - **Paged**: a 5-field geometry header (with or without a historical
//!   8-byte tag prefix) and fixed-length records packed into 4096-byte
//!   pages.
//!
//! This crate decodes both without the search engine loaded and derives
//! structural health metrics (degree distribution, weak near-isolated
//! nodes, entry point) plus human-inspectable adjacency and reverse-edge
//! views.
//!
//! # Robustness
//!
//! Input files may be truncated, corrupted, or adversarial. Every read is
//! bounds-checked, truncation mid-body is a graceful early stop with
//! partial results, and all other failures collapse to all-zero stats or an
//! empty report. Nothing here panics, mutates a file, or holds memory
//! proportional to the graph (the reverse-edge sampler is bounded by the
//! caller's sample size).
//!
//! # Example
//!
//! ```no_run
//! use proximetry::{compute_stats_from_sequential_file, render_graph_report};
//!
//! let stats = compute_stats_from_sequential_file("vamana.graph", 0);
//! print!("{}", render_graph_report(&stats));
//! ```

pub mod cursor;
pub mod error;
pub mod header;
pub mod paged;
pub mod sample;
pub mod sequential;
pub mod stats;

pub use cursor::ByteCursor;
pub use error::{InspectError, InspectResult};
pub use header::{
    resolve_embedded_graph_offset, unified_index_graph_offset, DataType, PagedHeader,
    PagedVariant, SequentialHeader,
};
pub use paged::{compute_stats_from_paged_file, PagedScanner};
pub use sample::{
    render_adjacency_sample, render_sampled_subgraph, render_small_graph, GraphSource,
    NeighborCapture, NodeRecord, SampledSubgraph,
};
pub use sequential::{compute_stats_from_sequential_file, SequentialScanner};
pub use stats::{compute_graph_stats, render_graph_report, GraphStats, DEFAULT_WEAK_THRESHOLD};
