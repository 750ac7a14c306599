//! Degree statistics over a proximity graph.
//!
//! The aggregator is a pure fold over a stream of per-node out-degrees:
//! order-independent, single-pass, and shared by the sequential and paged
//! file scanners as well as the in-memory entry point. Recomputing from the
//! same bytes yields bit-identical results.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Degree threshold below which a node counts as weak. Near-isolated nodes
/// harm search recall, so the count is reported as a structural-health
/// signal. File-backed scans always use this default; only the in-memory
/// entry point may override it.
pub const DEFAULT_WEAK_THRESHOLD: u64 = 2;

/// Structural summary of a proximity graph.
///
/// All-zero stats mean either an empty graph or a failed read; callers that
/// need to distinguish the two must do so out-of-band (the file entry
/// points log failures but deliberately return the same zero structure).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Nodes actually counted.
    pub total_nodes: u64,
    /// Nodes participating in normal search routing.
    pub active_nodes: u64,
    /// Nodes present in the graph but excluded from routing.
    pub frozen_nodes: u64,
    /// Sum of out-degrees over the counted nodes.
    pub total_edges: u64,
    /// Zero when no nodes were counted (sentinel for "no minimum").
    pub degree_min: u64,
    pub degree_avg: f64,
    pub degree_max: u64,
    /// Nodes with out-degree below the weak threshold.
    pub weak_count: u64,
    /// Default traversal origin (the medoid, in the paged layout).
    pub entry_point: u32,
}

/// Single-pass degree fold.
///
/// Tracks the minimum with a `u64::MAX` sentinel so an empty stream
/// collapses to zero rather than a bogus minimum.
#[derive(Debug)]
pub(crate) struct DegreeAccumulator {
    nodes: u64,
    total_edges: u64,
    degree_min: u64,
    degree_max: u64,
    weak_count: u64,
    weak_threshold: u64,
}

impl DegreeAccumulator {
    pub(crate) fn new(weak_threshold: u64) -> Self {
        Self {
            nodes: 0,
            total_edges: 0,
            degree_min: u64::MAX,
            degree_max: 0,
            weak_count: 0,
            weak_threshold,
        }
    }

    pub(crate) fn observe(&mut self, degree: u64) {
        self.nodes += 1;
        self.total_edges += degree;
        if degree < self.degree_min {
            self.degree_min = degree;
        }
        if degree > self.degree_max {
            self.degree_max = degree;
        }
        if degree < self.weak_threshold {
            self.weak_count += 1;
        }
    }

    pub(crate) fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Finalize into [`GraphStats`]. `total_nodes` is the number of degrees
    /// observed, not `active + frozen`; the two agree whenever the scan ran
    /// to completion. Zero observed nodes collapse to all-zero stats, entry
    /// point included, so "empty" and "unreadable" present identically in
    /// the returned structure.
    pub(crate) fn finish(self, active_nodes: u64, frozen_nodes: u64, entry_point: u32) -> GraphStats {
        if self.nodes == 0 {
            return GraphStats::default();
        }
        GraphStats {
            total_nodes: self.nodes,
            active_nodes,
            frozen_nodes,
            total_edges: self.total_edges,
            degree_min: if self.degree_min == u64::MAX {
                0
            } else {
                self.degree_min
            },
            degree_avg: self.total_edges as f64 / self.nodes as f64,
            degree_max: self.degree_max,
            weak_count: self.weak_count,
            entry_point,
        }
    }

    /// Finalize with an externally supplied total (the paged layout's
    /// header node count is authoritative even when trailing pages were
    /// unreadable). `degree_avg` divides by that total.
    pub(crate) fn finish_with_total(
        self,
        total_nodes: u64,
        active_nodes: u64,
        frozen_nodes: u64,
        entry_point: u32,
    ) -> GraphStats {
        if total_nodes == 0 {
            return GraphStats::default();
        }
        GraphStats {
            total_nodes,
            active_nodes,
            frozen_nodes,
            total_edges: self.total_edges,
            degree_min: if self.degree_min == u64::MAX {
                0
            } else {
                self.degree_min
            },
            degree_avg: self.total_edges as f64 / total_nodes as f64,
            degree_max: self.degree_max,
            weak_count: self.weak_count,
            entry_point,
        }
    }
}

/// Compute stats from an adjacency list already in memory (a live index
/// rather than a file). This is the only non-file-backed surface.
///
/// Aggregates over the first `active_count + frozen_count` positions,
/// clamped to the list's length so a short list degrades to partial stats
/// instead of panicking.
pub fn compute_graph_stats(
    adjacency: &[Vec<u32>],
    active_count: u64,
    frozen_count: u64,
    entry_point: u32,
    weak_threshold: u64,
) -> GraphStats {
    let total = active_count
        .saturating_add(frozen_count)
        .min(adjacency.len() as u64) as usize;
    let mut acc = DegreeAccumulator::new(weak_threshold);
    for neighbors in &adjacency[..total] {
        acc.observe(neighbors.len() as u64);
    }
    acc.finish(active_count, frozen_count, entry_point)
}

/// Render the standard one-line structural report.
///
/// External tooling parses this line; the field list and order are a
/// compatibility surface.
pub fn render_graph_report(stats: &GraphStats) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "Graph structure summary: total_nodes={} active={} frozen={} total_edges={} \
         degree_min={} degree_avg={} degree_max={} weak_count(deg<2)={} entry_point={}",
        stats.total_nodes,
        stats.active_nodes,
        stats.frozen_nodes,
        stats.total_edges,
        stats.degree_min,
        stats.degree_avg,
        stats.degree_max,
        stats.weak_count,
        stats.entry_point,
    );
    out.push('\n');
    out
}
