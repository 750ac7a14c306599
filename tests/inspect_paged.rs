//! Integration tests for the sector-paged disk index layout: page walking,
//! the tagged/untagged header heuristic, geometry rejection, and rendering.

use proximetry::{
    compute_stats_from_paged_file, render_adjacency_sample, render_small_graph, DataType,
    GraphSource,
};

const PAGE_LEN: usize = 4096;

/// Serialize a paged index. `tag` selects the newer encoding with the
/// 8-byte `(npts, ndims)` prefix; coordinates are zero-filled.
fn encode_paged_index(
    adjacency: &[Vec<u32>],
    tag: Option<(i32, i32)>,
    n_dims: u64,
    element_size: u64,
    medoid_id: u64,
    max_record_len: u64,
    records_per_page: u64,
) -> Vec<u8> {
    let mut bytes = Vec::new();
    if let Some((npts, ndims)) = tag {
        bytes.extend_from_slice(&npts.to_le_bytes());
        bytes.extend_from_slice(&ndims.to_le_bytes());
    }
    for v in [
        adjacency.len() as u64,
        n_dims,
        medoid_id,
        max_record_len,
        records_per_page,
    ] {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes.resize(PAGE_LEN, 0);

    for chunk in adjacency.chunks(records_per_page as usize) {
        let page_start = bytes.len();
        for (slot, neighbors) in chunk.iter().enumerate() {
            let record_offset = page_start + slot * max_record_len as usize;
            bytes.resize(record_offset, 0);
            bytes.extend_from_slice(&vec![0u8; (n_dims * element_size) as usize]);
            bytes.extend_from_slice(&(neighbors.len() as u32).to_le_bytes());
            for id in neighbors {
                bytes.extend_from_slice(&id.to_le_bytes());
            }
        }
        bytes.resize(page_start + PAGE_LEN, 0);
    }
    bytes
}

fn write_fixture(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

#[test]
fn ten_nodes_three_per_page_visits_each_once() {
    // ceil(10/3) = 4 pages, 2 empty slots in the last page.
    let adjacency: Vec<Vec<u32>> = (0..10u32).map(|i| vec![i + 1, i + 2]).collect();
    let bytes = encode_paged_index(&adjacency, Some((9, 1)), 4, 4, 3, 128, 3);
    assert_eq!(bytes.len(), PAGE_LEN * 5);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, "disk.index", &bytes);

    let stats = compute_stats_from_paged_file(&path, DataType::Float);
    assert_eq!(stats.total_nodes, 10);
    assert_eq!(stats.active_nodes, 10);
    assert_eq!(stats.frozen_nodes, 0);
    assert_eq!(stats.total_edges, 20);
    assert_eq!(stats.degree_min, 2);
    assert_eq!(stats.degree_max, 2);
    assert_eq!(stats.degree_avg, 2.0);
    assert_eq!(stats.entry_point, 3);
}

#[test]
fn untagged_header_is_accepted_for_small_counts() {
    // An untagged file whose n_nodes < 5 cannot be mistaken for the tagged
    // encoding; the resolver must rewind and read it correctly.
    let adjacency = vec![vec![1], vec![2], vec![0]];
    let bytes = encode_paged_index(&adjacency, None, 2, 4, 1, 64, 2);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, "untagged.index", &bytes);

    let stats = compute_stats_from_paged_file(&path, DataType::Float);
    assert_eq!(stats.total_nodes, 3);
    assert_eq!(stats.total_edges, 3);
    assert_eq!(stats.entry_point, 1);
}

#[test]
fn untagged_header_with_large_count_trips_the_tag_heuristic() {
    // Known false positive: an untagged file whose first four bytes decode
    // to an i32 >= 5 is read as tagged, shifting every geometry field. The
    // heuristic is inherited from the format; this documents the outcome
    // (garbage-in stats, but no crash and no over-read).
    let adjacency: Vec<Vec<u32>> = (0..6u32).map(|_| vec![0]).collect();
    let bytes = encode_paged_index(&adjacency, None, 2, 4, 0, 64, 2);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, "ambiguous.index", &bytes);

    let stats = compute_stats_from_paged_file(&path, DataType::Float);
    // Misread geometry fails validation or walks zero usable records;
    // either way it must degrade, not panic.
    assert_eq!(stats.total_edges, 0);
}

#[test]
fn eight_bit_element_size_changes_degree_offset() {
    let adjacency = vec![vec![1, 2, 3], vec![0]];
    let bytes = encode_paged_index(&adjacency, Some((9, 1)), 16, 1, 0, 64, 4);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, "int8.index", &bytes);

    let stats = compute_stats_from_paged_file(&path, DataType::Int8);
    assert_eq!(stats.total_nodes, 2);
    assert_eq!(stats.total_edges, 4);

    // Reading the same file as float coordinates violates the geometry
    // invariant (16 * 4 + 4 > 64) and must be rejected.
    let stats = compute_stats_from_paged_file(&path, DataType::Float);
    assert_eq!(stats, proximetry::GraphStats::default());
}

#[test]
fn oversized_record_variant_yields_zero_stats() {
    let mut bytes = encode_paged_index(&[vec![1]], Some((9, 1)), 2, 4, 0, 64, 1);
    // records_per_page = 0 encodes nodes spanning multiple pages.
    bytes[40..48].copy_from_slice(&0u64.to_le_bytes());

    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, "oversized.index", &bytes);

    let stats = compute_stats_from_paged_file(&path, DataType::Float);
    assert_eq!(stats, proximetry::GraphStats::default());
}

#[test]
fn missing_trailing_page_stops_the_scan() {
    let adjacency: Vec<Vec<u32>> = (0..10u32).map(|_| vec![1, 2]).collect();
    let mut bytes = encode_paged_index(&adjacency, Some((9, 1)), 4, 4, 0, 128, 3);
    // Drop the last page entirely plus a little of the one before it.
    bytes.truncate(PAGE_LEN * 4 - 100);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, "short.index", &bytes);

    let stats = compute_stats_from_paged_file(&path, DataType::Float);
    // Header count stays authoritative; edges cover only the pages read.
    assert_eq!(stats.total_nodes, 10);
    assert_eq!(stats.total_edges, 12);
}

#[test]
fn adjacency_sample_from_paged_index() {
    let adjacency = vec![vec![1, 2, 3, 4], vec![0], vec![]];
    let bytes = encode_paged_index(&adjacency, Some((9, 1)), 2, 4, 2, 64, 2);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, "sample.index", &bytes);
    let source = GraphSource::Paged {
        path: &path,
        data_type: DataType::Float,
    };

    let text = render_adjacency_sample(&source, 3, 2);
    assert_eq!(
        text,
        "Adjacency sample (first 3 nodes, entry_point=2):\n\
         \x20 0: [1, 2, ... (4 total)]\n\
         \x20 1: [0]\n\
         \x20 2: []\n"
    );

    let text = render_adjacency_sample(&source, 3, 0);
    assert!(text.contains("  0: [1, 2, 3, 4]\n"));
}

#[test]
fn small_graph_from_paged_index() {
    let adjacency = vec![vec![1, 9], vec![2], vec![0]];
    let bytes = encode_paged_index(&adjacency, Some((9, 1)), 2, 4, 0, 64, 2);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, "small.index", &bytes);
    let source = GraphSource::Paged {
        path: &path,
        data_type: DataType::Float,
    };

    let text = render_small_graph(&source, 3, 0);
    assert_eq!(
        text,
        "Small graph (first 3 nodes, entry_point=0): out-neighbors and referenced_by within sample\n\
         \x20 0: out [1, 9]  referenced_by [2]\n\
         \x20 1: out [2]  referenced_by [0]\n\
         \x20 2: out [0]  referenced_by [1]\n"
    );
}

#[test]
fn unreadable_paged_file_renders_open_error() {
    let source = GraphSource::Paged {
        path: std::path::Path::new("/no/such/disk.index"),
        data_type: DataType::Float,
    };
    let text = render_adjacency_sample(&source, 3, 0);
    assert_eq!(text, "Could not open file: /no/such/disk.index\n");
}
