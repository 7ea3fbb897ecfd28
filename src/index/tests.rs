use super::*;
use crate::semantic::l2_norm;

fn sample_index() -> VectorIndex {
    VectorIndex::build(&[
        vec![1.0_f32, 0.0, 0.0],
        vec![0.0, 2.0, 0.0],
        vec![3.0, 3.0, 0.0],
        vec![0.0, 0.0, -5.0],
    ])
    .expect("build sample index")
}

#[test]
fn build_normalizes_every_row() {
    let index = sample_index();
    assert_eq!(index.len(), 4);
    assert_eq!(index.dimensions(), 3);

    for row_id in 0..index.len() {
        let row = index.row(row_id).expect("row exists");
        assert!((l2_norm(row) - 1.0).abs() < 1e-6, "row {row_id} is unit length");
    }
    assert!(index.row(4).is_none());
}

#[test]
fn build_rejects_inconsistent_dimensions() {
    let result = VectorIndex::build(&[vec![1.0_f32, 0.0], vec![1.0, 0.0, 0.0]]);
    match result {
        Err(IndexError::DimensionMismatch { expected, actual }) => {
            assert_eq!(expected, 2);
            assert_eq!(actual, 3);
        }
        other => panic!("expected dimension mismatch, got {other:?}"),
    }
}

#[test]
fn build_rejects_zero_width_rows() {
    let empty_rows: [Vec<f32>; 2] = [Vec::new(), Vec::new()];
    match VectorIndex::build(&empty_rows) {
        Err(IndexError::DimensionMismatch { expected, actual }) => {
            assert_eq!(expected, 1);
            assert_eq!(actual, 0);
        }
        other => panic!("expected dimension mismatch, got {other:?}"),
    }

    let no_rows: [Vec<f32>; 0] = [];
    let index = VectorIndex::build(&no_rows).expect("empty build");
    assert!(index.is_empty());
    assert!(index.search(&[], 1).expect("search").is_empty());
    assert_eq!(
        VectorIndex::deserialize(&index.serialize()).expect("round trip"),
        index
    );
}

#[test]
fn search_orders_by_score_then_row_id() {
    let index = VectorIndex::build(&[
        vec![0.0_f32, 1.0],
        vec![1.0, 0.0],
        vec![2.0, 0.0],
        vec![1.0, 1.0],
    ])
    .expect("build");

    let hits = index.search(&[10.0, 0.0], 4).expect("search");
    let ids = hits.iter().map(|hit| hit.row_id).collect::<Vec<usize>>();
    assert_eq!(ids, vec![1, 2, 3, 0]);
    assert_eq!(hits[0].score, hits[1].score);
    assert!((hits[0].score - 1.0).abs() < 1e-9);

    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn search_with_large_k_returns_every_row() {
    let index = sample_index();
    let hits = index.search(&[1.0, 1.0, 1.0], 50).expect("search");
    assert_eq!(hits.len(), index.len());

    let top_two = index.search(&[1.0, 1.0, 1.0], 2).expect("search");
    assert_eq!(top_two.len(), 2);
    assert_eq!(top_two[0].row_id, 2);
}

#[test]
fn empty_index_search_is_empty_not_error() {
    let index = VectorIndex::build::<Vec<f32>>(&[]).expect("empty build");
    assert!(index.is_empty());
    assert!(index.search(&[1.0, 2.0], 3).expect("search").is_empty());
    assert!(sample_index().search(&[1.0, 0.0, 0.0], 0).expect("k=0").is_empty());
}

#[test]
fn search_rejects_query_of_wrong_dimension() {
    let err = sample_index().search(&[1.0, 0.0], 2).unwrap_err();
    assert!(matches!(
        err,
        IndexError::DimensionMismatch {
            expected: 3,
            actual: 2
        }
    ));
}

#[test]
fn serialize_round_trip_preserves_search_results() {
    let index = sample_index();
    let restored = VectorIndex::deserialize(&index.serialize()).expect("deserialize");

    assert_eq!(restored, index);
    assert_eq!(restored.len(), index.len());
    assert_eq!(restored.dimensions(), index.dimensions());

    for query in [[0.3_f32, -0.2, 0.9], [1.0, 1.0, 0.0], [-1.0, 0.5, 0.5]] {
        for k in 1..=5 {
            assert_eq!(
                restored.search(&query, k).expect("restored search"),
                index.search(&query, k).expect("search before round trip")
            );
        }
    }
}

#[test]
fn deserialize_rejects_foreign_magic_and_versions() {
    let mut bytes = sample_index().serialize();
    bytes[0] = b'X';
    assert!(matches!(
        VectorIndex::deserialize(&bytes),
        Err(IndexError::UnsupportedFormat(_))
    ));

    let mut bytes = sample_index().serialize();
    bytes[4..6].copy_from_slice(&99_u16.to_le_bytes());
    assert!(matches!(
        VectorIndex::deserialize(&bytes),
        Err(IndexError::UnsupportedFormat(_))
    ));

    assert!(matches!(
        VectorIndex::deserialize(b"MRV"),
        Err(IndexError::UnsupportedFormat(_))
    ));
}

#[test]
fn deserialize_rejects_truncated_or_padded_payloads() {
    let bytes = sample_index().serialize();

    let truncated = &bytes[..bytes.len() - 3];
    assert!(matches!(
        VectorIndex::deserialize(truncated),
        Err(IndexError::CorruptIndex(_))
    ));

    let mut padded = bytes.clone();
    padded.push(0);
    assert!(matches!(
        VectorIndex::deserialize(&padded),
        Err(IndexError::CorruptIndex(_))
    ));
}

#[test]
fn rebuild_hint_covers_only_format_failures() {
    assert!(IndexError::CorruptIndex("x".to_string()).is_recoverable_by_rebuild());
    assert!(IndexError::UnsupportedFormat("x".to_string()).is_recoverable_by_rebuild());
    assert!(
        !IndexError::DimensionMismatch {
            expected: 1,
            actual: 2
        }
        .is_recoverable_by_rebuild()
    );
}
