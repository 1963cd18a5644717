// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests: run the public bucket-classification surface
//! against the canonical worked example and its known-good matrix.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    missing_docs
)]

use candle_core::{DType, Device, Tensor};
use candle_table_bias::{
    compute_positional_buckets, BucketError, BucketerConfig, PositionalBucketer, TokenAttrs,
    TokenRole,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The worked 8-token sequence: metadata, metadata, metadata, then cells
/// (r2,c0), (r2,c0), (r2,c1), (r3,c0), (r3,c1).
fn worked_example(device: &Device) -> (Tensor, Tensor, Tensor) {
    let type_ids = Tensor::new(&[[1i64, 1, 2, 3, 3, 3, 3, 3]], device).unwrap();
    let row_ids = Tensor::new(&[[0i64, 0, 1, 2, 2, 2, 3, 3]], device).unwrap();
    let col_ids = Tensor::new(&[[0i64, 0, 0, 0, 0, 1, 0, 1]], device).unwrap();
    (type_ids, row_ids, col_ids)
}

/// Known-good buckets for the worked example with `num_buckets = 100`.
fn expected_buckets() -> Vec<Vec<i64>> {
    vec![
        vec![-1, -1, -1, 95, 95, 95, 95, 95],
        vec![-1, -1, -1, 95, 95, 95, 95, 95],
        vec![-1, -1, -1, 95, 95, 95, 95, 95],
        vec![96, 96, 96, -1, -1, 97, 98, 99],
        vec![96, 96, 96, -1, -1, 97, 98, 99],
        vec![96, 96, 96, 97, 97, -1, 99, 98],
        vec![96, 96, 96, 98, 98, 99, -1, 97],
        vec![96, 96, 96, 99, 99, 98, 97, -1],
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn free_function_reproduces_fixture() {
    let device = Device::Cpu;
    let (type_ids, row_ids, col_ids) = worked_example(&device);

    let buckets =
        compute_positional_buckets(8, 8, &type_ids, &row_ids, &col_ids, 100).unwrap();

    assert_eq!(buckets.dims(), &[1, 8, 8]);
    assert_eq!(buckets.dtype(), DType::I64);
    assert_eq!(buckets.to_vec3::<i64>().unwrap()[0], expected_buckets());
}

#[test]
fn hf_config_end_to_end() {
    let device = Device::Cpu;
    let (type_ids, row_ids, col_ids) = worked_example(&device);

    let json = serde_json::json!({
        "model_type": "tapas",
        "relative_attention_num_buckets": 100
    });
    let config = BucketerConfig::from_hf_config(&json).unwrap();
    let buckets = PositionalBucketer::new(config)
        .compute(&type_ids, &row_ids, &col_ids)
        .unwrap();

    assert_eq!(buckets.to_vec3::<i64>().unwrap()[0], expected_buckets());
}

#[test]
fn scalar_surface_matches_fixture() {
    let type_ids = [1i64, 1, 2, 3, 3, 3, 3, 3];
    let row_ids = [0i64, 0, 1, 2, 2, 2, 3, 3];
    let col_ids = [0i64, 0, 0, 0, 0, 1, 0, 1];

    let bucketer = PositionalBucketer::new(BucketerConfig::new(100).unwrap());
    let expected = expected_buckets();
    for i in 0..8 {
        for j in 0..8 {
            let query = TokenAttrs::from_ids(type_ids[i], row_ids[i], col_ids[i]);
            let key = TokenAttrs::from_ids(type_ids[j], row_ids[j], col_ids[j]);
            assert_eq!(bucketer.bucket_for_pair(query, key), expected[i][j]);
        }
    }
}

#[test]
fn role_mapping_matches_scheme() {
    assert_eq!(TokenRole::from_type_id(1), TokenRole::Metadata);
    assert_eq!(TokenRole::from_type_id(2), TokenRole::Metadata);
    assert_eq!(TokenRole::from_type_id(3), TokenRole::Cell);
    assert_eq!(TokenRole::from_type_id(0), TokenRole::Other);
    assert_eq!(TokenRole::from_type_id(4), TokenRole::Other);
}

#[test]
fn mismatched_lengths_fail_fast() {
    let device = Device::Cpu;
    let (type_ids, row_ids, col_ids) = worked_example(&device);

    let err = compute_positional_buckets(8, 9, &type_ids, &row_ids, &col_ids, 100)
        .err()
        .expect("length mismatch must be rejected");
    assert!(matches!(err, BucketError::Shape(_)));
}
