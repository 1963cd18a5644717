// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quick start: classify the worked 8-token table sequence and check the
//! result against its known-good bucket matrix.
//!
//! ```bash
//! cargo run --example bucket_demo
//! ```

use candle_core::{Device, Tensor};
use candle_table_bias::{compute_positional_buckets, BucketerConfig};

fn main() -> candle_table_bias::Result<()> {
    let device = Device::Cpu;

    // 1. Token attributes: (type, row, col) per token.
    //    (m,0,0),(m,0,0),(m,1,0),(c,2,0),(c,2,0),(c,2,1),(c,3,0),(c,3,1)
    let type_ids = Tensor::new(&[[1i64, 1, 2, 3, 3, 3, 3, 3]], &device)?;
    let row_ids = Tensor::new(&[[0i64, 0, 1, 2, 2, 2, 3, 3]], &device)?;
    let col_ids = Tensor::new(&[[0i64, 0, 0, 0, 0, 1, 0, 1]], &device)?;
    let num_buckets = 100;

    let config = BucketerConfig::new(num_buckets)?;
    println!("{config}");
    println!(
        "reserved labels: meta->cell {}, cell->meta {}, same row {}, same col {}, unrelated {}",
        config.meta_to_cell_bucket(),
        config.cell_to_meta_bucket(),
        config.same_row_bucket(),
        config.same_col_bucket(),
        config.unrelated_cell_bucket()
    );

    // 2. Compute buckets for the self-attention window.
    let buckets =
        compute_positional_buckets(8, 8, &type_ids, &row_ids, &col_ids, num_buckets)?;
    println!("\nbuckets {:?}:", buckets.dims());
    for row in &buckets.to_vec3::<i64>()?[0] {
        println!("  {row:?}");
    }

    // 3. Compare against the known-good matrix.
    let expected: Vec<Vec<i64>> = vec![
        vec![-1, -1, -1, 95, 95, 95, 95, 95],
        vec![-1, -1, -1, 95, 95, 95, 95, 95],
        vec![-1, -1, -1, 95, 95, 95, 95, 95],
        vec![96, 96, 96, -1, -1, 97, 98, 99],
        vec![96, 96, 96, -1, -1, 97, 98, 99],
        vec![96, 96, 96, 97, 97, -1, 99, 98],
        vec![96, 96, 96, 98, 98, 99, -1, 97],
        vec![96, 96, 96, 99, 99, 98, 97, -1],
    ];
    let matches = buckets.to_vec3::<i64>()?[0] == expected;
    println!("\nmatches expected matrix: {matches}");

    Ok(())
}
