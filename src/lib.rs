// SPDX-License-Identifier: MIT OR Apache-2.0

//! # candle-table-bias
//!
//! Table-aware relative-position buckets for attention bias, built on
//! [candle](https://github.com/huggingface/candle).
//!
//! For every (query, key) token pair in a table-structured self-attention
//! window, [`PositionalBucketer`] produces an integer bucket describing
//! the pair's structural relation — both in metadata, same cell, metadata
//! to cell, cell to metadata, same row, same column, or unrelated cells.
//! The resulting `[batch, seq, seq]` tensor indexes a learned
//! attention-bias embedding downstream.
//!
//! The computation is pure and stateless: fresh attributes in, a freshly
//! allocated bucket tensor out, no cross-call state.
//!
//! ```
//! use candle_core::{Device, Tensor};
//! use candle_table_bias::compute_positional_buckets;
//!
//! let device = Device::Cpu;
//! // One metadata token followed by two cells of the same row.
//! let type_ids = Tensor::new(&[[1i64, 3, 3]], &device).unwrap();
//! let row_ids = Tensor::new(&[[0i64, 4, 4]], &device).unwrap();
//! let col_ids = Tensor::new(&[[0i64, 0, 1]], &device).unwrap();
//!
//! let buckets = compute_positional_buckets(3, 3, &type_ids, &row_ids, &col_ids, 100).unwrap();
//! assert_eq!(
//!     buckets.to_vec3::<i64>().unwrap()[0],
//!     vec![vec![-1, 95, 95], vec![96, -1, 97], vec![96, 97, -1]],
//! );
//! ```

#![deny(warnings)]
#![warn(missing_docs)]

pub mod bucket;
pub mod config;
pub mod error;
pub mod role;

pub use bucket::{compute_positional_buckets, PositionalBucketer, TokenAttrs};
pub use config::BucketerConfig;
pub use error::{BucketError, Result};
pub use role::TokenRole;
