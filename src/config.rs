// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bucket configuration and `HuggingFace` `config.json` parsing.
//!
//! [`BucketerConfig`] holds the caller-supplied bucket budget and exposes
//! the reserved labels at the top of that range. Six labels are reserved:
//! the `-1` same-context sentinel plus `num_buckets - 5` through
//! `num_buckets - 1` for the five structural relations, so `num_buckets`
//! must be at least [`BucketerConfig::MIN_NUM_BUCKETS`].
//!
//! # Usage
//!
//! ```
//! use candle_table_bias::BucketerConfig;
//!
//! let json: serde_json::Value =
//!     serde_json::from_str(r#"{"relative_attention_num_buckets": 32}"#).unwrap();
//! let config = BucketerConfig::from_hf_config(&json).unwrap();
//! assert_eq!(config.num_buckets(), 32);
//! assert_eq!(config.meta_to_cell_bucket(), 27);
//! ```

use std::fmt;

use serde_json::Value;

use crate::error::{BucketError, Result};

/// Bucket budget for the relative attention bias, with the six reserved
/// labels occupying the top of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketerConfig {
    /// Caller-supplied upper bound on bucket indices.
    num_buckets: usize,
    /// `num_buckets` as `i64`, the dtype bucket labels are emitted in.
    top: i64,
}

impl BucketerConfig {
    /// Minimum accepted `num_buckets`: any smaller budget makes the five
    /// reserved labels collide with each other, with the `0` fall-through
    /// bucket, or go negative.
    pub const MIN_NUM_BUCKETS: usize = 6;

    /// Sentinel label for pairs sharing a context: both tokens in
    /// metadata, or both in the same table cell. Consumers are expected
    /// to offset or clamp this separately (e.g. a dedicated embedding
    /// slot); it is not a valid embedding index as-is.
    pub const SAME_CONTEXT_BUCKET: i64 = -1;

    /// Label for pairs where at least one token is outside the
    /// metadata/cell scheme ([`TokenRole::Other`](crate::TokenRole)).
    ///
    /// No relation rule fires for such pairs, so the label stays at
    /// zero. This is defined behavior, not an error; it collides with a
    /// real bucket only if a consumer allocates indices below
    /// `num_buckets - 5`.
    pub const FALLTHROUGH_BUCKET: i64 = 0;

    /// Create a config with the given bucket budget.
    ///
    /// # Errors
    ///
    /// Returns [`BucketError::Config`] if `num_buckets` is below
    /// [`Self::MIN_NUM_BUCKETS`].
    pub fn new(num_buckets: usize) -> Result<Self> {
        if num_buckets < Self::MIN_NUM_BUCKETS {
            return Err(BucketError::Config(format!(
                "num_buckets must be at least {}, got {num_buckets}",
                Self::MIN_NUM_BUCKETS
            )));
        }
        let top = i64::try_from(num_buckets).map_err(|_| {
            BucketError::Config(format!("num_buckets {num_buckets} overflows i64"))
        })?;
        Ok(Self { num_buckets, top })
    }

    /// Parse a config from a `HuggingFace`-style `config.json` value.
    ///
    /// Reads `relative_attention_num_buckets`, accepting `num_buckets` as
    /// an alias.
    ///
    /// # Errors
    ///
    /// Returns [`BucketError::Config`] if the field is missing, invalid,
    /// or below [`Self::MIN_NUM_BUCKETS`].
    pub fn from_hf_config(config: &Value) -> Result<Self> {
        Self::new(get_num_buckets(config)?)
    }

    /// The caller-supplied bucket budget.
    pub const fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    /// Label for a metadata query attending to a cell key: `num_buckets - 5`.
    pub const fn meta_to_cell_bucket(&self) -> i64 {
        self.top - 5
    }

    /// Label for a cell query attending to a metadata key: `num_buckets - 4`.
    pub const fn cell_to_meta_bucket(&self) -> i64 {
        self.top - 4
    }

    /// Label for two cells in the same row, different column: `num_buckets - 3`.
    pub const fn same_row_bucket(&self) -> i64 {
        self.top - 3
    }

    /// Label for two cells in the same column, different row: `num_buckets - 2`.
    pub const fn same_col_bucket(&self) -> i64 {
        self.top - 2
    }

    /// Label for two cells sharing neither row nor column: `num_buckets - 1`.
    pub const fn unrelated_cell_bucket(&self) -> i64 {
        self.top - 1
    }
}

impl fmt::Display for BucketerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BucketerConfig(num_buckets={})", self.num_buckets)
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Extract the bucket budget from a `config.json` value.
fn get_num_buckets(config: &Value) -> Result<usize> {
    let val = config
        .get("relative_attention_num_buckets")
        .or_else(|| config.get("num_buckets"))
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            BucketError::Config(
                "missing or invalid field 'relative_attention_num_buckets'".into(),
            )
        })?;
    usize::try_from(val).map_err(|_| {
        BucketError::Config(format!(
            "field 'relative_attention_num_buckets' value {val} overflows usize"
        ))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
