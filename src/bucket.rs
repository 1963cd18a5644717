// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relative-position bucket classification for table-structured sequences.
//!
//! Every (query, key) token pair in a self-attention window is assigned a
//! bucket describing its structural relation: both in metadata or in the
//! same cell (`-1`), metadata attending to a cell (`num_buckets - 5`), a
//! cell attending to metadata (`num_buckets - 4`), same row
//! (`num_buckets - 3`), same column (`num_buckets - 2`), or unrelated
//! cells (`num_buckets - 1`). Pairs involving a token outside the
//! metadata/cell scheme keep the `0` fall-through bucket.
//!
//! The result indexes a learned attention-bias embedding downstream; that
//! lookup (including handling of the `-1` sentinel) is the consumer's
//! concern.
//!
//! Two paths compute the same classification: [`PositionalBucketer::compute`]
//! is the batched tensor path, [`PositionalBucketer::bucket_for_pair`] the
//! scalar decision table it is checked against.

use candle_core::{DType, Tensor};

use crate::config::BucketerConfig;
use crate::error::{BucketError, Result};
use crate::role::TokenRole;

// ---------------------------------------------------------------------------
// Scalar path
// ---------------------------------------------------------------------------

/// Per-token attributes for the scalar classification path.
///
/// `row_id` and `col_id` are meaningful only when `role` is
/// [`TokenRole::Cell`]; they are ignored otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAttrs {
    /// Structural role derived from the raw `type_id`.
    pub role: TokenRole,
    /// Table row of the token (cell tokens only).
    pub row_id: i64,
    /// Table column of the token (cell tokens only).
    pub col_id: i64,
}

impl TokenAttrs {
    /// Build attributes from raw numeric ids.
    pub const fn from_ids(type_id: i64, row_id: i64, col_id: i64) -> Self {
        Self {
            role: TokenRole::from_type_id(type_id),
            row_id,
            col_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Bucketer
// ---------------------------------------------------------------------------

/// Computes relative-position buckets for table-structured self-attention.
#[derive(Debug, Clone, Copy)]
pub struct PositionalBucketer {
    /// Validated bucket budget.
    config: BucketerConfig,
}

impl PositionalBucketer {
    /// Create a bucketer from a validated config.
    pub const fn new(config: BucketerConfig) -> Self {
        Self { config }
    }

    /// The bucket configuration in use.
    pub const fn config(&self) -> &BucketerConfig {
        &self.config
    }

    /// Classify a single (query, key) token pair.
    ///
    /// The ordered decision table below is the reference semantics for
    /// [`Self::compute`]; each pair gets exactly one label. Direction
    /// matters only for the metadata/cell cross terms.
    pub fn bucket_for_pair(&self, query: TokenAttrs, key: TokenAttrs) -> i64 {
        let same_row = query.row_id == key.row_id;
        let same_col = query.col_id == key.col_id;

        match (query.role, key.role) {
            (TokenRole::Metadata, TokenRole::Metadata) => BucketerConfig::SAME_CONTEXT_BUCKET,
            (TokenRole::Metadata, TokenRole::Cell) => self.config.meta_to_cell_bucket(),
            (TokenRole::Cell, TokenRole::Metadata) => self.config.cell_to_meta_bucket(),
            (TokenRole::Cell, TokenRole::Cell) if same_row && same_col => {
                BucketerConfig::SAME_CONTEXT_BUCKET
            }
            (TokenRole::Cell, TokenRole::Cell) if same_row => self.config.same_row_bucket(),
            (TokenRole::Cell, TokenRole::Cell) if same_col => self.config.same_col_bucket(),
            (TokenRole::Cell, TokenRole::Cell) => self.config.unrelated_cell_bucket(),
            // A token outside the metadata/cell scheme matches no rule;
            // the label stays at the fall-through bucket.
            _ => BucketerConfig::FALLTHROUGH_BUCKET,
        }
    }

    /// Compute buckets for a batch of self-attention windows.
    ///
    /// # Shapes
    /// - `type_ids`, `row_ids`, `col_ids`: `[batch, seq]` — any numeric
    ///   dtype holding integer-valued data; cast to `I64` before exact
    ///   comparison
    /// - returns: `[batch, seq, seq]` of `I64` bucket labels, entry
    ///   `[b, i, j]` classifying query token `i` against key token `j`
    ///
    /// # Errors
    ///
    /// Returns [`BucketError::Shape`] if the attribute tensors are not
    /// rank 2 or disagree in shape, [`BucketError::Tensor`] on tensor
    /// operation failures.
    pub fn compute(
        &self,
        type_ids: &Tensor,
        row_ids: &Tensor,
        col_ids: &Tensor,
    ) -> Result<Tensor> {
        let (batch, seq_len) = validate_attr_shapes(type_ids, row_ids, col_ids)?;
        tracing::debug!(
            batch,
            seq_len,
            num_buckets = self.config.num_buckets(),
            "computing positional buckets"
        );

        let device = type_ids.device();
        let type_ids = type_ids.to_dtype(DType::I64)?;
        let row_ids = row_ids.to_dtype(DType::I64)?;
        let col_ids = col_ids.to_dtype(DType::I64)?;

        // Per-token role masks, shape [batch, seq], dtype U8.
        let [meta_lo, meta_hi] = TokenRole::METADATA_TYPE_IDS;
        let is_meta = type_ids.eq(meta_lo)?.maximum(&type_ids.eq(meta_hi)?)?;
        let is_cell = type_ids.eq(TokenRole::CELL_TYPE_ID)?;

        // Pair masks via outer products: [batch, seq, 1] x [batch, 1, seq]
        // broadcasts to [batch, seq, seq].
        let q_meta = is_meta.unsqueeze(2)?;
        let k_meta = is_meta.unsqueeze(1)?;
        let q_cell = is_cell.unsqueeze(2)?;
        let k_cell = is_cell.unsqueeze(1)?;

        let both_meta = q_meta.broadcast_mul(&k_meta)?;
        let both_cell = q_cell.broadcast_mul(&k_cell)?;
        let meta_to_cell = q_meta.broadcast_mul(&k_cell)?;
        let cell_to_meta = q_cell.broadcast_mul(&k_meta)?;

        // Row/col identity, restricted to cell-cell pairs: row/col ids of
        // non-cell tokens carry no meaning.
        let rows_equal = row_ids.unsqueeze(2)?.broadcast_eq(&row_ids.unsqueeze(1)?)?;
        let cols_equal = col_ids.unsqueeze(2)?.broadcast_eq(&col_ids.unsqueeze(1)?)?;
        let same_row = rows_equal.mul(&both_cell)?;
        let same_col = cols_equal.mul(&both_cell)?;
        let same_cell = same_row.mul(&same_col)?;
        let same_context = both_meta.maximum(&same_cell)?;

        // Resolve the label priority by layering where_cond from the
        // lowest-priority rule up, so each later mask overrides the ones
        // before it. The masks within one role combination are disjoint;
        // only same_cell overlaps same_row/same_col and it is applied last.
        let shape = (batch, seq_len, seq_len);
        let fill = |value: i64| Tensor::full(value, shape, device);

        let mut buckets = fill(BucketerConfig::FALLTHROUGH_BUCKET)?;
        buckets = both_cell.where_cond(&fill(self.config.unrelated_cell_bucket())?, &buckets)?;
        buckets = same_col.where_cond(&fill(self.config.same_col_bucket())?, &buckets)?;
        buckets = same_row.where_cond(&fill(self.config.same_row_bucket())?, &buckets)?;
        buckets = cell_to_meta.where_cond(&fill(self.config.cell_to_meta_bucket())?, &buckets)?;
        buckets = meta_to_cell.where_cond(&fill(self.config.meta_to_cell_bucket())?, &buckets)?;
        buckets =
            same_context.where_cond(&fill(BucketerConfig::SAME_CONTEXT_BUCKET)?, &buckets)?;

        Ok(buckets)
    }
}

// ---------------------------------------------------------------------------
// Free function
// ---------------------------------------------------------------------------

/// Compute relative-position buckets for a batch of self-attention windows.
///
/// Convenience wrapper over [`PositionalBucketer`] taking explicit query
/// and key lengths. Self-attention is assumed: `query_length` must equal
/// `key_length` and both must match the attribute tensors' sequence
/// dimension.
///
/// # Shapes
/// - `type_ids`, `row_ids`, `col_ids`: `[batch, seq]`
/// - returns: `[batch, seq, seq]` of `I64` bucket labels
///
/// # Errors
///
/// Returns [`BucketError::Shape`] on any length or rank mismatch and
/// [`BucketError::Config`] if `num_buckets` is below
/// [`BucketerConfig::MIN_NUM_BUCKETS`].
pub fn compute_positional_buckets(
    query_length: usize,
    key_length: usize,
    type_ids: &Tensor,
    row_ids: &Tensor,
    col_ids: &Tensor,
    num_buckets: usize,
) -> Result<Tensor> {
    if query_length != key_length {
        return Err(BucketError::Shape(format!(
            "self-attention requires query_length == key_length, got {query_length} vs {key_length}"
        )));
    }
    let (_batch, seq_len) = validate_attr_shapes(type_ids, row_ids, col_ids)?;
    if seq_len != query_length {
        return Err(BucketError::Shape(format!(
            "attribute sequence length {seq_len} does not match query_length {query_length}"
        )));
    }
    PositionalBucketer::new(BucketerConfig::new(num_buckets)?).compute(type_ids, row_ids, col_ids)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Check that the three attribute tensors are rank 2 and share one shape.
fn validate_attr_shapes(
    type_ids: &Tensor,
    row_ids: &Tensor,
    col_ids: &Tensor,
) -> Result<(usize, usize)> {
    let (batch, seq_len) = type_ids.dims2().map_err(|_| {
        BucketError::Shape(format!(
            "type_ids must be rank 2 [batch, seq], got shape {:?}",
            type_ids.shape()
        ))
    })?;
    for (name, tensor) in [("row_ids", row_ids), ("col_ids", col_ids)] {
        if tensor.dims() != type_ids.dims() {
            return Err(BucketError::Shape(format!(
                "{name} shape {:?} does not match type_ids shape {:?}",
                tensor.shape(),
                type_ids.shape()
            )));
        }
    }
    Ok((batch, seq_len))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
