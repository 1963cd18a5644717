// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token role derivation from raw `type_id` values.
//!
//! Table-structured inputs tag every token with a numeric `type_id`.
//! This module maps those ids onto an explicit categorical role rather
//! than comparing against floating-point ranges: ids `1` and `2` are
//! metadata (free text surrounding a table), id `3` is a table cell, and
//! everything else is outside the scheme.

use std::fmt;

/// Structural role of a token within a table-structured sequence.
///
/// Roles are mutually exclusive: each `type_id` maps to exactly one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenRole {
    /// Free-text token surrounding the table (`type_id` 1 or 2).
    Metadata,
    /// Token inside a table cell, carrying row/column identity (`type_id` 3).
    Cell,
    /// Token outside the metadata/cell scheme (any other `type_id`).
    Other,
}

impl TokenRole {
    /// `type_id` values that classify as [`TokenRole::Metadata`].
    pub const METADATA_TYPE_IDS: [i64; 2] = [1, 2];

    /// `type_id` value that classifies as [`TokenRole::Cell`].
    pub const CELL_TYPE_ID: i64 = 3;

    /// Derive the role for a raw `type_id`.
    ///
    /// Integer-valued data stored as floating point should be cast to
    /// `i64` before calling this; comparisons here are exact.
    pub const fn from_type_id(type_id: i64) -> Self {
        match type_id {
            1 | 2 => Self::Metadata,
            3 => Self::Cell,
            _ => Self::Other,
        }
    }

    /// Whether this role is [`TokenRole::Metadata`].
    pub const fn is_metadata(self) -> bool {
        matches!(self, Self::Metadata)
    }

    /// Whether this role is [`TokenRole::Cell`].
    pub const fn is_cell(self) -> bool {
        matches!(self, Self::Cell)
    }
}

impl fmt::Display for TokenRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata => write!(f, "Metadata"),
            Self::Cell => write!(f, "Cell"),
            Self::Other => write!(f, "Other"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn metadata_ids() {
        for id in TokenRole::METADATA_TYPE_IDS {
            assert_eq!(TokenRole::from_type_id(id), TokenRole::Metadata);
        }
    }

    #[test]
    fn cell_id() {
        assert_eq!(
            TokenRole::from_type_id(TokenRole::CELL_TYPE_ID),
            TokenRole::Cell
        );
    }

    #[test]
    fn everything_else_is_other() {
        for id in [i64::MIN, -1, 0, 4, 5, 100, i64::MAX] {
            assert_eq!(TokenRole::from_type_id(id), TokenRole::Other);
        }
    }

    #[test]
    fn roles_are_exclusive() {
        for id in -5..10 {
            let role = TokenRole::from_type_id(id);
            assert!(!(role.is_metadata() && role.is_cell()));
        }
    }
}
