// Copyright 2019-2020 PolkaX Authors. Licensed under GPL-3.0.

//! The one typed error this crate has: a structural-invariant violation
//! found by the debug-only [`crate::invariants::check`] validator. Nothing
//! on the hot path (`assoc`/`dissoc`/`lookup`/`find`/`apply`/iteration) is
//! fallible; this exists purely for tests and `debug_assert!`-gated checks.

use thiserror::Error;

/// A violation of one of the seven structural invariants every reachable
/// node must satisfy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantError {
    /// `len(cells) != popcount(bits)`.
    #[error("node at depth {depth}: {cell_count} cells but bits has popcount {popcount}")]
    CellCountMismatch {
        /// Depth of the offending node.
        depth: u32,
        /// Actual length of `cells`.
        cell_count: usize,
        /// `bits.count_ones()`.
        popcount: u32,
    },

    /// The node's address has bits set below its own slot range.
    #[error("node at depth {depth}: address has non-canonical low bits set")]
    NonCanonicalAddress {
        /// Depth of the offending node.
        depth: u32,
    },

    /// A key reachable under this node falls outside `[address, address |
    /// depthmask(depth)]`.
    #[error("node at depth {depth}: contains a key outside its own prefix")]
    ContainmentViolation {
        /// Depth of the offending node.
        depth: u32,
    },

    /// An interior node has fewer than two children.
    #[error("interior node at depth {depth} has {cell_count} children, need at least 2")]
    DegenerateInterior {
        /// Depth of the offending node.
        depth: u32,
        /// Actual child count.
        cell_count: usize,
    },

    /// `numel` doesn't match the sum of children's `numel` (interior) or the
    /// cell count (twig).
    #[error("node at depth {depth}: numel {numel} does not match its cells ({expected})")]
    NumelMismatch {
        /// Depth of the offending node.
        depth: u32,
        /// Recorded `numel`.
        numel: u64,
        /// Value `numel` should have been.
        expected: u64,
    },

    /// `firstn` doesn't match `bits == lowmask(popcount(bits))`.
    #[error("node at depth {depth}: firstn cache is stale")]
    StaleFirstn {
        /// Depth of the offending node.
        depth: u32,
    },

    /// `(depth, start_bit, shift)` disagree with the global depth tables.
    #[error("node at depth {depth}: start_bit/shift do not match the depth tables")]
    DepthShapeMismatch {
        /// Depth of the offending node.
        depth: u32,
    },

    /// Two nodes reachable from the same root disagree on `owning`.
    #[error("node at depth {depth}: owning flag disagrees with its ancestor")]
    NonUniformOwning {
        /// Depth of the offending node.
        depth: u32,
    },
}
