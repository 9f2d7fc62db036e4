// Copyright 2019-2020 PolkaX Authors. Licensed under GPL-3.0.

//! Fixed-width key types and the compile-time shape constants derived from
//! them.
//!
//! A PHAMT key *is* its own hash: there is no hash function and therefore no
//! collisions to resolve. Everything the trie needs to know about a key's
//! width — how many levels it has, how many bits the root consumes, where the
//! twig level sits — is a pure function of the key's bit width `W`, computed
//! once here rather than threaded through every call as a runtime parameter.

use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{BitAnd, BitOr, BitXor, Not, Shl, Shr, Sub};

/// Bits consumed by every non-root level, and by the root unless `W` forces a
/// narrower shift. Also the width of a twig's addressing range.
pub const NODE_SHIFT: u32 = 5;

mod private {
    pub trait Sealed {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
    impl Sealed for u128 {}
}

/// A fixed-width unsigned integer usable as a PHAMT key.
///
/// Sealed and implemented only for `u16`, `u32`, `u64`, `u128` — the four
/// widths for which the derived shape constants below are defined. A key
/// type mismatch is therefore a compile error, not a runtime one.
pub trait Key:
    Copy
    + Eq
    + Ord
    + Hash
    + Debug
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
    + Sub<Output = Self>
    + Send
    + Sync
    + 'static
    + private::Sealed
{
    /// Bit width of the key type (`W`).
    const WIDTH: u32;
    /// Bits the root node consumes (`W mod 5`, never zero).
    const ROOT_SHIFT: u32;
    /// Index of the highest bit the root discriminates on.
    const ROOT_FIRSTBIT: u32;
    /// Number of interior (non-root, non-twig) levels.
    const NODE_LEVELS: u32;
    /// Total levels from root through twig, inclusive.
    const LEVELS: u32;
    /// Depth at which nodes are twigs and cells hold values, not children.
    const TWIG_DEPTH: u32;

    /// The all-zero key.
    const ZERO: Self;
    /// The key with only bit 0 set.
    const ONE: Self;

    /// Number of set bits.
    fn count_ones(self) -> u32;
    /// Leading zero bits. `Self::ZERO.leading_zeros() == Self::WIDTH`, unlike
    /// some hardware `clz` intrinsics for which zero is undefined — Rust's
    /// integer methods already guarantee this, so no fallback is needed.
    fn leading_zeros(self) -> u32;
    /// Trailing zero bits; callers never invoke this with `self == ZERO`.
    fn trailing_zeros(self) -> u32;
    /// Widen a small slot index into a key-shaped value.
    fn from_slot(slot: u32) -> Self;
    /// Narrow a key-shaped value into a `usize` slot index. Only called
    /// after masking to a small range (at most 5 bits).
    fn to_usize(self) -> usize;
}

/// Depth of the conceptual root level.
pub const ROOT_DEPTH: u32 = 0;

macro_rules! impl_key {
    ($t:ty, $width:expr, $root_shift:expr, $node_levels:expr) => {
        impl Key for $t {
            const WIDTH: u32 = $width;
            const ROOT_SHIFT: u32 = $root_shift;
            const ROOT_FIRSTBIT: u32 = $width - $root_shift;
            const NODE_LEVELS: u32 = $node_levels;
            const LEVELS: u32 = $node_levels + 2;
            const TWIG_DEPTH: u32 = 1 + $node_levels;
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline]
            fn count_ones(self) -> u32 {
                <$t>::count_ones(self)
            }
            #[inline]
            fn leading_zeros(self) -> u32 {
                <$t>::leading_zeros(self)
            }
            #[inline]
            fn trailing_zeros(self) -> u32 {
                <$t>::trailing_zeros(self)
            }
            #[inline]
            fn from_slot(slot: u32) -> Self {
                slot as $t
            }
            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    };
}

// NODE_LEVELS = (W - ROOT_SHIFT - NODE_SHIFT) / NODE_SHIFT, worked out by
// hand per width since the four widths don't share a generic const formula
// worth the const-generics machinery it would take to express in stable Rust.
impl_key!(u16, 16, 1, 2);
impl_key!(u32, 32, 2, 5);
impl_key!(u64, 64, 4, 11);
impl_key!(u128, 128, 3, 24);
