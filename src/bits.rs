// Copyright 2019-2020 PolkaX Authors. Licensed under GPL-3.0.

//! Bit primitives shared by the 32-bit child bitmap and the `W`-bit key type.

use crate::key::Key;

/// Low mask covering the bottom `n` bits of a 32-bit bitmap.
#[inline]
#[must_use]
pub const fn lowmask32(n: u32) -> u32 {
    if n >= 32 {
        u32::MAX
    } else {
        (1u32 << n) - 1
    }
}

/// High mask: the complement of [`lowmask32`].
#[inline]
#[must_use]
pub const fn highmask32(n: u32) -> u32 {
    !lowmask32(n)
}

/// `true` iff `bits` is exactly the lowest `popcount(bits)` contiguous bits,
/// i.e. the occupied slots are densely packed starting at slot 0.
#[inline]
#[must_use]
pub fn firstn_bits32(bits: u32) -> bool {
    bits == lowmask32(bits.count_ones())
}

/// Low mask covering the bottom `n` bits of a key-shaped value.
#[inline]
pub fn lowmask<K: Key>(n: u32) -> K {
    if n == 0 {
        K::ZERO
    } else if n >= K::WIDTH {
        !K::ZERO
    } else {
        (K::ONE << n) - K::ONE
    }
}

/// High mask: the complement of [`lowmask`].
#[inline]
pub fn highmask<K: Key>(n: u32) -> K {
    !lowmask::<K>(n)
}

/// Index of the highest bit at which `a` and `b` differ.
///
/// Undefined (and never called) when `a == b`; callers only invoke this on
/// two prefixes already known to be disjoint.
#[inline]
pub fn highbitdiff<K: Key>(a: K, b: K) -> u32 {
    K::WIDTH - (a ^ b).leading_zeros() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowmask32_boundaries() {
        assert_eq!(lowmask32(0), 0);
        assert_eq!(lowmask32(1), 0b1);
        assert_eq!(lowmask32(5), 0b11111);
        assert_eq!(lowmask32(32), u32::MAX);
    }

    #[test]
    fn highmask32_is_complement() {
        assert_eq!(highmask32(5), !0b11111u32);
    }

    #[test]
    fn firstn_detects_dense_low_bits() {
        assert!(firstn_bits32(0));
        assert!(firstn_bits32(0b1));
        assert!(firstn_bits32(0b111));
        assert!(!firstn_bits32(0b101));
        assert!(!firstn_bits32(0b10));
    }

    #[test]
    fn highbitdiff_matches_spec_examples() {
        // highbitdiff(0, 32) == 5, per spec scenario S3.
        assert_eq!(highbitdiff::<u64>(0, 32), 5);
        // highbitdiff(0, 1 << 63) == 63, per spec scenario S4.
        assert_eq!(highbitdiff::<u64>(0, 1u64 << 63), 63);
    }

    #[test]
    fn lowmask_key_boundaries() {
        assert_eq!(lowmask::<u64>(0), 0);
        assert_eq!(lowmask::<u64>(5), 0b11111);
        assert_eq!(lowmask::<u64>(64), u64::MAX);
        assert_eq!(highmask::<u64>(60), !lowmask::<u64>(60));
    }
}
