// Copyright 2019-2020 PolkaX Authors. Licensed under GPL-3.0.

//! A persistent (immutable, structurally-shared) associative container
//! keyed by fixed-width unsigned integers, implemented as a hash array
//! mapped trie (HAMT) — except there is no hash function: a `phamt` key
//! already *is* its own hash, so there are no collisions to resolve, ever.
//!
//! Every [`Phamt::insert`]/[`Phamt::remove`] produces a new logical trie
//! that shares every subtree it didn't touch with its predecessor:
//!
//! ```
//! use phamt::Phamt;
//!
//! let t0: Phamt<u64, &str> = Phamt::new();
//! let t1 = t0.insert(42, "answer");
//! let t2 = t1.insert(7, "lucky");
//!
//! assert_eq!(t0.len(), 0);
//! assert_eq!(t1.get(42), Some(&"answer"));
//! assert_eq!(t2.get(7), Some(&"lucky"));
//! assert_eq!(t2.get(42), Some(&"answer"));
//! ```
//!
//! # Key widths
//!
//! [`Key`] is sealed and implemented exactly for `u16`, `u32`, `u64`, and
//! `u128`; the trie's internal shape (root width, interior branching,
//! number of levels) is derived once per width as associated constants, so
//! a key-width mismatch is a compile error rather than a runtime one.
//!
//! # Iteration order
//!
//! Iterating a `Phamt` (`for (k, v) in &trie`) visits entries in bit-layout
//! order — the order induced by descending the trie cell 0 first at every
//! level — not numeric key order. All `len(trie)` entries are visited
//! exactly once.
//!
//! # Host collaboration
//!
//! Ordinary callers never need [`HostHooks`]: the default [`NoopHooks`]
//! does nothing, since Rust values already have well-defined `Drop`
//! behavior. It exists for embedders that expose this trie across an FFI
//! boundary to a host runtime with its own reference-counted object
//! lifetime, where `retain`/`release` callbacks need to fire alongside
//! `assoc`/`dissoc`.
//!
//! # Debug-mode validation
//!
//! [`invariants::check`] walks a subtree and confirms the seven structural
//! invariants every reachable node must satisfy (packed cell array,
//! canonical address, containment, non-degenerate interior nodes, `numel`
//! consistency, a correct `firstn` cache, and a uniform owning flag). It is
//! not part of the hot path; use it in tests or behind `debug_assert!`.

#![deny(missing_docs)]

pub mod address;
pub mod bits;
pub mod error;
pub mod hooks;
pub mod invariants;
pub mod iter;
pub mod key;
pub mod node;
pub mod ops;
pub mod path;
mod trie;

pub use error::InvariantError;
pub use hooks::{HostHooks, NoopHooks};
pub use iter::Iter;
pub use key::Key;
pub use trie::Phamt;
