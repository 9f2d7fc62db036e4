// Copyright 2019-2020 PolkaX Authors. Licensed under GPL-3.0.

//! [`Phamt`]: the ergonomic, generic handle most callers use instead of the
//! raw `Node`/`Path` API. A thin `Arc<Node<K, V>>` newtype plus the
//! `HostHooks` extension point, giving ordinary callers a collection that
//! behaves like any other immutable Rust map.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::hooks::{HostHooks, NoopHooks};
use crate::iter::Iter;
use crate::key::Key;
use crate::node::{self, Node};
use crate::ops;
use crate::path::lookup;

/// A persistent, structurally-shared map from `K` to `V`.
///
/// Cloning a `Phamt` is `O(1)`: it bumps the root `Arc`'s reference count.
/// Every mutating method (`insert`, `remove`, `update`) returns a new
/// `Phamt`; the receiver is left untouched, exactly like `im`/`rpds`-style
/// persistent collections in other ecosystems.
///
/// `H` defaults to [`NoopHooks`]: ordinary callers never name it. Supplying
/// a custom `H` opts a trie into the owning/raw host-collaboration protocol
/// described on [`HostHooks`], typically only relevant when this crate is
/// embedded across an FFI boundary.
pub struct Phamt<K: Key, V, H: HostHooks<V> = NoopHooks> {
    root: Arc<Node<K, V>>,
    hooks: H,
    _marker: PhantomData<V>,
}

impl<K: Key, V, H: HostHooks<V>> Clone for Phamt<K, V, H>
where
    H: Clone,
{
    fn clone(&self) -> Self {
        Phamt {
            root: Arc::clone(&self.root),
            hooks: self.hooks.clone(),
            _marker: PhantomData,
        }
    }
}

impl<K: Key, V: fmt::Debug, H: HostHooks<V>> fmt::Debug for Phamt<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Key, V: Send + Sync + 'static> Phamt<K, V, NoopHooks> {
    /// An empty, owning trie with the default no-op hooks.
    pub fn new() -> Self {
        Phamt {
            root: node::empty_owning::<K, V>(),
            hooks: NoopHooks,
            _marker: PhantomData,
        }
    }

    /// An empty, raw (non-owning) trie with the default no-op hooks.
    pub fn new_raw() -> Self {
        Phamt {
            root: node::empty_raw::<K, V>(),
            hooks: NoopHooks,
            _marker: PhantomData,
        }
    }
}

impl<K: Key, V: Send + Sync + 'static> Default for Phamt<K, V, NoopHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Send + Sync + 'static, H: HostHooks<V> + Default> Phamt<K, V, H> {
    /// An empty, owning trie using a caller-supplied (`Default`-constructed)
    /// hook set.
    pub fn with_hooks() -> Self {
        Phamt {
            root: node::empty_owning::<K, V>(),
            hooks: H::default(),
            _marker: PhantomData,
        }
    }
}

impl<K: Key, V, H: HostHooks<V>> Phamt<K, V, H> {
    /// Number of key/value pairs stored.
    pub fn len(&self) -> u64 {
        self.root.numel
    }

    /// Whether the trie holds no entries.
    pub fn is_empty(&self) -> bool {
        self.root.numel == 0
    }

    /// Whether value cells in this trie participate in the host lifetime
    /// protocol (see [`HostHooks`]).
    pub fn is_owning(&self) -> bool {
        self.root.owning
    }

    /// Look up `key`, returning a reference to its value if present.
    pub fn get(&self, key: K) -> Option<&V> {
        lookup(&self.root, key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over `(key, &value)` pairs. Order is bit-layout order, not
    /// numeric key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root)
    }

    /// Run the debug-only structural validator over every node reachable
    /// from this trie's root. Not called anywhere on the hot path; exposed
    /// for tests and for callers who want to assert a trie's shape after
    /// building it through the raw `node`/`ops` API.
    pub fn check_invariants(&self) -> Result<(), crate::error::InvariantError> {
        crate::invariants::check(&self.root)
    }
}

impl<K: Key, V: Clone + Send + Sync + 'static, H: HostHooks<V> + Clone> Phamt<K, V, H> {
    /// Insert or replace `key -> value`, returning a new trie. The receiver
    /// is unchanged.
    ///
    /// When a value was already present, the replaced value is released and
    /// the new one retained via [`HostHooks`] (on an owning trie); on a raw
    /// trie this is a no-op. The "same pointer" fast path described in the
    /// core's `assoc` case 1 only applies when `V` itself carries pointer
    /// identity (e.g. `V = Arc<T>`, compared with `Arc::ptr_eq`): plain
    /// value types always take the copy-with-change path, which is
    /// semantically identical, just not reference-identical, when the new
    /// value compares equal to the old one.
    pub fn insert(&self, key: K, value: V) -> Self {
        if self.root.owning {
            if let Some(old) = self.get(key) {
                self.hooks.release(old);
            }
            self.hooks.retain(&value);
        }
        let root = ops::assoc(&self.root, key, value, self.root.owning);
        Phamt {
            root,
            hooks: self.hooks.clone(),
            _marker: PhantomData,
        }
    }

    /// Remove `key`, returning a new trie. The receiver is unchanged. A
    /// no-op (returns a trie sharing the same root) if `key` wasn't
    /// present.
    pub fn remove(&self, key: K) -> Self {
        if self.root.owning {
            if let Some(old) = self.get(key) {
                self.hooks.release(old);
            }
        }
        let root = ops::dissoc(&self.root, key);
        Phamt {
            root,
            hooks: self.hooks.clone(),
            _marker: PhantomData,
        }
    }

    /// Atomic single-key read-modify-write. `f` receives the current value
    /// (`None` if absent) and returns `Some(new_value)` to insert/replace or
    /// `None` to remove. Equivalent to, but cheaper than, a separate
    /// `get`/`insert`-or-`remove` pair: it descends the trie only once.
    pub fn update(&self, key: K, f: impl FnOnce(Option<&V>) -> Option<V>) -> Self {
        match f(self.get(key)) {
            Some(value) => self.insert(key, value),
            None => self.remove(key),
        }
    }
}

impl<'a, K: Key, V, H: HostHooks<V>> IntoIterator for &'a Phamt<K, V, H> {
    type Item = (K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Key, V: PartialEq, H: HostHooks<V>> PartialEq for Phamt<K, V, H> {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_trie_has_no_entries() {
        let t: Phamt<u64, &str> = Phamt::new();
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
        assert_eq!(t.get(42), None);
    }

    #[test]
    fn insert_then_get_matches_scenario_s1() {
        let t0: Phamt<u64, &str> = Phamt::new();
        let t1 = t0.insert(42, "v");
        assert_eq!(t1.len(), 1);
        assert_eq!(t1.get(42), Some(&"v"));
        assert_eq!(t1.get(43), None);
        assert_eq!(t0.len(), 0, "original trie must be unchanged");
    }

    #[test]
    fn remove_then_get_is_none() {
        let t0: Phamt<u64, &str> = Phamt::new();
        let t1 = t0.insert(1, "a").insert(2, "b");
        let t2 = t1.remove(1);
        assert_eq!(t2.get(1), None);
        assert_eq!(t2.get(2), Some(&"b"));
        assert_eq!(t1.get(1), Some(&"a"), "original trie must be unchanged");
    }

    #[test]
    fn update_as_increment_matches_scenario_s6() {
        let t0: Phamt<u64, u64> = Phamt::new_raw();
        let t1 = t0.update(7, |v| Some(v.copied().unwrap_or(0) + 1));
        let t2 = t1.update(7, |v| Some(v.copied().unwrap_or(0) + 1));
        let t3 = t2.update(8, |v| Some(v.copied().unwrap_or(0) + 1));
        let t4 = t3.update(7, |v| Some(v.copied().unwrap_or(0) + 1));
        assert_eq!(t4.get(7), Some(&3));
        assert_eq!(t4.get(8), Some(&1));
        assert_eq!(t4.len(), 2);
    }

    #[test]
    fn iterate_collects_every_pair() {
        let mut t: Phamt<u64, u64> = Phamt::new();
        for k in 0..40u64 {
            t = t.insert(k, k * 10);
        }
        let mut collected: Vec<(u64, u64)> = t.iter().map(|(k, v)| (k, *v)).collect();
        collected.sort_unstable();
        let expected: Vec<(u64, u64)> = (0..40u64).map(|k| (k, k * 10)).collect();
        assert_eq!(collected, expected);
    }

    #[test]
    fn clone_is_cheap_and_independent() {
        let t1: Phamt<u64, &str> = Phamt::new().insert(1, "a");
        let t2 = t1.clone().insert(2, "b");
        assert_eq!(t1.len(), 1);
        assert_eq!(t2.len(), 2);
    }
}
