// Copyright 2019-2020 PolkaX Authors. Licensed under GPL-3.0.

//! Host collaboration hooks for owning tries.
//!
//! A raw trie's values are ordinary Rust data; `Drop` already manages their
//! lifetime and no hook is ever called. An owning trie additionally offers a
//! host runtime (typically embedding this crate across an FFI boundary) two
//! callbacks invoked at node construction and destruction. Everything here
//! defaults to a no-op, so ordinary callers never notice `H` exists.

use crate::node::Cell;
use crate::key::Key;

/// Retain/release callbacks for values stored in an owning trie.
///
/// `retain` is invoked whenever a value cell is copied into a newly
/// constructed node (i.e. whenever the trie takes on a new logical reference
/// to it); `release` is invoked whenever a value cell is dropped from a
/// node's cell array without being copied forward. Neither is called by this
/// crate's own node constructors directly — `Phamt` invokes them at the
/// facade layer, where it is known whether a given `assoc`/`dissoc` actually
/// changed the set of retained cells.
pub trait HostHooks<V> {
    /// Called when `value` gains a new logical owner.
    fn retain(&self, _value: &V) {}
    /// Called when `value` loses a logical owner.
    fn release(&self, _value: &V) {}
}

/// The default, no-op host hook set. Used for every `Phamt` that doesn't
/// explicitly opt into host collaboration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoopHooks;

impl<V> HostHooks<V> for NoopHooks {}

/// Walk every value cell reachable from `node` that participates in the
/// host's lifetime protocol (i.e. every cell of an owning twig), invoking
/// `f`. Mirrors `Node::visit_children` but narrows to `Cell::Value`s, which
/// is what `retain`/`release` bookkeeping needs.
pub(crate) fn for_each_owned_value<K: Key, V>(
    node: &crate::node::Node<K, V>,
    f: &mut impl FnMut(&V),
) {
    node.visit_children(|cell| {
        if let Cell::Value(v) = cell {
            f(v);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_hooks_do_nothing_observable() {
        let hooks = NoopHooks;
        hooks.retain(&42);
        hooks.release(&42);
    }
}
