// Copyright 2019-2020 PolkaX Authors. Licensed under GPL-3.0.

//! `assoc` and `dissoc`: the path-based insert/replace and remove-with-
//! simplification algorithms. Both take the [`Path`] a [`crate::path::find`]
//! already produced and rebuild only the ancestors that changed.

use std::sync::Arc;

use log::trace;

use crate::key::Key;
use crate::node::{self, Cell, Node};
use crate::path::{find, Path, ROOT_LINK};

/// Insert or replace `key -> value` under `root`, returning a new root that
/// shares every unchanged subtree with the original.
pub fn assoc<K: Key, V: Clone>(root: &Arc<Node<K, V>>, key: K, value: V, owning: bool) -> Arc<Node<K, V>> {
    let path = find(root, key);
    assoc_with_path(&path, root, key, value, owning)
}

fn assoc_with_path<K: Key, V: Clone>(
    path: &Path<K, V>,
    root: &Arc<Node<K, V>>,
    key: K,
    value: V,
    owning: bool,
) -> Arc<Node<K, V>> {
    if path.value_found {
        // Case 2: found, replace. (Case 1, "same pointer", is an opt-in fast
        // path for `Arc`-wrapped values; see `Phamt::insert`.)
        let l = path.deepest();
        let u = node::copy_with_change(&l.node, l.cell_index, Cell::Value(value), l.node.numel);
        return rebuild_ancestors(path, l.parent_link, u, 0);
    }

    if root.numel == 0 {
        // Case 5: starting root is the empty sentinel.
        trace!("assoc: building a fresh twig from the empty sentinel");
        return node::from_kv(key, value, owning);
    }

    let l = path.deepest();
    if path.max_depth != path.edit_depth {
        // Case 3: key disjoint from everything under `l.node`.
        let twig = node::from_kv(key, value, owning);
        let ancestor = node::join_disjoint(Arc::clone(&l.node), twig);
        return rebuild_ancestors(path, l.parent_link, ancestor, 1);
    }

    if l.node.is_twig() {
        // Case 4: twig has a free slot for this key.
        let u = node::copy_with_insert(
            &l.node,
            l.bit_index,
            l.cell_index,
            Cell::Value(value),
            l.node.numel + 1,
        );
        return rebuild_ancestors(path, l.parent_link, u, 1);
    }

    // Case 6: interior node, key inside its prefix, slot empty.
    let twig = node::from_kv(key, value, owning);
    let u = node::copy_with_insert(
        &l.node,
        l.bit_index,
        l.cell_index,
        Cell::Child(twig),
        l.node.numel + 1,
    );
    rebuild_ancestors(path, l.parent_link, u, 1)
}

/// Walk ancestors from `start_link` up to (and including) `path.min_depth`,
/// splicing `u` in at each recorded cell and adjusting `numel` by `dnumel`
/// at every step, including the first (`dnumel` already reflects the change
/// made below `start_link`).
fn rebuild_ancestors<K: Key, V: Clone>(
    path: &Path<K, V>,
    start_link: u32,
    mut u: Arc<Node<K, V>>,
    dnumel: i64,
) -> Arc<Node<K, V>> {
    let mut link = start_link;
    while link != ROOT_LINK {
        let a = path.step(link);
        let numel = (a.node.numel as i64 + dnumel) as u64;
        u = node::copy_with_change(&a.node, a.cell_index, Cell::Child(u), numel);
        if a.node.depth == path.min_depth {
            break;
        }
        link = a.parent_link;
    }
    u
}

/// Remove `key` from `root`, applying structural simplification so the
/// result stays canonical (no 0- or 1-child interior nodes, no empty
/// twigs). Returns the original root, unchanged, if `key` wasn't present.
pub fn dissoc<K: Key, V: Clone + Send + Sync + 'static>(
    root: &Arc<Node<K, V>>,
    key: K,
) -> Arc<Node<K, V>> {
    let path = find(root, key);
    if !path.value_found {
        return Arc::clone(root);
    }

    let l = path.deepest();

    if l.node.numel == 1 {
        if l.node.depth == path.min_depth {
            // The twig we're emptying is itself the walk's starting root.
            return node::empty_like(&l.node);
        }
        let p = path.step(l.parent_link);
        if p.node.cell_count() == 2 {
            // The surviving sibling bubbles up, eliminating `p` entirely.
            trace!(
                "dissoc: collapsing interior node at depth {} into its surviving sibling",
                p.node.depth
            );
            let sibling_index = 1 - p.cell_index;
            let sibling = match &p.node.cells[sibling_index] {
                Cell::Child(child) => Arc::clone(child),
                Cell::Value(_) => unreachable!("interior node held a value cell"),
            };
            if p.node.depth == path.min_depth {
                return sibling;
            }
            return rebuild_ancestors(&path, p.parent_link, sibling, -1);
        }
        // Three or more cells: drop this twig's slot from its parent.
        let u = node::copy_with_delete(&p.node, p.bit_index, p.cell_index, p.node.numel - 1);
        return rebuild_ancestors(&path, p.parent_link, u, -1);
    }

    // Twig with more than one element: just drop this slot.
    let u = node::copy_with_delete(&l.node, l.bit_index, l.cell_index, l.node.numel - 1);
    rebuild_ancestors(&path, l.parent_link, u, -1)
}
