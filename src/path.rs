// Copyright 2019-2020 PolkaX Authors. Licensed under GPL-3.0.

//! A recorded descent through a trie: one [`Step`] per node visited, enough
//! to rebuild every ancestor on an edit or to resume iteration without a
//! fresh walk from the root.

use std::sync::Arc;

use crate::key::Key;
use crate::node::Node;

/// Sentinel `parent_link` value meaning "this step is the root of its walk".
pub const ROOT_LINK: u32 = 0xFF;

/// One visited node, plus enough information to locate it within its parent
/// and to find its parent in turn.
pub struct Step<K: Key, V> {
    /// The node visited at this step.
    pub node: Arc<Node<K, V>>,
    /// Slot this key maps to within `node`.
    pub bit_index: u32,
    /// Packed-array position corresponding to `bit_index`.
    pub cell_index: usize,
    /// Whether the slot was occupied when this step was recorded.
    pub is_found: bool,
    /// Depth of the parent step, or [`ROOT_LINK`] if `node` is the walk's
    /// starting node.
    pub parent_link: u32,
}

/// A descent from a starting node down to where a key either was found or
/// fell out of the trie's shape. Reused by `find`, `assoc`, `dissoc`, and the
/// iterator cursor (`first`/`next`).
pub struct Path<K: Key, V> {
    steps: Vec<Option<Step<K, V>>>,
    /// Depth of the node the walk started from.
    pub min_depth: u32,
    /// Depth of the last node visited.
    pub max_depth: u32,
    /// Depth at which an insert should splice in a new or replacement node.
    pub edit_depth: u32,
    /// Whether the walk ended on an occupied twig slot.
    pub value_found: bool,
}

impl<K: Key, V> Path<K, V> {
    /// An empty path with one slot per possible depth, pre-allocated so a
    /// walk never reallocates.
    pub fn new() -> Self {
        let mut steps = Vec::with_capacity(K::LEVELS as usize);
        steps.resize_with(K::LEVELS as usize, || None);
        Path {
            steps,
            min_depth: 0,
            max_depth: 0,
            edit_depth: 0,
            value_found: false,
        }
    }

    pub(crate) fn set_step(&mut self, depth: u32, step: Step<K, V>) {
        self.steps[depth as usize] = Some(step);
    }

    /// The recorded step at `depth`. Panics if no step was recorded there;
    /// callers only ever index depths a prior walk actually visited.
    pub fn step(&self, depth: u32) -> &Step<K, V> {
        self.steps[depth as usize]
            .as_ref()
            .expect("path step requested at an unvisited depth")
    }

    /// The step at [`Self::max_depth`].
    pub fn deepest(&self) -> &Step<K, V> {
        self.step(self.max_depth)
    }

    /// The value found at the end of the walk, if any.
    pub fn found_value(&self) -> Option<&V> {
        if !self.value_found {
            return None;
        }
        let step = self.deepest();
        match step.node.cells.get(step.cell_index) {
            Some(crate::node::Cell::Value(v)) => Some(v),
            _ => None,
        }
    }
}

impl<K: Key, V> Default for Path<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Descend from `root` toward `key`, recording every node visited.
///
/// See the module-level algorithm description: the walk stops either on an
/// occupied twig slot (`value_found = true`) or on the first node whose
/// `cellindex` comes back empty or outside the node's own prefix.
pub fn find<K: Key, V>(root: &Arc<Node<K, V>>, key: K) -> Path<K, V> {
    let mut path = Path::new();
    path.min_depth = root.depth;
    let mut node = Arc::clone(root);
    let mut parent_link = ROOT_LINK;
    loop {
        let depth = node.depth;
        let ci = node.cellindex_for(key);
        let step = Step {
            node: Arc::clone(&node),
            bit_index: ci.bit_index,
            cell_index: ci.cell_index,
            is_found: ci.is_found,
            parent_link,
        };
        path.set_step(depth, step);

        if !ci.is_found {
            path.max_depth = depth;
            path.edit_depth = if ci.is_beneath { depth } else { parent_link };
            path.value_found = false;
            return path;
        }

        if depth == K::TWIG_DEPTH {
            path.max_depth = depth;
            path.edit_depth = depth;
            path.value_found = true;
            return path;
        }

        let child = match &node.cells[ci.cell_index] {
            crate::node::Cell::Child(child) => Arc::clone(child),
            crate::node::Cell::Value(_) => {
                unreachable!("interior node held a value cell above twig depth")
            }
        };
        parent_link = depth;
        node = child;
    }
}

/// Descend from `root` toward `key`, discarding the path once the answer is
/// known. Cheaper than [`find`] when the caller has no intent to edit.
pub fn lookup<K: Key, V>(root: &Arc<Node<K, V>>, key: K) -> Option<&V> {
    let mut node = root;
    loop {
        let ci = node.cellindex_for(key);
        if !ci.is_found {
            return None;
        }
        match &node.cells[ci.cell_index] {
            crate::node::Cell::Value(v) => return Some(v),
            crate::node::Cell::Child(child) => node = child,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node;

    #[test]
    fn find_on_empty_reports_miss_beneath_at_root() {
        let empty = node::empty_owning::<u64, &str>();
        let path = find(&empty, 42);
        assert!(!path.value_found);
        assert_eq!(path.max_depth, path.min_depth);
        assert_eq!(path.edit_depth, path.max_depth);
    }

    #[test]
    fn find_hits_single_entry_twig() {
        let twig = node::from_kv::<u64, &str>(42, "v", true);
        let path = find(&twig, 42);
        assert!(path.value_found);
        assert_eq!(path.found_value(), Some(&"v"));
    }

    #[test]
    fn find_on_disjoint_key_reports_miss_disjoint() {
        let a = node::from_kv::<u64, &str>(0, "a", true);
        let b = node::from_kv::<u64, &str>(32, "b", true);
        let parent = node::join_disjoint(a, b);
        // 1024 is outside the parent's own slot range (it discriminates bits
        // [5, 10)), and the parent is this walk's starting node, so there is
        // no ancestor to record: edit_depth is the root-link sentinel.
        let path = find(&parent, 1024);
        assert!(!path.value_found);
        assert_eq!(path.max_depth, parent.depth);
        assert_eq!(path.edit_depth, ROOT_LINK);
    }

    #[test]
    fn lookup_matches_find() {
        let twig = node::from_kv::<u64, &str>(7, "seven", true);
        assert_eq!(lookup(&twig, 7), Some(&"seven"));
        assert_eq!(lookup(&twig, 8), None);
    }
}
