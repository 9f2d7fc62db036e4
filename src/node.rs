// Copyright 2019-2020 PolkaX Authors. Licensed under GPL-3.0.

//! Node representation and the constructors that build new, immutable nodes
//! while sharing everything they don't change.
//!
//! Every `copy_with_*` function here allocates exactly one new node; nothing
//! in this module ever mutates a published node in place.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::trace;
use once_cell::sync::OnceCell;

use crate::address::cellindex;
use crate::bits::{firstn_bits32, highbitdiff, highmask, lowmask};
use crate::key::{Key, NODE_SHIFT, ROOT_DEPTH};

/// A packed child slot: either a value (twig level) or a child subtree
/// (every other level). Which variant is legal at a given node is an
/// invariant of `depth`, not something a `Cell` enforces on its own.
pub enum Cell<K: Key, V> {
    /// A value stored at twig depth.
    Value(V),
    /// A child subtree at any depth above twig.
    Child(Arc<Node<K, V>>),
}

impl<K: Key, V: Clone> Clone for Cell<K, V> {
    fn clone(&self) -> Self {
        match self {
            Cell::Value(v) => Cell::Value(v.clone()),
            Cell::Child(n) => Cell::Child(Arc::clone(n)),
        }
    }
}

impl<K: Key, V: PartialEq> PartialEq for Cell<K, V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Value(a), Cell::Value(b)) => a == b,
            (Cell::Child(a), Cell::Child(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl<K: Key, V: PartialEq> PartialEq for Node<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
            && self.bits == other.bits
            && self.depth == other.depth
            && self.cells == other.cells
    }
}

/// One node of the trie: the root, an interior branch, or a twig.
///
/// See the crate-level invariants list; every field here participates in at
/// least one of them.
pub struct Node<K: Key, V> {
    /// Prefix shared by every key in this subtree; zero below the node's own
    /// slot range.
    pub(crate) address: K,
    /// Count of leaf values anywhere beneath this node.
    pub(crate) numel: u64,
    /// Bitmap of occupied slots, LSB-first.
    pub(crate) bits: u32,
    /// Lowest bit of the key range this node discriminates on.
    pub(crate) start_bit: u32,
    /// Number of bits this node discriminates on.
    pub(crate) shift: u32,
    /// Cached depth, consistent with `(start_bit, shift)`.
    pub(crate) depth: u32,
    /// Whether values under this node participate in a host lifetime
    /// protocol (see [`crate::hooks`]). Shared by every node in one trie.
    pub(crate) owning: bool,
    /// Cached `bits == lowmask(popcount(bits))`: occupied slots are densely
    /// packed from slot 0, so cell index equals bit index.
    pub(crate) firstn: bool,
    /// Reserved for a future mutable/transient builder phase; always
    /// `false` in this crate.
    #[allow(dead_code)]
    pub(crate) transient: bool,
    /// Packed children, one per set bit of `bits`, ordered LSB-first.
    pub(crate) cells: Box<[Cell<K, V>]>,
}

impl<K: Key, V> std::fmt::Debug for Node<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("address", &self.address)
            .field("depth", &self.depth)
            .field("bits", &format_args!("{:#034b}", self.bits))
            .field("numel", &self.numel)
            .field("firstn", &self.firstn)
            .field("owning", &self.owning)
            .finish()
    }
}

impl<K: Key, V> Node<K, V> {
    /// Number of occupied slots, i.e. `len(cells)`.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether this node is a twig (cells hold values, not children).
    #[inline]
    pub fn is_twig(&self) -> bool {
        self.depth == K::TWIG_DEPTH
    }

    /// Locate `key`'s slot within this node.
    #[inline]
    pub(crate) fn cellindex_for(&self, key: K) -> crate::address::CellIndex {
        cellindex::<K>(
            self.address,
            self.depth,
            self.start_bit,
            self.shift,
            self.bits,
            self.firstn,
            key,
        )
    }

    /// Enumerate every cell this node holds, in packed order. Mirrors §6's
    /// `visit_children` host collaboration hook: owning twigs and all
    /// interior nodes yield cells a tracing host would need to visit.
    pub fn visit_children<F: FnMut(&Cell<K, V>)>(&self, mut visitor: F) {
        if self.is_twig() && !self.owning {
            return;
        }
        for cell in self.cells.iter() {
            visitor(cell);
        }
    }
}

type Sentinels<K, V> = (Arc<Node<K, V>>, Arc<Node<K, V>>);

/// Process-wide registry of the two empty sentinels, one pair per `(K, V)`
/// instantiation actually used. A `static` item nested inside a generic
/// function is *not* monomorphized per type parameter in Rust (the item
/// itself cannot even name the enclosing function's generics), so the
/// per-type split has to happen at runtime, keyed by `TypeId` — this is the
/// standard pattern for a per-type singleton cache in a generic library.
static SENTINEL_REGISTRY: OnceCell<Mutex<HashMap<(TypeId, TypeId), Arc<dyn Any + Send + Sync>>>> =
    OnceCell::new();

/// Fetch (creating on first use) the `(owning, raw)` empty sentinel pair for
/// `(K, V)`. Pointer-stable: every call for the same `(K, V)` returns clones
/// of the same two `Arc`s, which is what the boundary law
/// `dissoc(empty, k) == empty` (pointer-equal) depends on.
fn sentinels<K: Key, V: Send + Sync + 'static>() -> Sentinels<K, V> {
    let registry = SENTINEL_REGISTRY.get_or_init(|| Mutex::new(HashMap::new()));
    let type_key = (TypeId::of::<K>(), TypeId::of::<V>());
    let mut guard = registry.lock().expect("sentinel registry lock poisoned");
    let boxed = guard.entry(type_key).or_insert_with(|| {
        let owning: Arc<Node<K, V>> = Arc::new(empty_node(true));
        let raw: Arc<Node<K, V>> = Arc::new(empty_node(false));
        Arc::new((owning, raw)) as Arc<dyn Any + Send + Sync>
    });
    Arc::clone(boxed)
        .downcast::<Sentinels<K, V>>()
        .ok()
        .expect("sentinel registry type mismatch cannot happen: keyed per (K, V)")
        .as_ref()
        .clone()
}

fn empty_node<K: Key, V>(owning: bool) -> Node<K, V> {
    Node {
        address: K::ZERO,
        numel: 0,
        bits: 0,
        start_bit: K::ROOT_FIRSTBIT,
        shift: K::ROOT_SHIFT,
        depth: ROOT_DEPTH,
        owning,
        firstn: true,
        transient: false,
        cells: Box::new([]),
    }
}

/// The owning empty sentinel for `(K, V)`. Pointer-stable within one
/// instantiation of this crate: repeated calls return the same `Arc`.
pub fn empty_owning<K: Key, V: Send + Sync + 'static>() -> Arc<Node<K, V>> {
    sentinels::<K, V>().0
}

/// The raw (non-owning) empty sentinel for `(K, V)`.
pub fn empty_raw<K: Key, V: Send + Sync + 'static>() -> Arc<Node<K, V>> {
    sentinels::<K, V>().1
}

/// The empty sentinel matching `node`'s owning flag.
pub fn empty_like<K: Key, V: Send + Sync + 'static>(node: &Node<K, V>) -> Arc<Node<K, V>> {
    if node.owning {
        empty_owning::<K, V>()
    } else {
        empty_raw::<K, V>()
    }
}

/// Build a single-entry twig holding `(k, v)`.
pub fn from_kv<K: Key, V>(k: K, v: V, owning: bool) -> Arc<Node<K, V>> {
    let twig_mask = lowmask::<K>(NODE_SHIFT);
    let address = k & !twig_mask;
    let slot = (k & twig_mask).to_usize() as u32;
    let bits = 1u32 << slot;
    Arc::new(Node {
        address,
        numel: 1,
        bits,
        start_bit: 0,
        shift: NODE_SHIFT,
        depth: K::TWIG_DEPTH,
        owning,
        firstn: firstn_bits32(bits),
        transient: false,
        cells: vec![Cell::Value(v)].into_boxed_slice(),
    })
}

/// Replace the cell at `cell_index`, keeping every other field (including
/// `bits`) the same except `numel`, which the caller must supply since only
/// the caller knows whether this change altered the subtree's element count.
pub fn copy_with_change<K: Key, V>(
    node: &Node<K, V>,
    cell_index: usize,
    new_cell: Cell<K, V>,
    numel: u64,
) -> Arc<Node<K, V>>
where
    V: Clone,
{
    let mut cells: Vec<Cell<K, V>> = node.cells.to_vec();
    cells[cell_index] = new_cell;
    Arc::new(Node {
        address: node.address,
        numel,
        bits: node.bits,
        start_bit: node.start_bit,
        shift: node.shift,
        depth: node.depth,
        owning: node.owning,
        firstn: node.firstn,
        transient: false,
        cells: cells.into_boxed_slice(),
    })
}

/// Insert a new cell at `bit_index`/`cell_index`, which must not already be
/// occupied.
pub fn copy_with_insert<K: Key, V>(
    node: &Node<K, V>,
    bit_index: u32,
    cell_index: usize,
    new_cell: Cell<K, V>,
    numel: u64,
) -> Arc<Node<K, V>>
where
    V: Clone,
{
    let bits = node.bits | (1u32 << bit_index);
    let mut cells: Vec<Cell<K, V>> = Vec::with_capacity(node.cells.len() + 1);
    cells.extend_from_slice(&node.cells[..cell_index]);
    cells.push(new_cell);
    cells.extend_from_slice(&node.cells[cell_index..]);
    Arc::new(Node {
        address: node.address,
        numel,
        bits,
        start_bit: node.start_bit,
        shift: node.shift,
        depth: node.depth,
        owning: node.owning,
        firstn: firstn_bits32(bits),
        transient: false,
        cells: cells.into_boxed_slice(),
    })
}

/// Remove the cell at `bit_index`/`cell_index`, which must currently be
/// occupied. The caller is responsible for the structural-simplification
/// decisions (collapsing a two-child parent, etc.) before reaching here.
pub fn copy_with_delete<K: Key, V>(
    node: &Node<K, V>,
    bit_index: u32,
    cell_index: usize,
    numel: u64,
) -> Arc<Node<K, V>>
where
    V: Clone,
{
    let bits = node.bits & !(1u32 << bit_index);
    let mut cells: Vec<Cell<K, V>> = Vec::with_capacity(node.cells.len() - 1);
    cells.extend_from_slice(&node.cells[..cell_index]);
    cells.extend_from_slice(&node.cells[cell_index + 1..]);
    Arc::new(Node {
        address: node.address,
        numel,
        bits,
        start_bit: node.start_bit,
        shift: node.shift,
        depth: node.depth,
        owning: node.owning,
        firstn: firstn_bits32(bits),
        transient: false,
        cells: cells.into_boxed_slice(),
    })
}

/// Build a new common ancestor for two nodes whose prefixes are disjoint
/// (neither contains the other). Both nodes must share `owning`.
pub fn join_disjoint<K: Key, V>(a: Arc<Node<K, V>>, b: Arc<Node<K, V>>) -> Arc<Node<K, V>> {
    debug_assert_eq!(
        a.owning, b.owning,
        "join_disjoint called across an owning/raw trie boundary"
    );
    let h = highbitdiff::<K>(a.address, b.address);
    // Strict: `h == ROOT_FIRSTBIT` falls inside the root's own discriminating
    // range (its lowest bit), so that case must join at the root, not one
    // level below it with the wrong shift.
    let (start_bit, shift, depth) = if h < K::WIDTH - K::ROOT_SHIFT {
        let level = (h - NODE_SHIFT) / NODE_SHIFT;
        (level * NODE_SHIFT + NODE_SHIFT, NODE_SHIFT, K::LEVELS - 2 - level)
    } else {
        (K::ROOT_FIRSTBIT, K::ROOT_SHIFT, ROOT_DEPTH)
    };
    let address = a.address & highmask::<K>(start_bit + shift);
    let bit_a = ((a.address >> start_bit) & lowmask::<K>(shift)).to_usize() as u32;
    let bit_b = ((b.address >> start_bit) & lowmask::<K>(shift)).to_usize() as u32;
    debug_assert_ne!(bit_a, bit_b, "join_disjoint requires disjoint prefixes");
    let bits = (1u32 << bit_a) | (1u32 << bit_b);
    let cells = if bit_a < bit_b {
        vec![Cell::Child(a.clone()), Cell::Child(b.clone())]
    } else {
        vec![Cell::Child(b.clone()), Cell::Child(a.clone())]
    };
    let numel = a.numel + b.numel;
    trace!(
        "join_disjoint: new ancestor at depth {} address {:?} (h={})",
        depth,
        address,
        h
    );
    Arc::new(Node {
        address,
        numel,
        bits,
        start_bit,
        shift,
        depth,
        owning: a.owning,
        firstn: firstn_bits32(bits),
        transient: false,
        cells: cells.into_boxed_slice(),
    })
}
