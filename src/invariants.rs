// Copyright 2019-2020 PolkaX Authors. Licensed under GPL-3.0.

//! Debug-only structural validator. Walks a subtree and returns the first
//! violation of the seven invariants every reachable node must satisfy; used
//! by tests and by `debug_assert!`-gated checks on the hot path, never by
//! the infallible public API itself.

use crate::address::{depth_to_shift, depth_to_startbit, isbeneath};
use crate::bits::{firstn_bits32, lowmask};
use crate::error::InvariantError;
use crate::key::Key;
use crate::node::{Cell, Node};

/// Check every invariant for `node` and everything reachable beneath it.
pub fn check<K: Key, V>(node: &Node<K, V>) -> Result<(), InvariantError> {
    check_node(node, node.owning)
}

fn check_node<K: Key, V>(node: &Node<K, V>, owning: bool) -> Result<(), InvariantError> {
    let popcount = node.bits.count_ones();
    if node.cells.len() != popcount as usize {
        return Err(InvariantError::CellCountMismatch {
            depth: node.depth,
            cell_count: node.cells.len(),
            popcount,
        });
    }

    if node.address & lowmask::<K>(node.start_bit + node.shift) != K::ZERO {
        return Err(InvariantError::NonCanonicalAddress { depth: node.depth });
    }

    if node.start_bit != depth_to_startbit::<K>(node.depth)
        || node.shift != depth_to_shift::<K>(node.depth)
    {
        return Err(InvariantError::DepthShapeMismatch { depth: node.depth });
    }

    if node.firstn != firstn_bits32(node.bits) {
        return Err(InvariantError::StaleFirstn { depth: node.depth });
    }

    if node.owning != owning {
        return Err(InvariantError::NonUniformOwning { depth: node.depth });
    }

    if node.is_twig() {
        if node.numel != popcount as u64 {
            return Err(InvariantError::NumelMismatch {
                depth: node.depth,
                numel: node.numel,
                expected: popcount as u64,
            });
        }
        return Ok(());
    }

    // An empty sentinel is the one interior-shaped node allowed zero
    // children; every other interior node needs at least two.
    if popcount < 2 && node.numel != 0 {
        return Err(InvariantError::DegenerateInterior {
            depth: node.depth,
            cell_count: node.cells.len(),
        });
    }

    let mut numel_sum: u64 = 0;
    for cell in node.cells.iter() {
        match cell {
            Cell::Child(child) => {
                if !isbeneath::<K>(node.address, node.depth, child.address) {
                    return Err(InvariantError::ContainmentViolation { depth: node.depth });
                }
                check_node(child, owning)?;
                numel_sum += child.numel;
            }
            Cell::Value(_) => {
                return Err(InvariantError::ContainmentViolation { depth: node.depth });
            }
        }
    }
    if node.numel != numel_sum {
        return Err(InvariantError::NumelMismatch {
            depth: node.depth,
            numel: node.numel,
            expected: numel_sum,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node;

    #[test]
    fn empty_sentinel_is_valid() {
        let empty = node::empty_owning::<u64, &str>();
        assert!(check(&empty).is_ok());
    }

    #[test]
    fn single_twig_is_valid() {
        let twig = node::from_kv::<u64, &str>(42, "v", true);
        assert!(check(&twig).is_ok());
    }

    #[test]
    fn join_disjoint_result_is_valid() {
        let a = node::from_kv::<u64, &str>(0, "a", true);
        let b = node::from_kv::<u64, &str>(32, "b", true);
        let parent = node::join_disjoint(a, b);
        assert!(check(&parent).is_ok());
    }

    #[test]
    fn detects_stale_firstn() {
        let broken: Node<u64, &str> = Node {
            address: 0,
            numel: 1,
            bits: 0b1,
            start_bit: 0,
            shift: 5,
            depth: <u64 as Key>::TWIG_DEPTH,
            owning: true,
            firstn: false,
            transient: false,
            cells: vec![Cell::Value("v")].into_boxed_slice(),
        };
        assert_eq!(check(&broken), Err(InvariantError::StaleFirstn { depth: broken.depth }));
    }
}
