// Copyright 2019-2020 PolkaX Authors. Licensed under GPL-3.0.

//! End-to-end scenarios S1-S6, W = 64, ported directly from the core's
//! testable-properties section. Exercised entirely through the public
//! `Phamt` facade; the equivalent assertions against the raw node shape
//! (address/bits/depth) live alongside `ops::assoc`/`ops::dissoc` as unit
//! tests, since those fields are crate-private by design.

use phamt::Phamt;

#[test]
fn s1_empty_and_single() {
    let t0: Phamt<u64, &str> = Phamt::new();
    assert_eq!(t0.len(), 0);
    assert_eq!(t0.get(42), None);

    let t1 = t0.insert(42, "v");
    assert_eq!(t1.len(), 1);
    assert_eq!(t1.get(42), Some(&"v"));
    assert_eq!(t1.get(43), None);
    assert!(t1.check_invariants().is_ok());
}

#[test]
fn s2_twig_packing() {
    let mut t: Phamt<u64, String> = Phamt::new();
    for k in 0..32u64 {
        t = t.insert(k, format!("k{k}"));
    }
    assert_eq!(t.len(), 32);
    for k in 0..32u64 {
        assert_eq!(t.get(k), Some(&format!("k{k}")));
    }
    assert!(t.check_invariants().is_ok());
}

#[test]
fn s3_split_across_twigs() {
    let t = Phamt::<u64, &str>::new().insert(0, "a").insert(32, "b");
    assert_eq!(t.len(), 2);
    assert_eq!(t.get(0), Some(&"a"));
    assert_eq!(t.get(32), Some(&"b"));
    assert!(t.check_invariants().is_ok());
}

#[test]
fn s4_disjoint_join_at_root() {
    let t = Phamt::<u64, &str>::new()
        .insert(0, "x")
        .insert(1u64 << 63, "y");
    assert_eq!(t.len(), 2);
    assert_eq!(t.get(0), Some(&"x"));
    assert_eq!(t.get(1u64 << 63), Some(&"y"));
    assert!(t.check_invariants().is_ok());
}

#[test]
fn s5_dissoc_collapses_chain() {
    let t = Phamt::<u64, &str>::new()
        .insert(0, "a")
        .insert(32, "b")
        .remove(32);
    assert_eq!(t.len(), 1);
    assert_eq!(t.get(0), Some(&"a"));
    assert_eq!(t.get(32), None);
    assert!(t.check_invariants().is_ok());
}

#[test]
fn s6_apply_as_increment() {
    let t0: Phamt<u64, u64> = Phamt::new_raw();
    let increment = |v: Option<&u64>| Some(v.copied().unwrap_or(0) + 1);

    let t1 = t0.update(7, increment);
    let t2 = t1.update(7, increment);
    let t3 = t2.update(8, increment);
    let t4 = t3.update(7, increment);

    assert_eq!(t4.get(7), Some(&3));
    assert_eq!(t4.get(8), Some(&1));
    assert_eq!(t4.len(), 2);
}
