//! Cross-variant property tests: every tree variant must agree with a
//! `BTreeSet` over any sequence of operations, and the shared contract from
//! the crate docs must hold for each of them.

use std::collections::BTreeSet;

use quickcheck::{Arbitrary, Gen};

use ordtree::{bst, redblack, splay};

/// An enum for the various kinds of "things" to do to
/// a search tree in a quicktest.
#[derive(Copy, Clone, Debug)]
enum Op<K> {
    Insert(K),
    Remove(K),
    Search(K),
}

impl<K> Arbitrary for Op<K>
where
    K: Arbitrary,
{
    fn arbitrary(g: &mut Gen) -> Self {
        match g.choose(&[0, 1, 2]).unwrap() {
            0 => Op::Insert(K::arbitrary(g)),
            1 => Op::Remove(K::arbitrary(g)),
            2 => Op::Search(K::arbitrary(g)),
            _ => unreachable!(),
        }
    }
}

/// The common tree surface, so one test body can drive every variant.
trait OrderedSet {
    fn insert(&mut self, key: i16) -> bool;
    fn remove(&mut self, key: &i16) -> bool;
    fn search(&mut self, key: &i16) -> bool;
    fn clear(&mut self);
    fn inorder_keys(&self) -> Vec<i16>;
    fn valid(&self) -> bool;
}

impl OrderedSet for bst::Tree<i16> {
    fn insert(&mut self, key: i16) -> bool {
        Self::insert(self, key)
    }
    fn remove(&mut self, key: &i16) -> bool {
        Self::remove(self, key)
    }
    fn search(&mut self, key: &i16) -> bool {
        Self::search(self, key)
    }
    fn clear(&mut self) {
        Self::clear(self)
    }
    fn inorder_keys(&self) -> Vec<i16> {
        self.inorder().into_iter().copied().collect()
    }
    fn valid(&self) -> bool {
        self.check()
    }
}

impl OrderedSet for redblack::Tree<i16> {
    fn insert(&mut self, key: i16) -> bool {
        Self::insert(self, key)
    }
    fn remove(&mut self, key: &i16) -> bool {
        Self::remove(self, key)
    }
    fn search(&mut self, key: &i16) -> bool {
        Self::search(self, key)
    }
    fn clear(&mut self) {
        Self::clear(self)
    }
    fn inorder_keys(&self) -> Vec<i16> {
        self.inorder().into_iter().copied().collect()
    }
    fn valid(&self) -> bool {
        self.check()
    }
}

impl OrderedSet for splay::Tree<i16> {
    fn insert(&mut self, key: i16) -> bool {
        Self::insert(self, key)
    }
    fn remove(&mut self, key: &i16) -> bool {
        Self::remove(self, key)
    }
    fn search(&mut self, key: &i16) -> bool {
        Self::search(self, key)
    }
    fn clear(&mut self) {
        Self::clear(self)
    }
    fn inorder_keys(&self) -> Vec<i16> {
        self.inorder().into_iter().copied().collect()
    }
    fn valid(&self) -> bool {
        self.check()
    }
}

fn variants() -> Vec<Box<dyn OrderedSet>> {
    vec![
        Box::new(bst::Tree::<i16>::new()),
        Box::new(redblack::Tree::<i16>::new()),
        Box::new(splay::Tree::<i16>::new()),
    ]
}

/// Applies a set of operations to a tree and a `BTreeSet`, checking that
/// every outcome agrees along the way.
fn do_ops(ops: &[Op<i16>], tree: &mut dyn OrderedSet, set: &mut BTreeSet<i16>) -> bool {
    ops.iter().all(|op| match op {
        Op::Insert(k) => tree.insert(*k) == set.insert(*k),
        Op::Remove(k) => tree.remove(k) == set.remove(k),
        Op::Search(k) => tree.search(k) == set.contains(k),
    })
}

quickcheck::quickcheck! {
    fn fuzz_every_variant_matches_btreeset(ops: Vec<Op<i16>>) -> bool {
        variants().into_iter().all(|mut tree| {
            let mut set = BTreeSet::new();
            do_ops(&ops, tree.as_mut(), &mut set)
                && tree.inorder_keys() == set.iter().copied().collect::<Vec<_>>()
                && tree.valid()
        })
    }

    fn fuzz_clear_leaves_every_variant_empty(keys: Vec<i16>) -> bool {
        variants().into_iter().all(|mut tree| {
            for key in &keys {
                tree.insert(*key);
            }
            tree.clear();
            tree.inorder_keys().is_empty() && keys.iter().all(|k| !tree.search(k))
        })
    }
}

#[test]
fn insert_then_search_then_remove_round_trip() {
    let keys = [5, 3, 8, 1, 4, 7, 9];
    let orders: [&[i16]; 3] = [
        &[5, 3, 8, 1, 4, 7, 9],
        &[9, 7, 4, 1, 8, 3, 5],
        &[1, 3, 4, 5, 7, 8, 9],
    ];
    for order in orders {
        for mut tree in variants() {
            for &key in &keys {
                assert!(tree.insert(key));
                assert!(tree.search(&key));
            }
            assert_eq!(tree.inorder_keys(), vec![1, 3, 4, 5, 7, 8, 9]);

            for key in order {
                assert!(tree.remove(key));
                assert!(!tree.search(key));
                assert!(tree.valid());
            }
            assert!(tree.inorder_keys().is_empty());
        }
    }
}

#[test]
fn duplicate_inserts_are_rejected_by_every_variant() {
    for mut tree in variants() {
        assert!(tree.insert(1));
        assert!(!tree.insert(1));
        assert_eq!(tree.inorder_keys(), vec![1]);
    }
}
