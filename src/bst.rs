//! An unbalanced binary search tree. This is the baseline variant: no
//! rebalancing ever happens, so the shape (and therefore the cost of every
//! operation) is entirely determined by the insertion order. Sorted input
//! degenerates into a linked list with `O(n)` searches and recursion as deep
//! as the tree. That is accepted behavior for this variant, not a bug.
//!
//! # Examples
//!
//! ```
//! use ordtree::bst::Tree;
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert!(!tree.search(&1));
//!
//! assert!(tree.insert(1));
//! assert!(tree.search(&1));
//!
//! // Inserting the same key again is rejected.
//! assert!(!tree.insert(1));
//!
//! assert!(tree.remove(&1));
//! assert!(!tree.search(&1));
//! ```

use std::cell::Cell;
use std::fmt;
use std::mem;

use crate::compare::Comparer;
use crate::traverse::{self, TreeNode};
use crate::util::{bump, Dir};

type Link<K> = Option<Box<Node<K>>>;

#[derive(Clone)]
struct Node<K> {
    key: K,
    left: Link<K>,
    right: Link<K>,
}

impl<K> Node<K> {
    fn new(key: K) -> Box<Self> {
        Box::new(Node {
            key,
            left: None,
            right: None,
        })
    }

    fn child(&self, dir: Dir) -> &Link<K> {
        match dir {
            Dir::Left => &self.left,
            Dir::Right => &self.right,
        }
    }

    fn child_mut(&mut self, dir: Dir) -> &mut Link<K> {
        match dir {
            Dir::Left => &mut self.left,
            Dir::Right => &mut self.right,
        }
    }

    /// Which way a descent for `key` continues from this node, or `None`
    /// when the keys are equivalent under `cmp`.
    fn direction(&self, key: &K, cmp: &Comparer<K>) -> Option<Dir> {
        if cmp.compare(key, &self.key) {
            Some(Dir::Left)
        } else if cmp.compare(&self.key, key) {
            Some(Dir::Right)
        } else {
            None
        }
    }

    fn search(node: Option<&Self>, key: &K, cmp: &Comparer<K>) -> bool {
        match node {
            None => false,
            Some(node) => match node.direction(key, cmp) {
                Some(dir) => Self::search(node.child(dir).as_deref(), key, cmp),
                None => true,
            },
        }
    }

    fn insert(link: &mut Link<K>, key: K, cmp: &Comparer<K>, mods: &Cell<u64>) -> bool {
        let node = match link {
            Some(node) => node,
            None => {
                *link = Some(Self::new(key));
                bump(mods, 1);
                return true;
            }
        };
        match node.direction(&key, cmp) {
            Some(dir) => Self::insert(node.child_mut(dir), key, cmp, mods),
            None => false,
        }
    }

    fn remove(link: &mut Link<K>, key: &K, cmp: &Comparer<K>, mods: &Cell<u64>) -> bool {
        let dir = match link.as_deref_mut() {
            None => return false,
            Some(node) => node.direction(key, cmp),
        };
        match dir {
            Some(dir) => Self::remove(
                link.as_mut().expect("descent started from a node").child_mut(dir),
                key,
                cmp,
                mods,
            ),
            None => {
                let node = link.as_deref_mut().expect("matched a node at this slot");
                if node.left.is_none() {
                    let node = link.take().expect("matched a node at this slot");
                    *link = node.right;
                    bump(mods, 1);
                    true
                } else if node.right.is_none() {
                    let node = link.take().expect("matched a node at this slot");
                    *link = node.left;
                    bump(mods, 1);
                    true
                } else {
                    // Two children: trade keys with the in-order predecessor
                    // (the maximum of the left subtree) and remove from the
                    // slot that now holds the key. The predecessor has no
                    // right child, so the removal there splices.
                    let (node_key, left) = (&mut node.key, &mut node.left);
                    let heir = Self::max_link(left);
                    mem::swap(
                        node_key,
                        &mut heir.as_mut().expect("max_link lands on a node").key,
                    );
                    bump(mods, 1);
                    Self::remove(heir, key, cmp, mods)
                }
            }
        }
    }

    /// The slot holding the maximum of a non-empty subtree.
    fn max_link(link: &mut Link<K>) -> &mut Link<K> {
        if link.as_ref().map_or(false, |node| node.right.is_some()) {
            Self::max_link(&mut link.as_mut().expect("just observed a node").right)
        } else {
            link
        }
    }
}

impl<K> TreeNode for Node<K> {
    type Key = K;

    fn key(&self) -> &K {
        &self.key
    }
    fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }
    fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }
}

/// An unbalanced binary search tree over keys ordered by a [`Comparer`].
#[derive(Clone)]
pub struct Tree<K> {
    root: Link<K>,
    cmp: Comparer<K>,
    mods: Cell<u64>,
}

impl<K: Ord + 'static> Default for Tree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Tree<K> {
    /// Generates a new, empty tree ordered naturally.
    pub fn new() -> Self
    where
        K: Ord + 'static,
    {
        Self::with_comparer(Comparer::new())
    }

    /// Generates a new, empty tree ordered by the given comparer.
    pub fn with_comparer(cmp: Comparer<K>) -> Self {
        Self {
            root: None,
            cmp,
            mods: Cell::new(0),
        }
    }

    /// The comparer ordering this tree, with its comparison counter.
    pub fn comparer(&self) -> &Comparer<K> {
        &self.cmp
    }

    /// Inserts `key`, returning `true` if it was new. Duplicate keys are
    /// rejected and leave the tree untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::bst::Tree;
    ///
    /// let mut tree = Tree::new();
    /// assert!(tree.insert(2));
    /// assert!(!tree.insert(2));
    /// ```
    pub fn insert(&mut self, key: K) -> bool {
        Node::insert(&mut self.root, key, &self.cmp, &self.mods)
    }

    /// Removes `key`, returning `true` if it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::bst::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(2);
    ///
    /// assert!(tree.remove(&2));
    /// assert!(!tree.remove(&2));
    /// ```
    pub fn remove(&mut self, key: &K) -> bool {
        Node::remove(&mut self.root, key, &self.cmp, &self.mods)
    }

    /// Whether `key` is present. Never mutates the tree.
    pub fn search(&self, key: &K) -> bool {
        Node::search(self.root.as_deref(), key, &self.cmp)
    }

    /// Removes every key by repeatedly removing the root's key through the
    /// ordinary removal path until the tree is empty.
    pub fn clear(&mut self)
    where
        K: Clone,
    {
        while let Some(key) = self.root.as_ref().map(|node| node.key.clone()) {
            self.remove(&key);
        }
    }

    /// The keys in ascending order.
    pub fn inorder(&self) -> Vec<&K> {
        traverse::inorder(self.root.as_deref())
    }

    /// The keys breadth-first, with `None` marking absent child slots.
    pub fn levelorder(&self) -> Vec<Option<&K>> {
        traverse::levelorder(self.root.as_deref())
    }

    /// Cumulative comparisons performed on behalf of this tree.
    pub fn comparisons(&self) -> u64 {
        self.cmp.comparisons()
    }

    /// Cumulative structural edits performed on this tree.
    pub fn modifications(&self) -> u64 {
        self.mods.get()
    }

    /// Validates BST order. Intended as a test oracle, not for normal use.
    pub fn check(&self) -> bool
    where
        K: fmt::Debug,
    {
        traverse::check_order(self.root.as_deref(), &self.cmp.fork())
    }
}


#[cfg(test)]
mod quicktests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::test::quick::Op;

    /// Applies a set of operations to a tree and a `BTreeSet`, checking that
    /// every outcome agrees along the way.
    fn do_ops(ops: &[Op<i8>], tree: &mut Tree<i8>, set: &mut BTreeSet<i8>) -> bool {
        ops.iter().all(|op| match op {
            Op::Insert(k) => tree.insert(*k) == set.insert(*k),
            Op::Remove(k) => tree.remove(k) == set.remove(k),
            Op::Search(k) => tree.search(k) == set.contains(k),
        })
    }

    quickcheck::quickcheck! {
        fn fuzz_matches_btreeset(ops: Vec<Op<i8>>) -> bool {
            let mut tree = Tree::new();
            let mut set = BTreeSet::new();

            do_ops(&ops, &mut tree, &mut set)
                && tree.inorder().into_iter().eq(set.iter())
                && tree.check()
        }
    }
}
