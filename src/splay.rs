//! A splay tree: no per-node metadata and no persistent shape invariant.
//! Every access, search included, splays the target to the root, so
//! recently used keys cluster near the top and repeat lookups get cheap.
//! Individual operations can still be linear; the logarithmic bound is
//! amortized over a sequence, not promised per call.
//!
//! The whole engine hangs off one primitive, [`splay`](Node::splay): a
//! top-down walk that searches and restructures in a single pass, splitting
//! everything it passes into an all-smaller and an all-greater chain and
//! reattaching both under whichever node ends up on top.
//!
//! # Examples
//!
//! ```
//! use ordtree::splay::Tree;
//!
//! let mut tree = Tree::new();
//! for key in [1, 2, 3] {
//!     assert!(tree.insert(key));
//! }
//!
//! // The last touched key sits at the root.
//! assert_eq!(tree.levelorder()[0], Some(&3));
//! tree.search(&1);
//! assert_eq!(tree.levelorder()[0], Some(&1));
//! ```

use std::cell::Cell;
use std::fmt;

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

    /// Top-down splay: brings `key`, or when absent the last node on its
    /// search path (an in-order neighbor), to the root of the subtree at
    /// `link`, and returns whether `key` was found.
    ///
    /// The walk looks two levels ahead. When the next two steps continue in
    /// the same direction and the grandchild is present (zig-zig), the child
    /// is rotated above the current root first; a direction change (zig-zag)
    /// needs no rotation because the two passes around it do the work. Either
    /// way the current root is then pushed onto the chain of keys on its side
    /// of the target and the walk descends. At the end the two chains become
    /// the new root's subtrees.
    fn splay(link: &mut Link<K>, key: &K, cmp: &Comparer<K>, mods: &Cell<u64>) -> bool {
        let mut root = match link.take() {
            Some(root) => root,
            None => return false,
        };
        // Spines of detached nodes: everything in `less` is smaller than
        // `key` (vacant right slots), everything in `greater` is larger
        // (vacant left slots), each in descent order.
        let mut less: Vec<Box<Node<K>>> = Vec::new();
        let mut greater: Vec<Box<Node<K>>> = Vec::new();
        let mut found = false;
        loop {
            let dir = match root.direction(key, cmp) {
                None => {
                    found = true;
                    break;
                }
                Some(dir) => dir,
            };
            if root.child(dir).is_none() {
                break;
            }
            let child_dir = root
                .child(dir)
                .as_deref()
                .expect("just observed a child")
                .direction(key, cmp);
            match child_dir {
                None => found = true,
                Some(child_dir)
                    if child_dir == dir
                        && root
                            .child(dir)
                            .as_deref()
                            .expect("just observed a child")
                            .child(child_dir)
                            .is_some() =>
                {
                    // Zig-zig: rotate the child above the root, then fall
                    // through to the link step below.
                    let mut child = root
                        .child_mut(dir)
                        .take()
                        .expect("just observed a child");
                    *root.child_mut(dir) = child.child_mut(dir.opposite()).take();
                    *child.child_mut(dir.opposite()) = Some(root);
                    root = child;
                    bump(mods, 3);
                }
                Some(_) => {}
            }
            let mut detached = root;
            let next = detached
                .child_mut(dir)
                .take()
                .expect("descent requires a child");
            match dir {
                // Descending left leaves the root and its right subtree
                // greater than the target, and vice versa.
                Dir::Left => greater.push(detached),
                Dir::Right => less.push(detached),
            }
            bump(mods, 2);
            root = next;
        }
        // Reassemble: the final root's own subtrees extend the chains, then
        // the chains become its children.
        let mut left_tree = root.left.take();
        for mut node in less.into_iter().rev() {
            node.right = left_tree;
            left_tree = Some(node);
        }
        let mut right_tree = root.right.take();
        for mut node in greater.into_iter().rev() {
            node.left = right_tree;
            right_tree = Some(node);
        }
        root.left = left_tree;
        root.right = right_tree;
        bump(mods, 2);
        *link = Some(root);
        found
    }

    fn insert(link: &mut Link<K>, key: K, cmp: &Comparer<K>, mods: &Cell<u64>) -> bool {
        if link.is_none() {
            *link = Some(Self::new(key));
            bump(mods, 1);
            return true;
        }
        if Self::splay(link, &key, cmp, mods) {
            return false;
        }
        // The splayed root is now an in-order neighbor of `key`: the new
        // node takes the root's subtree on the key's side, and the root
        // itself becomes the other child.
        let mut root = link.take().expect("splay leaves a root");
        let dir = root
            .direction(&key, cmp)
            .expect("key was not found, so it orders to one side");
        let mut node = Self::new(key);
        *node.child_mut(dir) = root.child_mut(dir).take();
        *node.child_mut(dir.opposite()) = Some(root);
        *link = Some(node);
        bump(mods, 3);
        true
    }

    fn remove(link: &mut Link<K>, key: &K, cmp: &Comparer<K>, mods: &Cell<u64>) -> bool {
        if !Self::splay(link, key, cmp, mods) {
            return false;
        }
        let mut root = link.take().expect("splay found the key at the root");
        if root.left.is_some() {
            // Splaying the left subtree by the removed key brings its
            // maximum (the predecessor) to its top with a vacant right
            // slot, where the old right subtree reattaches.
            Self::splay(&mut root.left, key, cmp, mods);
            let mut left = root.left.take().expect("subtree was non-empty");
            left.right = root.right.take();
            bump(mods, 2);
            *link = Some(left);
        } else {
            *link = root.right.take();
            bump(mods, 1);
        }
        true
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

/// A splay tree over keys ordered by a [`Comparer`].
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

    /// Inserts `key`, returning `true` if it was new. Either way the key (or
    /// its neighbor, for duplicates) ends up at the root.
    pub fn insert(&mut self, key: K) -> bool {
        Node::insert(&mut self.root, key, &self.cmp, &self.mods)
    }

    /// Removes `key`, returning `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        Node::remove(&mut self.root, key, &self.cmp, &self.mods)
    }

    /// Whether `key` is present. Takes `&mut self`: the search splays, so
    /// even a miss reshapes the tree.
    pub fn search(&mut self, key: &K) -> bool {
        Node::splay(&mut self.root, key, &self.cmp, &self.mods)
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

        fn fuzz_search_splays_present_keys_to_the_root(keys: Vec<i8>, probe: i8) -> bool {
            let mut tree = Tree::new();
            for key in &keys {
                tree.insert(*key);
            }
            if !tree.search(&probe) {
                return true;
            }
            tree.levelorder().first() == Some(&Some(&probe))
        }
    }
}
