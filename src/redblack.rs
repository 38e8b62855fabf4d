//! A red-black tree: the balanced variant. Every node carries a color, and
//! two rules keep the height logarithmic: a red node never has a red child,
//! and every path from a node down to an absent slot passes the same number
//! of black nodes. Absent slots count as black.
//!
//! Insertion fixes violations on the way back up with recolors and single or
//! double rotations; deletion propagates a "one black short" deficiency
//! upward until a recolor or rotation absorbs it. [`Tree::check`] validates
//! the whole invariant and is the oracle every test leans on.
//!
//! # Examples
//!
//! ```
//! use ordtree::redblack::Tree;
//!
//! let mut tree = Tree::new();
//! for key in [10, 20, 5] {
//!     assert!(tree.insert(key));
//! }
//! assert_eq!(tree.inorder(), vec![&5, &10, &20]);
//! assert!(tree.check());
//!
//! assert!(tree.remove(&10));
//! assert!(!tree.search(&10));
//! assert!(tree.check());
//! ```

use std::cell::Cell;
use std::fmt;
use std::mem;

use crate::compare::Comparer;
use crate::traverse::{self, TreeNode};
use crate::util::{bump, Dir};

type Link<K> = Option<Box<Node<K>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

/// Outcome of a removal step, threaded back up the descent.
enum Removal {
    /// The key wasn't found so nothing was removed.
    NotFound,
    /// The key was removed and black heights are already restored.
    Balanced,
    /// The key was removed but this subtree is one black node short; the
    /// caller must rebalance around it.
    Short,
}

fn is_red<K>(link: &Link<K>) -> bool {
    link.as_ref().map_or(false, |node| node.color == Color::Red)
}

#[derive(Clone)]
struct Node<K> {
    key: K,
    color: Color,
    left: Link<K>,
    right: Link<K>,
}

impl<K> Node<K> {
    /// New nodes start red: that never changes a black height, so only
    /// red-red adjacency can need fixing afterward.
    fn new(key: K) -> Box<Self> {
        Box::new(Node {
            key,
            color: Color::Red,
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

    /// Lifts the child opposite `dir` into this slot; the old subtree root
    /// moves down on the `dir` side. Three ownership moves, no aliasing.
    fn rotate(link: &mut Link<K>, dir: Dir, mods: &Cell<u64>) {
        let mut root = link.take().expect("rotation requires a subtree root");
        let mut lifted = root
            .child_mut(dir.opposite())
            .take()
            .expect("rotation requires a child to lift");
        *root.child_mut(dir.opposite()) = lifted.child_mut(dir).take();
        *lifted.child_mut(dir) = Some(root);
        *link = Some(lifted);
        bump(mods, 3);
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
        let dir = match link.as_deref_mut() {
            None => {
                *link = Some(Self::new(key));
                bump(mods, 1);
                return true;
            }
            Some(node) => match node.direction(&key, cmp) {
                None => return false,
                Some(dir) => dir,
            },
        };
        let inserted = Self::insert(
            link.as_mut().expect("descent started from a node").child_mut(dir),
            key,
            cmp,
            mods,
        );
        if inserted {
            Self::insert_fix(link, dir, mods);
        }
        inserted
    }

    /// Repairs red-red adjacency after an insert below the `dir` child of
    /// the node at `link`. Runs at every ancestor on the unwind; a rotation
    /// case leaves a black subtree root, which stops anything firing above.
    fn insert_fix(link: &mut Link<K>, dir: Dir, mods: &Cell<u64>) {
        let node = link.as_deref_mut().expect("fixup runs below a node");
        if !is_red(node.child(dir)) {
            return;
        }
        if is_red(node.child(dir.opposite())) {
            // Both children red: push the blackness down one level and let
            // the callers above keep fixing.
            node.color = Color::Red;
            node.left.as_mut().expect("observed red").color = Color::Black;
            node.right.as_mut().expect("observed red").color = Color::Black;
            bump(mods, 3);
            return;
        }
        let same = is_red(
            node.child(dir)
                .as_deref()
                .expect("observed red")
                .child(dir),
        );
        let zigzag = is_red(
            node.child(dir)
                .as_deref()
                .expect("observed red")
                .child(dir.opposite()),
        );
        if same {
            // Red child and red grandchild in a straight line: one rotation.
            node.color = Color::Red;
            node.child_mut(dir).as_mut().expect("observed red").color = Color::Black;
            bump(mods, 2);
            Self::rotate(link, dir.opposite(), mods);
        } else if zigzag {
            // Bent line: lift the grandchild twice.
            node.color = Color::Red;
            node.child_mut(dir)
                .as_mut()
                .expect("observed red")
                .child_mut(dir.opposite())
                .as_mut()
                .expect("observed red grandchild")
                .color = Color::Black;
            bump(mods, 2);
            Self::rotate(node.child_mut(dir), dir, mods);
            Self::rotate(link, dir.opposite(), mods);
        }
    }

    fn remove(link: &mut Link<K>, key: &K, cmp: &Comparer<K>, mods: &Cell<u64>) -> Removal {
        let dir = {
            let node = match link.as_deref_mut() {
                None => return Removal::NotFound,
                Some(node) => node,
            };
            match node.direction(key, cmp) {
                Some(dir) => dir,
                None => {
                    if node.left.is_some() && node.right.is_some() {
                        // Two children: trade keys with the in-order
                        // predecessor and keep removing in the left subtree,
                        // where the key now sits at a node with at most a
                        // left child.
                        let (node_key, left) = (&mut node.key, &mut node.left);
                        let heir = Self::max_link(left);
                        mem::swap(
                            node_key,
                            &mut heir.as_mut().expect("max_link lands on a node").key,
                        );
                        bump(mods, 1);
                        Dir::Left
                    } else {
                        return Self::splice(link, mods);
                    }
                }
            }
        };
        let removal = Self::remove(
            link.as_mut().expect("descent started from a node").child_mut(dir),
            key,
            cmp,
            mods,
        );
        match removal {
            Removal::Short => Self::remove_fix(link, dir, mods),
            other => other,
        }
    }

    /// Removes a node with at most one child by moving that child into its
    /// slot. Red nodes (and red replacements, recolored black) absorb the
    /// deficiency on the spot; a black node with a black replacement leaves
    /// the subtree one short.
    fn splice(link: &mut Link<K>, mods: &Cell<u64>) -> Removal {
        let node = link.take().expect("splice removes a node");
        let Node { color, left, right, .. } = *node;
        let mut replacement = left.or(right);
        bump(mods, 1);
        if color == Color::Red {
            *link = replacement;
            return Removal::Balanced;
        }
        if is_red(&replacement) {
            replacement.as_mut().expect("observed red").color = Color::Black;
            bump(mods, 1);
            *link = replacement;
            return Removal::Balanced;
        }
        *link = replacement;
        Removal::Short
    }

    /// Rebalances the node at `link` whose `dir` subtree is one black node
    /// short, case-split on the sibling's color.
    fn remove_fix(link: &mut Link<K>, dir: Dir, mods: &Cell<u64>) -> Removal {
        let red_sibling = {
            let node = link.as_deref().expect("fixup runs below a node");
            is_red(node.child(dir.opposite()))
        };
        if red_sibling {
            // Rotate the red sibling above this node. The deficient subtree
            // keeps its (black) parent, which is now red, so the black-
            // sibling cases below are guaranteed to finish.
            {
                let node = link.as_deref_mut().expect("fixup runs below a node");
                node.color = Color::Red;
                node.child_mut(dir.opposite())
                    .as_mut()
                    .expect("observed red")
                    .color = Color::Black;
                bump(mods, 2);
            }
            Self::rotate(link, dir, mods);
            let inner = link
                .as_mut()
                .expect("rotation leaves a root")
                .child_mut(dir);
            let removal = Self::fix_black_sibling(inner, dir, mods);
            debug_assert!(matches!(removal, Removal::Balanced));
            Removal::Balanced
        } else {
            Self::fix_black_sibling(link, dir, mods)
        }
    }

    /// The black-sibling half of the removal fixup: recolor when the sibling
    /// has no red child (propagating unless the parent was red), otherwise
    /// restore the black height with a single or double rotation and stop.
    fn fix_black_sibling(link: &mut Link<K>, dir: Dir, mods: &Cell<u64>) -> Removal {
        let node = link.as_deref_mut().expect("fixup runs below a node");
        let sibling = match node.child(dir.opposite()).as_deref() {
            // No sibling to borrow from; leave the deficiency to the caller.
            None => return Removal::Short,
            Some(sibling) => sibling,
        };
        let sibling_has_red = is_red(&sibling.left) || is_red(&sibling.right);
        if !sibling_has_red {
            let parent_was_red = node.color == Color::Red;
            node.color = Color::Black;
            node.child_mut(dir.opposite())
                .as_mut()
                .expect("sibling observed above")
                .color = Color::Red;
            bump(mods, 2);
            if parent_was_red {
                Removal::Balanced
            } else {
                Removal::Short
            }
        } else {
            let parent_color = node.color;
            let outer_red = is_red(
                node.child(dir.opposite())
                    .as_deref()
                    .expect("sibling observed above")
                    .child(dir.opposite()),
            );
            if outer_red {
                Self::rotate(link, dir, mods);
            } else {
                Self::rotate(node.child_mut(dir.opposite()), dir.opposite(), mods);
                Self::rotate(link, dir, mods);
            }
            // The lifted node takes the old parent's color; its children go
            // black, restoring the missing black on the `dir` side.
            let new_root = link.as_deref_mut().expect("rotation leaves a root");
            new_root.color = parent_color;
            if let Some(left) = new_root.left.as_mut() {
                left.color = Color::Black;
            }
            if let Some(right) = new_root.right.as_mut() {
                right.color = Color::Black;
            }
            bump(mods, 3);
            Removal::Balanced
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

    /// Black height of the subtree (absent slots count one), or `None` on a
    /// red-red adjacency or a height mismatch.
    fn black_height(node: Option<&Self>) -> Option<u64>
    where
        K: fmt::Debug,
    {
        let node = match node {
            None => return Some(1),
            Some(node) => node,
        };
        if node.color == Color::Red && (is_red(&node.left) || is_red(&node.right)) {
            log::error!("red-red adjacency at {:?}", node.key);
            return None;
        }
        let left = Self::black_height(node.left.as_deref())?;
        let right = Self::black_height(node.right.as_deref())?;
        if left != right {
            log::error!(
                "black-height mismatch at {:?}: left {} vs right {}",
                node.key,
                left,
                right
            );
            return None;
        }
        Some(left + (node.color == Color::Black) as u64)
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

/// A red-black tree over keys ordered by a [`Comparer`].
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
    /// rejected and leave the tree untouched; fixups only run for keys that
    /// actually went in.
    pub fn insert(&mut self, key: K) -> bool {
        let inserted = Node::insert(&mut self.root, key, &self.cmp, &self.mods);
        self.blacken_root();
        inserted
    }

    /// Removes `key`, returning `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        let removal = Node::remove(&mut self.root, key, &self.cmp, &self.mods);
        self.blacken_root();
        !matches!(removal, Removal::NotFound)
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

    /// Validates the full invariant: BST order, a black root, no red-red
    /// adjacency, and a uniform black height on every path. Intended as a
    /// test oracle, not for normal use.
    pub fn check(&self) -> bool
    where
        K: fmt::Debug,
    {
        if is_red(&self.root) {
            log::error!("root is red");
            return false;
        }
        traverse::check_order(self.root.as_deref(), &self.cmp.fork())
            && Node::black_height(self.root.as_deref()).is_some()
    }

    fn blacken_root(&mut self) {
        if let Some(root) = self.root.as_mut() {
            if root.color != Color::Black {
                root.color = Color::Black;
                bump(&self.mods, 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(keys: &[i32]) -> Tree<i32> {
        let mut tree = Tree::new();
        for &key in keys {
            assert!(tree.insert(key));
            assert!(tree.check());
        }
        tree
    }

    #[test]
    fn empty_tree_is_a_safe_no_op() {
        let mut tree: Tree<i32> = Tree::new();
        assert!(!tree.search(&1));
        assert!(!tree.remove(&1));
        assert!(tree.check());
        assert!(tree.inorder().is_empty());
    }

    #[test]
    fn three_keys_balance_with_a_black_root() {
        let tree = tree_of(&[10, 20, 5]);
        assert_eq!(tree.inorder(), vec![&5, &10, &20]);
        assert_eq!(tree.levelorder(), vec![Some(&10), Some(&5), Some(&20)]);
    }

    #[test]
    fn sorted_insertions_stay_balanced() {
        let tree = tree_of(&(1..=64).collect::<Vec<_>>());
        // A chain of 64 would be 64 levels deep; balanced it fits well under
        // 2 * log2(65) + 1 = 13 emitted levels.
        let levels = (tree.levelorder().len() + 1).trailing_zeros();
        assert!(levels <= 13, "tree is {} levels deep", levels);
        assert_eq!(tree.inorder(), (1..=64).collect::<Vec<_>>().iter().collect::<Vec<_>>());
    }

    #[test]
    fn duplicate_insert_changes_nothing() {
        let mut tree = tree_of(&[10, 20, 5]);
        let mods = tree.modifications();
        let shape: Vec<_> = tree.levelorder().into_iter().map(|k| k.copied()).collect();

        assert!(!tree.insert(20));
        assert_eq!(tree.modifications(), mods);
        assert_eq!(
            tree.levelorder().into_iter().map(|k| k.copied()).collect::<Vec<_>>(),
            shape
        );
    }

    #[test]
    fn remove_keeps_the_invariant() {
        let mut tree = tree_of(&[10, 20, 5]);
        assert!(tree.remove(&10));
        assert!(!tree.search(&10));
        assert!(tree.check());
        assert_eq!(tree.inorder(), vec![&5, &20]);
    }

    #[test]
    fn remove_every_key_in_every_order_of_a_small_tree() {
        let keys = [5, 3, 8, 1, 4, 7, 9];
        // Remove in insertion order, reverse order, and ascending order.
        for order in [
            keys.to_vec(),
            keys.iter().rev().copied().collect::<Vec<_>>(),
            {
                let mut sorted = keys.to_vec();
                sorted.sort_unstable();
                sorted
            },
        ] {
            let mut tree = tree_of(&keys);
            for key in &order {
                assert!(tree.remove(key), "removing {}", key);
                assert!(tree.check(), "after removing {}", key);
            }
            assert!(tree.inorder().is_empty());
        }
    }

    #[test]
    fn remove_missing_key_reports_false() {
        let mut tree = tree_of(&[10, 20, 5]);
        assert!(!tree.remove(&15));
        assert!(tree.check());
        assert_eq!(tree.inorder(), vec![&5, &10, &20]);
    }

    #[test]
    fn interleaved_inserts_and_removes_hold_the_invariant() {
        let mut tree = Tree::new();
        for round in 0..4 {
            for key in 0..32 {
                tree.insert(key * 4 + round);
                assert!(tree.check());
            }
            for key in (0..32).step_by(3) {
                tree.remove(&(key * 4 + round));
                assert!(tree.check());
            }
        }
    }

    #[test]
    fn clear_empties_through_remove() {
        let mut tree = tree_of(&[5, 3, 8, 1, 4, 7, 9]);
        tree.clear();
        assert!(tree.inorder().is_empty());
        assert!(tree.check());
    }

    #[test]
    fn check_rejects_a_cooked_tree() {
        // Hand-build a red root with a red child.
        let mut red_red: Tree<i32> = Tree::new();
        red_red.root = Some(Box::new(Node {
            key: 2,
            color: Color::Red,
            left: Some(Node::new(1)),
            right: None,
        }));
        assert!(!red_red.check());

        // Black root, but the left path carries an extra black node.
        let mut lopsided: Tree<i32> = Tree::new();
        lopsided.root = Some(Box::new(Node {
            key: 2,
            color: Color::Black,
            left: Some(Box::new(Node {
                key: 1,
                color: Color::Black,
                left: None,
                right: None,
            })),
            right: None,
        }));
        assert!(!lopsided.check());
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
        fn fuzz_matches_btreeset_and_stays_valid(ops: Vec<Op<i8>>) -> bool {
            let mut tree = Tree::new();
            let mut set = BTreeSet::new();

            do_ops(&ops, &mut tree, &mut set)
                && tree.inorder().into_iter().eq(set.iter())
                && tree.check()
        }

        fn fuzz_check_after_every_op(ops: Vec<Op<i8>>) -> bool {
            let mut tree = Tree::new();
            ops.iter().all(|op| {
                match op {
                    Op::Insert(k) => {
                        tree.insert(*k);
                    }
                    Op::Remove(k) => {
                        tree.remove(k);
                    }
                    Op::Search(k) => {
                        tree.search(k);
                    }
                }
                tree.check()
            })
        }
    }
}
