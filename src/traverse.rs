//! In-order and level-order producers shared by the tree variants, plus the
//! BST-order checker backing each variant's `check`.

use std::fmt;

use crate::compare::Comparer;

/// Crate-internal view of a tree node, letting the traversal helpers walk
/// any variant without caring about its metadata.
pub(crate) trait TreeNode: Sized {
    /// The key type stored in the node.
    type Key;

    fn key(&self) -> &Self::Key;
    fn left(&self) -> Option<&Self>;
    fn right(&self) -> Option<&Self>;
}

/// Collects the keys of the subtree under `root` in ascending order.
pub(crate) fn inorder<N: TreeNode>(root: Option<&N>) -> Vec<&N::Key> {
    let mut out = Vec::new();
    collect(root, &mut out);
    out
}

fn collect<'a, N: TreeNode>(node: Option<&'a N>, out: &mut Vec<&'a N::Key>) {
    if let Some(node) = node {
        collect(node.left(), out);
        out.push(node.key());
        collect(node.right(), out);
    }
}

/// Collects the keys of the subtree under `root` breadth-first, with `None`
/// marking each absent slot. Absent slots propagate two absent children so
/// positions stay aligned; the walk stops after the first level with nothing
/// present below it, which keeps the output bounded for sparse trees.
pub(crate) fn levelorder<N: TreeNode>(root: Option<&N>) -> Vec<Option<&N::Key>> {
    let mut out = Vec::new();
    let mut level: Vec<Option<&N>> = vec![root];
    loop {
        let mut next = Vec::with_capacity(level.len() * 2);
        for slot in level {
            out.push(slot.map(N::key));
            match slot {
                Some(node) => {
                    next.push(node.left());
                    next.push(node.right());
                }
                None => {
                    next.push(None);
                    next.push(None);
                }
            }
        }
        if next.iter().all(Option::is_none) {
            break;
        }
        level = next;
    }
    out
}

/// Checks that an in-order walk of the subtree ascends strictly under `cmp`.
/// Callers pass a forked comparer so validation stays out of the statistics.
pub(crate) fn check_order<N>(root: Option<&N>, cmp: &Comparer<N::Key>) -> bool
where
    N: TreeNode,
    N::Key: fmt::Debug,
{
    let keys = inorder(root);
    for pair in keys.windows(2) {
        if !cmp.compare(pair[0], pair[1]) {
            log::error!("order violation: {:?} does not precede {:?}", pair[0], pair[1]);
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain {
        key: i32,
        left: Option<Box<Plain>>,
        right: Option<Box<Plain>>,
    }

    impl Plain {
        fn leaf(key: i32) -> Option<Box<Plain>> {
            Some(Box::new(Plain {
                key,
                left: None,
                right: None,
            }))
        }
    }

    impl TreeNode for Plain {
        type Key = i32;

        fn key(&self) -> &i32 {
            &self.key
        }
        fn left(&self) -> Option<&Self> {
            self.left.as_deref()
        }
        fn right(&self) -> Option<&Self> {
            self.right.as_deref()
        }
    }

    #[test]
    fn inorder_is_left_root_right() {
        let root = Plain {
            key: 2,
            left: Plain::leaf(1),
            right: Plain::leaf(3),
        };
        assert_eq!(inorder(Some(&root)), vec![&1, &2, &3]);
    }

    #[test]
    fn levelorder_marks_gaps_and_stops() {
        // 1 with only a right child: the second level is [gap, 2] and the
        // third level is all gaps, so the walk stops after emitting level two.
        let root = Plain {
            key: 1,
            left: None,
            right: Plain::leaf(2),
        };
        assert_eq!(
            levelorder(Some(&root)),
            vec![Some(&1), None, Some(&2)]
        );
    }

    #[test]
    fn levelorder_of_nothing_is_one_gap() {
        assert_eq!(levelorder::<Plain>(None), vec![None]);
    }

    #[test]
    fn check_order_spots_a_violation() {
        let root = Plain {
            key: 1,
            left: Plain::leaf(5),
            right: None,
        };
        assert!(!check_order(Some(&root), &Comparer::new()));
        assert!(check_order(Some(&root), &Comparer::with(|a: &i32, b: &i32| b < a)));
    }
}
