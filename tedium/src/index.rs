//! Postorder indexing for Zhang–Shasha.
//!
//! Every algorithm in this crate works on the postorder numbering of a tree
//! (or forest). [`TreeIndex`] computes, in one traversal, the four arrays the
//! distance engine needs:
//!
//! - `postorder`: labels in postorder, left subtrees first, root last
//! - `leftmost`: `l(i)`, the postorder number of the leftmost leaf under `i`
//! - `keyroots`: roots and every node with a left sibling, ascending
//! - `parents`: postorder number of each node's parent, `None` for roots

use core::ops::Range;

use crate::trace;
use crate::tree::{Forest, Tree};

/// Postorder arrays for a tree or forest, borrowing its labels.
#[derive(Debug, Clone)]
pub struct TreeIndex<'a, T> {
    postorder: Vec<&'a T>,
    leftmost: Vec<usize>,
    keyroots: Vec<usize>,
    parents: Vec<Option<usize>>,
}

/// A node waiting on the traversal stack.
struct Visit<'a, T> {
    node: &'a Tree<T>,
    /// Traversal slot of the parent, `None` for forest roots.
    parent: Option<usize>,
    first_child: bool,
}

impl<'a, T> TreeIndex<'a, T> {
    /// Index a single tree.
    pub fn of_tree(tree: &'a Tree<T>) -> Self {
        Self::from_trees(core::slice::from_ref(tree))
    }

    /// Index a forest. Trees are numbered left to right, so the first tree
    /// occupies postorder `0..len(first)`.
    pub fn build(forest: &'a Forest<T>) -> Self {
        Self::from_trees(forest.trees())
    }

    fn from_trees(trees: &'a [Tree<T>]) -> Self {
        // Popping the stack yields nodes in reverse postorder. Each popped node
        // gets the next traversal slot; slots identify nodes physically, so
        // subtrees with equal labels never alias each other.
        let mut stack: Vec<Visit<'a, T>> = trees
            .iter()
            .map(|node| Visit {
                node,
                parent: None,
                first_child: false,
            })
            .collect();

        let mut labels: Vec<&'a T> = Vec::new();
        let mut parent_slot: Vec<Option<usize>> = Vec::new();
        let mut is_keyroot: Vec<bool> = Vec::new();
        let mut first_child_slot: Vec<Option<usize>> = Vec::new();

        while let Some(visit) = stack.pop() {
            let slot = labels.len();
            labels.push(visit.node.label());
            parent_slot.push(visit.parent);
            is_keyroot.push(visit.parent.is_none() || !visit.first_child);
            first_child_slot.push(None);

            if visit.first_child
                && let Some(parent) = visit.parent
            {
                first_child_slot[parent] = Some(slot);
            }

            stack.extend(
                visit
                    .node
                    .children()
                    .iter()
                    .enumerate()
                    .map(|(position, node)| Visit {
                        node,
                        parent: Some(slot),
                        first_child: position == 0,
                    }),
            );
        }

        let n = labels.len();
        let to_postorder = |slot: usize| n - 1 - slot;

        let postorder: Vec<&'a T> = labels.iter().rev().copied().collect();
        let parents: Vec<Option<usize>> = parent_slot
            .iter()
            .rev()
            .map(|parent| parent.map(to_postorder))
            .collect();

        let mut leftmost = Vec::with_capacity(n);
        for i in 0..n {
            let l = match first_child_slot[to_postorder(i)] {
                // The first child precedes its parent in postorder, so its
                // entry is already filled in.
                Some(child) => leftmost[to_postorder(child)],
                None => i,
            };
            leftmost.push(l);
        }

        let keyroots: Vec<usize> = (0..n).filter(|&i| is_keyroot[to_postorder(i)]).collect();

        trace!(nodes = n, keyroots = keyroots.len(), "indexed forest");

        Self {
            postorder,
            leftmost,
            keyroots,
            parents,
        }
    }

    /// Number of indexed nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.postorder.len()
    }

    /// Whether nothing was indexed (the empty forest).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.postorder.is_empty()
    }

    /// Labels in postorder.
    #[inline]
    pub fn postorder(&self) -> &[&'a T] {
        &self.postorder
    }

    /// `l(i)` for every postorder position `i`.
    #[inline]
    pub fn leftmost(&self) -> &[usize] {
        &self.leftmost
    }

    /// Keyroot positions, ascending.
    #[inline]
    pub fn keyroots(&self) -> &[usize] {
        &self.keyroots
    }

    /// Parent position of every node; `None` marks a root.
    #[inline]
    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }

    /// Label at postorder position `i`.
    #[inline]
    pub fn label(&self, i: usize) -> &'a T {
        self.postorder[i]
    }

    /// Postorder positions covered by the subtree rooted at `i`.
    #[inline]
    pub fn subtree(&self, i: usize) -> Range<usize> {
        self.leftmost[i]..i + 1
    }

    /// Postorder positions of the forest's roots, left to right.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.parents
            .iter()
            .enumerate()
            .filter(|(_, parent)| parent.is_none())
            .map(|(i, _)| i)
    }
}

/// Labels of `tree` in postorder.
pub fn postorder<T>(tree: &Tree<T>) -> Vec<&T> {
    TreeIndex::of_tree(tree).postorder
}

/// `l(i)` for every postorder position of `tree`.
pub fn leftmost<T>(tree: &Tree<T>) -> Vec<usize> {
    TreeIndex::of_tree(tree).leftmost
}

/// Keyroot positions of `tree`, ascending.
pub fn keyroots<T>(tree: &Tree<T>) -> Vec<usize> {
    TreeIndex::of_tree(tree).keyroots
}

/// Parent position of every node of `tree`, `None` for the root.
pub fn parents<T>(tree: &Tree<T>) -> Vec<Option<usize>> {
    TreeIndex::of_tree(tree).parents
}
