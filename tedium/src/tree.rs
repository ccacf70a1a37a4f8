//! Ordered, labeled trees and forests.
//!
//! Trees are plain values: a label and an ordered list of owned child trees.
//! Nothing here carries parent pointers; positional data (postorder numbers,
//! parents, leftmost leaves) is derived separately by [`crate::TreeIndex`].

use indextree::{Arena, NodeId};

/// An ordered rooted tree with labels of type `T`.
///
/// Equality and hashing are structural: two trees are equal when their labels
/// are equal and their children are pairwise equal, in order.
///
/// ```
/// use tedium::Tree;
///
/// // f(d(a, c(b)), e)
/// let tree = Tree::new(
///     "f",
///     [
///         Tree::new("d", [Tree::leaf("a"), Tree::new("c", [Tree::leaf("b")])]),
///         Tree::leaf("e"),
///     ],
/// );
/// assert_eq!(tree.node_count(), 6);
/// assert_eq!(*tree.label(), "f");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tree<T> {
    label: T,
    children: Vec<Tree<T>>,
}

impl<T> Tree<T> {
    /// Build a tree from a root label and its children, left to right.
    pub fn new(label: T, children: impl IntoIterator<Item = Tree<T>>) -> Self {
        Self {
            label,
            children: children.into_iter().collect(),
        }
    }

    /// Build a single-node tree.
    pub fn leaf(label: T) -> Self {
        Self {
            label,
            children: Vec::new(),
        }
    }

    /// The root label.
    #[inline]
    pub fn label(&self) -> &T {
        &self.label
    }

    /// The child subtrees, left to right.
    #[inline]
    pub fn children(&self) -> &[Tree<T>] {
        &self.children
    }

    /// Whether this tree has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in the tree. Always at least one; the empty case is
    /// an empty [`Forest`].
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Split the tree into its root label and children.
    pub fn into_parts(self) -> (T, Vec<Tree<T>>) {
        (self.label, self.children)
    }

    /// Relabel every node with `f`, keeping the shape.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Tree<U> {
        self.map_inner(&mut f)
    }

    fn map_inner<U>(&self, f: &mut impl FnMut(&T) -> U) -> Tree<U> {
        Tree {
            label: f(&self.label),
            children: self.children.iter().map(|c| c.map_inner(f)).collect(),
        }
    }

    /// Copy the subtree rooted at `root` out of an `indextree` arena.
    ///
    /// Children keep the arena's sibling order.
    pub fn from_arena(arena: &Arena<T>, root: NodeId) -> Self
    where
        T: Clone,
    {
        let children = root
            .children(arena)
            .map(|child| Tree::from_arena(arena, child))
            .collect();
        Self {
            label: arena[root].get().clone(),
            children,
        }
    }
}

/// An ordered sequence of sibling trees, possibly empty.
///
/// The empty forest is how the "no tree at all" side of a comparison is
/// spelled; it is distinct from any single-node tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Forest<T> {
    trees: Vec<Tree<T>>,
}

impl<T> Default for Forest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Forest<T> {
    /// The empty forest.
    pub fn new() -> Self {
        Self { trees: Vec::new() }
    }

    /// Alias for [`Forest::new`], reads better at call sites comparing
    /// against nothing.
    pub fn empty() -> Self {
        Self::new()
    }

    /// The member trees, left to right.
    #[inline]
    pub fn trees(&self) -> &[Tree<T>] {
        &self.trees
    }

    /// Number of trees in the forest.
    #[inline]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Whether the forest holds no trees.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Total number of nodes across all trees.
    pub fn node_count(&self) -> usize {
        self.trees.iter().map(Tree::node_count).sum()
    }

    /// Append a tree on the right.
    pub fn push(&mut self, tree: Tree<T>) {
        self.trees.push(tree);
    }
}

impl<T> From<Tree<T>> for Forest<T> {
    fn from(tree: Tree<T>) -> Self {
        Self { trees: vec![tree] }
    }
}

impl<T> From<Vec<Tree<T>>> for Forest<T> {
    fn from(trees: Vec<Tree<T>>) -> Self {
        Self { trees }
    }
}

impl<T> FromIterator<Tree<T>> for Forest<T> {
    fn from_iter<I: IntoIterator<Item = Tree<T>>>(iter: I) -> Self {
        Self {
            trees: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for Forest<T> {
    type Item = Tree<T>;
    type IntoIter = std::vec::IntoIter<Tree<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.trees.into_iter()
    }
}
