//! Edit script reconstruction.
//!
//! Runs the same dynamic program as [`crate::tree_distance`] while recording,
//! for every table cell, the step that produced it as a link to the
//! predecessor cell's path. When a cell turns out to be a finished
//! subtree-to-subtree distance, its path is kept; later passes that reuse
//! that distance splice the kept script in by reference instead of
//! recomputing it.
//!
//! Paths are expanded into [`EditOp`]s once, at the very end.

use core::fmt;
use std::rc::Rc;

use crate::cost::CostModel;
use crate::distance::{Engine, Finish, Recorder, Step};
use crate::index::TreeIndex;
use crate::tree::{Forest, Tree};
use crate::{debug, trace};

/// One elementary edit, borrowing labels from the input trees.
///
/// Positions are postorder numbers: `node` in the first tree for deletes and
/// relabels, `node` and `parent` in the second tree for inserts.
#[derive(PartialEq, Eq, Hash)]
pub enum EditOp<'a, T> {
    /// Remove a node of the first tree; its children move up to its parent.
    Delete {
        /// Label of the removed node
        label: &'a T,
        /// Postorder position in the first tree
        node: usize,
    },

    /// Add a node of the second tree.
    Insert {
        /// Label of the new node
        label: &'a T,
        /// Postorder position in the second tree
        node: usize,
        /// Postorder position of its parent in the second tree, `None` when
        /// the inserted node is a root
        parent: Option<usize>,
    },

    /// Map a node of the first tree onto a node of the second tree. Emitted
    /// for every kept node, including ones whose label does not change.
    Relabel {
        /// Label in the first tree
        from: &'a T,
        /// Label in the second tree
        to: &'a T,
        /// Postorder position in the first tree
        node: usize,
        /// Postorder position in the second tree
        target: usize,
    },
}

impl<T> Clone for EditOp<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EditOp<'_, T> {}

impl<'a, T> EditOp<'a, T> {
    /// The first-tree side of the edit, `None` for inserts.
    pub fn old_label(&self) -> Option<&'a T> {
        match *self {
            EditOp::Delete { label, .. } => Some(label),
            EditOp::Insert { .. } => None,
            EditOp::Relabel { from, .. } => Some(from),
        }
    }

    /// The second-tree side of the edit, `None` for deletes.
    pub fn new_label(&self) -> Option<&'a T> {
        match *self {
            EditOp::Delete { .. } => None,
            EditOp::Insert { label, .. } => Some(label),
            EditOp::Relabel { to, .. } => Some(to),
        }
    }

    /// Cost of this edit under `cost`.
    pub fn cost<C: CostModel<T>>(&self, cost: &C) -> f64 {
        match *self {
            EditOp::Delete { label, .. } => cost.delete(label),
            EditOp::Insert { label, .. } => cost.insert(label),
            EditOp::Relabel { from, to, .. } => cost.relabel(from, to),
        }
    }

    /// Whether this is a relabel to an equal label.
    pub fn is_identity(&self) -> bool
    where
        T: PartialEq,
    {
        matches!(self, EditOp::Relabel { from, to, .. } if from == to)
    }
}

impl<T: fmt::Display> fmt::Display for EditOp<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOp::Delete { label, node } => write!(f, "Delete({label} @{node})"),
            EditOp::Insert {
                label,
                node,
                parent: Some(parent),
            } => write!(f, "Insert({label} @{node} under {parent})"),
            EditOp::Insert {
                label,
                node,
                parent: None,
            } => write!(f, "Insert({label} @{node} as root)"),
            EditOp::Relabel {
                from,
                to,
                node,
                target,
            } => write!(f, "Relabel({from} @{node} → {to} @{target})"),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for EditOp<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOp::Delete { label, node } => write!(f, "Delete({label:?} @{node})"),
            EditOp::Insert {
                label,
                node,
                parent,
            } => write!(f, "Insert({label:?} @{node} under {parent:?})"),
            EditOp::Relabel {
                from,
                to,
                node,
                target,
            } => write!(f, "Relabel({from:?} @{node} → {to:?} @{target})"),
        }
    }
}

/// The optimal distance together with a sequence of edits realizing it.
#[derive(Debug, Clone, PartialEq)]
pub struct EditScript<'a, T> {
    /// Total cost, equal to [`crate::tree_distance`] on the same inputs.
    pub distance: f64,
    /// Edits ordered left to right in postorder.
    pub ops: Vec<EditOp<'a, T>>,
}

impl<'a, T> EditScript<'a, T> {
    /// Re-sum the ops under `cost`. With the cost model that produced the
    /// script this equals [`EditScript::distance`].
    pub fn cost_of<C: CostModel<T>>(&self, cost: &C) -> f64 {
        self.ops.iter().map(|op| op.cost(cost)).sum()
    }

    /// The ops that actually change something: everything except identity
    /// relabels.
    pub fn changes(&self) -> impl Iterator<Item = &EditOp<'a, T>> + '_
    where
        T: PartialEq,
    {
        self.ops.iter().filter(|op| !op.is_identity())
    }
}

/// A recorded edit, by postorder position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Delete(usize),
    Insert(usize),
    Relabel(usize, usize),
    /// The frozen script of a finished subtree pair.
    Subtree(usize, usize),
}

impl From<Step> for Piece {
    fn from(step: Step) -> Self {
        match step {
            Step::Delete { ni } => Piece::Delete(ni),
            Step::Insert { nj } => Piece::Insert(nj),
            Step::Relabel { ni, nj } => Piece::Relabel(ni, nj),
            Step::Combine { ni, nj, .. } => Piece::Subtree(ni, nj),
        }
    }
}

/// A recorded piece plus the path back towards the origin of its table.
///
/// Cells share their predecessors' links, so recording a cell and freezing a
/// subtree script are both O(1).
struct Link {
    piece: Piece,
    prev: Path,
}

/// Pieces from a cell back to the origin, newest first. `None` is the origin.
type Path = Option<Rc<Link>>;

impl Drop for Link {
    fn drop(&mut self) {
        // Unlink iteratively; a long chain would otherwise drop recursively.
        let mut prev = self.prev.take();
        while let Some(link) = prev {
            match Rc::try_unwrap(link) {
                Ok(mut link) => prev = link.prev.take(),
                Err(_) => break,
            }
        }
    }
}

/// Paths for the current table plus the frozen subtree scripts.
struct ScriptRecorder {
    /// Path of every cell of the current pass, row-major.
    paths: Vec<Path>,
    cols: usize,
    /// Frozen scripts for every subtree pair, `m × n`, row-major.
    subtrees: Vec<Path>,
    right_len: usize,
}

impl ScriptRecorder {
    fn new(left_len: usize, right_len: usize) -> Self {
        Self {
            paths: Vec::new(),
            cols: 0,
            subtrees: vec![None; left_len * right_len],
            right_len,
        }
    }

    fn path(&self, i1: usize, j1: usize) -> Path {
        self.paths[i1 * self.cols + j1].clone()
    }

    /// Flatten a path into ops, origin first, splicing frozen subtree scripts
    /// in place.
    fn expand<'a, T>(
        &self,
        top: &Path,
        left: &TreeIndex<'a, T>,
        right: &TreeIndex<'a, T>,
    ) -> Vec<EditOp<'a, T>> {
        // Links run newest first, so collect in reverse and flip at the end.
        let mut ops = Vec::new();
        let mut stack: Vec<&Link> = top.as_deref().into_iter().collect();
        while let Some(link) = stack.pop() {
            stack.extend(link.prev.as_deref());
            match link.piece {
                Piece::Subtree(ni, nj) => {
                    stack.extend(self.subtrees[ni * self.right_len + nj].as_deref());
                }
                Piece::Delete(ni) => ops.push(EditOp::Delete {
                    label: left.label(ni),
                    node: ni,
                }),
                Piece::Insert(nj) => ops.push(EditOp::Insert {
                    label: right.label(nj),
                    node: nj,
                    parent: right.parents()[nj],
                }),
                Piece::Relabel(ni, nj) => ops.push(EditOp::Relabel {
                    from: left.label(ni),
                    to: right.label(nj),
                    node: ni,
                    target: nj,
                }),
            }
        }
        ops.reverse();
        ops
    }
}

impl Recorder for ScriptRecorder {
    fn begin_pass(&mut self, rows: usize, cols: usize) {
        self.paths.clear();
        self.paths.resize(rows * cols, None);
        self.cols = cols;
    }

    fn step(&mut self, i1: usize, j1: usize, step: Step) {
        let (pi, pj) = step.predecessor(i1, j1);
        let prev = self.path(pi, pj);
        self.paths[i1 * self.cols + j1] = Some(Rc::new(Link {
            piece: Piece::from(step),
            prev,
        }));
    }

    fn subtree_done(&mut self, i1: usize, j1: usize, ni: usize, nj: usize) {
        trace!(ni, nj, "froze subtree script");
        self.subtrees[ni * self.right_len + nj] = self.path(i1, j1);
    }
}

fn edit_indexed<'a, T, C: CostModel<T>>(
    left: &TreeIndex<'a, T>,
    right: &TreeIndex<'a, T>,
    cost: C,
) -> EditScript<'a, T> {
    let mut recorder = ScriptRecorder::new(left.len(), right.len());
    let outcome = Engine::new(left, right, cost).run(&mut recorder);

    let top = match outcome.finish {
        Finish::Subtree { ni, nj } => recorder.subtrees[ni * recorder.right_len + nj].clone(),
        Finish::Table { i1, j1 } => recorder.path(i1, j1),
    };
    let ops = recorder.expand(&top, left, right);
    debug!(distance = outcome.distance, ops = ops.len(), "edit script built");

    EditScript {
        distance: outcome.distance,
        ops,
    }
}

/// Edit distance between two trees plus the edits that achieve it.
///
/// Ties between equally cheap choices always prefer delete, then insert, then
/// relabel, so the script is deterministic.
///
/// ```
/// use tedium::{EditOp, Tree, UnitCost, tree_edit};
///
/// let a = Tree::new("r", [Tree::leaf("x")]);
/// let b = Tree::new("r", [Tree::leaf("y")]);
///
/// let script = tree_edit(&a, &b, UnitCost);
/// assert_eq!(script.distance, 1.0);
/// assert_eq!(
///     script.ops,
///     [
///         EditOp::Relabel { from: &"x", to: &"y", node: 0, target: 0 },
///         EditOp::Relabel { from: &"r", to: &"r", node: 1, target: 1 },
///     ]
/// );
/// ```
pub fn tree_edit<'a, T, C: CostModel<T>>(
    tree1: &'a Tree<T>,
    tree2: &'a Tree<T>,
    cost: C,
) -> EditScript<'a, T> {
    let left = TreeIndex::of_tree(tree1);
    let right = TreeIndex::of_tree(tree2);
    edit_indexed(&left, &right, cost)
}

/// Like [`tree_edit`], for forests; either side may be empty.
pub fn forest_edit<'a, T, C: CostModel<T>>(
    forest1: &'a Forest<T>,
    forest2: &'a Forest<T>,
    cost: C,
) -> EditScript<'a, T> {
    let left = TreeIndex::build(forest1);
    let right = TreeIndex::build(forest2);
    edit_indexed(&left, &right, cost)
}
