//! Edit operation costs.
//!
//! The engine is generic over [`CostModel`]. [`UnitCost`] is the classic
//! model (every insert and delete costs 1, relabeling costs 1 unless the labels
//! are equal); [`Cost`] bundles arbitrary closures for everything else.
//!
//! Costs must be finite and non-negative. Nothing inside the distance engine
//! checks this; call [`validate_costs`] at the boundary if the cost functions
//! come from somewhere untrusted.

use facet::Facet;

use crate::index::TreeIndex;
use crate::tree::Forest;

/// The three cost functions Zhang–Shasha is parameterized by.
pub trait CostModel<T> {
    /// Cost of removing a node labeled `label`.
    fn delete(&self, label: &T) -> f64;

    /// Cost of inserting a node labeled `label`.
    fn insert(&self, label: &T) -> f64;

    /// Cost of turning a node labeled `from` into one labeled `to`.
    fn relabel(&self, from: &T, to: &T) -> f64;
}

impl<T, C: CostModel<T> + ?Sized> CostModel<T> for &C {
    #[inline]
    fn delete(&self, label: &T) -> f64 {
        (**self).delete(label)
    }

    #[inline]
    fn insert(&self, label: &T) -> f64 {
        (**self).insert(label)
    }

    #[inline]
    fn relabel(&self, from: &T, to: &T) -> f64 {
        (**self).relabel(from, to)
    }
}

/// Unit costs: delete 1, insert 1, relabel 0 for equal labels and 1 otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitCost;

impl<T: PartialEq> CostModel<T> for UnitCost {
    #[inline]
    fn delete(&self, _label: &T) -> f64 {
        1.0
    }

    #[inline]
    fn insert(&self, _label: &T) -> f64 {
        1.0
    }

    #[inline]
    fn relabel(&self, from: &T, to: &T) -> f64 {
        if from == to { 0.0 } else { 1.0 }
    }
}

type LabelCost<'c, T> = Box<dyn Fn(&T) -> f64 + 'c>;
type PairCost<'c, T> = Box<dyn Fn(&T, &T) -> f64 + 'c>;

/// Configurable cost functions.
///
/// Starts from [`UnitCost`]'s behaviour; each function can be swapped out.
///
/// ```
/// use tedium::{Cost, Tree, tree_distance};
///
/// let cost = Cost::default()
///     .with_delete(|_: &&str| 3.0)
///     .with_insert(|_| 3.0)
///     .with_relabel(|a, b| if a == b { 0.0 } else { 2.0 });
///
/// let d = tree_distance(&Tree::leaf("a"), &Tree::leaf("b"), &cost);
/// assert_eq!(d, 2.0);
/// ```
pub struct Cost<'c, T> {
    delete: LabelCost<'c, T>,
    insert: LabelCost<'c, T>,
    relabel: PairCost<'c, T>,
}

impl<'c, T: PartialEq> Default for Cost<'c, T> {
    fn default() -> Self {
        Self {
            delete: Box::new(|_: &T| 1.0),
            insert: Box::new(|_: &T| 1.0),
            relabel: Box::new(|from: &T, to: &T| if from == to { 0.0 } else { 1.0 }),
        }
    }
}

impl<'c, T> Cost<'c, T> {
    /// Build from three closures.
    pub fn new(
        delete: impl Fn(&T) -> f64 + 'c,
        insert: impl Fn(&T) -> f64 + 'c,
        relabel: impl Fn(&T, &T) -> f64 + 'c,
    ) -> Self {
        Self {
            delete: Box::new(delete),
            insert: Box::new(insert),
            relabel: Box::new(relabel),
        }
    }

    /// Constant costs. `relabel` applies only when labels differ; relabeling
    /// to an equal label stays free.
    pub fn uniform(delete: f64, insert: f64, relabel: f64) -> Self
    where
        T: PartialEq,
    {
        Self::new(
            move |_| delete,
            move |_| insert,
            move |from, to| if from == to { 0.0 } else { relabel },
        )
    }

    /// Replace the delete cost.
    pub fn with_delete(mut self, delete: impl Fn(&T) -> f64 + 'c) -> Self {
        self.delete = Box::new(delete);
        self
    }

    /// Replace the insert cost.
    pub fn with_insert(mut self, insert: impl Fn(&T) -> f64 + 'c) -> Self {
        self.insert = Box::new(insert);
        self
    }

    /// Replace the relabel cost.
    pub fn with_relabel(mut self, relabel: impl Fn(&T, &T) -> f64 + 'c) -> Self {
        self.relabel = Box::new(relabel);
        self
    }
}

impl<T> CostModel<T> for Cost<'_, T> {
    #[inline]
    fn delete(&self, label: &T) -> f64 {
        (self.delete)(label)
    }

    #[inline]
    fn insert(&self, label: &T) -> f64 {
        (self.insert)(label)
    }

    #[inline]
    fn relabel(&self, from: &T, to: &T) -> f64 {
        (self.relabel)(from, to)
    }
}

impl<T> core::fmt::Debug for Cost<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cost").finish_non_exhaustive()
    }
}

/// A cost function produced a value the distance engine can't use.
#[derive(Facet, Debug, Clone, PartialEq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum CostError {
    /// delete cost {value} for node {node} of the first tree is negative or not finite
    Delete {
        /// Postorder position in the first forest
        node: usize,
        /// The offending cost
        value: f64,
    },

    /// insert cost {value} for node {node} of the second tree is negative or not finite
    Insert {
        /// Postorder position in the second forest
        node: usize,
        /// The offending cost
        value: f64,
    },

    /// relabel cost {value} from node {from} to node {to} is negative or not finite
    Relabel {
        /// Postorder position in the first forest
        from: usize,
        /// Postorder position in the second forest
        to: usize,
        /// The offending cost
        value: f64,
    },
}

fn usable(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Check every cost the engine could ask for on this pair of forests.
///
/// Evaluates delete over the first forest, insert over the second, and
/// relabel over every pair, reporting the first bad value by postorder
/// position. This is O(m·n) cost calls, the same order as the distance itself.
pub fn validate_costs<T, C: CostModel<T>>(
    forest1: &Forest<T>,
    forest2: &Forest<T>,
    cost: &C,
) -> Result<(), CostError> {
    let index1 = TreeIndex::build(forest1);
    let index2 = TreeIndex::build(forest2);

    for (node, label) in index1.postorder().iter().enumerate() {
        let value = cost.delete(label);
        if !usable(value) {
            return Err(CostError::Delete { node, value });
        }
    }

    for (node, label) in index2.postorder().iter().enumerate() {
        let value = cost.insert(label);
        if !usable(value) {
            return Err(CostError::Insert { node, value });
        }
    }

    for (from, a) in index1.postorder().iter().enumerate() {
        for (to, b) in index2.postorder().iter().enumerate() {
            let value = cost.relabel(a, b);
            if !usable(value) {
                return Err(CostError::Relabel { from, to, value });
            }
        }
    }

    Ok(())
}
