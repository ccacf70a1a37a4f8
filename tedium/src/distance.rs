//! Zhang–Shasha tree edit distance.
//!
//! Based on "Simple Fast Algorithms for the Editing Distance between Trees and
//! Related Problems" (Zhang & Shasha, 1989).
//!
//! For every pair of keyroots `(i, j)` a forest-distance table is filled over
//! the postorder ranges `l(i)..=i` and `l(j)..=j`. Whenever both the row node
//! and the column node sit on the leftmost path of their keyroot, the cell is
//! a full subtree-to-subtree distance and is kept in a global memo; every
//! other cell splits off the rightmost subtrees and reuses the memo.
//!
//! Keyroots are visited in ascending postorder, which guarantees every memo
//! entry a pass reads was written by an earlier pass.

use crate::cost::CostModel;
use crate::index::TreeIndex;
use crate::tree::{Forest, Tree};
use crate::{debug, trace};

/// One cell's choice in a forest-distance table, with the nodes involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Delete row node `ni`, coming from the cell above.
    Delete { ni: usize },
    /// Insert column node `nj`, coming from the cell to the left.
    Insert { nj: usize },
    /// Map `ni` onto `nj`, coming from the diagonal.
    Relabel { ni: usize, nj: usize },
    /// Take the memoized subtree distance for `(ni, nj)`, coming from the
    /// cell at `from` (the forest left of both subtrees).
    Combine {
        ni: usize,
        nj: usize,
        from: (usize, usize),
    },
}

impl Step {
    /// The cell this step was reached from.
    pub(crate) fn predecessor(self, i1: usize, j1: usize) -> (usize, usize) {
        match self {
            Step::Delete { .. } => (i1 - 1, j1),
            Step::Insert { .. } => (i1, j1 - 1),
            Step::Relabel { .. } => (i1 - 1, j1 - 1),
            Step::Combine { from, .. } => from,
        }
    }
}

/// Observer for the dynamic program. The plain distance uses `()`, which
/// records nothing.
pub(crate) trait Recorder {
    /// A new local table of `rows × cols` is about to be filled.
    fn begin_pass(&mut self, _rows: usize, _cols: usize) {}

    /// Cell `(i1, j1)` of the current table was filled by `step`.
    fn step(&mut self, _i1: usize, _j1: usize, _step: Step) {}

    /// Cell `(i1, j1)` is the final distance between the subtrees rooted at
    /// `ni` and `nj`.
    fn subtree_done(&mut self, _i1: usize, _j1: usize, _ni: usize, _nj: usize) {}
}

impl Recorder for () {}

/// Where the overall answer lives once the passes are done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Finish {
    /// Both sides are single trees: the memo entry for the two roots.
    Subtree { ni: usize, nj: usize },
    /// Forests: the last cell of the final whole-forest table.
    Table { i1: usize, j1: usize },
}

pub(crate) struct Outcome {
    pub(crate) distance: f64,
    pub(crate) finish: Finish,
}

/// Tables for one distance computation. Not shared between calls.
pub(crate) struct Engine<'x, 'a, T, C> {
    left: &'x TreeIndex<'a, T>,
    right: &'x TreeIndex<'a, T>,
    cost: C,
    /// Subtree distances, `left.len() × right.len()`, row-major.
    memo: Vec<f64>,
    /// Scratch forest-distance table, reused by every pass.
    table: Vec<f64>,
}

impl<'x, 'a, T, C: CostModel<T>> Engine<'x, 'a, T, C> {
    pub(crate) fn new(left: &'x TreeIndex<'a, T>, right: &'x TreeIndex<'a, T>, cost: C) -> Self {
        Self {
            left,
            right,
            cost,
            memo: vec![0.0; left.len() * right.len()],
            table: Vec::new(),
        }
    }

    pub(crate) fn run<R: Recorder>(&mut self, recorder: &mut R) -> Outcome {
        let (m, n) = (self.left.len(), self.right.len());
        debug!(
            left_nodes = m,
            right_nodes = n,
            left_keyroots = self.left.keyroots().len(),
            right_keyroots = self.right.keyroots().len(),
            "zhang-shasha start"
        );

        let (left, right) = (self.left, self.right);
        for &i in left.keyroots() {
            for &j in right.keyroots() {
                let (lo1, lo2) = (left.leftmost()[i], right.leftmost()[j]);
                self.pass((lo1, i + 1), (lo2, j + 1), true, recorder);
            }
        }

        let single_trees = left.roots().count() == 1 && right.roots().count() == 1;
        let outcome = if single_trees {
            let (ni, nj) = (m - 1, n - 1);
            Outcome {
                distance: self.memo[ni * n + nj],
                finish: Finish::Subtree { ni, nj },
            }
        } else {
            // Either side is empty or holds several trees: one more pass over
            // the whole forests. No memo writes, every subtree pair is done.
            self.pass((0, m), (0, n), false, recorder);
            Outcome {
                distance: self.table[m * (n + 1) + n],
                finish: Finish::Table { i1: m, j1: n },
            }
        };

        debug!(distance = outcome.distance, "zhang-shasha done");
        outcome
    }

    /// Fill the forest-distance table for postorder ranges `lo1..hi1` and
    /// `lo2..hi2`. Row/column 0 is the empty forest.
    fn pass<R: Recorder>(
        &mut self,
        (lo1, hi1): (usize, usize),
        (lo2, hi2): (usize, usize),
        write_memo: bool,
        recorder: &mut R,
    ) {
        trace!(lo1, hi1, lo2, hi2, "forest pass");

        let Self {
            left,
            right,
            cost,
            memo,
            table,
        } = self;
        let n = right.len();
        let (l1, l2) = (left.leftmost(), right.leftmost());

        let rows = hi1 - lo1 + 1;
        let cols = hi2 - lo2 + 1;
        table.clear();
        table.resize(rows * cols, 0.0);
        recorder.begin_pass(rows, cols);

        for i1 in 1..rows {
            let ni = lo1 + i1 - 1;
            table[i1 * cols] = table[(i1 - 1) * cols] + cost.delete(left.label(ni));
            recorder.step(i1, 0, Step::Delete { ni });
        }

        for j1 in 1..cols {
            let nj = lo2 + j1 - 1;
            table[j1] = table[j1 - 1] + cost.insert(right.label(nj));
            recorder.step(0, j1, Step::Insert { nj });
        }

        for i1 in 1..rows {
            let ni = lo1 + i1 - 1;
            let a = left.label(ni);
            let delete_cost = cost.delete(a);

            for j1 in 1..cols {
                let nj = lo2 + j1 - 1;
                let b = right.label(nj);

                let delete = table[(i1 - 1) * cols + j1] + delete_cost;
                let insert = table[i1 * cols + j1 - 1] + cost.insert(b);

                let aligned = l1[ni] == lo1 && l2[nj] == lo2;
                let (third, third_step) = if aligned {
                    (
                        table[(i1 - 1) * cols + j1 - 1] + cost.relabel(a, b),
                        Step::Relabel { ni, nj },
                    )
                } else {
                    let from = (l1[ni] - lo1, l2[nj] - lo2);
                    (
                        table[from.0 * cols + from.1] + memo[ni * n + nj],
                        Step::Combine { ni, nj, from },
                    )
                };

                // Ties go to delete, then insert, then relabel/combine.
                let (mut best, mut step) = (delete, Step::Delete { ni });
                if insert < best {
                    (best, step) = (insert, Step::Insert { nj });
                }
                if third < best {
                    (best, step) = (third, third_step);
                }

                table[i1 * cols + j1] = best;
                recorder.step(i1, j1, step);

                if aligned && write_memo {
                    memo[ni * n + nj] = best;
                    recorder.subtree_done(i1, j1, ni, nj);
                }
            }
        }
    }
}

/// Edit distance between two trees.
///
/// `cost` is any [`CostModel`]; pass [`crate::UnitCost`] for the classic unit
/// costs or a `&`[`crate::Cost`] for custom functions.
///
/// ```
/// use tedium::{Tree, UnitCost, tree_distance};
///
/// let a = Tree::new("f", [Tree::new("d", [Tree::leaf("a"), Tree::new("c", [Tree::leaf("b")])]), Tree::leaf("e")]);
/// let b = Tree::new("f", [Tree::new("c", [Tree::new("d", [Tree::leaf("a"), Tree::leaf("b")])]), Tree::leaf("e")]);
///
/// assert_eq!(tree_distance(&a, &b, UnitCost), 2.0);
/// assert_eq!(tree_distance(&a, &a, UnitCost), 0.0);
/// ```
pub fn tree_distance<T, C: CostModel<T>>(tree1: &Tree<T>, tree2: &Tree<T>, cost: C) -> f64 {
    let left = TreeIndex::of_tree(tree1);
    let right = TreeIndex::of_tree(tree2);
    Engine::new(&left, &right, cost).run(&mut ()).distance
}

/// Edit distance between two forests; either side may be empty.
///
/// Against the empty forest, the distance is the summed insert (or delete)
/// cost of every node on the other side.
///
/// ```
/// use tedium::{Forest, Tree, UnitCost, forest_distance};
///
/// let empty = Forest::empty();
/// let one = Forest::from(Tree::new("a", [Tree::leaf("b")]));
///
/// assert_eq!(forest_distance(&empty, &empty, UnitCost), 0.0);
/// assert_eq!(forest_distance(&empty, &one, UnitCost), 2.0);
/// ```
pub fn forest_distance<T, C: CostModel<T>>(forest1: &Forest<T>, forest2: &Forest<T>, cost: C) -> f64 {
    let left = TreeIndex::build(forest1);
    let right = TreeIndex::build(forest2);
    Engine::new(&left, &right, cost).run(&mut ()).distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{Cost, UnitCost};
    use crate::notation::parse;
    use facet_testhelpers::test;

    fn t(s: &str) -> Tree<String> {
        parse(s).unwrap()
    }

    #[test]
    fn test_identical_trees_have_zero_distance() {
        for s in ["a", "a(b)", "a(b, c)", "f(d(a, c(b)), e)"] {
            assert_eq!(tree_distance(&t(s), &t(s), UnitCost), 0.0, "{s}");
        }
    }

    #[test]
    fn test_single_relabel() {
        assert_eq!(tree_distance(&t("a"), &t("b"), UnitCost), 1.0);

        let cost = Cost::new(|_: &String| 100.0, |_| 100.0, |_, _| 10.0);
        assert_eq!(tree_distance(&t("a"), &t("b"), &cost), 10.0);

        let cost = Cost::default().with_insert(|_: &String| 10.0);
        assert_eq!(tree_distance(&t("a"), &t("b"), &cost), 1.0);
    }

    #[test]
    fn test_reference_distances() {
        let trees = [
            t("f(d(a, c(b)), e)"),
            t("f(c(d(a, b)), e)"),
            t("g(e(a, c(b), d), f)"),
            t("o(g(a, c(b), f(d, e)), n(i(h), j, k, m(l)))"),
        ];
        let expected = [
            [0.0, 2.0, 4.0, 12.0],
            [2.0, 0.0, 6.0, 14.0],
            [4.0, 6.0, 0.0, 11.0],
            [12.0, 14.0, 11.0, 0.0],
        ];
        for (i, a) in trees.iter().enumerate() {
            for (j, b) in trees.iter().enumerate() {
                assert_eq!(
                    tree_distance(a, b, UnitCost),
                    expected[i][j],
                    "tree{} vs tree{}",
                    i + 1,
                    j + 1
                );
            }
        }

        let tens: Cost<String> = Cost::uniform(10.0, 10.0, 10.0);
        assert_eq!(tree_distance(&trees[0], &trees[1], &tens), 20.0);
        assert_eq!(tree_distance(&trees[1], &trees[0], &tens), 20.0);
    }

    #[test]
    fn test_weighted_minimum() {
        let a = t("d(b(a, c), f(e, g))");
        let b = t("f(e(x), g)");

        // Delete d, b, a, c; insert x.
        let cost = Cost::new(
            |_: &String| 3.0,
            |_| 3.0,
            |x, y| if x == y { 0.0 } else { 2.0 },
        );
        assert_eq!(tree_distance(&a, &b, &cost), 15.0);
        assert_eq!(tree_distance(&b, &a, &cost), 15.0);

        // Delete c, e, g; relabel f -> g, d -> f, b -> e, a -> x.
        let cost = Cost::new(|_: &String| 3.0, |_| 3.0, |_, _| 2.0);
        assert_eq!(tree_distance(&a, &b, &cost), 17.0);
        assert_eq!(tree_distance(&b, &a, &cost), 17.0);
    }

    #[test]
    fn test_empty_forests() {
        let empty: Forest<String> = Forest::empty();
        let leaf = Forest::from(t("a"));
        let bigger = Forest::from(t("a(b, c(d))"));

        assert_eq!(forest_distance(&empty, &empty, UnitCost), 0.0);
        assert_eq!(forest_distance(&empty, &leaf, UnitCost), 1.0);
        assert_eq!(forest_distance(&leaf, &empty, UnitCost), 1.0);
        assert_eq!(forest_distance(&empty, &bigger, UnitCost), 4.0);

        let cost = Cost::default()
            .with_insert(|label: &String| label.len() as f64 * 5.0)
            .with_delete(|_| 7.0);
        assert_eq!(forest_distance(&empty, &leaf, &cost), 5.0);
        assert_eq!(forest_distance(&leaf, &empty, &cost), 7.0);
        assert_eq!(forest_distance(&bigger, &empty, &cost), 28.0);
    }

    #[test]
    fn test_single_tree_forest_matches_tree_distance() {
        let a = t("f(d(a, c(b)), e)");
        let b = t("g(e(a, c(b), d), f)");
        assert_eq!(
            forest_distance(&Forest::from(a.clone()), &Forest::from(b.clone()), UnitCost),
            tree_distance(&a, &b, UnitCost)
        );
    }

    #[test]
    fn test_multi_tree_forests() {
        let ab: Forest<String> = [t("a"), t("b")].into_iter().collect();
        let b: Forest<String> = [t("b")].into_iter().collect();
        let ba: Forest<String> = [t("b"), t("a")].into_iter().collect();

        assert_eq!(forest_distance(&ab, &ab, UnitCost), 0.0);
        assert_eq!(forest_distance(&ab, &b, UnitCost), 1.0);
        assert_eq!(forest_distance(&b, &ab, UnitCost), 1.0);
        assert_eq!(forest_distance(&ab, &ba, UnitCost), 2.0);

        // Second tree gains a child, first tree untouched.
        let before: Forest<String> = [t("x(y)"), t("p(q)")].into_iter().collect();
        let after: Forest<String> = [t("x(y)"), t("p(q, r)")].into_iter().collect();
        assert_eq!(forest_distance(&before, &after, UnitCost), 1.0);
    }

    #[test]
    fn test_scratch_table_is_reused_across_calls() {
        let a = t("o(g(a, c(b), f(d, e)), n(i(h), j, k, m(l)))");
        let b = t("g(e(a, c(b), d), f)");
        let left = TreeIndex::of_tree(&a);
        let right = TreeIndex::of_tree(&b);
        let mut engine = Engine::new(&left, &right, UnitCost);
        let first = engine.run(&mut ()).distance;
        let second = engine.run(&mut ()).distance;
        assert_eq!(first, 11.0);
        assert_eq!(first, second);
    }
}
