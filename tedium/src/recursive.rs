//! The textbook forest-distance recursion, memoized.
//!
//! Any forest that shows up while decomposing a tree from the right is a
//! contiguous postorder range `lo..hi`, so a forest is just a pair of
//! indices. With `v` the rightmost root of a non-empty forest `F`:
//!
//! ```text
//! d(F1, F2) = min(
//!     d(F1 - v1, F2) + delete(v1),
//!     d(F1, F2 - v2) + insert(v2),
//!     d(F1 - T(v1), F2 - T(v2)) + d(T(v1) - v1, T(v2) - v2) + relabel(v1, v2),
//! )
//! ```
//!
//! This does far more work than the keyroot engine in [`crate::distance`]
//! and recurses as deep as both forests together. It exists to check that
//! engine against a formulation that is easy to read.

use core::ops::Range;

use rapidhash::RapidHashMap as HashMap;

use crate::cost::CostModel;
use crate::index::TreeIndex;
use crate::trace;
use crate::tree::{Forest, Tree};

type Key = (usize, usize, usize, usize);

struct Recursion<'x, 'a, T, C> {
    left: &'x TreeIndex<'a, T>,
    right: &'x TreeIndex<'a, T>,
    cost: C,
    memo: HashMap<Key, f64>,
}

impl<T, C: CostModel<T>> Recursion<'_, '_, T, C> {
    fn distance(&mut self, f1: Range<usize>, f2: Range<usize>) -> f64 {
        if f1.is_empty() && f2.is_empty() {
            return 0.0;
        }

        let key = (f1.start, f1.end, f2.start, f2.end);
        if let Some(&known) = self.memo.get(&key) {
            return known;
        }

        let best = if f1.is_empty() {
            let v2 = f2.end - 1;
            self.distance(f1, f2.start..v2) + self.cost.insert(self.right.label(v2))
        } else if f2.is_empty() {
            let v1 = f1.end - 1;
            self.distance(f1.start..v1, f2) + self.cost.delete(self.left.label(v1))
        } else {
            let (v1, v2) = (f1.end - 1, f2.end - 1);
            let (l1, l2) = (self.left.leftmost()[v1], self.right.leftmost()[v2]);
            let (a, b) = (self.left.label(v1), self.right.label(v2));

            let delete = self.distance(f1.start..v1, f2.clone()) + self.cost.delete(a);
            let insert = self.distance(f1.clone(), f2.start..v2) + self.cost.insert(b);
            let relabel = self.distance(f1.start..l1, f2.start..l2)
                + self.distance(l1..v1, l2..v2)
                + self.cost.relabel(a, b);

            delete.min(insert).min(relabel)
        };

        self.memo.insert(key, best);
        best
    }
}

fn run<T, C: CostModel<T>>(left: &TreeIndex<'_, T>, right: &TreeIndex<'_, T>, cost: C) -> f64 {
    let mut recursion = Recursion {
        left,
        right,
        cost,
        memo: HashMap::default(),
    };
    let distance = recursion.distance(0..left.len(), 0..right.len());
    trace!(states = recursion.memo.len(), distance, "recursive distance");
    distance
}

/// Edit distance between two trees, by plain recursion.
pub fn tree_distance<T, C: CostModel<T>>(tree1: &Tree<T>, tree2: &Tree<T>, cost: C) -> f64 {
    run(&TreeIndex::of_tree(tree1), &TreeIndex::of_tree(tree2), cost)
}

/// Edit distance between two forests, by plain recursion.
///
/// ```
/// use tedium::{Forest, UnitCost, notation::parse_forest, recursive};
///
/// let a = parse_forest("a(b), c").unwrap();
/// let b = parse_forest("a(b, c)").unwrap();
/// assert_eq!(recursive::forest_distance(&a, &b, UnitCost), 2.0);
/// assert_eq!(recursive::forest_distance(&a, &Forest::empty(), UnitCost), 3.0);
/// ```
pub fn forest_distance<T, C: CostModel<T>>(forest1: &Forest<T>, forest2: &Forest<T>, cost: C) -> f64 {
    run(&TreeIndex::build(forest1), &TreeIndex::build(forest2), cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{Cost, UnitCost};
    use crate::distance;
    use crate::notation::{parse, parse_forest};
    use facet_testhelpers::test;

    const TREES: [&str; 8] = [
        "f(d(a, c(b)), e)",
        "f(c(d(a, b)), e)",
        "g(e(a, c(b), d), f)",
        "o(g(a, c(b), f(d, e)), n(i(h), j, k, m(l)))",
        "d(b(a, c), f(e, g))",
        "f(e(x), g)",
        "a",
        "r(x(y), x(y))",
    ];

    #[test]
    fn test_reference_distances() {
        let a = parse("f(d(a, c(b)), e)").unwrap();
        let b = parse("o(g(a, c(b), f(d, e)), n(i(h), j, k, m(l)))").unwrap();
        assert_eq!(tree_distance(&a, &b, UnitCost), 12.0);
    }

    #[test]
    fn test_agrees_with_keyroot_engine() {
        let costs: [Cost<String>; 3] = [
            Cost::default(),
            Cost::uniform(3.0, 3.0, 2.0),
            Cost::new(
                |label: &String| label.len() as f64,
                |_| 2.5,
                |x, y| if x == y { 0.0 } else { 4.0 },
            ),
        ];

        for cost in &costs {
            for s1 in TREES {
                for s2 in TREES {
                    let (a, b) = (parse(s1).unwrap(), parse(s2).unwrap());
                    assert_eq!(
                        tree_distance(&a, &b, cost),
                        distance::tree_distance(&a, &b, cost),
                        "{s1} vs {s2} under {cost:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_forests_agree_with_keyroot_engine() {
        let forests = ["", "a", "a, b", "b, a", "x(y), p(q)", "x(y), p(q, r)", "a(b(c)), d, e(f)"];
        for s1 in forests {
            for s2 in forests {
                let (a, b) = (parse_forest(s1).unwrap(), parse_forest(s2).unwrap());
                assert_eq!(
                    forest_distance(&a, &b, UnitCost),
                    distance::forest_distance(&a, &b, UnitCost),
                    "[{s1}] vs [{s2}]"
                );
            }
        }
    }
}
