//! Property-based tests for distances and edit scripts.
//!
//! Trees are small and drawn from a four-letter alphabet so that equal labels,
//! repeated subtrees and ties come up often.

use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

use tedium::{
    Cost, EditOp, Forest, Tree, UnitCost, forest_distance, forest_edit, recursive, tree_distance,
    tree_edit,
};

// =============================================================================
// Generators
// =============================================================================

fn arb_label() -> impl Strategy<Value = char> {
    prop::sample::select(vec!['a', 'b', 'c', 'd'])
}

/// Trees of up to four levels with at most three children per node.
fn arb_tree() -> impl Strategy<Value = Tree<char>> {
    arb_label()
        .prop_map(Tree::leaf)
        .prop_recursive(4, 16, 3, |inner| {
            (arb_label(), prop_vec(inner, 1..=3))
                .prop_map(|(label, children)| Tree::new(label, children))
        })
}

fn arb_forest() -> impl Strategy<Value = Forest<char>> {
    prop_vec(arb_tree(), 0..=3).prop_map(Forest::from)
}

/// Integer-valued costs keep every sum exact, whatever the order.
fn weighted() -> Cost<'static, char> {
    let weight = |c: &char| f64::from(*c as u32 - 'a' as u32 + 1);
    Cost::new(weight, move |c| weight(c) + 1.0, |x, y| if x == y { 0.0 } else { 2.0 })
}

fn check_script_covers_every_node(ops: &[EditOp<'_, char>], left: usize, right: usize) {
    let mut seen_left = vec![0; left];
    let mut seen_right = vec![0; right];
    for op in ops {
        match *op {
            EditOp::Delete { node, .. } => seen_left[node] += 1,
            EditOp::Insert { node, .. } => seen_right[node] += 1,
            EditOp::Relabel { node, target, .. } => {
                seen_left[node] += 1;
                seen_right[target] += 1;
            }
        }
    }
    assert!(seen_left.iter().all(|&n| n == 1), "{seen_left:?}");
    assert!(seen_right.iter().all(|&n| n == 1), "{seen_right:?}");
}

// =============================================================================
// Distance properties
// =============================================================================

proptest! {
    #[test]
    fn identical_trees_are_free(tree in arb_tree()) {
        prop_assert_eq!(tree_distance(&tree, &tree, UnitCost), 0.0);

        let script = tree_edit(&tree, &tree, UnitCost);
        prop_assert_eq!(script.ops.len(), tree.node_count());
        prop_assert!(script.ops.iter().all(EditOp::is_identity));
    }

    #[test]
    fn unit_distance_is_symmetric(a in arb_tree(), b in arb_tree()) {
        prop_assert_eq!(tree_distance(&a, &b, UnitCost), tree_distance(&b, &a, UnitCost));
    }

    #[test]
    fn unit_distance_is_bounded_by_sizes(a in arb_tree(), b in arb_tree()) {
        let d = tree_distance(&a, &b, UnitCost);
        let (m, n) = (a.node_count() as f64, b.node_count() as f64);
        prop_assert!(d >= (m - n).abs());
        // Delete everything but the root, relabel it, insert the rest.
        prop_assert!(d <= m + n - 1.0);
    }

    #[test]
    fn triangle_inequality(a in arb_tree(), b in arb_tree(), c in arb_tree()) {
        let ac = tree_distance(&a, &c, UnitCost);
        let ab = tree_distance(&a, &b, UnitCost);
        let bc = tree_distance(&b, &c, UnitCost);
        prop_assert!(ac <= ab + bc, "{ac} > {ab} + {bc}");
    }

    #[test]
    fn scaling_costs_scales_distance(a in arb_tree(), b in arb_tree(), k in 1u8..=10) {
        let k = f64::from(k);
        let scaled: Cost<char> = Cost::uniform(k, k, k);
        prop_assert_eq!(tree_distance(&a, &b, &scaled), k * tree_distance(&a, &b, UnitCost));
    }

    #[test]
    fn forest_against_empty_counts_nodes(forest in arb_forest()) {
        let empty = Forest::empty();
        let nodes = forest.node_count() as f64;
        prop_assert_eq!(forest_distance(&forest, &empty, UnitCost), nodes);
        prop_assert_eq!(forest_distance(&empty, &forest, UnitCost), nodes);
    }

    #[test]
    fn single_tree_forest_matches_tree(a in arb_tree(), b in arb_tree()) {
        let fa = Forest::from(a.clone());
        let fb = Forest::from(b.clone());
        prop_assert_eq!(forest_distance(&fa, &fb, UnitCost), tree_distance(&a, &b, UnitCost));
    }
}

// =============================================================================
// Edit scripts and the recursive formulation
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn script_realizes_the_distance(a in arb_tree(), b in arb_tree()) {
        let cost = weighted();
        let script = tree_edit(&a, &b, &cost);
        prop_assert_eq!(script.distance, tree_distance(&a, &b, &cost));
        prop_assert_eq!(script.cost_of(&cost), script.distance);
        check_script_covers_every_node(&script.ops, a.node_count(), b.node_count());
    }

    #[test]
    fn forest_script_realizes_the_distance(a in arb_forest(), b in arb_forest()) {
        let script = forest_edit(&a, &b, UnitCost);
        prop_assert_eq!(script.distance, forest_distance(&a, &b, UnitCost));
        prop_assert_eq!(script.cost_of(&UnitCost), script.distance);
        check_script_covers_every_node(&script.ops, a.node_count(), b.node_count());
    }

    #[test]
    fn recursive_agrees_with_keyroots(a in arb_tree(), b in arb_tree()) {
        let cost = weighted();
        prop_assert_eq!(recursive::tree_distance(&a, &b, &cost), tree_distance(&a, &b, &cost));
    }

    #[test]
    fn recursive_agrees_on_forests(a in arb_forest(), b in arb_forest()) {
        prop_assert_eq!(
            recursive::forest_distance(&a, &b, UnitCost),
            forest_distance(&a, &b, UnitCost)
        );
    }
}
