//! # Tedium
//!
//! Exact tree edit distance, and the edit script behind it, using the
//! Zhang–Shasha algorithm.
//!
//! The name is **t**ree **ed**it d**i**stance, give or take, and what you'd
//! call doing it by hand.
//!
//! ## Algorithm Overview
//!
//! Given two ordered labeled trees and costs for deleting, inserting and
//! relabeling a node, Tedium finds the cheapest sequence of edits turning the
//! first tree into the second:
//!
//! 1. **Indexing**: number both trees in postorder, and compute each node's
//!    leftmost leaf and the keyroots ([`TreeIndex`])
//! 2. **Distance**: fill one forest-distance table per pair of keyroots,
//!    keeping subtree distances in a shared memo ([`tree_distance`])
//! 3. **Edit script**: record which choice won each cell and walk the choices
//!    back from the final cell ([`tree_edit`])
//!
//! Forests, including the empty forest, are supported throughout
//! ([`forest_distance`], [`forest_edit`]).
//!
//! ## Usage
//!
//! ```
//! use tedium::{Tree, UnitCost, tree_distance, tree_edit};
//!
//! let before: Tree<String> = "Module(Assign(Name, Const))".parse().unwrap();
//! let after: Tree<String> = "Module(Assign(Name, BinOp(Const, Const)))".parse().unwrap();
//!
//! assert_eq!(tree_distance(&before, &after, UnitCost), 2.0);
//!
//! let script = tree_edit(&before, &after, UnitCost);
//! for op in script.changes() {
//!     println!("{op}");
//! }
//! ```
//!
//! ## Features
//!
//! - `tracing`: log engine progress through the `tracing` crate.

#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]

pub use indextree;

mod tracing_macros;
pub(crate) use tracing_macros::{debug, trace};

pub mod cost;
pub mod distance;
pub mod index;
pub mod notation;
pub mod recursive;
pub mod script;
pub mod tree;

pub use cost::{Cost, CostError, CostModel, UnitCost, validate_costs};
pub use distance::{forest_distance, tree_distance};
pub use index::TreeIndex;
pub use notation::NotationError;
pub use script::{EditOp, EditScript, forest_edit, tree_edit};
pub use tree::{Forest, Tree};
