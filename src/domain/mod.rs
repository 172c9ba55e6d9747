//! Domain layer: the attack tree engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod evaluator;
pub mod report;
pub mod view;

pub use arena::{AttackTree, TreeNode};
pub use builder::{build, TreeBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use evaluator::{evaluate, evaluate_all};
pub use report::{breakdown, Breakdown, Relation};
pub use view::{Edge, NodeView, TreeDisplay, TreeView};
