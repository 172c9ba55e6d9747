//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod assessment;
mod comparison;
mod loader;

pub use assessment::{parse_assignment, AssessmentService};
pub use comparison::{compare, Comparison, ComparisonService, Direction, ScenarioPaths};
pub use loader::TreeLoader;
