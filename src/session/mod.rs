pub mod error;
pub mod planner;
pub mod tree;

pub use error::{PlanningError, PlanningErrorKind};
pub use planner::{PlannerConfig, PlanningOutcome, PlanningSession};
pub use tree::{Binding, BindingId, Element, ElementId, ResolutionTree};
