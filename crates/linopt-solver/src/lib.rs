mod classify;
mod error;
mod linalg;
mod pivot;
mod problem;
mod solution;
mod solver;
mod standard_form;

pub mod engine;

pub use classify::StatusClassifier;
pub use error::ValidationError;
pub use pivot::{Leaving, PivotRule, TOLERANCE};
pub use problem::{Constraint, Direction, Objective, RawModel, Relation, Sign};
pub use solution::{ConstraintViolation, SolverResult, SolverStatus};
pub use solver::{Method, Solver};
pub use standard_form::{ColumnSource, StandardFormModel, normalize};
