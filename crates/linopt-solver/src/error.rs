use thiserror::Error;

/// A raw model that cannot be turned into a standard form model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Constraint {row} has {found} coefficients, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Objective has {found} coefficients, expected {expected}")]
    ObjectiveWidth { expected: usize, found: usize },
    #[error("Sign domains given for {found} variables, expected {expected}")]
    SignWidth { expected: usize, found: usize },
    #[error("Unknown constraint relation: {0}")]
    UnknownRelation(String),
    #[error("Unknown variable sign domain: {0}")]
    UnknownSign(String),
    #[error("Unknown objective direction: {0}")]
    UnknownDirection(String),
    #[error("Non-finite number in {location}")]
    NonFinite { location: String },
}
