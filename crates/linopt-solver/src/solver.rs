use crate::classify::StatusClassifier;
use crate::engine::{Engine, RevisedEngine, TableauEngine, TerminalState, default_iteration_limit};
use crate::error::ValidationError;
use crate::pivot::{PivotRule, TOLERANCE};
use crate::problem::RawModel;
use crate::solution::SolverResult;
use crate::standard_form::{StandardFormModel, normalize};

/// Which engine carries out the pivots.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Full Gauss-Jordan tableau
    Tableau,
    /// Basis inverse with eta updates
    #[default]
    Revised,
}

/// Two-phase simplex solver for linear programming models
#[derive(Debug, Clone)]
pub struct Solver {
    method: Method,
    /// Pivot budget across both phases; `None` scales with the model
    max_iterations: Option<usize>,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            method: Method::default(),
            max_iterations: None,
            tolerance: TOLERANCE,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Normalize, pivot and classify `model`.
    pub fn solve(&self, model: &RawModel) -> Result<SolverResult, ValidationError> {
        let standard = normalize(model)?;
        let state = self.run(&standard);
        let result = StatusClassifier::new(self.tolerance).classify(model, &standard, &state);

        log::debug!(
            "{:?} solve finished: {} in {} iterations",
            self.method,
            result.status,
            result.iterations
        );

        Ok(result)
    }

    /// Run the configured engine on a model already in standard form.
    pub fn run(&self, model: &StandardFormModel) -> TerminalState {
        let rule = PivotRule::new(self.tolerance);
        let max_iterations = self
            .max_iterations
            .unwrap_or_else(|| default_iteration_limit(model));

        match self.method {
            Method::Tableau => TableauEngine::new(rule, max_iterations).solve(model),
            Method::Revised => RevisedEngine::new(rule, max_iterations).solve(model),
        }
    }
}
