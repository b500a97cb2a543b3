use std::fmt;

/// The result of solving an LP model
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolverResult {
    /// Solution status
    pub status: SolverStatus,
    /// Value of each original variable (empty unless an optimum was found)
    pub values: Vec<f64>,
    /// Objective value in the model's own direction
    pub objective_value: f64,
    /// Pivots performed across both phases
    pub iterations: usize,
    /// Whether a degenerate pivot or a degenerate basic solution was seen
    pub degenerate: bool,
    /// Shadow price of each original constraint (empty unless optimal)
    pub shadow_prices: Vec<f64>,
    /// Standard form columns in the final basis (empty unless optimal)
    pub basis: Vec<usize>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// A unique optimal vertex was found
    Optimal,
    /// An optimal vertex was found and some nonbasic column has zero reduced cost
    OptimalMultiple,
    /// The constraints admit no solution
    Infeasible,
    /// The objective improves without bound
    Unbounded,
    /// The pivot budget ran out, or phase I stalled, before a terminal state
    IterationLimitExceeded,
}

/// Information about a violated constraint or sign restriction
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    /// Constraint (or variable) name
    pub constraint: String,
    /// Required value (from constraint RHS)
    pub required: f64,
    /// Actual value achieved
    pub actual: f64,
    /// How much the constraint is violated by
    pub violation_amount: f64,
    /// Human-readable description of what's wrong
    pub description: String,
}

impl SolverStatus {
    pub fn is_optimal(self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::OptimalMultiple)
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SolverStatus::Optimal => "OPTIMAL",
            SolverStatus::OptimalMultiple => "OPTIMAL (MULTIPLE)",
            SolverStatus::Infeasible => "INFEASIBLE",
            SolverStatus::Unbounded => "UNBOUNDED",
            SolverStatus::IterationLimitExceeded => "ITERATION LIMIT",
        };
        f.write_str(label)
    }
}

impl SolverResult {
    pub fn infeasible(iterations: usize, degenerate: bool) -> Self {
        Self::without_solution(SolverStatus::Infeasible, f64::NAN, iterations, degenerate)
    }

    /// `objective_value` is the infinity matching the model's direction.
    pub fn unbounded(objective_value: f64, iterations: usize, degenerate: bool) -> Self {
        Self::without_solution(SolverStatus::Unbounded, objective_value, iterations, degenerate)
    }

    pub fn iteration_limit(iterations: usize, degenerate: bool) -> Self {
        Self::without_solution(SolverStatus::IterationLimitExceeded, f64::NAN, iterations, degenerate)
    }

    fn without_solution(status: SolverStatus, objective_value: f64, iterations: usize, degenerate: bool) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective_value,
            iterations,
            degenerate,
            shadow_prices: Vec::new(),
            basis: Vec::new(),
        }
    }
}
