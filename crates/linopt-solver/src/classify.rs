use crate::engine::{Exit, Phase, TerminalState};
use crate::linalg;
use crate::pivot::TOLERANCE;
use crate::problem::{Direction, RawModel};
use crate::solution::{SolverResult, SolverStatus};
use crate::standard_form::StandardFormModel;

/// Turns an engine's terminal state into a [`SolverResult`] over the raw model.
///
/// Classification is a pure function of its inputs; classifying the same
/// terminal state twice gives the same result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusClassifier {
    tolerance: f64,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self { tolerance: TOLERANCE }
    }
}

impl StatusClassifier {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn classify(&self, raw: &RawModel, model: &StandardFormModel, state: &TerminalState) -> SolverResult {
        let iterations = state.iterations;

        if state.phase == Phase::One
            && state.exit == Exit::NoEntering
            && state.phase_one_objective > self.tolerance
        {
            return SolverResult::infeasible(iterations, state.degenerate);
        }

        match state.exit {
            // Phase I cannot run off to infinity; no leaving row there means it stalled
            Exit::NoLeaving if state.phase == Phase::One => {
                return SolverResult::iteration_limit(iterations, state.degenerate);
            }
            Exit::NoLeaving => {
                let objective_value = match model.direction {
                    Direction::Maximize => f64::INFINITY,
                    Direction::Minimize => f64::NEG_INFINITY,
                };
                return SolverResult::unbounded(objective_value, iterations, state.degenerate);
            }
            Exit::IterationLimit => {
                return SolverResult::iteration_limit(iterations, state.degenerate);
            }
            Exit::NoEntering => {}
        }

        let status = if self.has_alternative_optimum(model, state) {
            SolverStatus::OptimalMultiple
        } else {
            SolverStatus::Optimal
        };

        let degenerate = state.degenerate
            || state
                .basis
                .iter()
                .any(|&j| state.column_values[j].abs() <= self.tolerance);

        let values = model.back_map(&state.column_values);
        let objective_value = raw.objective_value(&values);

        SolverResult {
            status,
            values,
            objective_value,
            iterations,
            degenerate,
            shadow_prices: self.shadow_prices(model, state),
            basis: state.basis.clone(),
        }
    }

    /// Some nonbasic column could enter without changing the objective.
    ///
    /// The half of a split free variable whose twin is basic is skipped: moving
    /// it only re-expresses the same original value.
    fn has_alternative_optimum(&self, model: &StandardFormModel, state: &TerminalState) -> bool {
        state.reduced_costs.iter().enumerate().any(|(j, d)| {
            if state.basis.contains(&j) {
                return false;
            }
            if model.twin(j).is_some_and(|twin| state.basis.contains(&twin)) {
                return false;
            }
            d.abs() <= self.tolerance
        })
    }

    /// `yᵀ = c_Bᵀ B⁻¹`, re-signed for the raw direction and any row flips.
    fn shadow_prices(&self, model: &StandardFormModel, state: &TerminalState) -> Vec<f64> {
        let basis_matrix: Vec<Vec<f64>> = state
            .active_rows
            .iter()
            .map(|&i| state.basis.iter().map(|&j| model.a[i][j]).collect())
            .collect();
        let Some(inverse) = linalg::invert(&basis_matrix, self.tolerance) else {
            panic!("final basis {:?} is singular", state.basis);
        };

        let basic_costs: Vec<f64> = state.basis.iter().map(|&j| model.c[j]).collect();
        let y = linalg::vec_mat(&basic_costs, &inverse);

        let mut prices = vec![0.0; model.num_rows()];
        for (&row, y_row) in state.active_rows.iter().zip(y) {
            let row_factor = if model.flipped_rows[row] { -1.0 } else { 1.0 };
            prices[row] = model.direction.factor() * row_factor * y_row;
        }
        prices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, RevisedEngine, TableauEngine, default_iteration_limit, test_models};
    use crate::pivot::PivotRule;
    use crate::problem::Relation;
    use crate::standard_form::normalize;
    use approx::assert_abs_diff_eq;

    fn classify(raw: &RawModel) -> SolverResult {
        let sf = normalize(raw).unwrap();
        let state = TableauEngine::new(PivotRule::default(), default_iteration_limit(&sf)).solve(&sf);
        StatusClassifier::default().classify(raw, &sf, &state)
    }

    #[test]
    fn test_optimal_back_mapping() {
        let result = classify(&test_models::wyndor());

        assert_eq!(result.status, SolverStatus::Optimal);
        assert_abs_diff_eq!(result.values[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.values[1], 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.objective_value, 36.0, epsilon = 1e-9);
        assert!(!result.degenerate);
    }

    #[test]
    fn test_shadow_prices() {
        let result = classify(&test_models::wyndor());
        let expected = [0.0, 1.5, 1.0];
        for (actual, expected) in result.shadow_prices.iter().zip(expected) {
            assert_abs_diff_eq!(*actual, expected, epsilon = 1e-9);
        }

        // Flipped >= rows of a minimization
        let result = classify(&test_models::nonpositive_variables());
        for actual in &result.shadow_prices {
            assert_abs_diff_eq!(*actual, 1.0, epsilon = 1e-9);
        }

        // Redundant rows price at zero
        let result = classify(&test_models::redundant_equalities());
        assert_eq!(result.shadow_prices.len(), 3);
        assert_abs_diff_eq!(result.shadow_prices[0], 1.0, epsilon = 1e-9);
        assert_eq!(&result.shadow_prices[1..], &[0.0, 0.0]);
    }

    #[test]
    fn test_shadow_prices_after_reentered_artificial() {
        let raw = test_models::reentered_artificial();
        let sf = normalize(&raw).unwrap();
        let state = RevisedEngine::new(PivotRule::default(), default_iteration_limit(&sf)).solve(&sf);
        let result = StatusClassifier::default().classify(&raw, &sf, &state);

        assert_eq!(result.status, SolverStatus::Optimal);
        assert!(result.degenerate);
        let expected = [0.0, -3.0, -4.0, 0.0];
        for (actual, expected) in result.shadow_prices.iter().zip(expected) {
            assert_abs_diff_eq!(*actual, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_phase_one_stall_is_reported_as_limit() {
        let mut raw = RawModel::new(vec!["x".to_string()]);
        for name in ["a", "b", "c"] {
            raw.add_constraint(name, vec![0.4], Relation::Eq, 0.4);
        }
        let sf = normalize(&raw).unwrap();
        let state = TableauEngine::new(PivotRule::new(0.5), 100).solve(&sf);
        let result = StatusClassifier::new(0.5).classify(&raw, &sf, &state);

        assert_eq!(result.status, SolverStatus::IterationLimitExceeded);
        assert!(result.values.is_empty());
    }

    #[test]
    fn test_unbounded_objective_follows_direction() {
        let result = classify(&test_models::unbounded());
        assert_eq!(result.status, SolverStatus::Unbounded);
        assert_eq!(result.objective_value, f64::INFINITY);
        assert!(result.values.is_empty());
    }

    #[test]
    fn test_infeasible() {
        let result = classify(&test_models::infeasible());
        assert_eq!(result.status, SolverStatus::Infeasible);
        assert!(result.objective_value.is_nan());
    }

    #[test]
    fn test_multiple_optima() {
        let result = classify(&test_models::multiple_optima());
        assert_eq!(result.status, SolverStatus::OptimalMultiple);
        assert_abs_diff_eq!(result.objective_value, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_split_twin_is_not_an_alternative_optimum() {
        let result = classify(&test_models::free_variable());
        assert_eq!(result.status, SolverStatus::Optimal);
        assert_abs_diff_eq!(result.values[0], -5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.values[1], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_iteration_limit_precedes_optimality() {
        let raw = test_models::wyndor();
        let sf = normalize(&raw).unwrap();
        let state = RevisedEngine::new(PivotRule::default(), 2).solve(&sf);
        let result = StatusClassifier::default().classify(&raw, &sf, &state);

        assert_eq!(result.status, SolverStatus::IterationLimitExceeded);
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let raw = test_models::degenerate();
        let sf = normalize(&raw).unwrap();
        let state = RevisedEngine::new(PivotRule::default(), default_iteration_limit(&sf)).solve(&sf);
        let classifier = StatusClassifier::default();

        let first = classifier.classify(&raw, &sf, &state);
        let second = classifier.classify(&raw, &sf, &state);
        assert_eq!(first, second);
        assert!(first.degenerate);
    }
}
