use super::{Engine, Pivoting, TerminalState, two_phase};
use crate::pivot::PivotRule;
use crate::standard_form::StandardFormModel;

/// Full-tableau simplex.
///
/// Every pivot is a Gauss-Jordan step over all `m` rows and the reduced cost
/// row, `O(m·n)` per iteration.
#[derive(Debug, Clone, Copy)]
pub struct TableauEngine {
    rule: PivotRule,
    max_iterations: usize,
}

impl TableauEngine {
    pub fn new(rule: PivotRule, max_iterations: usize) -> Self {
        Self { rule, max_iterations }
    }
}

impl Engine for TableauEngine {
    fn solve(&self, model: &StandardFormModel) -> TerminalState {
        two_phase(Tableau::new(model, self.rule.tolerance()), model, &self.rule, self.max_iterations)
    }
}

/// `m` constraint rows and one reduced cost row, each with the right-hand
/// side in the last column.
struct Tableau {
    rows: Vec<Vec<f64>>,
    /// Reduced costs; the last entry is minus the objective
    cost: Vec<f64>,
    basis: Vec<usize>,
    active_rows: Vec<usize>,
    tolerance: f64,
}

impl Tableau {
    fn new(model: &StandardFormModel, tolerance: f64) -> Self {
        let rows = model
            .a
            .iter()
            .zip(&model.b)
            .map(|(row, &rhs)| {
                let mut row = row.clone();
                row.push(rhs);
                row
            })
            .collect();

        Self {
            rows,
            cost: vec![0.0; model.num_columns() + 1],
            basis: model.initial_basis.clone(),
            active_rows: (0..model.num_rows()).collect(),
            tolerance,
        }
    }

    fn width(&self) -> usize {
        self.cost.len()
    }

    fn rhs_col(&self) -> usize {
        self.width() - 1
    }
}

impl Pivoting for Tableau {
    fn start_phase(&mut self, costs: &[f64]) {
        // Columns past the phase's costs (artificials in phase II) are deleted outright
        let n_cols = costs.len();
        if self.rhs_col() > n_cols {
            let rhs_col = self.rhs_col();
            for row in &mut self.rows {
                row.drain(n_cols..rhs_col);
            }
            self.cost.truncate(n_cols + 1);
        }

        let rhs_col = self.rhs_col();
        self.cost[..n_cols].copy_from_slice(costs);
        self.cost[rhs_col] = 0.0;
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            let c_b = costs[basic];
            if c_b == 0.0 {
                continue;
            }
            for (d, &t) in self.cost.iter_mut().zip(row) {
                *d -= c_b * t;
            }
        }
        for &basic in &self.basis {
            self.cost[basic] = 0.0;
        }
    }

    fn reduced_costs(&self) -> Vec<f64> {
        self.cost[..self.rhs_col()].to_vec()
    }

    fn objective(&self) -> f64 {
        -self.cost[self.rhs_col()]
    }

    fn values(&self) -> Vec<f64> {
        let rhs_col = self.rhs_col();
        self.rows.iter().map(|row| row[rhs_col]).collect()
    }

    fn direction(&self, column: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[column]).collect()
    }

    fn pivot(&mut self, row: usize, column: usize, _direction: &[f64]) {
        let pivot_val = self.rows[row][column];
        assert!(
            pivot_val.abs() > self.tolerance,
            "singular pivot {} at row {}, column {}",
            pivot_val,
            row,
            column
        );

        self.basis[row] = column;

        // Scale pivot row
        for t in &mut self.rows[row] {
            *t /= pivot_val;
        }
        self.rows[row][column] = 1.0;

        // Eliminate column in other rows and in the cost row
        let pivot_row = std::mem::take(&mut self.rows[row]);
        for other in self.rows.iter_mut().chain(std::iter::once(&mut self.cost)) {
            if other.is_empty() {
                continue;
            }
            let factor = other[column];
            if factor == 0.0 {
                continue;
            }
            for (t, &p) in other.iter_mut().zip(&pivot_row) {
                *t -= factor * p;
            }
            other[column] = 0.0;
        }
        self.rows[row] = pivot_row;
    }

    fn basis_row(&self, row: usize, width: usize) -> Vec<f64> {
        self.rows[row][..width].to_vec()
    }

    fn remove_row(&mut self, row: usize, constraint: usize) {
        self.rows.remove(row);
        self.basis.remove(row);
        self.active_rows.retain(|&i| i != constraint);
    }

    fn basis(&self) -> &[usize] {
        &self.basis
    }

    fn active_rows(&self) -> &[usize] {
        &self.active_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_models;
    use crate::engine::{Exit, Phase, default_iteration_limit};
    use crate::problem::{RawModel, Relation};
    use crate::standard_form::normalize;
    use approx::assert_abs_diff_eq;

    fn run(model: &RawModel) -> (StandardFormModel, TerminalState) {
        let sf = normalize(model).unwrap();
        let engine = TableauEngine::new(PivotRule::default(), default_iteration_limit(&sf));
        let state = engine.solve(&sf);
        (sf, state)
    }

    #[test]
    fn test_wyndor_terminal_state() {
        let (sf, state) = run(&test_models::wyndor());

        assert_eq!(state.phase, Phase::Two);
        assert_eq!(state.exit, Exit::NoEntering);
        assert_eq!(state.phase_one_objective, 0.0);
        assert_abs_diff_eq!(state.objective, -36.0, epsilon = 1e-9);

        let values = sf.back_map(&state.column_values);
        assert_abs_diff_eq!(values[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(values[1], 6.0, epsilon = 1e-9);
        assert!(state.basis.iter().all(|&j| !sf.is_artificial(j)));
    }

    #[test]
    fn test_infeasible_stops_in_phase_one() {
        let (_, state) = run(&test_models::infeasible());

        assert_eq!(state.phase, Phase::One);
        assert_eq!(state.exit, Exit::NoEntering);
        assert_abs_diff_eq!(state.phase_one_objective, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unbounded_has_no_leaving_row() {
        let (_, state) = run(&test_models::unbounded());

        assert_eq!(state.phase, Phase::Two);
        assert_eq!(state.exit, Exit::NoLeaving);
    }

    #[test]
    fn test_artificial_columns_are_deleted_for_phase_two() {
        let (sf, state) = run(&test_models::minimization_with_ge());

        assert!(sf.has_artificial());
        assert_eq!(state.reduced_costs.len(), sf.artificial_start);
        assert_abs_diff_eq!(state.objective, 9.0, epsilon = 1e-9);
    }

    #[test]
    fn test_redundant_rows_are_dropped() {
        let (sf, state) = run(&test_models::redundant_equalities());

        assert_eq!(state.active_rows, vec![0]);
        assert_eq!(state.basis, vec![0]);
        assert!(state.degenerate);
        assert_eq!(sf.back_map(&state.column_values), vec![2.0, 0.0]);
    }

    #[test]
    fn test_redundant_row_follows_artificial_provenance() {
        // The first row's artificial re-enters at position 3; row 0 is the one dropped
        let (_, state) = run(&test_models::reentered_artificial());

        assert_eq!(state.phase, Phase::Two);
        assert_eq!(state.exit, Exit::NoEntering);
        assert_eq!(state.active_rows, vec![1, 2, 3]);
        assert_eq!(state.basis, vec![1, 2, 3]);
        assert_abs_diff_eq!(state.objective, -3.0, epsilon = 1e-9);

        let (_, state) = run(&test_models::reentered_artificial_unbounded());
        assert_eq!(state.exit, Exit::NoLeaving);
        assert_eq!(state.active_rows, vec![1, 2, 3]);
    }

    #[test]
    fn test_phase_one_stall() {
        // Every direction entry sits under a coarse tolerance while the reduced cost does not
        let mut model = RawModel::new(vec!["x".to_string()]);
        for name in ["a", "b", "c"] {
            model.add_constraint(name, vec![0.4], Relation::Eq, 0.4);
        }
        let sf = normalize(&model).unwrap();
        let state = TableauEngine::new(PivotRule::new(0.5), 100).solve(&sf);

        assert_eq!(state.phase, Phase::One);
        assert_eq!(state.exit, Exit::NoLeaving);
        assert_eq!(state.iterations, 0);
        assert_abs_diff_eq!(state.phase_one_objective, 1.2, epsilon = 1e-9);
    }

    #[test]
    fn test_iteration_limit() {
        let sf = normalize(&test_models::wyndor()).unwrap();
        let state = TableauEngine::new(PivotRule::default(), 1).solve(&sf);

        assert_eq!(state.exit, Exit::IterationLimit);
        assert_eq!(state.iterations, 1);
    }
}
