use super::{Engine, Pivoting, TerminalState, two_phase};
use crate::linalg;
use crate::pivot::PivotRule;
use crate::standard_form::StandardFormModel;

/// Revised simplex with an explicit basis inverse.
///
/// Only the basic column indices and `B⁻¹` are kept. Reduced costs and the
/// entering direction are priced from the model on demand, and each pivot
/// updates `B⁻¹` with one eta matrix in `O(m²)`.
#[derive(Debug, Clone, Copy)]
pub struct RevisedEngine {
    rule: PivotRule,
    max_iterations: usize,
}

impl RevisedEngine {
    pub fn new(rule: PivotRule, max_iterations: usize) -> Self {
        Self { rule, max_iterations }
    }
}

impl Engine for RevisedEngine {
    fn solve(&self, model: &StandardFormModel) -> TerminalState {
        two_phase(BasisInverse::new(model, self.rule.tolerance()), model, &self.rule, self.max_iterations)
    }
}

struct BasisInverse<'a> {
    model: &'a StandardFormModel,
    basis: Vec<usize>,
    active_rows: Vec<usize>,
    /// `B⁻¹`, one row per active row
    inverse: Vec<Vec<f64>>,
    /// Costs of the current phase
    costs: Vec<f64>,
    /// `c_B`
    basic_costs: Vec<f64>,
    tolerance: f64,
}

impl<'a> BasisInverse<'a> {
    fn new(model: &'a StandardFormModel, tolerance: f64) -> Self {
        // The seeding slack and artificial columns form an identity basis
        let m = model.num_rows();
        Self {
            model,
            basis: model.initial_basis.clone(),
            active_rows: (0..m).collect(),
            inverse: linalg::identity(m),
            costs: Vec::new(),
            basic_costs: vec![0.0; m],
            tolerance,
        }
    }

    /// Column `j` of `A` restricted to the active rows.
    fn column(&self, j: usize) -> Vec<f64> {
        self.active_rows.iter().map(|&i| self.model.a[i][j]).collect()
    }

    fn rhs(&self) -> Vec<f64> {
        self.active_rows.iter().map(|&i| self.model.b[i]).collect()
    }

    fn refresh_basic_costs(&mut self) {
        self.basic_costs = self.basis.iter().map(|&j| self.costs.get(j).copied().unwrap_or(0.0)).collect();
    }

    /// Recompute `B⁻¹` from scratch for the current basis.
    fn refactor(&mut self) {
        let matrix: Vec<Vec<f64>> = self
            .active_rows
            .iter()
            .map(|&i| self.basis.iter().map(|&j| self.model.a[i][j]).collect())
            .collect();

        match linalg::invert(&matrix, self.tolerance) {
            Some(inverse) => self.inverse = inverse,
            None => panic!("basis {:?} over rows {:?} is singular", self.basis, self.active_rows),
        }
    }
}

impl Pivoting for BasisInverse<'_> {
    fn start_phase(&mut self, costs: &[f64]) {
        self.costs = costs.to_vec();
        self.refresh_basic_costs();
    }

    fn reduced_costs(&self) -> Vec<f64> {
        // Simplex multipliers yᵀ = c_Bᵀ B⁻¹
        let y = linalg::vec_mat(&self.basic_costs, &self.inverse);

        let mut reduced: Vec<f64> = (0..self.costs.len())
            .map(|j| self.costs[j] - linalg::dot(&y, &self.column(j)))
            .collect();
        for &basic in &self.basis {
            if let Some(d) = reduced.get_mut(basic) {
                *d = 0.0;
            }
        }
        reduced
    }

    fn objective(&self) -> f64 {
        linalg::dot(&self.basic_costs, &self.values())
    }

    fn values(&self) -> Vec<f64> {
        linalg::mat_vec(&self.inverse, &self.rhs())
    }

    fn direction(&self, column: usize) -> Vec<f64> {
        linalg::mat_vec(&self.inverse, &self.column(column))
    }

    fn pivot(&mut self, row: usize, column: usize, direction: &[f64]) {
        let pivot_val = direction[row];
        assert!(
            pivot_val.abs() > self.tolerance,
            "singular pivot {} at row {}, column {}",
            pivot_val,
            row,
            column
        );

        // B⁻¹ ← E B⁻¹ with the eta matrix E built from the direction
        let pivot_row: Vec<f64> = self.inverse[row].iter().map(|v| v / pivot_val).collect();
        for (i, inv_row) in self.inverse.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = direction[i];
            if factor == 0.0 {
                continue;
            }
            for (v, &p) in inv_row.iter_mut().zip(&pivot_row) {
                *v -= factor * p;
            }
        }
        self.inverse[row] = pivot_row;

        self.basis[row] = column;
        self.basic_costs[row] = self.costs.get(column).copied().unwrap_or(0.0);
    }

    fn basis_row(&self, row: usize, width: usize) -> Vec<f64> {
        (0..width).map(|j| linalg::dot(&self.inverse[row], &self.column(j))).collect()
    }

    fn remove_row(&mut self, row: usize, constraint: usize) {
        // B⁻¹ rows follow basis positions, its columns follow active rows
        self.basis.remove(row);
        self.active_rows.retain(|&i| i != constraint);
        self.refresh_basic_costs();
        self.refactor();
    }

    fn basis(&self) -> &[usize] {
        &self.basis
    }

    fn active_rows(&self) -> &[usize] {
        &self.active_rows
    }
}
