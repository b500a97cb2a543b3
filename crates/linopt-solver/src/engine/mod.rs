//! Two-phase simplex engines.
//!
//! [`TableauEngine`] keeps the whole Gauss-Jordan tableau, [`RevisedEngine`]
//! keeps only the basis and its inverse. Both drive the same two-phase
//! loop and consult the same [`PivotRule`], so on a given model they visit the
//! same bases and stop in the same [`TerminalState`].

mod revised;
mod tableau;

pub use revised::RevisedEngine;
pub use tableau::TableauEngine;

use crate::pivot::PivotRule;
use crate::standard_form::StandardFormModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Minimizing the sum of artificial columns
    One,
    /// Minimizing the real objective
    Two,
}

/// Why the last phase stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// No column improves the objective
    NoEntering,
    /// The entering column has no positive entry
    NoLeaving,
    /// The pivot budget ran out
    IterationLimit,
}

/// Algebraic state left behind by an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalState {
    /// Phase that was running when the engine stopped
    pub phase: Phase,
    pub exit: Exit,
    /// Phase I optimum, zero when phase I was skipped
    pub phase_one_objective: f64,
    /// Internal (minimized) objective of the last phase
    pub objective: f64,
    /// Basic column of each active row
    pub basis: Vec<usize>,
    /// Standard form rows still in play; redundant rows are dropped after phase I
    pub active_rows: Vec<usize>,
    /// Value of every standard form column
    pub column_values: Vec<f64>,
    /// Reduced cost of every column eligible in the last phase, zero on basic columns
    pub reduced_costs: Vec<f64>,
    /// Pivots performed, including those expelling artificials
    pub iterations: usize,
    /// A pivot had a zero or tied minimum ratio
    pub degenerate: bool,
    /// Internal objective after each phase II pivot
    pub objective_trace: Vec<TraceStep>,
}

/// One phase II pivot as seen by the objective.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceStep {
    /// Internal objective after the pivot
    pub objective: f64,
    /// The pivot had a zero or tied minimum ratio
    pub degenerate: bool,
}

/// A simplex implementation over a standard form model.
pub trait Engine {
    fn solve(&self, model: &StandardFormModel) -> TerminalState;
}

/// Bookkeeping primitives an engine exposes to the two-phase driver.
///
/// Rows are indexed by position in the current basis, columns by standard
/// form column index.
trait Pivoting {
    /// Install the objective of a new phase. Columns past `costs.len()` stop
    /// being candidates.
    fn start_phase(&mut self, costs: &[f64]);
    fn reduced_costs(&self) -> Vec<f64>;
    fn objective(&self) -> f64;
    /// Current values of the basic variables
    fn values(&self) -> Vec<f64>;
    /// `column` expressed in the current basis
    fn direction(&self, column: usize) -> Vec<f64>;
    fn pivot(&mut self, row: usize, column: usize, direction: &[f64]);
    /// Entries of basis row `row` for columns `0..width`
    fn basis_row(&self, row: usize, width: usize) -> Vec<f64>;
    /// Drop basis position `row` together with standard form row `constraint`.
    ///
    /// The two differ once an artificial has left the basis and re-entered
    /// at another position.
    fn remove_row(&mut self, row: usize, constraint: usize);
    fn basis(&self) -> &[usize];
    fn active_rows(&self) -> &[usize];
}

#[derive(Debug, Default)]
struct Run {
    iterations: usize,
    degenerate: bool,
    objective_trace: Vec<TraceStep>,
}

impl Run {
    fn iterate<S: Pivoting>(&mut self, state: &mut S, rule: &PivotRule, max_iterations: usize, phase: Phase) -> Exit {
        loop {
            let Some(column) = rule.choose_entering(&state.reduced_costs()) else {
                return Exit::NoEntering;
            };
            if self.iterations >= max_iterations {
                return Exit::IterationLimit;
            }

            let direction = state.direction(column);
            let Some(leaving) = rule.choose_leaving(&state.values(), &direction) else {
                log::debug!("{:?}: column {} has no leaving row", phase, column);
                return Exit::NoLeaving;
            };

            log::trace!(
                "{:?} pivot {}: column {} enters, row {} (column {}) leaves, ratio {}{}",
                phase,
                self.iterations,
                column,
                leaving.row,
                state.basis()[leaving.row],
                leaving.ratio,
                if leaving.degenerate { " (degenerate)" } else { "" }
            );

            self.degenerate |= leaving.degenerate;
            state.pivot(leaving.row, column, &direction);
            self.iterations += 1;

            if phase == Phase::Two {
                self.objective_trace.push(TraceStep {
                    objective: state.objective(),
                    degenerate: leaving.degenerate,
                });
            }
        }
    }

    /// Pivot every artificial still basic at level zero onto a real column, or
    /// drop the row it seeded when no real column reaches it.
    fn drive_out_artificials<S: Pivoting>(&mut self, state: &mut S, model: &StandardFormModel, tolerance: f64) {
        let mut row = 0;
        while row < state.basis().len() {
            let Some(constraint) = model.artificial_row(state.basis()[row]) else {
                row += 1;
                continue;
            };

            let entries = state.basis_row(row, model.artificial_start);
            match entries.iter().position(|e| e.abs() > tolerance) {
                Some(column) => {
                    log::debug!("expelling artificial {} from row {} via column {}", state.basis()[row], row, column);
                    let direction = state.direction(column);
                    state.pivot(row, column, &direction);
                    self.iterations += 1;
                    self.degenerate = true;
                    row += 1;
                }
                None => {
                    // The artificial's own row is a combination of the others
                    log::debug!("dropping redundant row {} (basis position {})", constraint, row);
                    state.remove_row(row, constraint);
                }
            }
        }
    }

    fn finish<S: Pivoting>(self, state: &S, model: &StandardFormModel, phase: Phase, exit: Exit, phase_one_objective: f64) -> TerminalState {
        let mut column_values = vec![0.0; model.num_columns()];
        for (&column, value) in state.basis().iter().zip(state.values()) {
            column_values[column] = value;
        }

        log::debug!(
            "{:?} stopped with {:?} after {} iterations, objective {}",
            phase,
            exit,
            self.iterations,
            state.objective()
        );

        TerminalState {
            phase,
            exit,
            phase_one_objective,
            objective: state.objective(),
            basis: state.basis().to_vec(),
            active_rows: state.active_rows().to_vec(),
            column_values,
            reduced_costs: state.reduced_costs(),
            iterations: self.iterations,
            degenerate: self.degenerate,
            objective_trace: self.objective_trace,
        }
    }
}

/// Run phase I (when artificials exist) and phase II on `state`.
fn two_phase<S: Pivoting>(mut state: S, model: &StandardFormModel, rule: &PivotRule, max_iterations: usize) -> TerminalState {
    let mut run = Run::default();
    let mut phase_one_objective = 0.0;

    if model.has_artificial() {
        log::debug!("phase I over {} artificial columns", model.num_columns() - model.artificial_start);
        state.start_phase(&model.phase_one_costs());

        let exit = run.iterate(&mut state, rule, max_iterations, Phase::One);
        phase_one_objective = state.objective();
        match exit {
            Exit::NoEntering => {}
            Exit::IterationLimit => {
                return run.finish(&state, model, Phase::One, exit, phase_one_objective);
            }
            Exit::NoLeaving => {
                // Every entry of the entering column is below tolerance: phase I stalled
                log::warn!("phase I stalled at objective {}", phase_one_objective);
                return run.finish(&state, model, Phase::One, exit, phase_one_objective);
            }
        }

        if phase_one_objective > rule.tolerance() {
            log::debug!("phase I optimum {} is positive", phase_one_objective);
            return run.finish(&state, model, Phase::One, exit, phase_one_objective);
        }
        run.drive_out_artificials(&mut state, model, rule.tolerance());
    }

    state.start_phase(&model.c[..model.artificial_start]);
    let exit = run.iterate(&mut state, rule, max_iterations, Phase::Two);
    run.finish(&state, model, Phase::Two, exit, phase_one_objective)
}

/// Default pivot budget for a model: `200·(m+n)`.
pub fn default_iteration_limit(model: &StandardFormModel) -> usize {
    200 * (model.num_rows() + model.num_columns())
}
