use crate::error::ValidationError;
use crate::problem::{Direction, RawModel, Relation, Sign};

/// Where a standard form column comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// Original nonnegative variable, taken as is
    Direct(usize),
    /// Original nonpositive variable `x = -x'`
    Negated(usize),
    /// Positive half of a free variable `x = x⁺ - x⁻`
    SplitPositive(usize),
    /// Negative half of a free variable
    SplitNegative(usize),
    /// Slack of a `<=` row
    Slack(usize),
    /// Surplus of a `>=` row
    Surplus(usize),
    /// Artificial seeding the basis of a `>=` or `=` row
    Artificial(usize),
}

impl ColumnSource {
    /// Original variable and the multiplier that maps this column's value onto it.
    pub fn original(self) -> Option<(usize, f64)> {
        match self {
            ColumnSource::Direct(var) | ColumnSource::SplitPositive(var) => Some((var, 1.0)),
            ColumnSource::Negated(var) | ColumnSource::SplitNegative(var) => Some((var, -1.0)),
            ColumnSource::Slack(_) | ColumnSource::Surplus(_) | ColumnSource::Artificial(_) => None,
        }
    }
}

/// `min cᵀx  s.t.  Ax = b, x >= 0, b >= 0`, plus the bookkeeping needed to
/// map a solution back onto the raw model.
///
/// Columns are laid out as structural columns (in variable order, two per free
/// variable), then one slack or surplus column per inequality row, then one
/// artificial column per `>=` or `=` row. Artificials therefore occupy the
/// tail `artificial_start..num_columns()`.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardFormModel {
    /// Row-major constraint matrix, `m` rows by `n` columns
    pub a: Vec<Vec<f64>>,
    /// Right-hand sides, all nonnegative
    pub b: Vec<f64>,
    /// Costs of the minimization, zero on auxiliary columns
    pub c: Vec<f64>,
    /// Provenance of every column
    pub columns: Vec<ColumnSource>,
    /// Slack or artificial column seeding each row
    pub initial_basis: Vec<usize>,
    /// First artificial column
    pub artificial_start: usize,
    /// Direction of the raw objective
    pub direction: Direction,
    /// Rows multiplied by -1 because their right-hand side was negative
    pub flipped_rows: Vec<bool>,
    /// Number of variables in the raw model
    pub num_original: usize,
}

impl StandardFormModel {
    pub fn num_rows(&self) -> usize {
        self.b.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_artificial(&self, column: usize) -> bool {
        column >= self.artificial_start
    }

    pub fn has_artificial(&self) -> bool {
        self.artificial_start < self.num_columns()
    }

    /// Row seeded by an artificial column.
    pub fn artificial_row(&self, column: usize) -> Option<usize> {
        match self.columns.get(column)? {
            ColumnSource::Artificial(row) => Some(*row),
            _ => None,
        }
    }

    /// The other half of a split free variable.
    pub fn twin(&self, column: usize) -> Option<usize> {
        match self.columns.get(column)? {
            ColumnSource::SplitPositive(_) => Some(column + 1),
            ColumnSource::SplitNegative(_) => column.checked_sub(1),
            _ => None,
        }
    }

    /// Phase I costs: one on every artificial column, zero elsewhere.
    pub fn phase_one_costs(&self) -> Vec<f64> {
        (0..self.num_columns())
            .map(|j| if self.is_artificial(j) { 1.0 } else { 0.0 })
            .collect()
    }

    /// Combine standard form column values into original variable values.
    pub fn back_map(&self, column_values: &[f64]) -> Vec<f64> {
        let mut values = vec![0.0; self.num_original];
        for (source, &x) in self.columns.iter().zip(column_values) {
            if let Some((var, factor)) = source.original() {
                values[var] += factor * x;
            }
        }
        values
    }
}

/// Convert an arbitrary-form model into standard form.
pub fn normalize(raw: &RawModel) -> Result<StandardFormModel, ValidationError> {
    raw.validate()?;

    let direction = raw.objective.direction;
    let factor = direction.factor();

    // Structural columns
    let mut columns = Vec::new();
    let mut c = Vec::new();
    for (var, (&sign, &cost)) in raw.signs.iter().zip(&raw.objective.coefficients).enumerate() {
        let cost = factor * cost;
        match sign {
            Sign::NonNegative => {
                columns.push(ColumnSource::Direct(var));
                c.push(cost);
            }
            Sign::NonPositive => {
                columns.push(ColumnSource::Negated(var));
                c.push(-cost);
            }
            Sign::Free => {
                columns.push(ColumnSource::SplitPositive(var));
                c.push(cost);
                columns.push(ColumnSource::SplitNegative(var));
                c.push(-cost);
            }
        }
    }
    let n_structural = columns.len();

    // Rows with nonnegative right-hand sides
    let mut rows = Vec::with_capacity(raw.num_constraints());
    let mut b = Vec::with_capacity(raw.num_constraints());
    let mut relations = Vec::with_capacity(raw.num_constraints());
    let mut flipped_rows = Vec::with_capacity(raw.num_constraints());
    for constraint in &raw.constraints {
        let flip = constraint.rhs < 0.0;
        let row_factor = if flip { -1.0 } else { 1.0 };

        let mut row = Vec::with_capacity(n_structural);
        for source in &columns {
            let Some((var, column_factor)) = source.original() else {
                continue;
            };
            row.push(row_factor * column_factor * constraint.coefficients[var]);
        }

        rows.push(row);
        b.push(row_factor * constraint.rhs);
        relations.push(if flip { constraint.relation.flipped() } else { constraint.relation });
        flipped_rows.push(flip);
    }

    let n_slack = relations.iter().filter(|r| **r != Relation::Eq).count();
    let n_artificial = relations.iter().filter(|r| **r != Relation::Le).count();
    let artificial_start = n_structural + n_slack;
    let n_columns = artificial_start + n_artificial;

    for row in &mut rows {
        row.resize(n_columns, 0.0);
    }

    // Slack, surplus and artificial columns
    let mut initial_basis = vec![0; rows.len()];
    let mut slack_idx = n_structural;
    let mut artificial_idx = artificial_start;
    for (i, relation) in relations.iter().enumerate() {
        match relation {
            Relation::Le => {
                rows[i][slack_idx] = 1.0;
                initial_basis[i] = slack_idx;
                slack_idx += 1;
            }
            Relation::Ge => {
                rows[i][slack_idx] = -1.0;
                slack_idx += 1;
                rows[i][artificial_idx] = 1.0;
                initial_basis[i] = artificial_idx;
                artificial_idx += 1;
            }
            Relation::Eq => {
                rows[i][artificial_idx] = 1.0;
                initial_basis[i] = artificial_idx;
                artificial_idx += 1;
            }
        }
    }

    for (i, relation) in relations.iter().enumerate() {
        if *relation == Relation::Eq {
            continue;
        }
        columns.push(match relation {
            Relation::Le => ColumnSource::Slack(i),
            _ => ColumnSource::Surplus(i),
        });
    }
    for (i, relation) in relations.iter().enumerate() {
        if *relation != Relation::Le {
            columns.push(ColumnSource::Artificial(i));
        }
    }
    c.resize(n_columns, 0.0);

    log::debug!(
        "normalized {}x{} model into {}x{} standard form ({} artificial)",
        raw.num_constraints(),
        raw.num_variables(),
        rows.len(),
        n_columns,
        n_artificial
    );

    Ok(StandardFormModel {
        a: rows,
        b,
        c,
        columns,
        initial_basis,
        artificial_start,
        direction,
        flipped_rows,
        num_original: raw.num_variables(),
    })
}
