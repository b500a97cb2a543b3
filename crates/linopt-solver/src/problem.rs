use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::solution::ConstraintViolation;

/// A linear program in the form a model parser produces it.
///
/// Constraints may use any relation, right-hand sides may be negative and
/// variables may be restricted to either sign or left free. The solver never
/// mutates a `RawModel`; it is normalized into a standard form model first.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RawModel {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
    /// Sign domain of each variable
    pub signs: Vec<Sign>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Whether to minimize or maximize
    pub direction: Direction,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub relation: Relation,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sign {
    /// x >= 0
    #[default]
    NonNegative,
    /// x <= 0
    NonPositive,
    /// Unrestricted in sign
    Free,
}

impl Direction {
    /// Multiplier that turns this direction's objective into a minimization.
    pub fn factor(self) -> f64 {
        match self {
            Direction::Maximize => -1.0,
            Direction::Minimize => 1.0,
        }
    }
}

impl Relation {
    /// The relation that holds after multiplying both sides by -1.
    pub fn flipped(self) -> Self {
        match self {
            Relation::Le => Relation::Ge,
            Relation::Ge => Relation::Le,
            Relation::Eq => Relation::Eq,
        }
    }
}

impl FromStr for Direction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" | "maximize" | "maximise" => Ok(Direction::Maximize),
            "min" | "minimize" | "minimise" => Ok(Direction::Minimize),
            _ => Err(ValidationError::UnknownDirection(s.to_string())),
        }
    }
}

impl FromStr for Relation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "<=" | "≤" | "le" => Ok(Relation::Le),
            ">=" | "≥" | "ge" => Ok(Relation::Ge),
            "=" | "==" | "eq" => Ok(Relation::Eq),
            _ => Err(ValidationError::UnknownRelation(s.to_string())),
        }
    }
}

impl FromStr for Sign {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nonnegative" | "nonneg" | ">=0" | "≥0" => Ok(Sign::NonNegative),
            "nonpositive" | "nonpos" | "<=0" | "≤0" => Ok(Sign::NonPositive),
            "free" | "unrestricted" => Ok(Sign::Free),
            _ => Err(ValidationError::UnknownSign(s.to_string())),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "=",
        };
        f.write_str(symbol)
    }
}

impl RawModel {
    /// An empty minimization over nonnegative variables.
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                direction: Direction::Minimize,
                coefficients: vec![0.0; n],
            },
            constraints: Vec::new(),
            signs: vec![Sign::NonNegative; n],
        }
    }

    pub fn set_objective(&mut self, direction: Direction, coefficients: Vec<f64>) {
        self.objective = Objective { direction, coefficients };
    }

    pub fn maximize(&mut self, coefficients: Vec<f64>) {
        self.set_objective(Direction::Maximize, coefficients);
    }

    pub fn minimize(&mut self, coefficients: Vec<f64>) {
        self.set_objective(Direction::Minimize, coefficients);
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, relation: Relation, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            relation,
            rhs,
        });
    }

    /// Restrict the sign of variable `var`. Out-of-range indices are ignored.
    pub fn set_sign(&mut self, var: usize, sign: Sign) {
        if let Some(slot) = self.signs.get_mut(var) {
            *slot = sign;
        }
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Check dimensions and numbers before any pivoting happens.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let n = self.num_variables();

        if self.objective.coefficients.len() != n {
            return Err(ValidationError::ObjectiveWidth {
                expected: n,
                found: self.objective.coefficients.len(),
            });
        }
        if self.signs.len() != n {
            return Err(ValidationError::SignWidth {
                expected: n,
                found: self.signs.len(),
            });
        }
        if self.objective.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ValidationError::NonFinite {
                location: "objective".to_string(),
            });
        }

        for (row, c) in self.constraints.iter().enumerate() {
            if c.coefficients.len() != n {
                return Err(ValidationError::RowWidth {
                    row,
                    expected: n,
                    found: c.coefficients.len(),
                });
            }
            if !c.rhs.is_finite() || c.coefficients.iter().any(|a| !a.is_finite()) {
                return Err(ValidationError::NonFinite {
                    location: format!("constraint {}", c.name),
                });
            }
        }

        Ok(())
    }

    /// Objective value of `values` in the model's own direction.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(values)
            .map(|(c, x)| c * x)
            .sum()
    }

    /// Every constraint and sign restriction that `values` breaks by more than `tolerance`.
    ///
    /// The worst violation comes first.
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();

        for c in &self.constraints {
            let lhs: f64 = c.coefficients.iter().zip(values).map(|(a, x)| a * x).sum();

            let violation_amount = match c.relation {
                Relation::Le => lhs - c.rhs,
                Relation::Ge => c.rhs - lhs,
                Relation::Eq => (lhs - c.rhs).abs(),
            };
            if violation_amount > tolerance {
                violations.push(ConstraintViolation {
                    constraint: c.name.clone(),
                    required: c.rhs,
                    actual: lhs,
                    violation_amount,
                    description: format!(
                        "{} requires {} {:.4} but got {:.4}",
                        c.name, c.relation, c.rhs, lhs
                    ),
                });
            }
        }

        for ((name, sign), &x) in self.variables.iter().zip(&self.signs).zip(values) {
            let violation_amount = match sign {
                Sign::NonNegative => -x,
                Sign::NonPositive => x,
                Sign::Free => continue,
            };
            if violation_amount > tolerance {
                violations.push(ConstraintViolation {
                    constraint: name.clone(),
                    required: 0.0,
                    actual: x,
                    violation_amount,
                    description: format!("{} must be {:?} but is {:.4}", name, sign, x),
                });
            }
        }

        violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("x{}", i)).collect()
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!("<=".parse::<Relation>().unwrap(), Relation::Le);
        assert_eq!("≥".parse::<Relation>().unwrap(), Relation::Ge);
        assert_eq!(" EQ ".parse::<Relation>().unwrap(), Relation::Eq);
        assert_eq!("free".parse::<Sign>().unwrap(), Sign::Free);
        assert_eq!("Maximize".parse::<Direction>().unwrap(), Direction::Maximize);

        assert_eq!(
            "<>".parse::<Relation>(),
            Err(ValidationError::UnknownRelation("<>".to_string()))
        );
        assert!(matches!("positive-ish".parse::<Sign>(), Err(ValidationError::UnknownSign(_))));
        assert!(matches!("optimize".parse::<Direction>(), Err(ValidationError::UnknownDirection(_))));
    }

    #[test]
    fn test_validate_row_width() {
        let mut model = RawModel::new(names(2));
        model.add_constraint("ok", vec![1.0, 1.0], Relation::Le, 1.0);
        model.add_constraint("short", vec![1.0], Relation::Le, 1.0);

        assert_eq!(
            model.validate(),
            Err(ValidationError::RowWidth { row: 1, expected: 2, found: 1 })
        );
    }

    #[test]
    fn test_validate_objective_and_numbers() {
        let mut model = RawModel::new(names(2));
        model.maximize(vec![1.0]);
        assert!(matches!(model.validate(), Err(ValidationError::ObjectiveWidth { .. })));

        model.maximize(vec![1.0, f64::NAN]);
        assert!(matches!(model.validate(), Err(ValidationError::NonFinite { .. })));

        model.maximize(vec![1.0, 2.0]);
        model.signs.pop();
        assert!(matches!(model.validate(), Err(ValidationError::SignWidth { .. })));
    }

    #[test]
    fn test_violations() {
        let mut model = RawModel::new(names(2));
        model.set_sign(1, Sign::Free);
        model.add_constraint("cap", vec![1.0, 1.0], Relation::Le, 4.0);
        model.add_constraint("floor", vec![1.0, 0.0], Relation::Ge, 1.0);
        model.add_constraint("fixed", vec![0.0, 1.0], Relation::Eq, -1.0);

        assert!(model.violations(&[2.0, -1.0], 1e-9).is_empty());

        let violations = model.violations(&[-3.0, 8.0], 1e-9);
        let broken: Vec<&str> = violations.iter().map(|v| v.constraint.as_str()).collect();
        assert_eq!(broken, vec!["fixed", "floor", "x0", "cap"]);
        assert!((violations[0].violation_amount - 9.0).abs() < 1e-12);
    }
}
