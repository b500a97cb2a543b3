/// Shared tolerance for "zero" reduced costs, ratios, pivots and the phase I objective.
pub const TOLERANCE: f64 = 1e-9;

/// Row chosen by the ratio test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leaving {
    /// Row whose basic variable leaves
    pub row: usize,
    /// Step length along the entering column
    pub ratio: f64,
    /// The minimum ratio was zero or shared by several rows
    pub degenerate: bool,
}

/// Bland's rule: the smallest improving column enters, the smallest row among
/// minimum-ratio ties leaves.
///
/// Both engines consult the same rule so they walk the same sequence of bases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotRule {
    tolerance: f64,
}

impl Default for PivotRule {
    fn default() -> Self {
        Self { tolerance: TOLERANCE }
    }
}

impl PivotRule {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// First column whose reduced cost would lower the (minimized) objective.
    ///
    /// Callers pass only the columns eligible in the current phase; basic
    /// columns carry a zero reduced cost and are never picked.
    pub fn choose_entering(&self, reduced_costs: &[f64]) -> Option<usize> {
        reduced_costs.iter().position(|&d| d < -self.tolerance)
    }

    /// Minimum ratio test over rows with a positive direction entry.
    ///
    /// `values` are the current basic values and `direction` is the entering
    /// column expressed in the current basis. `None` means the entering column
    /// can be increased forever.
    pub fn choose_leaving(&self, values: &[f64], direction: &[f64]) -> Option<Leaving> {
        let mut best: Option<Leaving> = None;

        for (row, (&value, &d)) in values.iter().zip(direction).enumerate() {
            if d <= self.tolerance {
                continue;
            }
            let ratio = value.max(0.0) / d;
            let candidate = Leaving {
                row,
                ratio,
                degenerate: false,
            };
            best = match best {
                None => Some(candidate),
                Some(current) if ratio < current.ratio - self.tolerance => Some(candidate),
                Some(mut current) => {
                    if (ratio - current.ratio).abs() <= self.tolerance {
                        current.degenerate = true;
                    }
                    Some(current)
                }
            };
        }

        best.map(|mut leaving| {
            leaving.degenerate |= leaving.ratio <= self.tolerance;
            leaving
        })
    }
}
