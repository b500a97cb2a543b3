//! Small dense helpers shared by the engines and the classifier.

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `xᵀ M` for a row-major square or rectangular `M`.
pub fn vec_mat(x: &[f64], matrix: &[Vec<f64>]) -> Vec<f64> {
    let width = matrix.first().map_or(0, Vec::len);
    let mut out = vec![0.0; width];
    for (&xi, row) in x.iter().zip(matrix) {
        if xi == 0.0 {
            continue;
        }
        for (o, &m) in out.iter_mut().zip(row) {
            *o += xi * m;
        }
    }
    out
}

/// `M x` for a row-major `M`.
pub fn mat_vec(matrix: &[Vec<f64>], x: &[f64]) -> Vec<f64> {
    matrix.iter().map(|row| dot(row, x)).collect()
}

pub fn identity(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            let mut row = vec![0.0; n];
            row[i] = 1.0;
            row
        })
        .collect()
}

/// Gauss-Jordan inverse with partial pivoting.
///
/// Returns `None` when a pivot falls below `tolerance`.
pub fn invert(matrix: &[Vec<f64>], tolerance: f64) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    let mut work: Vec<Vec<f64>> = matrix.to_vec();
    let mut inverse = identity(n);

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&a, &b| work[a][col].abs().total_cmp(&work[b][col].abs()))?;
        if work[pivot_row][col].abs() <= tolerance {
            return None;
        }
        work.swap(col, pivot_row);
        inverse.swap(col, pivot_row);

        let pivot = work[col][col];
        for j in 0..n {
            work[col][j] /= pivot;
            inverse[col][j] /= pivot;
        }

        for i in 0..n {
            if i == col {
                continue;
            }
            let factor = work[i][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                work[i][j] -= factor * work[col][j];
                inverse[i][j] -= factor * inverse[col][j];
            }
        }
    }

    Some(inverse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_invert() {
        let m = vec![vec![0.0, 2.0], vec![1.0, 1.0]];
        let inv = invert(&m, 1e-12).unwrap();

        assert_abs_diff_eq!(inv[0][0], -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(inv[0][1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(inv[1][0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(inv[1][1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invert_singular() {
        let m = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(invert(&m, 1e-12).is_none());
    }

    #[test]
    fn test_products() {
        let m = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        assert_eq!(mat_vec(&m, &[1.0, 0.0, -1.0]), vec![-2.0, -2.0]);
        assert_eq!(vec_mat(&[1.0, -1.0], &m), vec![-3.0, -3.0, -3.0]);
    }
}
