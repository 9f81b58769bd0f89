//! Dense linear algebra used by the estimators.
//!
//! Only what the regressions need: a pivoted Gaussian elimination for the
//! symmetric positive (semi-)definite ridge systems, and a one-sided Jacobi
//! SVD that backs the minimum-norm least squares solver.

use ndarray::{s, Zip};

use crate::error::{check_samples, Error, Result};
use crate::{Matrix, Vector};

const MAX_SWEEPS: usize = 60;

/// Solves `a · x = b` by Gaussian elimination with partial pivoting.
pub fn solve(a: &Matrix, b: &Vector) -> Result<Vector> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(Error::invalid(format!(
            "expected a square system, got {}x{}",
            n,
            a.ncols()
        )));
    }
    check_samples(n, b.len())?;

    let mut aug = Matrix::zeros((n, n + 1));
    aug.slice_mut(s![.., ..n]).assign(a);
    aug.column_mut(n).assign(b);

    let scale = a.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let threshold = scale * f64::EPSILON * n as f64;

    for i in 0..n {
        let mut max_row = i;
        for k in (i + 1)..n {
            if aug[(k, i)].abs() > aug[(max_row, i)].abs() {
                max_row = k;
            }
        }

        if aug[(max_row, i)].abs() <= threshold {
            return Err(Error::Singular);
        }

        if max_row != i {
            for j in 0..=n {
                aug.swap((i, j), (max_row, j));
            }
        }

        for k in (i + 1)..n {
            let factor = aug[(k, i)] / aug[(i, i)];
            if factor == 0.0 {
                continue;
            }
            for j in i..=n {
                aug[(k, j)] -= factor * aug[(i, j)];
            }
        }
    }

    let mut x = Vector::zeros(n);
    for i in (0..n).rev() {
        x[i] = aug[(i, n)];
        for j in (i + 1)..n {
            x[i] -= aug[(i, j)] * x[j];
        }
        x[i] /= aug[(i, i)];
    }

    Ok(x)
}

/// Thin singular value decomposition `a = u · diag(singular_values) · vᵀ`.
///
/// `u` is `n_rows x n_cols`, `v` is `n_cols x n_cols`, singular values are
/// sorted in decreasing order. Columns of `u` belonging to zero singular
/// values are left as zero vectors.
#[derive(Clone, Debug)]
pub struct Svd {
    pub u: Matrix,
    pub singular_values: Vector,
    pub v: Matrix,
}

/// One-sided (Hestenes) Jacobi SVD.
pub fn svd(a: &Matrix) -> Svd {
    let (m, n) = a.dim();

    // Rows of `w` are the columns of `a`; rotating rows keeps memory contiguous.
    let mut w = Matrix::zeros((n, m));
    w.assign(&a.t());
    let mut vt = Matrix::eye(n);

    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;

        for p in 0..n {
            for q in (p + 1)..n {
                let alpha = w.row(p).dot(&w.row(p));
                let beta = w.row(q).dot(&w.row(q));
                let gamma = w.row(p).dot(&w.row(q));

                if gamma == 0.0 || gamma.abs() <= f64::EPSILON * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let cos = 1.0 / (1.0 + t * t).sqrt();
                let sin = cos * t;

                rotate_rows(&mut w, p, q, cos, sin);
                rotate_rows(&mut vt, p, q, cos, sin);
            }
        }

        if !rotated {
            break;
        }
    }

    let norms: Vec<f64> = w.rows().into_iter().map(|row| row.dot(&row).sqrt()).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| norms[j].total_cmp(&norms[i]));

    let mut u = Matrix::zeros((m, n));
    let mut v = Matrix::zeros((n, n));
    let mut singular_values = Vector::zeros(n);

    for (k, &j) in order.iter().enumerate() {
        let sigma = norms[j];
        singular_values[k] = sigma;
        v.column_mut(k).assign(&vt.row(j));
        if sigma > 0.0 {
            u.column_mut(k).assign(&(&w.row(j) / sigma));
        }
    }

    Svd {
        u,
        singular_values,
        v,
    }
}

fn rotate_rows(m: &mut Matrix, p: usize, q: usize, cos: f64, sin: f64) {
    let (mut row_p, mut row_q) = m.multi_slice_mut((s![p, ..], s![q, ..]));
    Zip::from(&mut row_p).and(&mut row_q).for_each(|xp, xq| {
        let (a, b) = (*xp, *xq);
        *xp = cos * a - sin * b;
        *xq = sin * a + cos * b;
    });
}

/// Minimum-norm least squares solution of `x · w ≈ y`.
#[derive(Clone, Debug)]
pub struct LeastSquares {
    pub coefficients: Vector,
    pub rank: usize,
    pub singular_values: Vector,
}

/// Solves the least squares problem through the SVD of `x`.
///
/// Singular values at or below `rcond * s_max` count as zero. The default
/// `rcond` is `max(n_rows, n_cols) * f64::EPSILON`.
pub fn lstsq(x: &Matrix, y: &Vector, rcond: Option<f64>) -> Result<LeastSquares> {
    check_samples(x.nrows(), y.len())?;

    let (m, n) = x.dim();
    let Svd {
        u,
        singular_values,
        v,
    } = svd(x);

    let rcond = rcond.unwrap_or(f64::EPSILON * m.max(n) as f64);
    let s_max = singular_values.first().copied().unwrap_or(0.0);
    let cutoff = rcond * s_max;

    let mut coefficients = Vector::zeros(n);
    let mut rank = 0;
    for (j, &sigma) in singular_values.iter().enumerate() {
        if sigma <= cutoff || sigma == 0.0 {
            continue;
        }
        rank += 1;
        let projection = u.column(j).dot(y) / sigma;
        coefficients.scaled_add(projection, &v.column(j));
    }

    Ok(LeastSquares {
        coefficients,
        rank,
        singular_values,
    })
}
