//! Kernel projection: equality constraints as a nullspace parameterization.
//!
//! Given a linear system `A x = b`, this module produces a particular
//! least-squares solution `x_eq` together with an orthonormal basis `Z` of
//! `ker(A)`. Every solution of the system can then be written as
//!
//! ```text
//! x = x_eq + Z y
//! ```
//!
//! with `y` free and of dimension `n − rank(A)`. Substituting this
//! parameterization removes the equality constraints from an optimization
//! problem entirely, which is how both the simplex and the quadratic
//! programming engines handle their `A x = b` blocks.
//!
//! The projection itself never fails. When `A x = b` has no exact solution,
//! `x_eq` is still the least-squares minimizer, and it is up to the caller to
//! reject it by checking `‖A x_eq − b‖` against its own tolerance.

use nalgebra::{DMatrix, DVector, RealField};

use crate::linalg::factor::{self, Backend};

/// Computes `(Z, x_eq)` for `A x = b` with the given backend.
///
/// `Z` has `A.ncols() − rank(A)` columns and satisfies `A Z = 0` numerically;
/// it has zero columns when `A` has full column rank. With [`Backend::Svd`],
/// `x_eq` is the minimum-norm least-squares solution; with
/// [`Backend::ColPivQr`] it is a basic least-squares solution.
pub fn project<S: RealField + Copy>(
    backend: Backend,
    a: &DMatrix<S>,
    b: &DVector<S>,
) -> (DMatrix<S>, DVector<S>) {
    assert_eq!(
        a.nrows(),
        b.nrows(),
        "kernel projection: A and b have different numbers of rows"
    );
    match backend {
        Backend::Svd => svd_projection(a, b),
        Backend::ColPivQr => qr_projection(a, b),
    }
}

/// SVD-based projection. A single decomposition yields both outputs: the
/// pseudo-inverse solve gives the minimum-norm `x_eq`, and the right singular
/// vectors past the numerical rank span the kernel.
pub fn svd_projection<S: RealField + Copy>(
    a: &DMatrix<S>,
    b: &DVector<S>,
) -> (DMatrix<S>, DVector<S>) {
    let (e, n) = a.shape();

    // Zero-row padding squares the system so the decomposition carries a
    // complete right factor; the least-squares problem is unchanged.
    let p = e.max(n);
    let mut padded_a = DMatrix::zeros(p, n);
    padded_a.view_mut((0, 0), (e, n)).copy_from(a);
    let mut padded_b = DVector::zeros(p);
    padded_b.rows_mut(0, e).copy_from(b);

    let svd = padded_a.svd(true, true);
    let largest = if svd.singular_values.is_empty() {
        S::zero()
    } else {
        svd.singular_values[0]
    };
    let dim: S = nalgebra::convert(p.max(n) as f64);
    let eps = S::default_epsilon() * dim * largest;

    let rank = svd.rank(eps);
    let x_eq = svd
        .solve(&padded_b, eps)
        .expect("SVD computed with U and V");
    let v_t = svd.v_t.as_ref().expect("SVD computed with V");
    let z = v_t.rows(rank, n - rank).transpose();
    (z, x_eq)
}

/// Column-pivoted-QR-based projection. One decomposition of `A` solves for
/// `x_eq`; a second decomposition of `A^T` exposes the kernel as the trailing
/// columns of its orthogonal factor.
pub fn qr_projection<S: RealField + Copy>(
    a: &DMatrix<S>,
    b: &DVector<S>,
) -> (DMatrix<S>, DVector<S>) {
    let x_eq = factor::lstsq_qr(a, b);
    let z = factor::nullspace_qr(a);
    (z, x_eq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn backends() -> [Backend; 2] {
        [Backend::Svd, Backend::ColPivQr]
    }

    #[test]
    fn test_rank_deficient_system() {
        // Second row is twice the first: rank 1, kernel of dimension 2.
        let a = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 6.0]);
        let b = DVector::from_row_slice(&[1.0, 2.0]);
        for backend in backends() {
            let (z, x_eq) = project(backend, &a, &b);
            assert_eq!(z.ncols(), 2, "{:?}", backend);
            assert!((&a * &z).norm() < 1e-12, "{:?}", backend);
            assert!((&a * &x_eq - &b).norm() < 1e-12, "{:?}", backend);
        }
    }

    #[test]
    fn test_full_column_rank_leaves_no_freedom() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, -1.0]);
        let b = DVector::from_row_slice(&[3.0, 1.0]);
        for backend in backends() {
            let (z, x_eq) = project(backend, &a, &b);
            assert_eq!(z.ncols(), 0, "{:?}", backend);
            assert_relative_eq!(x_eq[0], 2.0, epsilon = 1e-12);
            assert_relative_eq!(x_eq[1], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_inconsistent_system_minimizes_residual() {
        // x = 1 and x = 3 cannot both hold; least squares lands on x = 2.
        let a = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        let b = DVector::from_row_slice(&[1.0, 3.0]);
        for backend in backends() {
            let (z, x_eq) = project(backend, &a, &b);
            assert_eq!(z.ncols(), 0, "{:?}", backend);
            assert_relative_eq!(x_eq[0], 2.0, epsilon = 1e-12);
            // The caller detects infeasibility from the residual.
            assert!((&a * &x_eq - &b).norm() > 1.0);
        }
    }

    #[test]
    fn test_svd_solution_is_minimum_norm() {
        let a = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        let b = DVector::from_row_slice(&[2.0]);
        let (_, x_eq) = svd_projection(&a, &b);
        // The minimum-norm solution of x1 + x2 = 2 is (1, 1).
        assert_relative_eq!(x_eq[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x_eq[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parameterization_spans_solutions() {
        let a = DMatrix::from_row_slice(1, 3, &[1.0, -1.0, 2.0]);
        let b = DVector::from_row_slice(&[5.0]);
        for backend in backends() {
            let (z, x_eq) = project(backend, &a, &b);
            assert_eq!(z.ncols(), 2);
            // Any y keeps the equality satisfied.
            let y = DVector::from_row_slice(&[0.7, -1.3]);
            let x = &x_eq + &z * y;
            assert!((&a * x - &b).norm() < 1e-12, "{:?}", backend);
        }
    }
}
