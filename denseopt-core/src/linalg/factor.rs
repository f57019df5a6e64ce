//! Rank-revealing least-squares solves and nullspace bases.
//!
//! Both optimization engines reduce their subproblems to two primitives:
//!
//! - solve `A x = b` in the least-squares sense when the system may be
//!   rectangular and rank deficient, and
//! - extract an orthonormal basis `Z` of `ker(A)`, so that `A Z = 0`.
//!
//! Two interchangeable backends provide them. The SVD backend returns the
//! minimum-norm least-squares solution; the column-pivoted QR backend returns
//! a basic (not minimum-norm) solution but is noticeably cheaper on wide
//! problems. Which one runs is a per-solver choice, see [`Backend`].
//!
//! nalgebra computes thin factors only (`min(m, n)` singular vectors, thin Q).
//! A complete right factor is required to read off the kernel, so the SVD path
//! squares the system by appending zero rows, which changes neither the
//! singular values nor the least-squares residual, and the QR path applies the
//! Householder sequence to the identity to materialize the full orthogonal
//! factor.

use nalgebra::{convert, DMatrix, DVector, RealField};

/// Factorization backend used for least-squares solves and kernel extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Singular value decomposition. Minimum-norm least-squares solutions.
    Svd,
    /// Column-pivoted QR. Basic least-squares solutions, cheaper than SVD.
    ColPivQr,
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(feature = "qr-kernel") {
            Backend::ColPivQr
        } else {
            Backend::Svd
        }
    }
}

/// Least-squares solution of `A x = b`.
///
/// Never fails: on rank-deficient or inconsistent systems the residual
/// `‖A x − b‖` is minimized, which is all the callers rely on. Whether the
/// system is actually satisfied must be checked by the caller.
pub fn lstsq<S: RealField + Copy>(
    backend: Backend,
    a: &DMatrix<S>,
    b: &DVector<S>,
) -> DVector<S> {
    assert_eq!(a.nrows(), b.nrows(), "lstsq: rhs has wrong number of rows");
    match backend {
        Backend::Svd => lstsq_svd(a, b),
        Backend::ColPivQr => lstsq_qr(a, b),
    }
}

/// Orthonormal basis of `ker(A)`, with `A.ncols() − rank(A)` columns.
///
/// Returns a matrix with zero columns when `A` has full column rank.
pub fn nullspace<S: RealField + Copy>(backend: Backend, a: &DMatrix<S>) -> DMatrix<S> {
    match backend {
        Backend::Svd => nullspace_svd(a),
        Backend::ColPivQr => nullspace_qr(a),
    }
}

/// Rank threshold in the style of the underlying library: relative to the
/// largest singular value (or pivot), scaled by the problem size.
fn rank_eps<S: RealField + Copy>(nrows: usize, ncols: usize, largest: S) -> S {
    let dim: S = convert(nrows.max(ncols) as f64);
    S::default_epsilon() * dim * largest
}

pub(crate) fn lstsq_svd<S: RealField + Copy>(a: &DMatrix<S>, b: &DVector<S>) -> DVector<S> {
    let svd = a.clone().svd(true, true);
    let largest = if svd.singular_values.is_empty() {
        S::zero()
    } else {
        svd.singular_values[0]
    };
    let eps = rank_eps(a.nrows(), a.ncols(), largest);
    svd.solve(b, eps).expect("SVD computed with U and V")
}

pub(crate) fn lstsq_qr<S: RealField + Copy>(a: &DMatrix<S>, b: &DVector<S>) -> DVector<S> {
    let n = a.ncols();
    let qr = a.clone().col_piv_qr();
    let r = qr.r();
    let rank = triangular_rank(&r);

    // Solve R w = Q^T b on the leading rank x rank triangle, then undo the
    // column pivoting. Coordinates beyond the numerical rank stay zero, which
    // makes this a basic (not minimum-norm) least-squares solution.
    let mut qtb = b.clone();
    qr.q_tr_mul(&mut qtb);
    let mut w = DVector::zeros(n);
    for i in (0..rank).rev() {
        let mut acc = qtb[i];
        for j in (i + 1)..rank {
            acc -= r[(i, j)] * w[j];
        }
        w[i] = acc / r[(i, i)];
    }
    qr.p().inv_permute_rows(&mut w);
    w
}

pub(crate) fn nullspace_svd<S: RealField + Copy>(a: &DMatrix<S>) -> DMatrix<S> {
    let (e, n) = a.shape();
    // Appending zero rows leaves the singular values untouched but gives the
    // decomposition a complete n x n right factor.
    let p = e.max(n);
    let mut padded = DMatrix::zeros(p, n);
    padded.view_mut((0, 0), (e, n)).copy_from(a);
    let svd = padded.svd(false, true);
    let largest = if svd.singular_values.is_empty() {
        S::zero()
    } else {
        svd.singular_values[0]
    };
    let rank = svd.rank(rank_eps(e, n, largest));
    let v_t = svd.v_t.expect("SVD computed with V");
    // Singular values are sorted in descending order, so the kernel vectors
    // are the trailing rows of V^T.
    v_t.rows(rank, n - rank).transpose()
}

pub(crate) fn nullspace_qr<S: RealField + Copy>(a: &DMatrix<S>) -> DMatrix<S> {
    let n = a.ncols();
    let qr = a.transpose().col_piv_qr();
    let rank = triangular_rank(&qr.r());
    // The trailing columns of the full orthogonal factor of A^T span ker(A).
    let mut q_t = DMatrix::identity(n, n);
    qr.q_tr_mul(&mut q_t);
    q_t.rows(rank, n - rank).transpose()
}

/// Numerical rank of an upper-trapezoidal factor from a rank-revealing
/// decomposition, counted against the largest diagonal pivot.
fn triangular_rank<S: RealField + Copy>(r: &DMatrix<S>) -> usize {
    let k = r.nrows().min(r.ncols());
    let mut largest = S::zero();
    for i in 0..k {
        largest = largest.max(r[(i, i)].abs());
    }
    let eps = rank_eps(r.nrows(), r.ncols(), largest);
    (0..k).filter(|&i| r[(i, i)].abs() > eps).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn backends() -> [Backend; 2] {
        [Backend::Svd, Backend::ColPivQr]
    }

    #[test]
    fn test_lstsq_square_system() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 4.0]);
        let b = DVector::from_row_slice(&[2.0, 8.0]);
        for backend in backends() {
            let x = lstsq(backend, &a, &b);
            assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
            assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_lstsq_overdetermined() {
        // Fit x to [1, 1]^T x ~= [1, 3]: residual is minimized at x = 2.
        let a = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        let b = DVector::from_row_slice(&[1.0, 3.0]);
        for backend in backends() {
            let x = lstsq(backend, &a, &b);
            assert_relative_eq!(x[0], 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_lstsq_underdetermined_satisfies_system() {
        let a = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, -1.0]);
        let b = DVector::from_row_slice(&[4.0]);
        for backend in backends() {
            let x = lstsq(backend, &a, &b);
            let res = (&a * &x - &b).norm();
            assert!(res < 1e-12, "residual {} for {:?}", res, backend);
        }
    }

    #[test]
    fn test_nullspace_dimensions_and_orthogonality() {
        // Rank-1 matrix on 3 variables: the kernel is a plane.
        let a = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 6.0]);
        for backend in backends() {
            let z = nullspace(backend, &a);
            assert_eq!(z.ncols(), 2, "{:?}", backend);
            assert!((&a * &z).norm() < 1e-12, "{:?}", backend);
            // Columns are orthonormal.
            let gram = z.transpose() * &z;
            assert!((gram - DMatrix::<f64>::identity(2, 2)).norm() < 1e-12);
        }
    }

    #[test]
    fn test_nullspace_full_column_rank_is_empty() {
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        for backend in backends() {
            let z = nullspace(backend, &a);
            assert_eq!(z.shape(), (2, 0), "{:?}", backend);
        }
    }

    #[test]
    fn test_nullspace_zero_matrix_is_identity_sized() {
        let a = DMatrix::<f64>::zeros(2, 3);
        for backend in backends() {
            let z = nullspace(backend, &a);
            assert_eq!(z.ncols(), 3, "{:?}", backend);
            let gram = z.transpose() * &z;
            assert!((gram - DMatrix::<f64>::identity(3, 3)).norm() < 1e-12);
        }
    }

    #[test]
    fn test_generic_scalar_f32() {
        let a = DMatrix::<f32>::from_row_slice(1, 2, &[1.0, -1.0]);
        let b = DVector::<f32>::from_row_slice(&[2.0]);
        for backend in backends() {
            let x = lstsq(backend, &a, &b);
            assert!((a.clone() * &x - &b).norm() < 1e-5);
            let z = nullspace(backend, &a);
            assert_eq!(z.ncols(), 1);
            assert!((a.clone() * &z).norm() < 1e-5);
        }
    }
}
