//! Simplex method for dense linear programs.
//!
//! Solves problems of the form
//!
//! ```text
//! minimize    f^T x
//! subject to  A x  = b      (optional)
//!             C x <= d
//! ```
//!
//! No sign assumption is made on `x`. Equality constraints are removed up
//! front through a kernel projection (see [`crate::kernel`]), single-variable
//! inequality rows are turned into sign information, and free variables are
//! split into positive and negative parts so the remaining problem fits the
//! canonical tableau form.
//!
//! Two strategies locate an initial feasible basis when the origin violates
//! some constraints:
//!
//! - the **two-phase method** (`large_number <= 0`) first minimizes the sum
//!   of the artificial variables and only then optimizes the real objective;
//! - the **penalty method** (`large_number > 0`) attaches the weight
//!   `large_number` to every artificial variable and optimizes everything in
//!   one run. The weight must dominate the objective and constraint
//!   magnitudes by several orders for the penalty to be effective.
//!
//! `small_number` is the zero tolerance: any value in
//! `(-small_number, small_number)` is treated as zero during pivoting and
//! when testing constraint rows.

pub(crate) mod tableau;

use nalgebra::{DMatrix, DVector, RealField};
use thiserror::Error;

use crate::kernel;
use crate::linalg::factor::Backend;

/// Reasons for the simplex method to halt without a solution.
#[derive(Debug, Clone, Error)]
pub enum SimplexError {
    /// The constraint set admits no point.
    #[error("infeasible: {0}")]
    Infeasible(String),
    /// The objective decreases without bound over the constraint set.
    #[error("unbounded: {0}")]
    Unbounded(String),
    /// The problem statement itself is not meaningful.
    #[error("ill-defined: {0}")]
    IllDefined(String),
}

/// Minimizes `f^T x` subject to `C x <= d`.
///
/// An empty `f` is accepted as an all-zero objective, with the number of
/// variables taken from `C`; this turns the routine into a pure feasibility
/// search. Dimension mismatches and a non-positive `small_number` are
/// programming errors and panic.
///
/// A problem without any constraint row is rejected as ill-defined: no
/// bounds on `x` are assumed, so any nonzero objective could be driven to
/// negative infinity.
pub fn minimize<S: RealField + Copy>(
    f: &DVector<S>,
    c: &DMatrix<S>,
    d: &DVector<S>,
    small_number: S,
    large_number: S,
) -> Result<DVector<S>, SimplexError> {
    assert!(
        small_number > S::zero(),
        "the zero tolerance must be positive"
    );

    let n = if f.nrows() == 0 { c.ncols() } else { f.nrows() };
    assert!(n > 0, "the problem does not have any variables");
    let f = if f.nrows() == 0 {
        DVector::zeros(n)
    } else {
        f.clone()
    };

    assert_eq!(
        c.nrows(),
        d.nrows(),
        "C and d have different numbers of rows"
    );
    assert_eq!(c.ncols(), n, "C has the wrong number of columns");

    if c.nrows() == 0 {
        return Err(SimplexError::IllDefined(
            "no constraints given, the problem is ill-defined".to_string(),
        ));
    }

    // Drop rows in the form 0 x <= d_i: trivially satisfiable when d_i >= 0,
    // proof of infeasibility otherwise.
    let mut keep = Vec::with_capacity(c.nrows());
    for i in 0..c.nrows() {
        let zero_row = (0..n).all(|j| {
            let v = c[(i, j)];
            -small_number < v && v < small_number
        });
        if !zero_row {
            keep.push(i);
        } else if d[i] < S::zero() {
            return Err(SimplexError::Infeasible(format!(
                "degenerate constraint row {} demands 0 <= {:?}",
                i, d[i]
            )));
        }
    }
    let c = c.select_rows(keep.iter());
    let d = d.select_rows(keep.iter());
    let m = c.nrows();

    // Substitute x = T w, w >= 0.
    let t = tableau::transform_matrix(&c, &d, small_number)?;
    let nv = t.ncols();
    let fs = t.transpose() * &f;
    let cs = &c * &t;

    let (mut tb, mut basic_variables) = tableau::create_tableau(&cs, &d);
    let na = tb.ncols() - nv - m - 1;

    if large_number > S::zero() {
        tableau::penalty_method(
            &fs,
            &mut tb,
            &mut basic_variables,
            na,
            small_number,
            large_number,
        )?;
    } else {
        tableau::two_phase_method(&fs, &mut tb, &mut basic_variables, na, small_number)?;
    }

    // Non-basic working variables are zero; basic ones are read off the rhs.
    let rhs = tb.ncols() - 1;
    let mut w = DVector::zeros(nv);
    for i in 0..m {
        if basic_variables[i] < nv {
            w[basic_variables[i]] = tb[(i, rhs)];
        }
    }
    let x = &t * w;

    if cfg!(debug_assertions) {
        let violation = &c * &x - &d;
        debug_assert!(
            violation.iter().all(|v| *v < small_number),
            "pivoting finished but the constraints are violated"
        );
    }

    Ok(x)
}

/// Minimizes `f^T x` subject to `A x = b` and `C x <= d`.
///
/// The equalities are eliminated through a kernel projection: with `x = x_eq
/// + Z y` they hold for every `y`, and the remaining problem in `y` is handed
/// to [`minimize`]. When the equalities fully determine `x`, that point is
/// returned directly, provided it also satisfies the inequalities.
pub fn minimize_eq<S: RealField + Copy>(
    f: &DVector<S>,
    a: &DMatrix<S>,
    b: &DVector<S>,
    c: &DMatrix<S>,
    d: &DVector<S>,
    small_number: S,
    large_number: S,
) -> Result<DVector<S>, SimplexError> {
    assert_eq!(
        a.nrows(),
        b.nrows(),
        "A and b have different numbers of rows"
    );
    assert_eq!(a.ncols(), f.nrows(), "A has the wrong number of columns");
    assert_eq!(c.ncols(), f.nrows(), "C has the wrong number of columns");

    let (z, x_eq) = kernel::project(Backend::default(), a, b);

    // The projection always yields the least-squares minimizer; an actual
    // solution exists only if the residual vanishes.
    let residual = a * &x_eq - b;
    if residual.iter().any(|v| v.abs() > small_number) {
        return Err(SimplexError::Infeasible(
            "equality constraints are infeasible".to_string(),
        ));
    }

    if z.ncols() == 0 {
        // No degrees of freedom left; x_eq is the only candidate.
        for i in 0..c.nrows() {
            let mut cx = S::zero();
            for j in 0..c.ncols() {
                cx += c[(i, j)] * x_eq[j];
            }
            if cx - d[i] > small_number {
                return Err(SimplexError::Infeasible(format!(
                    "the equality constraints determine x fully, but x violates inequality row {}",
                    i
                )));
            }
        }
        return Ok(x_eq);
    }

    let fy = z.transpose() * f;
    let cy = c * &z;
    let dy = d - c * &x_eq;

    let y = minimize(&fy, &cy, &dy, small_number, large_number).map_err(|e| match e {
        SimplexError::Infeasible(msg) => {
            SimplexError::Infeasible(format!("inequality subproblem: {}", msg))
        }
        SimplexError::Unbounded(msg) => {
            SimplexError::Unbounded(format!("inequality subproblem: {}", msg))
        }
        SimplexError::IllDefined(msg) => {
            SimplexError::IllDefined(format!("inequality subproblem: {}", msg))
        }
    })?;

    Ok(x_eq + z * y)
}

/// Maximizes `f^T x` subject to `C x <= d`.
pub fn maximize<S: RealField + Copy>(
    f: &DVector<S>,
    c: &DMatrix<S>,
    d: &DVector<S>,
    small_number: S,
    large_number: S,
) -> Result<DVector<S>, SimplexError> {
    minimize(&-f, c, d, small_number, large_number)
}

/// Maximizes `f^T x` subject to `A x = b` and `C x <= d`.
pub fn maximize_eq<S: RealField + Copy>(
    f: &DVector<S>,
    a: &DMatrix<S>,
    b: &DVector<S>,
    c: &DMatrix<S>,
    d: &DVector<S>,
    small_number: S,
    large_number: S,
) -> Result<DVector<S>, SimplexError> {
    minimize_eq(&-f, a, b, c, d, small_number, large_number)
}
