//! Tableau construction and pivoting for the simplex engine.
//!
//! The public entry points in the parent module reduce every problem to the
//! canonical form `min f^T w` subject to `M w = rhs`, `w >= 0`, stored as a
//! dense tableau:
//!
//! ```text
//! [ working | slack | artificial | rhs ]      m rows of constraints
//! [ ------------ objective ----------- ]      1 bottom row
//! ```
//!
//! One basic variable is associated with every constraint row; its column is a
//! unit vector and its value is the corresponding entry of the rhs column.
//! Pivoting exchanges a basic variable against a non-basic one while keeping
//! the tableau in this standard form.

use nalgebra::{DMatrix, DVector, RealField};

use super::SimplexError;

/// Sign information deduced for one decision variable.
///
/// A variable with neither flag set is free and is later split into a
/// positive and a negative part. Both flags set at once means two constraints
/// contradict each other and the problem is infeasible.
#[derive(Debug, Clone, Default)]
pub(crate) struct VariableDomain {
    /// The constraints imply `x >= 0`.
    pub non_negative: bool,
    /// The constraints imply `x <= 0`.
    pub non_positive: bool,
    /// Constraint row the deduction came from, for error reporting.
    pub row: Option<usize>,
}

/// Scans the constraints for single-variable rows and deduces sign domains.
///
/// A row with exactly one coefficient beyond the zero tolerance is a
/// one-sided bound on that variable: with `c < 0` and `d <= 0` the variable
/// cannot be negative, with `c > 0` and `d <= 0` it cannot be positive.
/// Contradictory deductions on the same variable are reported as infeasible
/// regardless of the order in which the two rows appear.
pub(crate) fn deduce_variable_domains<S: RealField + Copy>(
    c: &DMatrix<S>,
    d: &DVector<S>,
    small_number: S,
) -> Result<Vec<VariableDomain>, SimplexError> {
    let m = c.nrows();
    let n = c.ncols();
    let mut domains = vec![VariableDomain::default(); n];

    for row in 0..m {
        // Look for the single non-zero coefficient of this row, if any.
        let mut nonzero = None;
        let mut multiple = false;
        for col in 0..n {
            let v = c[(row, col)];
            if v <= -small_number || v >= small_number {
                if nonzero.is_none() {
                    nonzero = Some(col);
                } else {
                    multiple = true;
                    break;
                }
            }
        }
        if multiple {
            continue;
        }
        let Some(col) = nonzero else {
            // Zero rows are filtered out before this point.
            return Err(SimplexError::IllDefined(format!(
                "constraint row {} has only zero coefficients",
                row
            )));
        };

        if c[(row, col)] < S::zero() && d[row] <= S::zero() {
            if domains[col].non_positive {
                return Err(SimplexError::Infeasible(format!(
                    "variable {} is constrained non-positive (row {}) and non-negative (row {})",
                    col,
                    domains[col].row.unwrap_or(row),
                    row
                )));
            }
            domains[col].non_negative = true;
            domains[col].row = Some(row);
        }
        if c[(row, col)] > S::zero() && d[row] <= S::zero() {
            if domains[col].non_negative {
                return Err(SimplexError::Infeasible(format!(
                    "variable {} is constrained non-negative (row {}) and non-positive (row {})",
                    col,
                    domains[col].row.unwrap_or(row),
                    row
                )));
            }
            domains[col].non_positive = true;
            domains[col].row = Some(row);
        }
    }

    Ok(domains)
}

/// Builds the sign-splitting transform `T` so that `x = T w` with `w >= 0`.
///
/// Every variable contributes a `+e_j` column unless it is known
/// non-positive, and a `-e_j` column unless it is known non-negative; a free
/// variable therefore contributes both.
pub(crate) fn transform_from_domains<S: RealField + Copy>(
    domains: &[VariableDomain],
) -> DMatrix<S> {
    let n = domains.len();
    let nv: usize = domains
        .iter()
        .map(|dom| usize::from(!dom.non_positive) + usize::from(!dom.non_negative))
        .sum();

    let mut t = DMatrix::zeros(n, nv);
    let mut col = 0;
    for (i, dom) in domains.iter().enumerate() {
        if !dom.non_positive {
            t[(i, col)] = S::one();
            col += 1;
        }
        if !dom.non_negative {
            t[(i, col)] = -S::one();
            col += 1;
        }
    }
    debug_assert_eq!(col, nv);
    t
}

/// Deduces variable domains and assembles the transform in one step.
pub(crate) fn transform_matrix<S: RealField + Copy>(
    c: &DMatrix<S>,
    d: &DVector<S>,
    small_number: S,
) -> Result<DMatrix<S>, SimplexError> {
    let domains = deduce_variable_domains(c, d, small_number)?;
    Ok(transform_from_domains(&domains))
}

/// Creates the canonical tableau for `C w <= d`, `w >= 0`.
///
/// Rows with `d_i >= 0` get a slack variable and the slack starts basic.
/// Rows with `d_i < 0` are negated and additionally get an artificial
/// variable, which starts basic instead. Returns the tableau with a zeroed
/// bottom row together with the initial list of basic variables.
pub(crate) fn create_tableau<S: RealField + Copy>(
    c: &DMatrix<S>,
    d: &DVector<S>,
) -> (DMatrix<S>, Vec<usize>) {
    let m = c.nrows();
    let n = c.ncols();

    // One artificial variable per negative right-hand side.
    let na = (0..m).filter(|&i| d[i] < S::zero()).count();

    let rhs = n + m + na;
    let mut tableau = DMatrix::zeros(m + 1, rhs + 1);
    let mut basic_variables = vec![0usize; m];

    let mut ia = 0;
    for i in 0..m {
        if d[i] < S::zero() {
            basic_variables[i] = n + m + ia;
            for j in 0..n {
                tableau[(i, j)] = -c[(i, j)];
            }
            tableau[(i, n + i)] = -S::one();
            tableau[(i, n + m + ia)] = S::one();
            tableau[(i, rhs)] = -d[i];
            ia += 1;
        } else {
            basic_variables[i] = n + i;
            for j in 0..n {
                tableau[(i, j)] = c[(i, j)];
            }
            tableau[(i, n + i)] = S::one();
            tableau[(i, rhs)] = d[i];
        }
    }

    (tableau, basic_variables)
}

/// One pivot: normalize the leaving row and eliminate the entering column
/// from every other constraint row.
///
/// The bottom row is left untouched so callers can decide when and how the
/// objective coefficients are updated.
pub(crate) fn pivot<S: RealField + Copy>(
    tableau: &mut DMatrix<S>,
    entering: usize,
    leaving: usize,
) {
    let nrows = tableau.nrows();
    let ncols = tableau.ncols();

    let pv = tableau[(leaving, entering)];
    for j in 0..ncols {
        tableau[(leaving, j)] /= pv;
    }

    for i in 0..nrows - 1 {
        if i == leaving {
            continue;
        }
        let factor = tableau[(i, entering)];
        if factor != S::zero() {
            for j in 0..ncols {
                let delta = factor * tableau[(leaving, j)];
                tableau[(i, j)] -= delta;
            }
        }
    }
}

/// Gaussian elimination on the bottom row: zero the objective coefficient of
/// every basic variable.
pub(crate) fn eliminate_objective<S: RealField + Copy>(
    tableau: &mut DMatrix<S>,
    basic_variables: &[usize],
) {
    let last = tableau.nrows() - 1;
    let ncols = tableau.ncols();
    for (i, &bv) in basic_variables.iter().enumerate() {
        let weight = tableau[(last, bv)];
        if weight != S::zero() {
            for j in 0..ncols {
                let delta = weight * tableau[(i, j)];
                tableau[(last, j)] -= delta;
            }
        }
    }
}

/// The inner simplex loop: pivot until every objective coefficient is
/// non-negative (within tolerance) or the problem proves unbounded.
///
/// Entering variable: most negative bottom-row coefficient, smallest column
/// index on ties. Leaving variable: smallest ratio `rhs / coefficient` among
/// rows with a positive coefficient in the entering column, smallest row
/// index on ties.
pub(crate) fn run_simplex<S: RealField + Copy>(
    tableau: &mut DMatrix<S>,
    basic_variables: &mut [usize],
    small_number: S,
) -> Result<(), SimplexError> {
    let m = tableau.nrows() - 1;
    let n = tableau.ncols() - 1;

    loop {
        let mut entering = 0;
        let mut best = tableau[(m, 0)];
        for j in 1..n {
            if tableau[(m, j)] < best {
                best = tableau[(m, j)];
                entering = j;
            }
        }
        if best >= -small_number {
            return Ok(());
        }

        let mut leaving = None;
        let mut min_ratio = S::zero();
        for row in 0..m {
            let coeff = tableau[(row, entering)];
            if coeff > small_number {
                let ratio = tableau[(row, n)] / coeff;
                if leaving.is_none() || ratio < min_ratio {
                    leaving = Some(row);
                    min_ratio = ratio;
                }
            }
        }
        let Some(leaving) = leaving else {
            return Err(SimplexError::Unbounded(format!(
                "no positive pivot found in entering column {}",
                entering
            )));
        };

        basic_variables[leaving] = entering;
        pivot(tableau, entering, leaving);

        // Re-zero the entering column in the objective row.
        let weight = tableau[(m, entering)];
        for j in 0..=n {
            let delta = weight * tableau[(leaving, j)];
            tableau[(m, j)] -= delta;
        }
    }
}

/// Two-phase method. Phase one minimizes the sum of the artificial
/// variables; if it reaches zero, the artificials are swapped out of the
/// basis and dropped, and phase two minimizes the real objective from the
/// feasible basis found.
pub(crate) fn two_phase_method<S: RealField + Copy>(
    objective: &DVector<S>,
    tableau: &mut DMatrix<S>,
    basic_variables: &mut Vec<usize>,
    na: usize,
    small_number: S,
) -> Result<(), SimplexError> {
    let m = tableau.nrows() - 1;
    let nv = tableau.ncols() - m - na - 1;

    if na > 0 {
        // Phase one: unit weight on every (currently basic) artificial.
        for i in 0..m {
            if basic_variables[i] >= nv + m {
                tableau[(m, basic_variables[i])] = S::one();
            }
        }
        eliminate_objective(tableau, basic_variables);
        run_simplex(tableau, basic_variables, small_number)?;

        let rhs = tableau.ncols() - 1;
        for i in 0..m {
            if basic_variables[i] >= nv + m && tableau[(i, rhs)] > small_number {
                return Err(SimplexError::Infeasible(format!(
                    "artificial variable {} remains nonzero ({:?}) after the feasibility phase",
                    basic_variables[i] - nv - m,
                    tableau[(i, rhs)]
                )));
            }
        }

        // Swap every zero-valued basic artificial against a non-basic,
        // non-artificial column so the artificials can be dropped.
        for i in 0..m {
            if basic_variables[i] < nv + m {
                continue;
            }
            let mut candidate = None;
            for j in 0..nv + m {
                if !basic_variables.contains(&j)
                    && (tableau[(i, j)] > small_number || tableau[(i, j)] < -small_number)
                {
                    candidate = Some(j);
                    break;
                }
            }
            let Some(j) = candidate else {
                return Err(SimplexError::Infeasible(format!(
                    "cannot drive artificial variable {} out of the basis",
                    basic_variables[i] - nv - m
                )));
            };
            basic_variables[i] = j;
            pivot(tableau, j, i);
            debug_assert!(
                tableau[(i, rhs)] > -small_number,
                "swapping a zero-valued artificial produced a negative basic value"
            );
        }

        // Drop the artificial columns; the rhs column shifts left into place.
        let t = std::mem::replace(tableau, DMatrix::zeros(0, 0));
        *tableau = t.remove_columns(nv + m, na);

        // Phase two objective.
        let rhs = tableau.ncols() - 1;
        for j in 0..nv {
            tableau[(m, j)] = objective[j];
        }
        for j in nv..=rhs {
            tableau[(m, j)] = S::zero();
        }
        eliminate_objective(tableau, basic_variables);
    } else {
        // The initial basis is already feasible and purely made of slacks, so
        // no elimination is needed.
        for j in 0..nv {
            tableau[(m, j)] = objective[j];
        }
    }

    run_simplex(tableau, basic_variables, small_number)
}

/// Penalty (big-M) method: the real objective plus a large weight on every
/// artificial variable, minimized in a single run.
pub(crate) fn penalty_method<S: RealField + Copy>(
    objective: &DVector<S>,
    tableau: &mut DMatrix<S>,
    basic_variables: &mut [usize],
    na: usize,
    small_number: S,
    large_number: S,
) -> Result<(), SimplexError> {
    let m = tableau.nrows() - 1;
    let nv = tableau.ncols() - m - na - 1;

    for j in 0..nv {
        tableau[(m, j)] = objective[j];
    }
    for i in 0..m {
        if basic_variables[i] >= nv + m {
            tableau[(m, basic_variables[i])] = large_number;
        }
    }
    eliminate_objective(tableau, basic_variables);
    run_simplex(tableau, basic_variables, small_number)?;

    let rhs = tableau.ncols() - 1;
    for i in 0..m {
        if basic_variables[i] >= nv + m && tableau[(i, rhs)] > small_number {
            return Err(SimplexError::Infeasible(format!(
                "artificial variable {} remains nonzero ({:?}) after pivoting",
                basic_variables[i] - nv - m,
                tableau[(i, rhs)]
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: f64 = 1e-9;

    #[test]
    fn test_domain_deduction_non_negative() {
        // -x1 <= 0 means x1 >= 0.
        let c = DMatrix::from_row_slice(1, 2, &[-1.0, 0.0]);
        let d = DVector::from_row_slice(&[0.0]);
        let domains = deduce_variable_domains(&c, &d, SMALL).unwrap();
        assert!(domains[0].non_negative);
        assert!(!domains[0].non_positive);
        assert_eq!(domains[0].row, Some(0));
        assert!(!domains[1].non_negative && !domains[1].non_positive);
    }

    #[test]
    fn test_domain_deduction_non_positive() {
        // 2 x1 <= -4 means x1 <= -2 < 0.
        let c = DMatrix::from_row_slice(1, 1, &[2.0]);
        let d = DVector::from_row_slice(&[-4.0]);
        let domains = deduce_variable_domains(&c, &d, SMALL).unwrap();
        assert!(domains[0].non_positive);
    }

    #[test]
    fn test_domain_conflict_both_orders() {
        // x >= 2 and x <= -1 cannot hold together. Both row orders must be
        // caught.
        let c = DMatrix::from_row_slice(2, 1, &[-1.0, 1.0]);
        let d = DVector::from_row_slice(&[-2.0, -1.0]);
        assert!(matches!(
            deduce_variable_domains(&c, &d, SMALL),
            Err(SimplexError::Infeasible(_))
        ));

        let c = DMatrix::from_row_slice(2, 1, &[1.0, -1.0]);
        let d = DVector::from_row_slice(&[-1.0, -2.0]);
        assert!(matches!(
            deduce_variable_domains(&c, &d, SMALL),
            Err(SimplexError::Infeasible(_))
        ));
    }

    #[test]
    fn test_multi_variable_rows_deduce_nothing() {
        let c = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        let d = DVector::from_row_slice(&[-3.0]);
        let domains = deduce_variable_domains(&c, &d, SMALL).unwrap();
        assert!(domains.iter().all(|v| !v.non_negative && !v.non_positive));
    }

    #[test]
    fn test_transform_free_variables_get_two_columns() {
        let domains = vec![VariableDomain::default(); 2];
        let t = transform_from_domains::<f64>(&domains);
        assert_eq!(t.shape(), (2, 4));
        // x = u - v per variable.
        assert_eq!(t[(0, 0)], 1.0);
        assert_eq!(t[(0, 1)], -1.0);
        assert_eq!(t[(1, 2)], 1.0);
        assert_eq!(t[(1, 3)], -1.0);
    }

    #[test]
    fn test_transform_sign_constrained_variables_get_one_column() {
        let mut domains = vec![VariableDomain::default(); 2];
        domains[0].non_negative = true;
        domains[1].non_positive = true;
        let t = transform_from_domains::<f64>(&domains);
        assert_eq!(t.shape(), (2, 2));
        assert_eq!(t[(0, 0)], 1.0);
        assert_eq!(t[(1, 1)], -1.0);
    }

    #[test]
    fn test_create_tableau_slack_rows() {
        let c = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let d = DVector::from_row_slice(&[5.0, 6.0]);
        let (tableau, basic) = create_tableau(&c, &d);
        // No artificials: 2 working + 2 slack + rhs.
        assert_eq!(tableau.shape(), (3, 5));
        assert_eq!(basic, vec![2, 3]);
        assert_eq!(tableau[(0, 2)], 1.0);
        assert_eq!(tableau[(1, 3)], 1.0);
        assert_eq!(tableau[(0, 4)], 5.0);
        assert_eq!(tableau[(1, 4)], 6.0);
    }

    #[test]
    fn test_create_tableau_artificial_row_negated() {
        let c = DMatrix::from_row_slice(1, 2, &[1.0, -2.0]);
        let d = DVector::from_row_slice(&[-3.0]);
        let (tableau, basic) = create_tableau(&c, &d);
        // 2 working + 1 slack + 1 artificial + rhs.
        assert_eq!(tableau.shape(), (2, 5));
        assert_eq!(basic, vec![3]);
        // Row negated, slack -1, artificial +1, rhs positive.
        assert_eq!(tableau[(0, 0)], -1.0);
        assert_eq!(tableau[(0, 1)], 2.0);
        assert_eq!(tableau[(0, 2)], -1.0);
        assert_eq!(tableau[(0, 3)], 1.0);
        assert_eq!(tableau[(0, 4)], 3.0);
    }

    #[test]
    fn test_pivot_keeps_basic_columns_unit() {
        let c = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 2.0, 1.0]);
        let d = DVector::from_row_slice(&[4.0, 6.0]);
        let (mut tableau, mut basic) = create_tableau(&c, &d);
        // Entering column 0; the ratio test picks row 1 (6/2 < 4/1).
        basic[1] = 0;
        pivot(&mut tableau, 0, 1);

        for (row, &bv) in basic.iter().enumerate() {
            for i in 0..tableau.nrows() - 1 {
                let expected: f64 = if i == row { 1.0 } else { 0.0 };
                assert!(
                    (tableau[(i, bv)] - expected).abs() < 1e-12,
                    "basic column {} is not a unit vector",
                    bv
                );
            }
        }
        // Right-hand sides stay non-negative after a ratio-test pivot.
        let rhs = tableau.ncols() - 1;
        for i in 0..tableau.nrows() - 1 {
            assert!(tableau[(i, rhs)] >= 0.0);
        }
    }

    #[test]
    fn test_run_simplex_small_maximization() {
        // max 3u + 2v subject to u + v <= 4, u + 3v <= 6, u, v >= 0.
        // As a minimization of -3u - 2v the optimum is u = 4, v = 0.
        let c = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 3.0]);
        let d = DVector::from_row_slice(&[4.0, 6.0]);
        let (mut tableau, mut basic) = create_tableau(&c, &d);
        let m = tableau.nrows() - 1;
        tableau[(m, 0)] = -3.0;
        tableau[(m, 1)] = -2.0;
        run_simplex(&mut tableau, &mut basic, SMALL).unwrap();

        let rhs = tableau.ncols() - 1;
        let mut w = [0.0; 2];
        for i in 0..2 {
            if basic[i] < 2 {
                w[basic[i]] = tableau[(i, rhs)];
            }
        }
        assert!((w[0] - 4.0).abs() < 1e-9);
        assert!(w[1].abs() < 1e-9);
        // Objective value appears negated in the bottom right corner.
        assert!((tableau[(m, rhs)] - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_run_simplex_detects_unbounded() {
        // min -u with u only bounded from below.
        let c = DMatrix::from_row_slice(1, 1, &[-1.0]);
        let d = DVector::from_row_slice(&[0.0]);
        let (mut tableau, mut basic) = create_tableau(&c, &d);
        let m = tableau.nrows() - 1;
        tableau[(m, 0)] = -1.0;
        assert!(matches!(
            run_simplex(&mut tableau, &mut basic, SMALL),
            Err(SimplexError::Unbounded(_))
        ));
    }

    #[test]
    fn test_eliminate_objective_zeroes_basic_weights() {
        let c = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 2.0, 1.0]);
        let d = DVector::from_row_slice(&[4.0, 6.0]);
        let (mut tableau, basic) = create_tableau(&c, &d);
        let m = tableau.nrows() - 1;
        tableau[(m, 2)] = 1.0;
        tableau[(m, 3)] = 1.0;
        eliminate_objective(&mut tableau, &basic);
        for &bv in &basic {
            assert_eq!(tableau[(m, bv)], 0.0);
        }
    }

    #[test]
    fn test_two_phase_and_penalty_agree() {
        // min w1 subject to -w1 <= -2 (w1 >= 2), w1 <= 5, w >= 0.
        let c = DMatrix::from_row_slice(2, 1, &[-1.0, 1.0]);
        let d = DVector::from_row_slice(&[-2.0, 5.0]);
        let objective = DVector::from_row_slice(&[1.0]);

        let (mut t1, mut b1) = create_tableau(&c, &d);
        let na1 = t1.ncols() - 1 - 1 - 2;
        two_phase_method(&objective, &mut t1, &mut b1, na1, SMALL).unwrap();

        let (mut t2, mut b2) = create_tableau(&c, &d);
        let na2 = t2.ncols() - 1 - 1 - 2;
        penalty_method(&objective, &mut t2, &mut b2, na2, SMALL, 1e6).unwrap();

        let read = |t: &DMatrix<f64>, b: &[usize]| -> f64 {
            let rhs = t.ncols() - 1;
            for (i, &bv) in b.iter().enumerate() {
                if bv == 0 {
                    return t[(i, rhs)];
                }
            }
            0.0
        };
        assert!((read(&t1, &b1) - 2.0).abs() < 1e-9);
        assert!((read(&t2, &b2) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_phase_reports_infeasible() {
        // w1 <= -1 with w1 >= 0 is impossible.
        let c = DMatrix::from_row_slice(1, 1, &[1.0]);
        let d = DVector::from_row_slice(&[-1.0]);
        let objective = DVector::from_row_slice(&[0.0]);
        let (mut tableau, mut basic) = create_tableau(&c, &d);
        let na = tableau.ncols() - 1 - 1 - 1;
        assert_eq!(na, 1);
        assert!(matches!(
            two_phase_method(&objective, &mut tableau, &mut basic, na, SMALL),
            Err(SimplexError::Infeasible(_))
        ));
    }
}
