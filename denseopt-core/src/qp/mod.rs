//! Active-set solver for linearly constrained least-squares problems.
//!
//! Minimizes `‖Q x − r‖²` subject to `A x = b` and `C x <= d`. The objective
//! is kept in factored form (rather than as a Hessian `Q^T Q`) because that
//! is how the problems show up in practice, for instance in differential
//! kinematics where a model `s_dot = J q_dot` is tracked under actuation
//! limits.
//!
//! The solve proceeds in two reductions:
//!
//! 1. Equality constraints are removed through a kernel projection: with
//!    `x = x_eq + Z y` they hold for every `y`, and the problem shrinks to
//!    `min ‖Qy y − ry‖²` subject to `Cy y <= dy` with `Qy = Q Z`,
//!    `ry = r − Q x_eq`, `Cy = C Z`, `dy = d − C x_eq`.
//! 2. The inequality-constrained reduced problem is solved with an active-set
//!    iteration. Starting from a feasible point, each iteration minimizes the
//!    objective with the active constraints held as equalities (stepping only
//!    inside `ker(Ca)`), clips the step at the first blocking inactive
//!    constraint, and activates it. On a full step, the Lagrange multipliers
//!    of the active constraints decide termination: all non-negative means a
//!    KKT point, otherwise the most negative one leaves the active set.
//!
//! The solver is stateful on purpose. Between calls to
//! [`Solver::update_inequalities`] that keep the number of rows unchanged,
//! the iterate and the active set survive, so a sequence of similar problems
//! warm-starts each solve from the previous solution.
//!
//! # Infeasibility clears the constraints
//!
//! When constraint installation fails (infeasible equalities or
//! inequalities), the solver does **not** keep the previous constraints: it
//! reverts to a fully unconstrained state. A subsequent [`Solver::solve`]
//! then returns the plain least-squares minimizer of `‖Q x − r‖`. Callers
//! that ignore the error result will silently get that unconstrained
//! solution.

use nalgebra::{DMatrix, DVector, RealField};
use thiserror::Error;

use crate::kernel;
use crate::linalg::factor::{self, Backend};
use crate::simplex;

/// Iteration cap for the active-set loop. The anti-cycling rule (never drop
/// the constraint that was activated last) is known to be incomplete, so a
/// run this long indicates cycling and is treated as a bug.
const MAX_ITERATIONS: usize = 1_000_000;

/// Failure reported by constraint installation or by the solve itself.
#[derive(Debug, Clone, Error)]
pub enum QpError {
    /// The constraint set admits no point. After this error the solver is
    /// unconstrained, see the module documentation.
    #[error("infeasible: {0}")]
    Infeasible(String),
}

/// Quadratic programming solver with warm-startable active set.
///
/// See the module documentation for the problem form and the overall
/// algorithm. Dimension mismatches in any update are programming errors and
/// panic; infeasibility is reported through [`QpError`].
#[derive(Debug, Clone)]
pub struct Solver<S: RealField + Copy> {
    /// Tolerance for feasibility checks and rank decisions.
    tol: S,
    /// Number of decision variables.
    nx: usize,
    /// Number of rows of the objective.
    nr: usize,
    /// Dimension of the reduced variable, `nx - rank(A)`.
    ny: usize,
    /// Number of inequality constraints.
    mi: usize,
    /// Number of equality constraints.
    me: usize,
    backend: Backend,
    verbose: bool,

    /// Objective, as supplied.
    q: DMatrix<S>,
    r: DVector<S>,

    /// Kernel basis of the equality constraints and a particular solution.
    z: DMatrix<S>,
    x_eq: DVector<S>,

    /// Objective and inequalities reduced to the kernel coordinates.
    qy: DMatrix<S>,
    ry: DVector<S>,
    cy: DMatrix<S>,
    dy: DVector<S>,

    /// Unconstrained minimizer of the reduced objective.
    yu: DVector<S>,
    /// Current iterate.
    yk: DVector<S>,

    /// Rows of `cy`/`dy` currently treated as equalities, in activation order.
    ca: DMatrix<S>,
    da: DVector<S>,
    active: Vec<usize>,
    inactive: Vec<usize>,
}

impl<S: RealField + Copy> Solver<S> {
    /// Creates an unconstrained solver for `xdim` variables and an objective
    /// with `rdim` rows, both initially zero.
    pub fn new(xdim: usize, rdim: usize, tolerance: S) -> Self {
        assert!(xdim > 0, "at least one decision variable is required");
        assert!(rdim > 0, "at least one objective row is required");
        assert!(
            tolerance > S::zero(),
            "the feasibility tolerance must be positive"
        );
        let verbose = std::env::var("DENSEOPT_VERBOSE")
            .map(|v| v == "1")
            .unwrap_or(false);

        let mut solver = Self {
            tol: tolerance,
            nx: xdim,
            nr: rdim,
            ny: xdim,
            mi: 0,
            me: 0,
            backend: Backend::default(),
            verbose,
            q: DMatrix::zeros(rdim, xdim),
            r: DVector::zeros(rdim),
            z: DMatrix::identity(xdim, xdim),
            x_eq: DVector::zeros(xdim),
            qy: DMatrix::zeros(rdim, xdim),
            ry: DVector::zeros(rdim),
            cy: DMatrix::zeros(0, xdim),
            dy: DVector::zeros(0),
            yu: DVector::zeros(xdim),
            yk: DVector::zeros(xdim),
            ca: DMatrix::zeros(0, xdim),
            da: DVector::zeros(0),
            active: Vec::new(),
            inactive: Vec::new(),
        };
        solver.reset_active_set();
        solver
    }

    /// Creates a solver and installs the given objective, deducing the
    /// dimensions from `q`.
    pub fn from_objective(q: &DMatrix<S>, r: &DVector<S>, tolerance: S) -> Self {
        let mut solver = Self::new(q.ncols(), q.nrows(), tolerance);
        solver.update_objective(q, r);
        solver
    }

    /// Selects the factorization backend used for all internal solves.
    ///
    /// Takes effect from the next objective or constraint update.
    pub fn set_backend(&mut self, backend: Backend) {
        self.backend = backend;
    }

    /// Enables or disables progress reporting on stderr.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Replaces the objective and refreshes everything derived from it.
    pub fn update_objective(&mut self, q: &DMatrix<S>, r: &DVector<S>) {
        assert_eq!(q.nrows(), self.nr, "Q has the wrong number of rows");
        assert_eq!(q.ncols(), self.nx, "Q has the wrong number of columns");
        assert_eq!(r.nrows(), self.nr, "r has the wrong number of rows");
        self.q = q.clone();
        self.r = r.clone();
        self.refresh_reduced_objective();
    }

    /// Empties the active set, preventing a warm start of the next solve.
    pub fn reset_active_set(&mut self) {
        self.ca = DMatrix::zeros(0, self.ny);
        self.da = DVector::zeros(0);
        self.active.clear();
        self.inactive = (0..self.mi).collect();
    }

    /// Removes every constraint; the solver becomes a plain least-squares
    /// minimizer of the stored objective.
    pub fn clear_constraints(&mut self) {
        self.z = DMatrix::identity(self.nx, self.nx);
        self.x_eq = DVector::zeros(self.nx);
        self.me = 0;
        self.mi = 0;
        self.ny = self.nx;
        self.cy = DMatrix::zeros(0, self.nx);
        self.dy = DVector::zeros(0);
        self.yk = DVector::zeros(self.nx);
        self.reset_active_set();
        self.refresh_reduced_objective();
    }

    /// Installs inequality constraints only, discarding any equalities.
    ///
    /// Equivalent to [`Solver::set_constraints_eq`] with an empty equality
    /// block. On infeasible constraints the solver is left unconstrained.
    pub fn set_constraints(&mut self, c: &DMatrix<S>, d: &DVector<S>) -> Result<(), QpError> {
        let a = DMatrix::zeros(0, self.nx);
        let b = DVector::zeros(0);
        self.set_constraints_eq(&a, &b, c, d)
    }

    /// Installs equality and inequality constraints, replacing all previous
    /// ones and resetting the active set.
    ///
    /// The equalities are reduced through a kernel projection right away; if
    /// `A x = b` has no solution within the tolerance, or the inequalities
    /// turn out infeasible, the solver is left **unconstrained** and the
    /// error is returned.
    pub fn set_constraints_eq(
        &mut self,
        a: &DMatrix<S>,
        b: &DVector<S>,
        c: &DMatrix<S>,
        d: &DVector<S>,
    ) -> Result<(), QpError> {
        assert_eq!(a.ncols(), self.nx, "A has the wrong number of columns");
        assert_eq!(
            a.nrows(),
            b.nrows(),
            "A and b have different numbers of rows"
        );

        if a.nrows() == 0 {
            if self.me > 0 {
                // Drop the pre-existing equality reduction.
                self.z = DMatrix::identity(self.nx, self.nx);
                self.x_eq = DVector::zeros(self.nx);
                self.me = 0;
                self.ny = self.nx;
                self.yk = DVector::zeros(self.nx);
                self.refresh_reduced_objective();
            }
        } else {
            let (z, x_eq) = kernel::project(self.backend, a, b);
            let residual = a * &x_eq - b;
            if residual.iter().any(|v| v.abs() > self.tol) {
                self.clear_constraints();
                return Err(QpError::Infeasible(
                    "equality constraints are infeasible".to_string(),
                ));
            }
            self.me = a.nrows();
            self.ny = z.ncols();
            self.z = z;
            self.x_eq = x_eq;
            self.yk = DVector::zeros(self.ny);
            self.refresh_reduced_objective();
        }

        // Force the feasibility check and active-set reset below, even when
        // the number of inequality rows happens to match the previous one.
        self.mi = 0;
        self.reset_active_set();
        self.update_inequalities(c, d)
    }

    /// Replaces the inequality constraints, keeping any equalities.
    ///
    /// When the number of rows is unchanged, this is the warm-start path: the
    /// iterate and the active set are preserved and **no feasibility check is
    /// performed**, trusting the caller that the perturbed constraints remain
    /// feasible. When the row count changes, a simplex-based feasibility
    /// search runs and the active set is reset; on infeasibility the solver
    /// is left unconstrained.
    pub fn update_inequalities(
        &mut self,
        c: &DMatrix<S>,
        d: &DVector<S>,
    ) -> Result<(), QpError> {
        assert_eq!(c.ncols(), self.nx, "C has the wrong number of columns");
        assert_eq!(
            c.nrows(),
            d.nrows(),
            "C and d have different numbers of rows"
        );

        self.cy = c.clone();
        self.dy = d.clone();

        if self.me > 0 {
            if c.nrows() > 0 {
                if self.ny > 0 {
                    // The order matters: dy must use C before it is reduced.
                    self.dy = d - c * &self.x_eq;
                    self.cy = c * &self.z;
                } else {
                    self.cy = DMatrix::zeros(c.nrows(), 0);
                    self.dy = DVector::zeros(c.nrows());
                }
            } else {
                self.cy = DMatrix::zeros(0, self.ny);
                self.dy = DVector::zeros(0);
            }
        }

        if c.nrows() != self.mi {
            if c.nrows() > 0 {
                if self.ny > 0 {
                    // Feasibility oracle: zero objective with a strict margin
                    // below d, so the point found clears the tolerance.
                    let zero_objective = DVector::zeros(self.ny);
                    let margin = self.dy.map(|v| v - self.tol);
                    match simplex::minimize(
                        &zero_objective,
                        &self.cy,
                        &margin,
                        self.tol,
                        -S::one(),
                    ) {
                        Ok(y) => {
                            self.yk = y;
                            if let Some(v) = max_residual(&self.cy, &self.yk, &self.dy) {
                                if v > S::zero() {
                                    self.clear_constraints();
                                    return Err(QpError::Infeasible(
                                        "the feasibility search returned a point violating the inequalities"
                                            .to_string(),
                                    ));
                                }
                            }
                        }
                        Err(e) => {
                            self.clear_constraints();
                            return Err(QpError::Infeasible(format!(
                                "inequality constraints: {}",
                                e
                            )));
                        }
                    }
                } else {
                    // The equalities fully determine x; either that point
                    // satisfies the inequalities or nothing does.
                    let residual = c * &self.x_eq - d;
                    if residual.iter().any(|v| *v > S::zero()) {
                        self.clear_constraints();
                        return Err(QpError::Infeasible(
                            "the equality constraints determine x fully, but it violates the inequalities"
                                .to_string(),
                        ));
                    }
                }
            }

            self.mi = c.nrows();
            self.reset_active_set();
        }

        Ok(())
    }

    /// Solves the installed problem and returns the minimizer.
    pub fn solve(&mut self) -> Result<DVector<S>, QpError> {
        self.solve_impl(None)
    }

    /// Like [`Solver::solve`], but offers `guess` as a candidate starting
    /// point for the active-set iteration. The guess is used only if it has
    /// the reduced dimension and satisfies the inequalities.
    pub fn solve_with_guess(&mut self, guess: &DVector<S>) -> Result<DVector<S>, QpError> {
        self.solve_impl(Some(guess))
    }

    fn solve_impl(&mut self, guess: Option<&DVector<S>>) -> Result<DVector<S>, QpError> {
        // Fully pinned by the equalities; nothing to optimize.
        if self.ny == 0 {
            return Ok(self.x_eq.clone());
        }

        let y = self.solve_reduced(guess)?;

        if self.me > 0 {
            Ok(&self.x_eq + &self.z * y)
        } else {
            Ok(y)
        }
    }

    /// Active-set iteration on the reduced problem.
    fn solve_reduced(&mut self, guess: Option<&DVector<S>>) -> Result<DVector<S>, QpError> {
        // Without inequalities this is plain least squares.
        if self.mi == 0 {
            return Ok(self.yu.clone());
        }

        self.find_feasible_start(guess)?;
        if self.verbose {
            eprintln!(
                "[qp] starting active-set iteration with {} of {} constraints active",
                self.active.len(),
                self.mi
            );
        }

        let mut na = self.active.len();
        let mut iters: usize = 0;
        loop {
            iters += 1;
            if iters > MAX_ITERATIONS {
                panic!(
                    "active-set iteration cap ({}) exceeded; the problem cycles",
                    MAX_ITERATIONS
                );
            }

            // Step direction: minimize the objective with the active rows held
            // as equalities, i.e. restrict the step to ker(Ca).
            let p = if na > 0 {
                let w = factor::nullspace(self.backend, &self.ca);
                if w.ncols() == 0 {
                    // The active constraints pin the iterate completely.
                    DVector::zeros(self.ny)
                } else {
                    let target = &self.ry - &self.qy * &self.yk;
                    let reduced = &self.qy * &w;
                    let u = factor::lstsq(self.backend, &reduced, &target);
                    &w * u
                }
            } else {
                // Step straight to the unconstrained minimum.
                &self.yu - &self.yk
            };

            // Largest multiple of p that keeps every inactive constraint
            // satisfied, capped at the full step.
            let mut alpha = S::one();
            let mut blocking = None;
            for (pos, &idx) in self.inactive.iter().enumerate() {
                let cp = row_dot(&self.cy, idx, &p);
                if cp > S::zero() {
                    let ai = (self.dy[idx] - row_dot(&self.cy, idx, &self.yk)) / cp;
                    if ai < alpha {
                        alpha = ai;
                        blocking = Some(pos);
                    }
                }
            }

            if let Some(pos) = blocking {
                let idx = self.inactive[pos];
                if self.verbose {
                    eprintln!(
                        "[qp] iteration {}: step {:?} blocked, activating constraint {}",
                        iters, alpha, idx
                    );
                }
                self.yk.axpy(alpha, &p, S::one());
                self.active.push(idx);
                self.inactive.remove(pos);
                self.rebuild_active_rows();
                na += 1;
                continue;
            }

            // Full step.
            self.yk.axpy(S::one(), &p, S::one());

            if na == 0 {
                // Reached the unconstrained minimum without touching any
                // constraint.
                return Ok(self.yk.clone());
            }

            // Lagrange multipliers of the active constraints, up to a factor
            // of two which does not affect the sign test.
            let gradient = self.qy.transpose() * (&self.ry - &self.qy * &self.yk);
            let ca_t = self.ca.transpose();
            let half_mu = factor::lstsq(self.backend, &ca_t, &gradient);

            // The most recently activated constraint is never dropped; that
            // is the whole anti-cycling protection.
            let mut drop_pos = None;
            let mut most_negative = S::zero();
            for i in 0..na - 1 {
                if half_mu[i] < most_negative {
                    most_negative = half_mu[i];
                    drop_pos = Some(i);
                }
            }

            match drop_pos {
                Some(pos) => {
                    let idx = self.active.remove(pos);
                    if self.verbose {
                        eprintln!(
                            "[qp] iteration {}: multiplier {:?} negative, deactivating constraint {}",
                            iters, most_negative, idx
                        );
                    }
                    self.inactive.push(idx);
                    self.rebuild_active_rows();
                    na -= 1;
                }
                // All multipliers non-negative: KKT point.
                None => return Ok(self.yk.clone()),
            }
        }
    }

    /// Picks a feasible starting iterate, trying in order: the current
    /// iterate, the caller's guess, the least-squares solution of the active
    /// rows, and finally a simplex feasibility search.
    fn find_feasible_start(&mut self, guess: Option<&DVector<S>>) -> Result<(), QpError> {
        if let Some(v) = max_residual(&self.cy, &self.yk, &self.dy) {
            if v < self.tol {
                if self.verbose {
                    eprintln!("[qp] current iterate is a feasible start");
                }
                return Ok(());
            }
        }

        if let Some(g) = guess {
            if g.nrows() == self.ny {
                if let Some(v) = max_residual(&self.cy, g, &self.dy) {
                    if v <= S::zero() {
                        if self.verbose {
                            eprintln!("[qp] caller-supplied guess is a feasible start");
                        }
                        self.yk = g.clone();
                        return Ok(());
                    }
                }
            }
        }

        if self.ca.nrows() > 0 {
            let candidate = factor::lstsq(self.backend, &self.ca, &self.da);
            if let Some(v) = max_residual(&self.cy, &candidate, &self.dy) {
                if v <= S::zero() {
                    if self.verbose {
                        eprintln!("[qp] active rows give a feasible start");
                    }
                    self.yk = candidate;
                    return Ok(());
                }
            }
        }

        if self.verbose {
            eprintln!("[qp] falling back to a simplex feasibility search");
        }
        let zero_objective = DVector::zeros(self.ny);
        let margin = self.dy.map(|v| v - self.tol);
        match simplex::minimize(&zero_objective, &self.cy, &margin, self.tol, -S::one()) {
            Ok(y) => self.yk = y,
            Err(e) => {
                return Err(QpError::Infeasible(format!(
                    "no feasible starting point: {}",
                    e
                )))
            }
        }
        if let Some(v) = max_residual(&self.cy, &self.yk, &self.dy) {
            if v > S::zero() {
                return Err(QpError::Infeasible(
                    "the feasibility search returned a point violating the inequalities"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Rematerializes `ca`/`da` from the active index list, in activation
    /// order.
    fn rebuild_active_rows(&mut self) {
        self.ca = self.cy.select_rows(self.active.iter());
        self.da = self.dy.select_rows(self.active.iter());
    }

    /// Recomputes the reduced objective and its unconstrained minimizer.
    fn refresh_reduced_objective(&mut self) {
        if self.me > 0 {
            if self.ny > 0 {
                self.qy = &self.q * &self.z;
                self.ry = &self.r - &self.q * &self.x_eq;
            } else {
                self.qy = DMatrix::zeros(self.nr, 0);
                self.ry = DVector::zeros(self.nr);
            }
        } else {
            self.qy = self.q.clone();
            self.ry = self.r.clone();
        }

        self.yu = if self.ny > 0 {
            factor::lstsq(self.backend, &self.qy, &self.ry)
        } else {
            DVector::zeros(0)
        };
    }
}

/// Largest entry of `C y − d`, or `None` when there are no rows.
fn max_residual<S: RealField + Copy>(
    c: &DMatrix<S>,
    y: &DVector<S>,
    d: &DVector<S>,
) -> Option<S> {
    if c.nrows() == 0 {
        return None;
    }
    let residual = c * y - d;
    let mut best = residual[0];
    for i in 1..residual.nrows() {
        if residual[i] > best {
            best = residual[i];
        }
    }
    Some(best)
}

fn row_dot<S: RealField + Copy>(m: &DMatrix<S>, row: usize, v: &DVector<S>) -> S {
    let mut acc = S::zero();
    for j in 0..m.ncols() {
        acc += m[(row, j)] * v[j];
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_unconstrained_is_least_squares() {
        // min (x1 + x2 - 5)^2: the minimum-norm minimizer is (2.5, 2.5).
        let q = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        let r = DVector::from_row_slice(&[5.0]);
        let mut solver = Solver::from_objective(&q, &r, TOL);
        let x = solver.solve().unwrap();
        assert_relative_eq!(x[0], 2.5, epsilon = 1e-9);
        assert_relative_eq!(x[1], 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_equality_and_inequality() {
        // min (x1 + x2 - 5)^2 s.t. x1 - x2 = 10, x1 + 4 x2 <= 0.
        // Optimum at (7.5, -2.5).
        let q = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        let r = DVector::from_row_slice(&[5.0]);
        let a = DMatrix::from_row_slice(1, 2, &[1.0, -1.0]);
        let b = DVector::from_row_slice(&[10.0]);
        let c = DMatrix::from_row_slice(1, 2, &[1.0, 4.0]);
        let d = DVector::from_row_slice(&[0.0]);

        let mut solver = Solver::from_objective(&q, &r, TOL);
        solver.set_constraints_eq(&a, &b, &c, &d).unwrap();
        let x = solver.solve().unwrap();
        assert_relative_eq!(x[0], 7.5, epsilon = 1e-6);
        assert_relative_eq!(x[1], -2.5, epsilon = 1e-6);
    }

    #[test]
    fn test_fully_determined_by_equalities() {
        let q = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let r = DVector::from_row_slice(&[0.0]);
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, -1.0]);
        let b = DVector::from_row_slice(&[3.0, 1.0]);
        let c = DMatrix::<f64>::zeros(0, 2);
        let d = DVector::<f64>::zeros(0);

        let mut solver = Solver::from_objective(&q, &r, TOL);
        solver.set_constraints_eq(&a, &b, &c, &d).unwrap();
        let x = solver.solve().unwrap();
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_infeasible_equalities_clear_constraints() {
        let q = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
        let r = DVector::from_row_slice(&[4.0]);
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let b = DVector::from_row_slice(&[1.0, 2.0]);
        let c = DMatrix::<f64>::zeros(0, 2);
        let d = DVector::<f64>::zeros(0);

        let mut solver = Solver::from_objective(&q, &r, TOL);
        assert!(solver.set_constraints_eq(&a, &b, &c, &d).is_err());

        // Documented contract: the solver is now unconstrained and solves the
        // plain least-squares problem.
        let x = solver.solve().unwrap();
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_infeasible_inequalities_clear_constraints() {
        // x1 <= -1 and -x1 <= -1 demand x1 <= -1 and x1 >= 1 at once.
        let q = DMatrix::from_row_slice(1, 1, &[1.0]);
        let r = DVector::from_row_slice(&[3.0]);
        let c = DMatrix::from_row_slice(2, 1, &[1.0, -1.0]);
        let d = DVector::from_row_slice(&[-1.0, -1.0]);

        let mut solver = Solver::from_objective(&q, &r, TOL);
        assert!(solver.set_constraints(&c, &d).is_err());
        let x = solver.solve().unwrap();
        assert_relative_eq!(x[0], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inequality_binds_only_when_violated() {
        // min (x - 3)^2 with x <= 5: the bound is slack at the optimum.
        let q = DMatrix::from_row_slice(1, 1, &[1.0]);
        let r = DVector::from_row_slice(&[3.0]);
        let c = DMatrix::from_row_slice(1, 1, &[1.0]);
        let d = DVector::from_row_slice(&[5.0]);
        let mut solver = Solver::from_objective(&q, &r, TOL);
        solver.set_constraints(&c, &d).unwrap();
        let x = solver.solve().unwrap();
        assert_relative_eq!(x[0], 3.0, epsilon = 1e-9);

        // With x <= 2 the bound becomes active.
        let d = DVector::from_row_slice(&[2.0]);
        solver.update_inequalities(&c, &d).unwrap();
        let x = solver.solve().unwrap();
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-7);
    }

    #[test]
    fn test_update_objective_keeps_constraints() {
        let q = DMatrix::from_row_slice(1, 1, &[1.0]);
        let r = DVector::from_row_slice(&[10.0]);
        let c = DMatrix::from_row_slice(1, 1, &[1.0]);
        let d = DVector::from_row_slice(&[4.0]);
        let mut solver = Solver::from_objective(&q, &r, TOL);
        solver.set_constraints(&c, &d).unwrap();
        let x = solver.solve().unwrap();
        assert_relative_eq!(x[0], 4.0, epsilon = 1e-7);

        // A new target inside the feasible region frees the constraint. The
        // warm-started active set still pins the iterate to the old bound, so
        // a reset is needed for the bound to deactivate.
        let r = DVector::from_row_slice(&[1.0]);
        solver.update_objective(&q, &r);
        solver.reset_active_set();
        let x = solver.solve().unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-7);
    }

    #[test]
    fn test_solve_with_guess_accepts_feasible_guess() {
        let q = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let r = DVector::from_row_slice(&[4.0, 0.0]);
        let c = DMatrix::from_row_slice(1, 2, &[1.0, 0.0]);
        let d = DVector::from_row_slice(&[1.0]);
        let mut solver = Solver::from_objective(&q, &r, TOL);
        solver.set_constraints(&c, &d).unwrap();
        let guess = DVector::from_row_slice(&[0.0, 0.0]);
        let x = solver.solve_with_guess(&guess).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-7);
        assert_relative_eq!(x[1], 0.0, epsilon = 1e-7);
    }
}
