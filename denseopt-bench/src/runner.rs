//! Executes parsed fixtures against the solvers and grades the results.
//!
//! The grading mirrors the reference harness conventions: LP fixtures run
//! with a zero tolerance of `1e-6` under both feasibility strategies
//! (two-phase and penalty with weight `1e6`), QP fixtures run with a solve
//! tolerance of `1e-9`. Solutions are compared through their objective
//! values, not coordinate by coordinate, since degenerate problems have
//! many optimal vertices.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use denseopt_core::qp;
use denseopt_core::simplex;

use crate::fixture::{self, LpFixture, QpFixture};

/// Zero tolerance handed to the simplex engine.
pub const LP_TOLERANCE: f64 = 1e-6;
/// Penalty weight for the big-M strategy.
pub const LP_PENALTY: f64 = 1e6;
/// Feasibility tolerance handed to the QP solver.
pub const QP_TOLERANCE: f64 = 1e-9;
/// Relative tolerance for objective comparisons.
pub const COMP_TOLERANCE: f64 = 1e-6;

/// Outcome of a single fixture.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub kind: CaseKind,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaseKind {
    Lp,
    Qp,
}

/// Aggregate over a fixture directory.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub cases: Vec<CaseReport>,
}

impl Summary {
    fn from_cases(cases: Vec<CaseReport>) -> Self {
        let passed = cases.iter().filter(|c| c.passed).count();
        Summary {
            total: cases.len(),
            passed,
            failed: cases.len() - passed,
            cases,
        }
    }
}

fn solve_lp(lp: &LpFixture, large_number: f64) -> Result<nalgebra::DVector<f64>, simplex::SimplexError> {
    if lp.a.nrows() > 0 {
        simplex::minimize_eq(
            &lp.f,
            &lp.a,
            &lp.b,
            &lp.c,
            &lp.d,
            LP_TOLERANCE,
            large_number,
        )
    } else {
        simplex::minimize(&lp.f, &lp.c, &lp.d, LP_TOLERANCE, large_number)
    }
}

/// Runs an LP fixture under both strategies and grades each result.
pub fn run_lp_case(name: &str, lp: &LpFixture) -> CaseReport {
    for (label, large) in [("two-phase", -1.0), ("penalty", LP_PENALTY)] {
        let outcome = solve_lp(lp, large);
        match (lp.feasible, outcome) {
            (true, Ok(x)) => {
                let expected_obj = lp.f.dot(&lp.expected);
                let obj = lp.f.dot(&x);
                let ftol = (LP_TOLERANCE * expected_obj.abs()).max(LP_TOLERANCE);
                if (expected_obj - obj).abs() > ftol {
                    return CaseReport {
                        name: name.to_string(),
                        kind: CaseKind::Lp,
                        passed: false,
                        detail: format!(
                            "{}: objective {} does not match expected {}",
                            label, obj, expected_obj
                        ),
                    };
                }
            }
            (false, Err(_)) => {}
            (true, Err(e)) => {
                return CaseReport {
                    name: name.to_string(),
                    kind: CaseKind::Lp,
                    passed: false,
                    detail: format!("{}: expected a solution, solver said: {}", label, e),
                };
            }
            (false, Ok(_)) => {
                return CaseReport {
                    name: name.to_string(),
                    kind: CaseKind::Lp,
                    passed: false,
                    detail: format!("{}: expected infeasibility, solver found a solution", label),
                };
            }
        }
    }
    CaseReport {
        name: name.to_string(),
        kind: CaseKind::Lp,
        passed: true,
        detail: "ok".to_string(),
    }
}

/// Runs a QP fixture and grades the result.
pub fn run_qp_case(name: &str, qp_fixture: &QpFixture) -> CaseReport {
    let fail = |detail: String| CaseReport {
        name: name.to_string(),
        kind: CaseKind::Qp,
        passed: false,
        detail,
    };

    let mut solver = qp::Solver::from_objective(&qp_fixture.q, &qp_fixture.r, QP_TOLERANCE);
    let installed = if qp_fixture.a.nrows() > 0 {
        solver.set_constraints_eq(&qp_fixture.a, &qp_fixture.b, &qp_fixture.c, &qp_fixture.d)
    } else {
        solver.set_constraints(&qp_fixture.c, &qp_fixture.d)
    };

    match (qp_fixture.feasible, installed) {
        (false, Err(_)) => {
            return CaseReport {
                name: name.to_string(),
                kind: CaseKind::Qp,
                passed: true,
                detail: "ok (infeasible)".to_string(),
            };
        }
        (true, Err(e)) => return fail(format!("expected feasible constraints, got: {}", e)),
        (false, Ok(())) => return fail("expected infeasible constraints".to_string()),
        (true, Ok(())) => {}
    }

    let x = match solver.solve() {
        Ok(x) => x,
        Err(e) => return fail(format!("solve failed: {}", e)),
    };

    if qp_fixture.a.nrows() > 0 {
        let residual = &qp_fixture.a * &x - &qp_fixture.b;
        if residual.iter().any(|v| v.abs() > QP_TOLERANCE) {
            return fail(format!(
                "equality constraints violated, |A x - b| = {:.3e}",
                residual.norm()
            ));
        }
    }
    if qp_fixture.c.nrows() > 0 {
        let slack = &qp_fixture.c * &x - &qp_fixture.d;
        if slack.iter().any(|v| *v > QP_TOLERANCE) {
            return fail(format!(
                "inequality constraints violated, max(C x - d) = {:.3e}",
                slack.max()
            ));
        }
    }

    let expected_obj = (&qp_fixture.q * &qp_fixture.expected - &qp_fixture.r).norm();
    let obj = (&qp_fixture.q * &x - &qp_fixture.r).norm();
    let ftol = COMP_TOLERANCE * (0.5 * (expected_obj + obj)).max(1.0);
    if obj > expected_obj + ftol {
        return fail(format!(
            "objective {} is worse than expected {}",
            obj, expected_obj
        ));
    }

    CaseReport {
        name: name.to_string(),
        kind: CaseKind::Qp,
        passed: true,
        detail: "ok".to_string(),
    }
}

/// Runs every `lp_*.txt` and `qp_*.txt` fixture in a directory.
pub fn run_directory(dir: &Path) -> Result<Summary> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    paths.sort();

    let mut cases = Vec::new();
    for path in paths {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        if name.starts_with("lp_") {
            let lp = fixture::load_lp(&path)?;
            cases.push(run_lp_case(&name, &lp));
        } else if name.starts_with("qp_") {
            let qp_fixture = fixture::load_qp(&path)?;
            cases.push(run_qp_case(&name, &qp_fixture));
        }
    }

    Ok(Summary::from_cases(cases))
}
