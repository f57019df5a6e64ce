//! Denseopt: dense linear and quadratic programming
//!
//! This library provides two optimization engines over dense real matrices:
//!
//! - **Linear Programming (LP)**: a simplex method with two-phase and
//!   penalty (big-M) feasibility strategies
//! - **Constrained least squares (QP)**: an active-set method for
//!   `min ‖Q x − r‖²` under linear equality and inequality constraints,
//!   with warm-started re-solves
//!
//! # Algorithm
//!
//! Both engines share a **kernel projection** preprocessor: equality
//! constraints `A x = b` are eliminated by writing `x = x_eq + Z y` with
//! `x_eq` a particular least-squares solution and `Z` an orthonormal basis
//! of `ker(A)`. The reduced, inequality-only problem is then solved in `y`.
//! Key features:
//!
//! - **Interchangeable factorizations**: SVD or column-pivoted QR back the
//!   least-squares solves and kernel extraction, selectable per solver
//! - **Sign deduction**: single-variable inequality rows become variable
//!   domains instead of tableau rows, keeping the simplex tableau small
//! - **Warm starts**: the QP solver keeps its iterate and active set across
//!   inequality updates of unchanged dimension
//!
//! All matrices are dense with runtime dimensions, and the scalar type is
//! generic over [`nalgebra::RealField`].
//!
//! # Example
//!
//! ```
//! use nalgebra::{DMatrix, DVector};
//! use denseopt_core::qp;
//!
//! // min (x1 + x2 - 5)^2  s.t.  x1 - x2 = 10,  x1 + 4 x2 <= 0
//! let q = DMatrix::<f64>::from_row_slice(1, 2, &[1.0, 1.0]);
//! let r = DVector::from_row_slice(&[5.0]);
//! let a = DMatrix::from_row_slice(1, 2, &[1.0, -1.0]);
//! let b = DVector::from_row_slice(&[10.0]);
//! let c = DMatrix::from_row_slice(1, 2, &[1.0, 4.0]);
//! let d = DVector::from_row_slice(&[0.0]);
//!
//! let mut solver = qp::Solver::from_objective(&q, &r, 1e-9);
//! solver.set_constraints_eq(&a, &b, &c, &d).expect("feasible");
//! let x = solver.solve().expect("solvable");
//! // x is approximately (7.5, -2.5)
//! assert!((x[0] - 7.5).abs() < 1e-6 && (x[1] + 2.5).abs() < 1e-6);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)] // full-form LP entry points take the whole problem

pub mod kernel;
pub mod linalg;
pub mod qp;
pub mod simplex;

// Re-export main types
pub use linalg::factor::Backend;
pub use qp::{QpError, Solver as QpSolver};
pub use simplex::SimplexError;
