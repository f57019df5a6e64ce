//! Quadratic programming example.
//!
//! Solves:
//!   minimize    (x1 + x2 - 5)^2
//!   subject to  x1 -   x2  = 10
//!               x1 + 4 x2 <= 0
//!
//! Optimal solution: x = (7.5, -2.5)

use denseopt_core::qp::Solver;
use nalgebra::{DMatrix, DVector};

fn main() {
    println!("Denseopt - Quadratic Programming Example");
    println!("========================================");
    println!();

    // Objective and constraints in matrix form:
    //   Q = [1 1]   r = [5]
    //   A = [1 -1]  b = [10]
    //   C = [1  4]  d = [0]
    let q = DMatrix::from_row_slice(1, 2, &[1.0, 1.0]);
    let r = DVector::from_row_slice(&[5.0]);
    let a = DMatrix::from_row_slice(1, 2, &[1.0, -1.0]);
    let b = DVector::from_row_slice(&[10.0]);
    let c = DMatrix::from_row_slice(1, 2, &[1.0, 4.0]);
    let d = DVector::from_row_slice(&[0.0]);

    let tolerance = 1e-6;
    let mut solver = Solver::from_objective(&q, &r, tolerance);

    if let Err(e) = solver.set_constraints_eq(&a, &b, &c, &d) {
        eprintln!("Constraints rejected: {}", e);
        std::process::exit(1);
    }

    match solver.solve() {
        Ok(x) => {
            println!("=== Solution ===");
            println!("x1 = {:.6}", x[0]);
            println!("x2 = {:.6}", x[1]);
            // Prints: x = (7.5, -2.5)

            println!();
            println!(
                "Equality residual:  A x - b = {:.2e}",
                (&a * &x - &b).norm()
            );
            println!(
                "Inequality slack:   C x - d = {:.6} (should be <= 0)",
                (&c * &x - &d)[0]
            );
            println!("Objective:          |Q x - r| = {:.6}", (&q * &x - &r).norm());
        }
        Err(e) => {
            eprintln!("Solver failed: {}", e);
            std::process::exit(1);
        }
    }
}
