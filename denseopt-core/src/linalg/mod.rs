//! Dense factorization helpers shared by the solvers.

pub mod factor;

pub use factor::{lstsq, nullspace, Backend};
