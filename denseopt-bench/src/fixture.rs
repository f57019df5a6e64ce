//! Plain-text fixture parser for LP and QP test problems.
//!
//! Both formats are whitespace-delimited token streams; line breaks carry no
//! meaning. The leading token states whether the problem is feasible, then a
//! dimension line follows, then the matrices in row-major order. Blocks for
//! equality or inequality constraints are absent when their count is zero.
//!
//! LP fixture (`lp_*.txt`):
//!
//! ```text
//! <True|False>
//! <nv> <ne> <ni>
//! <nv floats: f>
//! <ne*nv floats: A>  <ne floats: b>      # only if ne > 0
//! <ni*nv floats: C>  <ni floats: d>      # only if ni > 0
//! <nv floats: expected x>
//! ```
//!
//! QP fixture (`qp_*.txt`):
//!
//! ```text
//! <True|False>
//! <nv> <no> <ne> <ni>
//! <no*nv floats: Q>  <no floats: r>
//! <ne*nv floats: A>  <ne floats: b>      # only if ne > 0
//! <ni*nv floats: C>  <ni floats: d>      # only if ni > 0
//! <nv floats: expected x>
//! ```
//!
//! The expected solution is always present; it is ignored for infeasible
//! problems.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use nalgebra::{DMatrix, DVector};

/// A parsed LP fixture.
#[derive(Debug, Clone)]
pub struct LpFixture {
    pub feasible: bool,
    pub f: DVector<f64>,
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub c: DMatrix<f64>,
    pub d: DVector<f64>,
    pub expected: DVector<f64>,
}

/// A parsed QP fixture.
#[derive(Debug, Clone)]
pub struct QpFixture {
    pub feasible: bool,
    pub q: DMatrix<f64>,
    pub r: DVector<f64>,
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub c: DMatrix<f64>,
    pub d: DVector<f64>,
    pub expected: DVector<f64>,
}

/// Token cursor over the fixture text.
struct Tokens<'a> {
    iter: std::str::SplitWhitespace<'a>,
    consumed: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            iter: text.split_whitespace(),
            consumed: 0,
        }
    }

    fn next(&mut self) -> Result<&'a str> {
        self.consumed += 1;
        self.iter
            .next()
            .with_context(|| format!("fixture ends early at token {}", self.consumed))
    }

    fn bool(&mut self) -> Result<bool> {
        match self.next()? {
            "True" => Ok(true),
            "False" => Ok(false),
            other => bail!("expected True or False, found {:?}", other),
        }
    }

    fn usize(&mut self) -> Result<usize> {
        let tok = self.next()?;
        tok.parse()
            .with_context(|| format!("expected a dimension, found {:?}", tok))
    }

    fn float(&mut self) -> Result<f64> {
        let tok = self.next()?;
        tok.parse()
            .with_context(|| format!("expected a number, found {:?}", tok))
    }

    fn vector(&mut self, len: usize) -> Result<DVector<f64>> {
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(self.float()?);
        }
        Ok(DVector::from_vec(values))
    }

    fn matrix(&mut self, rows: usize, cols: usize) -> Result<DMatrix<f64>> {
        let mut values = Vec::with_capacity(rows * cols);
        for _ in 0..rows * cols {
            values.push(self.float()?);
        }
        Ok(DMatrix::from_row_slice(rows, cols, &values))
    }
}

/// Parses an LP fixture from its text content.
pub fn parse_lp(text: &str) -> Result<LpFixture> {
    let mut tokens = Tokens::new(text);
    let feasible = tokens.bool()?;
    let nv = tokens.usize()?;
    let ne = tokens.usize()?;
    let ni = tokens.usize()?;
    if nv == 0 {
        bail!("LP fixture declares zero variables");
    }

    let f = tokens.vector(nv)?;
    let a = tokens.matrix(ne, nv)?;
    let b = tokens.vector(ne)?;
    let c = tokens.matrix(ni, nv)?;
    let d = tokens.vector(ni)?;
    let expected = tokens.vector(nv)?;

    Ok(LpFixture {
        feasible,
        f,
        a,
        b,
        c,
        d,
        expected,
    })
}

/// Parses a QP fixture from its text content.
pub fn parse_qp(text: &str) -> Result<QpFixture> {
    let mut tokens = Tokens::new(text);
    let feasible = tokens.bool()?;
    let nv = tokens.usize()?;
    let no = tokens.usize()?;
    let ne = tokens.usize()?;
    let ni = tokens.usize()?;
    if nv == 0 || no == 0 {
        bail!("QP fixture declares an empty objective");
    }

    let q = tokens.matrix(no, nv)?;
    let r = tokens.vector(no)?;
    let a = tokens.matrix(ne, nv)?;
    let b = tokens.vector(ne)?;
    let c = tokens.matrix(ni, nv)?;
    let d = tokens.vector(ni)?;
    let expected = tokens.vector(nv)?;

    Ok(QpFixture {
        feasible,
        q,
        r,
        a,
        b,
        c,
        d,
        expected,
    })
}

/// Loads and parses an LP fixture file.
pub fn load_lp(path: &Path) -> Result<LpFixture> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_lp(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Loads and parses a QP fixture file.
pub fn load_qp(path: &Path) -> Result<QpFixture> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_qp(&text).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lp_without_equalities() {
        let text = "True\n2 0 2\n-1 1\n1 0\n0 1\n4 3\n4 3\n";
        let lp = parse_lp(text).unwrap();
        assert!(lp.feasible);
        assert_eq!(lp.f.len(), 2);
        assert_eq!(lp.a.shape(), (0, 2));
        assert_eq!(lp.c.shape(), (2, 2));
        assert_eq!(lp.d.as_slice(), &[4.0, 3.0]);
        assert_eq!(lp.expected.as_slice(), &[4.0, 3.0]);
    }

    #[test]
    fn test_parse_lp_with_equalities() {
        let text = "True 2 1 1  1 1  1 -1  0  1 0  5  2.5 2.5";
        let lp = parse_lp(text).unwrap();
        assert_eq!(lp.a.shape(), (1, 2));
        assert_eq!(lp.b.as_slice(), &[0.0]);
        assert_eq!(lp.c.shape(), (1, 2));
        assert_eq!(lp.d.as_slice(), &[5.0]);
    }

    #[test]
    fn test_parse_qp_round_trip() {
        let text = "True\n2 1 1 1\n1 1\n5\n1 -1\n10\n1 4\n0\n7.5 -2.5\n";
        let qp = parse_qp(text).unwrap();
        assert!(qp.feasible);
        assert_eq!(qp.q.shape(), (1, 2));
        assert_eq!(qp.r.as_slice(), &[5.0]);
        assert_eq!(qp.a.shape(), (1, 2));
        assert_eq!(qp.c.shape(), (1, 2));
        assert_eq!(qp.expected.as_slice(), &[7.5, -2.5]);
    }

    #[test]
    fn test_truncated_fixture_is_an_error() {
        let text = "True\n2 0 1\n-1 1\n1 0\n";
        assert!(parse_lp(text).is_err());
    }

    #[test]
    fn test_bad_feasibility_token_is_an_error() {
        let text = "Maybe\n1 0 1\n1\n1\n1\n1\n";
        assert!(parse_lp(text).is_err());
    }
}
