#![allow(non_snake_case)]
#![allow(non_camel_case_types)]
use crate::numerical::BVP_linear::BVP_errors::{BVPError, BVPResult};
use crate::somelinalg::linear_sys_diagnostics::{RELATIVE_PIVOT_TOL, pivot_scale};
use log::debug;
use nalgebra::{DMatrix, DVector};

/// LU decomposition with partial (row) pivoting restricted to the band of the matrix.
///
/// The matrix is kept in LAPACK band storage: entry A[(i, j)] lives in `ab[(kl + ku + i - j, j)]`,
/// so `ab` has 2*kl + ku + 1 rows and N columns and memory is O(N * (2 kl + ku)). The extra kl
/// rows on top hold the fill-in created by row interchanges, which is why the upper bandwidth of
/// the factor is kl + ku. Every elimination step only touches the kl rows below the pivot and
/// the kl + ku columns to the right of it, so the cost is O(N * kl * (kl + ku)).
///
/// Multipliers are stored below the diagonal in the order they were produced, and the row
/// interchanges are recorded LAPACK style: at step k row k was swapped with row `ipiv[k]`.
/// [`BandLU::solve`] replays the swaps interleaved with the forward elimination.
#[derive(Debug, Clone)]
pub struct BandLU {
    ab: DMatrix<f64>,
    n: usize,
    ipiv: Vec<usize>,
    kl: usize,
    ku: usize,
    factorized: bool,
}

impl BandLU {
    fn zeros(n: usize, kl: usize, ku: usize) -> BandLU {
        debug!("band LU: n = {}, kl = {}, ku = {}", n, kl, ku);
        BandLU {
            ab: DMatrix::zeros(2 * kl + ku + 1, n),
            n,
            ipiv: (0..n).collect(),
            kl,
            ku,
            factorized: false,
        }
    }

    /// row of `ab` holding A[(i, j)], valid for j <= i + kl + ku and i <= j + kl
    fn row(&self, i: usize, j: usize) -> usize {
        self.kl + self.ku + i - j
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.ab[(self.row(i, j), j)]
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        let r = self.row(i, j);
        self.ab[(r, j)] = value;
    }

    /// Copies a dense matrix into band storage. `bandwidth` = (kl, ku); when None it is
    /// detected from the nonzero pattern. Nonzeros outside a given band are an error.
    pub fn new(matrix: DMatrix<f64>, bandwidth: Option<(usize, usize)>) -> BVPResult<BandLU> {
        let (nrows, ncols) = matrix.shape();
        if nrows != ncols {
            return Err(BVPError::configuration(format!(
                "matrix must be square, got {}x{}",
                nrows, ncols
            )));
        }
        let (kl_found, ku_found) = Self::find_bandwidths(&matrix);
        let (kl, ku) = match bandwidth {
            Some((kl, ku)) if kl < kl_found || ku < ku_found => {
                return Err(BVPError::configuration(format!(
                    "matrix has bandwidths ({}, {}), larger than the requested ({}, {})",
                    kl_found, ku_found, kl, ku
                )));
            }
            Some(bw) => bw,
            None => (kl_found, ku_found),
        };
        let mut lu = Self::zeros(nrows, kl, ku);
        for j in 0..ncols {
            for i in j.saturating_sub(ku)..(j + kl + 1).min(nrows) {
                lu.set(i, j, matrix[(i, j)]);
            }
        }
        Ok(lu)
    }

    /// Tridiagonal matrix from its sub-, main and superdiagonal, without a dense copy
    pub fn from_diagonals(
        lower: &DVector<f64>,
        diagonal: &DVector<f64>,
        upper: &DVector<f64>,
    ) -> BVPResult<BandLU> {
        let n = diagonal.len();
        if n == 0 || lower.len() + 1 != n || upper.len() + 1 != n {
            return Err(BVPError::configuration(format!(
                "tridiagonal matrix needs n - 1, n, n - 1 diagonal entries, got {}, {}, {}",
                lower.len(),
                n,
                upper.len()
            )));
        }
        let mut lu = Self::zeros(n, 1, 1);
        for i in 0..n {
            lu.set(i, i, diagonal[i]);
            if i + 1 < n {
                lu.set(i + 1, i, lower[i]);
                lu.set(i, i + 1, upper[i]);
            }
        }
        Ok(lu)
    }

    pub fn bandwidths(&self) -> (usize, usize) {
        (self.kl, self.ku)
    }

    /// Number of sub- and superdiagonals holding nonzero entries
    pub fn find_bandwidths(A: &DMatrix<f64>) -> (usize, usize) {
        let n = A.nrows();
        let mut kl = 0;
        let mut ku = 0;
        for j in 0..A.ncols() {
            for i in 0..n {
                if A[(i, j)] != 0.0 {
                    if j > i {
                        ku = ku.max(j - i);
                    } else if i > j {
                        kl = kl.max(i - j);
                    }
                }
            }
        }
        (kl, ku)
    }

    /// In-place factorization PA = LU. A zero (or negligible) pivot column is reported as a
    /// singular matrix.
    pub fn factorize(&mut self) -> BVPResult<()> {
        let n = self.n;
        let (kl, ku) = (self.kl, self.ku);
        let tol = RELATIVE_PIVOT_TOL * pivot_scale(&self.ab);
        for k in 0..n {
            let lower_border = (k + kl + 1).min(n);
            let right_border = (k + kl + ku + 1).min(n);
            let d = kl + ku;
            let piv = self.ab.view_range(d..d + lower_border - k, k).icamax() + k;
            let diag = self.get(piv, k);
            if !(diag.abs() > tol) {
                return Err(BVPError::degeneracy(format!(
                    "matrix is singular: pivot {:.3e} in column {}",
                    diag, k
                )));
            }
            self.ipiv[k] = piv;
            if piv != k {
                for j in k..right_border {
                    let (a_kj, a_pj) = (self.get(k, j), self.get(piv, j));
                    self.set(k, j, a_pj);
                    self.set(piv, j, a_kj);
                }
            }
            let inv_diag = 1.0 / diag;
            for i in k + 1..lower_border {
                let m = self.get(i, k) * inv_diag;
                self.set(i, k, m);
                if m != 0.0 {
                    for j in k + 1..right_border {
                        let a_ij = self.get(i, j) - m * self.get(k, j);
                        self.set(i, j, a_ij);
                    }
                }
            }
        }
        self.factorized = true;
        Ok(())
    }

    /// Solves Ax = b with the stored factors
    pub fn solve(&self, b: &DVector<f64>) -> BVPResult<DVector<f64>> {
        let n = self.n;
        if !self.factorized {
            return Err(BVPError::configuration(
                "band LU: solve called before factorize",
            ));
        }
        if b.len() != n {
            return Err(BVPError::configuration(format!(
                "right hand side has length {} but the matrix is {}x{}",
                b.len(),
                n,
                n
            )));
        }
        let (kl, ku) = (self.kl, self.ku);
        let mut x = b.clone();
        // L y = P b
        for k in 0..n {
            let piv = self.ipiv[k];
            if piv != k {
                x.swap_rows(k, piv);
            }
            let xk = x[k];
            for i in k + 1..(k + kl + 1).min(n) {
                x[i] -= self.get(i, k) * xk;
            }
        }
        // U x = y
        for i in (0..n).rev() {
            let mut sum = x[i];
            for j in i + 1..(i + kl + ku + 1).min(n) {
                sum -= self.get(i, j) * x[j];
            }
            x[i] = sum / self.get(i, i);
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(BVPError::degeneracy(
                "band LU solve produced non-finite values",
            ));
        }
        Ok(x)
    }
}

/// factorize + solve in one call
pub fn solve_banded_LU(
    A: &DMatrix<f64>,
    b: &DVector<f64>,
    bandwidth: Option<(usize, usize)>,
) -> BVPResult<DVector<f64>> {
    let mut lu = BandLU::new(A.clone(), bandwidth)?;
    lu.factorize()?;
    lu.solve(b)
}

/// factorize + solve for a tridiagonal matrix given by its three diagonals
pub fn solve_tridiagonal_LU(
    lower: &DVector<f64>,
    diagonal: &DVector<f64>,
    upper: &DVector<f64>,
    b: &DVector<f64>,
) -> BVPResult<DVector<f64>> {
    let mut lu = BandLU::from_diagonals(lower, diagonal, upper)?;
    lu.factorize()?;
    lu.solve(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tridiagonal(n: usize, sub: f64, diag: f64, sup: f64) -> DMatrix<f64> {
        DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                diag
            } else if i == j + 1 {
                sub
            } else if j == i + 1 {
                sup
            } else {
                0.0
            }
        })
    }

    #[test]
    fn test_find_bandwidths() {
        let A = tridiagonal(5, -1.0, 2.0, -1.0);
        assert_eq!(BandLU::find_bandwidths(&A), (1, 1));
        let mut B = DMatrix::<f64>::identity(6, 6);
        B[(4, 1)] = 3.0;
        B[(0, 2)] = 1.0;
        assert_eq!(BandLU::find_bandwidths(&B), (3, 2));
        assert_eq!(BandLU::new(B.clone(), None).unwrap().bandwidths(), (3, 2));
        assert_eq!(BandLU::new(B.clone(), Some((4, 2))).unwrap().bandwidths(), (4, 2));
        assert!(matches!(
            BandLU::new(B, Some((1, 1))),
            Err(BVPError::Configuration(_))
        ));
    }

    #[test]
    fn test_tridiagonal_matches_dense() {
        let n = 9;
        let A = tridiagonal(n, -1.05, 2.02, -0.95);
        let b = DVector::from_fn(n, |i, _| (i as f64 + 1.0).sin());
        let x = solve_banded_LU(&A, &b, None).unwrap();
        let x_dense = A.clone().lu().solve(&b).unwrap();
        for i in 0..n {
            assert_relative_eq!(x[i], x_dense[i], epsilon = 1e-12);
        }
        let x_diagonals = solve_tridiagonal_LU(
            &DVector::from_element(n - 1, -1.05),
            &DVector::from_element(n, 2.02),
            &DVector::from_element(n - 1, -0.95),
            &b,
        )
        .unwrap();
        for i in 0..n {
            assert_relative_eq!(x_diagonals[i], x_dense[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_large_tridiagonal_system() {
        // far too large for dense storage
        let n = 200_000;
        let lower = DVector::from_element(n - 1, -1.0);
        let diagonal = DVector::from_element(n, 4.0);
        let upper = DVector::from_element(n - 1, -1.0);
        let b = DVector::from_fn(n, |i, _| if i == 0 || i == n - 1 { 3.0 } else { 2.0 });
        let lu = {
            let mut lu = BandLU::from_diagonals(&lower, &diagonal, &upper).unwrap();
            lu.factorize().unwrap();
            lu
        };
        assert_eq!(lu.bandwidths(), (1, 1));
        assert_eq!(lu.ab.shape(), (4, n));
        let x = lu.solve(&b).unwrap();
        assert!(x.iter().all(|v| (v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_pivoting_with_fill_in() {
        // small diagonal forces a row interchange at every step
        let n = 8;
        let A = tridiagonal(n, 3.0, 1e-3, 1.0);
        let x_exact = DVector::from_fn(n, |i, _| 1.0 + i as f64);
        let b = &A * &x_exact;
        let mut lu = BandLU::new(A.clone(), None).unwrap();
        lu.factorize().unwrap();
        assert!(lu.ipiv.iter().enumerate().any(|(k, &p)| p != k));
        let x = lu.solve(&b).unwrap();
        for i in 0..n {
            assert_relative_eq!(x[i], x_exact[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_wider_band() {
        let n = 10;
        let A = DMatrix::from_fn(n, n, |i, j| {
            let d = i as i64 - j as i64;
            match d {
                0 => 4.0 + i as f64 * 0.1,
                1 | 2 => -1.0 - 0.05 * j as f64,
                -1 => 0.5,
                _ => 0.0,
            }
        });
        let b = DVector::from_fn(n, |i, _| i as f64 - 3.0);
        let x = solve_banded_LU(&A, &b, Some((2, 1))).unwrap();
        let residual = (&A * &x - &b).norm();
        assert!(residual < 1e-12, "residual = {}", residual);
    }

    #[test]
    fn test_singular_band_matrix() {
        let mut A = tridiagonal(4, 1.0, 2.0, 1.0);
        A.row_mut(2).fill(0.0);
        let b = DVector::from_element(4, 1.0);
        assert!(matches!(
            solve_banded_LU(&A, &b, None),
            Err(BVPError::NumericalDegeneracy(_))
        ));
    }

    #[test]
    fn test_solve_requires_factorization() {
        let lu = BandLU::new(DMatrix::identity(3, 3), None).unwrap();
        assert!(lu.solve(&DVector::zeros(3)).is_err());
        assert!(BandLU::new(DMatrix::zeros(2, 3), None).is_err());
        let one = DVector::from_element(1, 1.0);
        assert!(BandLU::from_diagonals(&one, &one, &one).is_err());
    }
}
