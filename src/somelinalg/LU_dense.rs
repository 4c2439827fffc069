//! Direct dense solve Ax = b through nalgebra's LU decomposition with partial pivoting.
//! A pivot below `RELATIVE_PIVOT_TOL * max|A_ij|` means the matrix is (numerically) singular.
use crate::numerical::BVP_linear::BVP_errors::{BVPError, BVPResult};
use crate::somelinalg::linear_sys_diagnostics::{RELATIVE_PIVOT_TOL, pivot_scale};
use log::debug;
use nalgebra::{DMatrix, DVector};

pub fn solve_dense_LU(A: &DMatrix<f64>, b: &DVector<f64>) -> BVPResult<DVector<f64>> {
    let (n, m) = A.shape();
    if n != m {
        return Err(BVPError::configuration(format!(
            "matrix must be square, got {}x{}",
            n, m
        )));
    }
    if b.len() != n {
        return Err(BVPError::configuration(format!(
            "right hand side has length {} but the matrix is {}x{}",
            b.len(),
            n,
            n
        )));
    }
    let scale = pivot_scale(A);
    let lu = A.clone().lu();
    let u_diag = lu.u().diagonal();
    let min_pivot = u_diag.amin();
    debug!(
        "dense LU: n = {}, smallest pivot {:.3e}, matrix scale {:.3e}",
        n, min_pivot, scale
    );
    if !(min_pivot > RELATIVE_PIVOT_TOL * scale) {
        return Err(BVPError::degeneracy(format!(
            "matrix is singular: smallest LU pivot {:.3e} relative to scale {:.3e}",
            min_pivot, scale
        )));
    }
    let x = lu
        .solve(b)
        .ok_or_else(|| BVPError::degeneracy("LU solve failed: matrix is singular"))?;
    if x.iter().any(|v| !v.is_finite()) {
        return Err(BVPError::degeneracy(
            "LU solve produced non-finite values",
        ));
    }
    Ok(x)
}
