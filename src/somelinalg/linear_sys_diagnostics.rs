use log::{debug, warn};
use nalgebra::DMatrix;

/// matrices above this size are not checked with an SVD (too expensive for a diagnostic)
pub const DIAGNOSTICS_MAX_DIM: usize = 400;
/// condition numbers above this are reported as a warning
pub const CONDITION_WARNING_THRESHOLD: f64 = 1e12;
/// pivots smaller than this fraction of the largest matrix entry are treated as zero
pub const RELATIVE_PIVOT_TOL: f64 = 1e-13;

/// The condition number of a matrix is the ratio of its largest singular value to the smallest.
/// A system is poorly conditioned when the solution is sensitive to small changes in the data.
pub fn condition_number(A: &DMatrix<f64>) -> f64 {
    let singular_values = A.singular_values();
    let max_sigma = singular_values.max();
    let min_sigma = singular_values.min();
    if min_sigma == 0.0 {
        return f64::INFINITY;
    }
    max_sigma / min_sigma
}

pub fn poorly_conditioned(A: &DMatrix<f64>, threshold: f64) -> bool {
    let cond = condition_number(A);
    let poorly_conditioned = cond > threshold;
    if poorly_conditioned {
        warn!(
            "The system of linear equations is poorly conditioned. Condition number = {:.3e}",
            cond
        );
    } else {
        debug!("condition number = {:.3e}", cond);
    }
    poorly_conditioned
}

/// Conditioning check that is skipped for large matrices
pub fn linear_system_diagnostics(A: &DMatrix<f64>, threshold: f64) -> Option<bool> {
    if A.nrows() > DIAGNOSTICS_MAX_DIM {
        debug!(
            "skipping condition number estimate for a {}x{} matrix",
            A.nrows(),
            A.ncols()
        );
        return None;
    }
    Some(poorly_conditioned(A, threshold))
}

/// scale used to judge pivots: largest absolute entry (1.0 for a zero matrix)
pub fn pivot_scale(A: &DMatrix<f64>) -> f64 {
    let amax = A.amax();
    if amax > 0.0 { amax } else { 1.0 }
}

/// famous example of ill-conditioned matrix
#[cfg(test)]
pub(crate) fn hilbert_matrix(n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |i, j| 1.0 / (i as f64 + j as f64 + 1.0))
}
