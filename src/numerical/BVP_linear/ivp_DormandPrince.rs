//! Adaptive Dormand-Prince 5(4) integrator for the initial value problems of the shooting method.
//!
//! The step is controlled by the embedded 4th order error estimate with the usual mixed
//! scale `atol + rtol*|y|`; results are reported on a fixed output grid. Steps are clipped
//! so that every output abscissa is hit exactly, no interpolation is involved.
use crate::numerical::BVP_linear::BVP_errors::{BVPError, BVPResult};
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};

const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
const A: [[f64; 6]; 6] = [
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
    ],
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];
// 5th order weights (same as the last row of A, FSAL)
const B: [f64; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];
// difference between the 5th and the embedded 4th order weights
const E: [f64; 7] = [
    -71.0 / 57600.0,
    0.0,
    71.0 / 16695.0,
    -71.0 / 1920.0,
    17253.0 / 339200.0,
    -22.0 / 525.0,
    1.0 / 40.0,
];
const ERROR_ESTIMATOR_ORDER: f64 = 4.0;
const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

/// right hand side dy/dx = f(x, y)
pub type OdeRhs<'a> = dyn Fn(f64, &DVector<f64>) -> DVector<f64> + 'a;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DormandPrinceSettings {
    pub rtol: f64,
    pub atol: f64,
    /// accepted + rejected steps allowed over the whole interval
    pub max_steps: usize,
}

impl Default for DormandPrinceSettings {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-9,
            max_steps: 100_000,
        }
    }
}

impl DormandPrinceSettings {
    pub fn validate(&self) -> BVPResult<()> {
        if !(self.rtol.is_finite() && self.rtol > 0.0) {
            return Err(BVPError::configuration(format!(
                "rtol must be positive, got {}",
                self.rtol
            )));
        }
        if !(self.atol.is_finite() && self.atol >= 0.0) {
            return Err(BVPError::configuration(format!(
                "atol must be non-negative, got {}",
                self.atol
            )));
        }
        if self.max_steps == 0 {
            return Err(BVPError::configuration("max_steps must be at least 1"));
        }
        if self.rtol < 100.0 * f64::EPSILON {
            warn!(
                "rtol = {} is below 100*EPS, the error control will not reach it",
                self.rtol
            );
        }
        Ok(())
    }
}

/// Statistics of one integration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntegrationStats {
    pub accepted: usize,
    pub rejected: usize,
    pub rhs_evaluations: usize,
}

fn rms_norm(v: &DVector<f64>) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.norm() / (v.len() as f64).sqrt()
}

/// Initial step heuristic (Hairer, Norsett, Wanner), same scheme the stiff solvers of the crate use
fn select_initial_step(
    f: &OdeRhs,
    x0: f64,
    y0: &DVector<f64>,
    f0: &DVector<f64>,
    interval_length: f64,
    settings: &DormandPrinceSettings,
) -> f64 {
    if interval_length == 0.0 {
        return 0.0;
    }
    let scale = y0.map(|y| settings.atol + y.abs() * settings.rtol);
    let d0 = rms_norm(&y0.component_div(&scale));
    let d1 = rms_norm(&f0.component_div(&scale));
    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };
    let h0 = h0.min(interval_length);
    let y1 = y0 + h0 * f0;
    let f1 = f(x0 + h0, &y1);
    let d2 = rms_norm(&(f1 - f0).component_div(&scale)) / h0;
    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        f64::max(1e-6, h0 * 1e-3)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / (ERROR_ESTIMATOR_ORDER + 1.0))
    };
    (100.0 * h0).min(h1).min(interval_length)
}

/// One Dormand-Prince step; returns (y_new, f_new, error_norm)
fn dopri_step(
    f: &OdeRhs,
    x: f64,
    y: &DVector<f64>,
    f0: &DVector<f64>,
    h: f64,
    settings: &DormandPrinceSettings,
) -> (DVector<f64>, DVector<f64>, f64) {
    let mut k: Vec<DVector<f64>> = Vec::with_capacity(7);
    k.push(f0.clone());
    for s in 1..6 {
        let mut y_stage = y.clone();
        for (j, kj) in k.iter().enumerate() {
            let a_sj = A[s - 1][j];
            if a_sj != 0.0 {
                y_stage.axpy(h * a_sj, kj, 1.0);
            }
        }
        k.push(f(x + C[s] * h, &y_stage));
    }
    let mut y_new = y.clone();
    for (j, kj) in k.iter().enumerate() {
        if B[j] != 0.0 {
            y_new.axpy(h * B[j], kj, 1.0);
        }
    }
    let f_new = f(x + h, &y_new);
    k.push(f_new.clone());

    let mut err = DVector::zeros(y.len());
    for (j, kj) in k.iter().enumerate() {
        if E[j] != 0.0 {
            err.axpy(h * E[j], kj, 1.0);
        }
    }
    let scale = y
        .zip_map(&y_new, |a, b| a.abs().max(b.abs()))
        .map(|m| settings.atol + m * settings.rtol);
    let error_norm = rms_norm(&err.component_div(&scale));
    (y_new, f_new, error_norm)
}

/// Integrates dy/dx = f(x, y), y(x_out[0]) = y0 and returns the states on `x_out` as the
/// columns of a (dim x x_out.len()) matrix.
pub fn dormand_prince_on_grid(
    f: &OdeRhs,
    y0: &DVector<f64>,
    x_out: &DVector<f64>,
    settings: &DormandPrinceSettings,
) -> BVPResult<(DMatrix<f64>, IntegrationStats)> {
    settings.validate()?;
    if x_out.is_empty() {
        return Err(BVPError::configuration("output grid is empty"));
    }
    if x_out.as_slice().windows(2).any(|w| w[1] <= w[0]) {
        return Err(BVPError::configuration(
            "output grid must be strictly increasing",
        ));
    }
    if y0.iter().any(|v| !v.is_finite()) {
        return Err(BVPError::integration(
            "all components of the initial state must be finite",
        ));
    }
    let n_out = x_out.len();
    let mut solution = DMatrix::zeros(y0.len(), n_out);
    solution.set_column(0, y0);
    let mut stats = IntegrationStats::default();

    let mut x = x_out[0];
    let mut y = y0.clone();
    let mut f_curr = f(x, &y);
    stats.rhs_evaluations += 1;
    let x_end = x_out[n_out - 1];
    let mut h = select_initial_step(f, x, &y, &f_curr, x_end - x, settings);
    stats.rhs_evaluations += 1;
    debug!("Dormand-Prince: initial step {}", h);

    for (i, &target) in x_out.iter().enumerate().skip(1) {
        while x < target {
            if stats.accepted + stats.rejected >= settings.max_steps {
                return Err(BVPError::integration(format!(
                    "step budget of {} exhausted at x = {}",
                    settings.max_steps, x
                )));
            }
            let min_step = 10.0 * f64::EPSILON * x.abs().max(1.0);
            if h < min_step {
                return Err(BVPError::integration(format!(
                    "step size {} fell below the minimum {} at x = {}",
                    h, min_step, x
                )));
            }
            // clip to the next output point; hitting it exactly keeps the grid exact
            let (h_try, lands_on_target) = if x + h >= target {
                (target - x, true)
            } else {
                (h, false)
            };
            let (y_new, f_new, error_norm) = dopri_step(f, x, &y, &f_curr, h_try, settings);
            stats.rhs_evaluations += 6;
            if !error_norm.is_finite() {
                stats.rejected += 1;
                h = h_try * MIN_FACTOR;
                continue;
            }
            if error_norm <= 1.0 {
                stats.accepted += 1;
                x = if lands_on_target { target } else { x + h_try };
                y = y_new;
                f_curr = f_new;
                let factor = if error_norm == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * error_norm.powf(-1.0 / (ERROR_ESTIMATOR_ORDER + 1.0)))
                        .clamp(MIN_FACTOR, MAX_FACTOR)
                };
                // a clipped step says nothing about the natural step size
                h = if lands_on_target {
                    h.max(h_try * factor)
                } else {
                    h_try * factor
                };
            } else {
                stats.rejected += 1;
                let factor = (SAFETY * error_norm.powf(-1.0 / (ERROR_ESTIMATOR_ORDER + 1.0)))
                    .max(MIN_FACTOR);
                h = h_try * factor;
            }
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(BVPError::integration(format!(
                "solution is not finite at x = {}",
                x
            )));
        }
        solution.set_column(i, &y);
    }
    info!(
        "Dormand-Prince finished: {} accepted, {} rejected steps, {} rhs evaluations",
        stats.accepted, stats.rejected, stats.rhs_evaluations
    );
    Ok((solution, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::BVP_linear::BVP_problem::create_mesh;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_exponential_growth() {
        // y' = y, y(0) = 1
        let f = |_x: f64, y: &DVector<f64>| -> DVector<f64> { y.clone() };
        let x_out = create_mesh(0.0, 1.0, 0.1).unwrap();
        let (sol, stats) = dormand_prince_on_grid(
            &f,
            &DVector::from_vec(vec![1.0]),
            &x_out,
            &DormandPrinceSettings::default(),
        )
        .unwrap();
        assert_eq!(sol.ncols(), 11);
        for (i, x) in x_out.iter().enumerate() {
            assert_abs_diff_eq!(sol[(0, i)], x.exp(), epsilon = 1e-5);
        }
        assert!(stats.accepted >= 10);
    }

    #[test]
    fn test_harmonic_oscillator() {
        // y1' = y2, y2' = -y1, exact y1 = cos x, y2 = -sin x
        let f = |_x: f64, y: &DVector<f64>| -> DVector<f64> {
            DVector::from_vec(vec![y[1], -y[0]])
        };
        let x_out = create_mesh(0.0, std::f64::consts::PI, 0.25).unwrap();
        let settings = DormandPrinceSettings {
            rtol: 1e-9,
            atol: 1e-12,
            max_steps: 100_000,
        };
        let (sol, _) =
            dormand_prince_on_grid(&f, &DVector::from_vec(vec![1.0, 0.0]), &x_out, &settings)
                .unwrap();
        for (i, x) in x_out.iter().enumerate() {
            assert_abs_diff_eq!(sol[(0, i)], x.cos(), epsilon = 1e-7);
            assert_abs_diff_eq!(sol[(1, i)], -x.sin(), epsilon = 1e-7);
        }
    }

    #[test]
    fn test_step_budget_exhausted() {
        let f = |_x: f64, y: &DVector<f64>| -> DVector<f64> {
            DVector::from_vec(vec![y[1], -y[0]])
        };
        let x_out = DVector::from_vec(vec![0.0, 100.0]);
        let settings = DormandPrinceSettings {
            rtol: 1e-10,
            atol: 1e-12,
            max_steps: 5,
        };
        let res = dormand_prince_on_grid(&f, &DVector::from_vec(vec![1.0, 0.0]), &x_out, &settings);
        assert!(matches!(res, Err(BVPError::Integration(_))));
    }

    #[test]
    fn test_blow_up_is_reported() {
        // y' = y^2, y(0) = 1 blows up at x = 1
        let f = |_x: f64, y: &DVector<f64>| -> DVector<f64> { y.map(|v| v * v) };
        let x_out = DVector::from_vec(vec![0.0, 0.5, 2.0]);
        let res = dormand_prince_on_grid(
            &f,
            &DVector::from_vec(vec![1.0]),
            &x_out,
            &DormandPrinceSettings::default(),
        );
        assert!(matches!(res, Err(BVPError::Integration(_))));
    }

    #[test]
    fn test_bad_settings() {
        let f = |_x: f64, y: &DVector<f64>| -> DVector<f64> { y.clone() };
        let x_out = DVector::from_vec(vec![0.0, 1.0]);
        let settings = DormandPrinceSettings {
            rtol: -1.0,
            ..Default::default()
        };
        let res = dormand_prince_on_grid(&f, &DVector::from_vec(vec![1.0]), &x_out, &settings);
        assert!(matches!(res, Err(BVPError::Configuration(_))));
    }
}
