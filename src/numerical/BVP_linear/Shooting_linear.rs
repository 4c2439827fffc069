//! # Linear shooting method
//!
//! For a linear equation y'' = p(x)y' + q(x)y + r(x) with y(a) = alpha, y(b) = beta no secant
//! iteration on the missing slope is needed: the solution is a linear combination of two
//! initial value problems
//!
//! - IVP1 (particular): y1'' = p y1' + q y1 + r, y1(a) = alpha, y1'(a) = 0
//! - IVP2 (homogeneous): y2'' = p y2' + q y2,     y2(a) = 0,     y2'(a) = 1
//!
//! and y = y1 + c y2 with c = (beta - y1(b)) / y2(b). The missing slope is y'(a) = c.
//!
//! Both IVPs are integrated by the adaptive Dormand-Prince 5(4) stepper in first order form
//! [y, y'], with every output point a, a+h, ..., b hit exactly.
//!
//! When y2(b) vanishes the homogeneous problem has a nontrivial solution through both end
//! points (resonance) and the boundary value problem is either unsolvable or not unique.
//! This is reported as [`BVPError::NumericalDegeneracy`] whenever
//! |y2(b)| <= resonance_tol * max|y2|.
//!
//! ## Usage Example
//! ```rust, ignore
//! let problem = ProblemDefinition::reference();
//! let mut solver = LinearShootingSolver::new(0.1);
//! let sample = solver.solve(&problem)?;
//! println!("y'(a) = {}", solver.get_result().slope_at_a);
//! ```
use crate::numerical::BVP_linear::BVP_errors::{BVPError, BVPResult};
use crate::numerical::BVP_linear::BVP_problem::{
    Method, ProblemDefinition, SolutionSample, create_mesh,
};
use crate::numerical::BVP_linear::ivp_DormandPrince::{
    DormandPrinceSettings, IntegrationStats, dormand_prince_on_grid,
};
use log::{debug, info, warn};
use nalgebra::DVector;

pub const DEFAULT_RESONANCE_TOL: f64 = 1e-4;

/// Configuration of the linear shooting solver.
#[derive(Debug, Clone)]
pub struct LinearShootingSolver {
    /// spacing of the output grid
    pub step_size: f64,
    pub ivp: DormandPrinceSettings,
    pub resonance_tol: f64,
    pub result: ShootingResult,
}

/// Everything the last successful call computed
#[derive(Debug, Clone)]
pub struct ShootingResult {
    pub x_mesh: DVector<f64>,
    /// particular solution on the mesh
    pub y1: DVector<f64>,
    /// homogeneous solution on the mesh
    pub y2: DVector<f64>,
    /// combination coefficient, equal to y'(a)
    pub slope_at_a: f64,
    pub stats: [IntegrationStats; 2],
}

impl Default for ShootingResult {
    fn default() -> Self {
        Self {
            x_mesh: DVector::zeros(0),
            y1: DVector::zeros(0),
            y2: DVector::zeros(0),
            slope_at_a: 0.0,
            stats: [IntegrationStats::default(); 2],
        }
    }
}

impl LinearShootingSolver {
    pub fn new(step_size: f64) -> Self {
        Self {
            step_size,
            ivp: DormandPrinceSettings::default(),
            resonance_tol: DEFAULT_RESONANCE_TOL,
            result: ShootingResult::default(),
        }
    }

    pub fn with_ivp_settings(mut self, ivp: DormandPrinceSettings) -> Self {
        self.ivp = ivp;
        self
    }

    pub fn with_resonance_tol(mut self, resonance_tol: f64) -> Self {
        self.resonance_tol = resonance_tol;
        self
    }

    fn validate(&self) -> BVPResult<()> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(BVPError::configuration(format!(
                "shooting: step size must be positive, got h={}",
                self.step_size
            )));
        }
        if !(self.resonance_tol.is_finite() && self.resonance_tol >= 0.0) {
            return Err(BVPError::configuration(format!(
                "shooting: resonance tolerance must be non-negative, got {}",
                self.resonance_tol
            )));
        }
        self.ivp.validate()
    }

    /// Solves the problem on the grid a, a+h, ..., b
    pub fn solve(&mut self, problem: &ProblemDefinition) -> BVPResult<SolutionSample> {
        info!("Starting linear shooting solver");
        debug!(
            "Problem parameters: {:?}, h = {}, ivp settings = {:?}",
            problem, self.step_size, self.ivp
        );
        self.validate()?;
        let x_mesh = create_mesh(problem.a, problem.b, self.step_size)?;
        debug!("shooting output grid: {} points", x_mesh.len());

        // [y, y'] -> [y', p y' + q y + r]
        let particular = |x: f64, y: &DVector<f64>| -> DVector<f64> {
            DVector::from_vec(vec![
                y[1],
                problem.p(x) * y[1] + problem.q(x) * y[0] + problem.r(x),
            ])
        };
        let homogeneous = |x: f64, y: &DVector<f64>| -> DVector<f64> {
            DVector::from_vec(vec![y[1], problem.p(x) * y[1] + problem.q(x) * y[0]])
        };

        let y1_0 = DVector::from_vec(vec![problem.alpha, 0.0]);
        let (sol1, stats1) = dormand_prince_on_grid(&particular, &y1_0, &x_mesh, &self.ivp)
            .map_err(|e| annotate("particular IVP", e))?;
        let y2_0 = DVector::from_vec(vec![0.0, 1.0]);
        let (sol2, stats2) = dormand_prince_on_grid(&homogeneous, &y2_0, &x_mesh, &self.ivp)
            .map_err(|e| annotate("homogeneous IVP", e))?;
        debug!("particular IVP: {:?}", stats1);
        debug!("homogeneous IVP: {:?}", stats2);

        let y1 = sol1.row(0).transpose();
        let y2 = sol2.row(0).transpose();
        let n = x_mesh.len();
        let y1_b = y1[n - 1];
        let y2_b = y2[n - 1];
        let y2_scale = y2.amax();
        if !(y2_b.abs() > self.resonance_tol * y2_scale) {
            warn!(
                "shooting: homogeneous solution vanishes at b (y2(b) = {:e}, max|y2| = {:e})",
                y2_b, y2_scale
            );
            return Err(BVPError::degeneracy(format!(
                "shooting resonance: y2(b) = {:.3e} is negligible compared with max|y2| = {:.3e}; \
                 the homogeneous problem has a nontrivial solution vanishing at both ends",
                y2_b, y2_scale
            )));
        }
        let c = (problem.beta - y1_b) / y2_b;
        info!(
            "shooting: y1(b) = {}, y2(b) = {}, y'(a) = {}",
            y1_b, y2_b, c
        );
        let y = &y1 + c * &y2;

        self.result = ShootingResult {
            x_mesh: x_mesh.clone(),
            y1,
            y2,
            slope_at_a: c,
            stats: [stats1, stats2],
        };
        SolutionSample::new(Method::Shooting, x_mesh, y)
    }

    pub fn get_result(&self) -> &ShootingResult {
        &self.result
    }
}

fn annotate(which: &str, e: BVPError) -> BVPError {
    match e {
        BVPError::Integration(msg) => BVPError::integration(format!("{}: {}", which, msg)),
        other => other,
    }
}
