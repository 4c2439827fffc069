//! # Variational (Galerkin/Ritz) solver with a sine basis
//!
//! The solution is sought as
//!
//! y(x) = l(t) + sum_{k=1..n} c_k sin(k pi t),   t = (x - a)/L,  L = b - a,
//!
//! where l(t) = alpha + (beta - alpha) t carries the boundary values, so every basis function
//! vanishes at both ends and the boundary conditions hold exactly.
//!
//! Two formulations of the Galerkin system A c = f are available:
//!
//! - [`GalerkinFormulation::Reference`] (default). The classic symmetric Ritz form:
//!
//!   A_ij = int_a^b [phi_i' phi_j' + q phi_i phi_j] dx,   f_i = int_a^b r phi_i dx
//!
//!   The advection term p y' is left out of the bilinear form and the lift does not enter the
//!   load vector, so for p != 0 (or nonzero boundary data) the result is only a rough
//!   approximation which does not converge to the true solution as n grows.
//!
//! - [`GalerkinFormulation::Consistent`]. The projection of the full residual equation for
//!   u = y - l, u'' = p u' + q u + g with g = p l' + q l + r:
//!
//!   A_ij = int_a^b [phi_i' phi_j' + p phi_j' phi_i + q phi_i phi_j] dx,  f_i = -int_a^b g phi_i dx
//!
//! All integrals are computed on the reference interval t in [0, 1] with the chosen
//! quadrature rule. The system is dense and solved by LU.
use crate::numerical::BVP_linear::BVP_errors::{BVPError, BVPResult};
use crate::numerical::BVP_linear::BVP_problem::{Method, ProblemDefinition, SolutionSample};
use crate::numerical::BVP_linear::quadrature::{Quadrature, QuadratureRule};
use crate::somelinalg::LU_dense::solve_dense_LU;
use crate::somelinalg::linear_sys_diagnostics::{
    CONDITION_WARNING_THRESHOLD, linear_system_diagnostics,
};
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;
use strum_macros::{Display, EnumIter, EnumString};

pub const DEFAULT_EVALUATION_POINTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum GalerkinFormulation {
    /// symmetric form without the advection term
    #[default]
    Reference,
    /// full Galerkin projection including p y' and the boundary lift
    Consistent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalerkinSystem {
    /// n_terms x n_terms
    pub matrix: DMatrix<f64>,
    pub rhs: DVector<f64>,
}

#[derive(Debug, Clone)]
pub struct VariationalSolver {
    pub n_terms: usize,
    pub formulation: GalerkinFormulation,
    pub quadrature: QuadratureRule,
    pub evaluation_points: usize,
}

impl VariationalSolver {
    pub fn new(n_terms: usize) -> Self {
        Self {
            n_terms,
            formulation: GalerkinFormulation::default(),
            quadrature: QuadratureRule::default(),
            evaluation_points: DEFAULT_EVALUATION_POINTS,
        }
    }

    pub fn with_formulation(mut self, formulation: GalerkinFormulation) -> Self {
        self.formulation = formulation;
        self
    }

    pub fn with_quadrature(mut self, quadrature: QuadratureRule) -> Self {
        self.quadrature = quadrature;
        self
    }

    pub fn with_evaluation_points(mut self, evaluation_points: usize) -> Self {
        self.evaluation_points = evaluation_points;
        self
    }

    fn validate(&self) -> BVPResult<()> {
        if self.n_terms < 1 {
            return Err(BVPError::configuration(
                "variational method needs at least one basis function (n_terms >= 1)",
            ));
        }
        if self.evaluation_points < 2 {
            return Err(BVPError::configuration(format!(
                "evaluation grid needs at least 2 points, got {}",
                self.evaluation_points
            )));
        }
        Ok(())
    }

    pub fn assemble(&self, problem: &ProblemDefinition) -> BVPResult<GalerkinSystem> {
        self.validate()?;
        let quad = self.quadrature.build()?;
        let system = match self.formulation {
            GalerkinFormulation::Reference => assemble_reference(problem, self.n_terms, &quad),
            GalerkinFormulation::Consistent => assemble_consistent(problem, self.n_terms, &quad),
        };
        debug!(
            "variational: assembled {}x{} {} system with {}",
            self.n_terms, self.n_terms, self.formulation, self.quadrature
        );
        Ok(system)
    }

    /// basis coefficients c_1..c_n
    pub fn coefficients(&self, problem: &ProblemDefinition) -> BVPResult<DVector<f64>> {
        let GalerkinSystem { matrix, rhs } = self.assemble(problem)?;
        linear_system_diagnostics(&matrix, CONDITION_WARNING_THRESHOLD);
        solve_dense_LU(&matrix, &rhs).map_err(|e| match e {
            BVPError::NumericalDegeneracy(msg) => {
                BVPError::degeneracy(format!("Galerkin system: {}", msg))
            }
            other => other,
        })
    }

    pub fn solve(&self, problem: &ProblemDefinition) -> BVPResult<SolutionSample> {
        info!(
            "Starting variational solver: {} sine terms, {} formulation",
            self.n_terms, self.formulation
        );
        let c = self.coefficients(problem)?;
        debug!("Galerkin coefficients: {:?}", c.as_slice());
        let m = self.evaluation_points - 1;
        let x = DVector::from_fn(m + 1, |k, _| {
            if k == m {
                problem.b
            } else {
                problem.a + problem.length() * k as f64 / m as f64
            }
        });
        let y = DVector::from_fn(m + 1, |k, _| {
            let t = k as f64 / m as f64;
            evaluate_expansion(problem, &c, t)
        });
        SolutionSample::new(Method::Variational, x, y)
    }
}

/// l(t) + sum c_k sin(k pi t)
pub fn evaluate_expansion(problem: &ProblemDefinition, c: &DVector<f64>, t: f64) -> f64 {
    let lift = problem.alpha + (problem.beta - problem.alpha) * t;
    c.iter()
        .enumerate()
        .map(|(k, ck)| ck * ((k + 1) as f64 * PI * t).sin())
        .sum::<f64>()
        + lift
}

fn assemble_reference(problem: &ProblemDefinition, n: usize, quad: &Quadrature) -> GalerkinSystem {
    let L = problem.length();
    let a = problem.a;
    let mut matrix = DMatrix::zeros(n, n);
    let mut rhs = DVector::zeros(n);
    for i in 0..n {
        let wi = (i + 1) as f64 * PI;
        for j in i..n {
            let wj = (j + 1) as f64 * PI;
            let value = L * quad.integrate(0.0, 1.0, |t| {
                (wi / L) * (wj / L) * (wi * t).cos() * (wj * t).cos()
                    + problem.q(a + L * t) * (wi * t).sin() * (wj * t).sin()
            });
            matrix[(i, j)] = value;
            matrix[(j, i)] = value;
        }
        rhs[i] = L * quad.integrate(0.0, 1.0, |t| problem.r(a + L * t) * (wi * t).sin());
    }
    GalerkinSystem { matrix, rhs }
}

fn assemble_consistent(
    problem: &ProblemDefinition,
    n: usize,
    quad: &Quadrature,
) -> GalerkinSystem {
    let L = problem.length();
    let a = problem.a;
    // l'(x) = (beta - alpha)/L
    let slope = (problem.beta - problem.alpha) / L;
    let g = |t: f64| {
        let x = a + L * t;
        let lift = problem.alpha + (problem.beta - problem.alpha) * t;
        problem.p(x) * slope + problem.q(x) * lift + problem.r(x)
    };
    let mut matrix = DMatrix::zeros(n, n);
    let mut rhs = DVector::zeros(n);
    for i in 0..n {
        let wi = (i + 1) as f64 * PI;
        for j in 0..n {
            let wj = (j + 1) as f64 * PI;
            matrix[(i, j)] = L * quad.integrate(0.0, 1.0, |t| {
                let x = a + L * t;
                let (si, ci) = (wi * t).sin_cos();
                let (sj, cj) = (wj * t).sin_cos();
                (wi / L) * ci * (wj / L) * cj
                    + problem.p(x) * (wj / L) * cj * si
                    + problem.q(x) * si * sj
            });
        }
        rhs[i] = -L * quad.integrate(0.0, 1.0, |t| g(t) * (wi * t).sin());
    }
    GalerkinSystem { matrix, rhs }
}
