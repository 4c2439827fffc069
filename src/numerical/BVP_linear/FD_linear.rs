//! # Finite difference solver for the linear BVP
//!
//! Centered second order differences on the uniform grid x_i = a + i h, i = 0..n, n = (b-a)/h:
//!
//! y'' ~ (y_{i+1} - 2 y_i + y_{i-1}) / h^2,   y' ~ (y_{i+1} - y_{i-1}) / (2h)
//!
//! Multiplying by -h^2 gives, for the interior unknowns y_1..y_{n-1}, the tridiagonal system
//!
//! (-1 - h/2 p_i) y_{i-1} + (2 + h^2 q_i) y_i + (-1 + h/2 p_i) y_{i+1} = -h^2 r_i
//!
//! with the known boundary values moved to the right hand side of the first and last rows.
//! Only the three diagonals are stored. The system is solved directly, either by nalgebra's
//! dense LU (up to [`MAX_DENSE_UNKNOWNS`] unknowns) or by the band LU, which needs O(n) memory.
use crate::numerical::BVP_linear::BVP_errors::{BVPError, BVPResult};
use crate::numerical::BVP_linear::BVP_problem::{
    Method, ProblemDefinition, SolutionSample, exact_interval_count,
};
use crate::somelinalg::LU_dense::solve_dense_LU;
use crate::somelinalg::RustedLINPACK::lu_band_nalg::solve_tridiagonal_LU;
use crate::somelinalg::linear_sys_diagnostics::{
    CONDITION_WARNING_THRESHOLD, DIAGNOSTICS_MAX_DIM, linear_system_diagnostics,
};
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use strum_macros::{Display, EnumString};

/// the dense backend refuses larger systems (n^2 doubles of storage)
pub const MAX_DENSE_UNKNOWNS: usize = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LinearSolverKind {
    /// nalgebra LU with partial pivoting
    #[default]
    Dense,
    /// band LU with partial pivoting, kl = ku = 1
    Banded,
}

/// Assembled tridiagonal system for the interior grid values
#[derive(Debug, Clone, PartialEq)]
pub struct FDSystem {
    /// full grid x_0..x_n
    pub grid: DVector<f64>,
    /// subdiagonal, entries (k+1, k)
    pub lower: DVector<f64>,
    pub diagonal: DVector<f64>,
    /// superdiagonal, entries (k, k+1)
    pub upper: DVector<f64>,
    pub rhs: DVector<f64>,
}

impl FDSystem {
    /// number of unknowns n - 1
    pub fn size(&self) -> usize {
        self.diagonal.len()
    }

    /// dense (n-1)x(n-1) copy of the matrix
    pub fn matrix(&self) -> DMatrix<f64> {
        let m = self.size();
        DMatrix::from_fn(m, m, |i, j| {
            if i == j {
                self.diagonal[i]
            } else if i == j + 1 {
                self.lower[j]
            } else if j == i + 1 {
                self.upper[i]
            } else {
                0.0
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct FiniteDifferenceSolver {
    pub step_size: f64,
    pub linear_solver: LinearSolverKind,
}

impl FiniteDifferenceSolver {
    pub fn new(step_size: f64) -> Self {
        Self {
            step_size,
            linear_solver: LinearSolverKind::default(),
        }
    }

    pub fn with_linear_solver(mut self, linear_solver: LinearSolverKind) -> Self {
        self.linear_solver = linear_solver;
        self
    }

    pub fn assemble(&self, problem: &ProblemDefinition) -> BVPResult<FDSystem> {
        let n = exact_interval_count(problem.a, problem.b, self.step_size)?;
        if n < 2 {
            return Err(BVPError::configuration(format!(
                "finite differences need at least 2 intervals, got n = {} for h = {}",
                n, self.step_size
            )));
        }
        let h = problem.length() / n as f64;
        let grid = DVector::from_fn(n + 1, |i, _| {
            if i == n {
                problem.b
            } else {
                problem.a + i as f64 * h
            }
        });
        let m = n - 1;
        let mut lower = DVector::zeros(m - 1);
        let mut diagonal = DVector::zeros(m);
        let mut upper = DVector::zeros(m - 1);
        let mut rhs = DVector::zeros(m);
        for k in 0..m {
            let x = grid[k + 1];
            let (p, q, r) = (problem.p(x), problem.q(x), problem.r(x));
            diagonal[k] = 2.0 + h * h * q;
            if k > 0 {
                lower[k - 1] = -1.0 - 0.5 * h * p;
            }
            if k + 1 < m {
                upper[k] = -1.0 + 0.5 * h * p;
            }
            rhs[k] = -h * h * r;
            if k == 0 {
                rhs[k] += (1.0 + 0.5 * h * p) * problem.alpha;
            }
            if k == m - 1 {
                rhs[k] += (1.0 - 0.5 * h * p) * problem.beta;
            }
        }
        debug!("finite differences: assembled {}x{} tridiagonal system", m, m);
        Ok(FDSystem {
            grid,
            lower,
            diagonal,
            upper,
            rhs,
        })
    }

    pub fn solve(&self, problem: &ProblemDefinition) -> BVPResult<SolutionSample> {
        info!(
            "Starting finite difference solver, h = {}, linear solver: {}",
            self.step_size, self.linear_solver
        );
        let system = self.assemble(problem)?;
        let m = system.size();
        if self.linear_solver == LinearSolverKind::Dense && m > MAX_DENSE_UNKNOWNS {
            return Err(BVPError::configuration(format!(
                "dense finite difference system with {} unknowns exceeds {}, {}",
                m, MAX_DENSE_UNKNOWNS, "use linear_solver: banded"
            )));
        }
        if m <= DIAGNOSTICS_MAX_DIM {
            linear_system_diagnostics(&system.matrix(), CONDITION_WARNING_THRESHOLD);
        }
        let interior = match self.linear_solver {
            LinearSolverKind::Dense => solve_dense_LU(&system.matrix(), &system.rhs),
            LinearSolverKind::Banded => solve_tridiagonal_LU(
                &system.lower,
                &system.diagonal,
                &system.upper,
                &system.rhs,
            ),
        }
        .map_err(|e| match e {
            BVPError::NumericalDegeneracy(msg) => {
                BVPError::degeneracy(format!("finite difference system: {}", msg))
            }
            other => other,
        })?;
        let n = system.grid.len() - 1;
        let y = DVector::from_fn(n + 1, |i, _| match i {
            0 => problem.alpha,
            i if i == n => problem.beta,
            i => interior[i - 1],
        });
        SolutionSample::new(Method::FiniteDifference, system.grid, y)
    }
}
