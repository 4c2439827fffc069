//! # Comparison driver
//!
//! [`LinearBVPTask`] bundles one problem with the three solver configurations and the
//! presentation settings. [`LinearBVPTask::run`] calls the solvers (sequentially, or in
//! parallel with rayon when `comparison.parallel` is set) and returns a [`ComparisonReport`]
//! that keeps every method's `Result`: the caller chooses between aborting on the first
//! failure ([`ComparisonReport::into_samples`]) and presenting the methods that succeeded
//! ([`ComparisonReport::successful`]).
//!
//! ```rust, ignore
//! let task = LinearBVPTask::new(ProblemDefinition::reference(), 0.1, 10);
//! let report = task.run();
//! task.postprocessing(&report)?;
//! ```
use crate::Utils::comparison_table::{comparison_table, timing_table};
use crate::Utils::logger::save_samples_to_csv;
use crate::Utils::plots::plot_solutions;
use crate::numerical::BVP_linear::BVP_errors::{BVPError, BVPResult};
use crate::numerical::BVP_linear::BVP_problem::{
    Method, ProblemDefinition, SolutionSample, create_mesh,
};
use crate::numerical::BVP_linear::BVP_utils::{format_elapsed, timed};
use crate::numerical::BVP_linear::FD_linear::FiniteDifferenceSolver;
use crate::numerical::BVP_linear::Galerkin_sine::VariationalSolver;
use crate::numerical::BVP_linear::Shooting_linear::LinearShootingSolver;
use log::{LevelFilter, error, info, warn};
use std::error::Error;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSettings {
    /// spacing of the table abscissas a, a + step, ..., b
    pub table_step: f64,
    /// run the three solvers concurrently
    pub parallel: bool,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        Self {
            table_step: 0.2,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostprocessingSettings {
    pub plot: bool,
    pub plot_filename: String,
    pub save_to_csv: bool,
    pub csv_filename: String,
    pub print_table: bool,
    pub loglevel: LevelFilter,
    pub save_log: bool,
}

impl Default for PostprocessingSettings {
    fn default() -> Self {
        Self {
            plot: true,
            plot_filename: "bvp_comparison.png".to_string(),
            save_to_csv: false,
            csv_filename: "bvp_comparison.csv".to_string(),
            print_table: true,
            loglevel: LevelFilter::Info,
            save_log: false,
        }
    }
}

/// One problem, three solvers, and what to do with the results
#[derive(Debug, Clone)]
pub struct LinearBVPTask {
    pub problem: ProblemDefinition,
    pub shooting: LinearShootingSolver,
    pub finite_difference: FiniteDifferenceSolver,
    pub variational: VariationalSolver,
    pub comparison: ComparisonSettings,
    pub postprocessing: PostprocessingSettings,
}

/// Result and wall clock time of one solver
#[derive(Debug, Clone)]
pub struct MethodOutcome {
    pub method: Method,
    pub result: BVPResult<SolutionSample>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct ComparisonReport {
    /// shooting, finite difference, variational, in this order
    pub outcomes: Vec<MethodOutcome>,
    pub a: f64,
    pub b: f64,
    pub table_step: f64,
}

impl LinearBVPTask {
    /// default solver settings with the step h for shooting and finite differences
    pub fn new(problem: ProblemDefinition, h: f64, n_terms: usize) -> Self {
        Self {
            problem,
            shooting: LinearShootingSolver::new(h),
            finite_difference: FiniteDifferenceSolver::new(h),
            variational: VariationalSolver::new(n_terms),
            comparison: ComparisonSettings::default(),
            postprocessing: PostprocessingSettings::default(),
        }
    }

    fn run_shooting(&self) -> MethodOutcome {
        let mut solver = self.shooting.clone();
        let (result, elapsed) = timed("shooting", || solver.solve(&self.problem));
        MethodOutcome {
            method: Method::Shooting,
            result,
            elapsed,
        }
    }

    fn run_finite_difference(&self) -> MethodOutcome {
        let (result, elapsed) = timed("finite differences", || {
            self.finite_difference.solve(&self.problem)
        });
        MethodOutcome {
            method: Method::FiniteDifference,
            result,
            elapsed,
        }
    }

    fn run_variational(&self) -> MethodOutcome {
        let (result, elapsed) = timed("variational", || self.variational.solve(&self.problem));
        MethodOutcome {
            method: Method::Variational,
            result,
            elapsed,
        }
    }

    /// Solves the problem with all three methods. Never fails as a whole: each method's
    /// error is kept in its outcome.
    pub fn run(&self) -> ComparisonReport {
        info!(
            "Comparing shooting, finite differences and variational method on [{}, {}] ({})",
            self.problem.a,
            self.problem.b,
            if self.comparison.parallel {
                "parallel"
            } else {
                "sequential"
            }
        );
        let outcomes = if self.comparison.parallel {
            let (shooting, (fd, variational)) = rayon::join(
                || self.run_shooting(),
                || {
                    rayon::join(
                        || self.run_finite_difference(),
                        || self.run_variational(),
                    )
                },
            );
            vec![shooting, fd, variational]
        } else {
            vec![
                self.run_shooting(),
                self.run_finite_difference(),
                self.run_variational(),
            ]
        };
        for outcome in &outcomes {
            match &outcome.result {
                Ok(sample) => info!(
                    "{}: {} points in {}",
                    outcome.method,
                    sample.len(),
                    format_elapsed(outcome.elapsed)
                ),
                Err(e) => error!("{} failed: {}", outcome.method, e),
            }
        }
        ComparisonReport {
            outcomes,
            a: self.problem.a,
            b: self.problem.b,
            table_step: self.comparison.table_step,
        }
    }

    /// Table, plot and csv of whatever succeeded. Aborts only on I/O errors.
    pub fn postprocessing(&self, report: &ComparisonReport) -> Result<(), Box<dyn Error>> {
        let samples = report.successful();
        if samples.is_empty() {
            warn!("no method succeeded, nothing to present");
            return Ok(());
        }
        if self.postprocessing.print_table {
            println!("{}", comparison_table(report)?);
            println!("{}", timing_table(report));
        }
        if self.postprocessing.plot {
            plot_solutions(
                &samples,
                &self.postprocessing.plot_filename,
                "Linear BVP: shooting vs finite differences vs variational",
            )?;
            info!("plot saved to {}", self.postprocessing.plot_filename);
        }
        if self.postprocessing.save_to_csv {
            save_samples_to_csv(&samples, &self.postprocessing.csv_filename)?;
            info!("solutions saved to {}", self.postprocessing.csv_filename);
        }
        Ok(())
    }
}

impl ComparisonReport {
    pub fn outcome(&self, method: Method) -> Option<&MethodOutcome> {
        self.outcomes.iter().find(|o| o.method == method)
    }

    pub fn sample(&self, method: Method) -> Option<&SolutionSample> {
        self.outcome(method).and_then(|o| o.result.as_ref().ok())
    }

    /// all samples, or the first error in method order
    pub fn into_samples(self) -> BVPResult<Vec<SolutionSample>> {
        self.outcomes.into_iter().map(|o| o.result).collect()
    }

    pub fn successful(&self) -> Vec<&SolutionSample> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .collect()
    }

    pub fn failures(&self) -> Vec<(Method, &BVPError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.method, e)))
            .collect()
    }

    /// a, a + table_step, ..., b
    pub fn table_abscissas(&self) -> BVPResult<Vec<f64>> {
        Ok(create_mesh(self.a, self.b, self.table_step)?
            .iter()
            .copied()
            .collect())
    }

    /// largest difference between two methods at the abscissas of the second one
    pub fn max_deviation(&self, m1: Method, m2: Method) -> Option<f64> {
        let s1 = self.sample(m1)?;
        let s2 = self.sample(m2)?;
        Some(s1.max_deviation_from(s2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_sequential_and_parallel_agree() {
        let problem = ProblemDefinition::reference();
        let mut task = LinearBVPTask::new(problem, 0.1, 10);
        let sequential = task.run();
        task.comparison.parallel = true;
        let parallel = task.run();
        assert!(sequential.failures().is_empty());
        for method in [Method::Shooting, Method::FiniteDifference, Method::Variational] {
            assert_eq!(sequential.sample(method), parallel.sample(method));
        }
        let samples = parallel.into_samples().unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].method, Method::Shooting);
        assert_eq!(samples[2].method, Method::Variational);
    }

    #[test]
    fn test_partial_results_on_failure() {
        // FD rejects h = 0.07, the other two still run
        let problem = ProblemDefinition::reference();
        let report = LinearBVPTask::new(problem, 0.07, 5).run();
        assert_eq!(report.successful().len(), 2);
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, Method::FiniteDifference);
        assert!(matches!(failures[0].1, BVPError::Configuration(_)));
        assert!(matches!(
            report.into_samples(),
            Err(BVPError::Configuration(_))
        ));
    }

    #[test]
    fn test_resonant_problem_report() {
        let problem =
            ProblemDefinition::new(|_| 0.0, |_| -PI * PI, |_| 0.0, 0.0, 1.0, 0.0, 1.0).unwrap();
        let report = LinearBVPTask::new(problem, 0.1, 3).run();
        assert!(matches!(
            report.outcome(Method::Shooting).unwrap().result,
            Err(BVPError::NumericalDegeneracy(_))
        ));
        assert!(matches!(
            report.outcome(Method::Variational).unwrap().result,
            Err(BVPError::NumericalDegeneracy(_))
        ));
    }

    #[test]
    fn test_table_abscissas() {
        let problem = ProblemDefinition::reference();
        let report = LinearBVPTask::new(problem, 0.1, 3).run();
        let xs = report.table_abscissas().unwrap();
        assert_eq!(xs.len(), 6);
        assert_abs_diff_eq!(xs[2], 0.4, epsilon = 1e-12);
        assert_eq!(xs[5], 1.0);
        let dev = report
            .max_deviation(Method::Shooting, Method::FiniteDifference)
            .unwrap();
        assert!(dev < 1e-2);
    }
}
