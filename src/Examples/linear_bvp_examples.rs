use crate::numerical::BVP_linear::BVP_comparison::LinearBVPTask;
use crate::numerical::BVP_linear::BVP_problem::{Method, ProblemDefinition};
use crate::numerical::BVP_linear::FD_linear::{FiniteDifferenceSolver, LinearSolverKind};
use crate::numerical::BVP_linear::Galerkin_sine::{GalerkinFormulation, VariationalSolver};
use crate::numerical::BVP_linear::Shooting_linear::LinearShootingSolver;
use crate::numerical::BVP_linear::quadrature::QuadratureRule;
use std::f64::consts::PI;

pub fn linear_bvp_examples(example: usize) {
    match example {
        0 => {
            // the reference problem
            // y'' = -(x+1) y' + 2 y + (1 - x^2) exp(-x),  y(0) = 1, y(1) = 2
            let problem = ProblemDefinition::reference();
            let mut task = LinearBVPTask::new(problem, 0.1, 10);
            task.postprocessing.plot = false;
            let report = task.run();
            if let Err(e) = task.postprocessing(&report) {
                println!("postprocessing failed: {}", e);
            }
            for (m1, m2) in [
                (Method::Shooting, Method::FiniteDifference),
                (Method::Variational, Method::FiniteDifference),
            ] {
                if let Some(d) = report.max_deviation(m1, m2) {
                    println!("max |{} - {}| = {:.3e}", m1, m2, d);
                }
            }
        }
        1 => {
            // y'' = y, y(0) = 0, y(1) = sinh(1); exact solution sinh(x)
            let problem = match ProblemDefinition::new(
                |_x| 0.0,
                |_x| 1.0,
                |_x| 0.0,
                0.0,
                1.0,
                0.0,
                1.0_f64.sinh(),
            ) {
                Ok(p) => p,
                Err(e) => {
                    println!("{}", e);
                    return;
                }
            };
            let mut shooting = LinearShootingSolver::new(0.05);
            let fd = FiniteDifferenceSolver::new(0.05).with_linear_solver(LinearSolverKind::Banded);
            let galerkin = VariationalSolver::new(8)
                .with_formulation(GalerkinFormulation::Consistent)
                .with_quadrature(QuadratureRule::GaussLegendre { degree: 30 });
            let results = [
                shooting.solve(&problem),
                fd.solve(&problem),
                galerkin.solve(&problem),
            ];
            for result in results {
                match result {
                    Ok(sample) => {
                        let error = sample
                            .points()
                            .map(|(x, y)| (y - x.sinh()).abs())
                            .fold(0.0, f64::max);
                        println!("{}: max error {:.3e}", sample.method, error);
                    }
                    Err(e) => println!("{}", e),
                }
            }
            let stats = shooting.get_result().stats;
            println!(
                "shooting IVPs: {} + {} accepted steps",
                stats[0].accepted, stats[1].accepted
            );
        }
        2 => {
            // settings from a task string, coefficients from code
            let settings = r#"
            problem
            a: 0.0
            b: 1.0
            alpha: 1.0
            beta: 2.0
            discretization
            h: 0.05
            n_terms: 12
            variational
            formulation: consistent
            quadrature: gauss_legendre
            quadrature_points: 40
            comparison
            parallel: true
            postprocessing
            plot: true
            plot_filename: reference_problem.png
            save_to_csv: true
            csv_filename: reference_problem.csv
            "#;
            match LinearBVPTask::parse_settings_from_str(ProblemDefinition::reference(), settings)
            {
                Ok(task) => {
                    let report = task.run();
                    if let Err(e) = task.postprocessing(&report) {
                        println!("postprocessing failed: {}", e);
                    }
                }
                Err(e) => println!("bad settings: {}", e),
            }
        }
        3 => {
            // resonance: y'' = -pi^2 y, y(0) = 0, y(1) = 1 has no solution.
            // shooting reports it, the Galerkin matrix is singular (first diagonal entry is 0)
            let problem = match ProblemDefinition::new(
                |_x| 0.0,
                |_x| -PI * PI,
                |_x| 0.0,
                0.0,
                1.0,
                0.0,
                1.0,
            ) {
                Ok(p) => p,
                Err(e) => {
                    println!("{}", e);
                    return;
                }
            };
            let report = LinearBVPTask::new(problem, 0.1, 3).run();
            for (method, error) in report.failures() {
                println!("{}: {}", method, error);
            }
        }
        _ => {
            println!("no such example: {}", example);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_run() {
        // example 2 writes files, it is left to the binary
        for example in [0, 1, 3] {
            linear_bvp_examples(example);
        }
    }
}
