#[cfg(test)]
mod tests {
    use crate::numerical::BVP_linear::BVP_comparison::LinearBVPTask;
    use crate::numerical::BVP_linear::BVP_errors::BVPError;
    use crate::numerical::BVP_linear::BVP_problem::{Method, ProblemDefinition, SolutionSample};
    use crate::numerical::BVP_linear::FD_linear::{FiniteDifferenceSolver, LinearSolverKind};
    use crate::numerical::BVP_linear::Galerkin_sine::{GalerkinFormulation, VariationalSolver};
    use crate::numerical::BVP_linear::Shooting_linear::LinearShootingSolver;
    use crate::numerical::BVP_linear::quadrature::QuadratureRule;
    use approx::assert_abs_diff_eq;
    use log::LevelFilter;
    use simplelog::{Config, SimpleLogger};
    use std::f64::consts::PI;
    use strum::IntoEnumIterator;

    fn init_logger() {
        let _ = SimpleLogger::init(LevelFilter::Info, Config::default());
    }

    const CHECK_POINTS: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

    fn reference_samples(formulation: GalerkinFormulation, n_terms: usize) -> Vec<SolutionSample> {
        let problem = ProblemDefinition::reference();
        let mut shooting = LinearShootingSolver::new(0.1);
        vec![
            shooting.solve(&problem).unwrap(),
            FiniteDifferenceSolver::new(0.1).solve(&problem).unwrap(),
            VariationalSolver::new(n_terms)
                .with_formulation(formulation)
                .solve(&problem)
                .unwrap(),
        ]
    }

    fn fd_reference() -> SolutionSample {
        FiniteDifferenceSolver::new(0.1)
            .solve(&ProblemDefinition::reference())
            .unwrap()
    }

    #[test]
    fn test_grids_are_increasing_and_span_the_domain() {
        init_logger();
        for sample in reference_samples(GalerkinFormulation::Reference, 10) {
            assert!(
                sample.x().as_slice().windows(2).all(|w| w[0] < w[1]),
                "{} grid is not increasing",
                sample.method
            );
            assert_eq!(sample.first().0, 0.0);
            assert_eq!(sample.last().0, 1.0);
        }
    }

    #[test]
    fn test_boundary_values_of_all_methods() {
        init_logger();
        let samples = reference_samples(GalerkinFormulation::Reference, 10);
        for sample in &samples[..2] {
            assert_abs_diff_eq!(sample.first().1, 1.0, epsilon = 1e-6);
            assert_abs_diff_eq!(sample.last().1, 2.0, epsilon = 1e-6);
        }
        // the sine basis vanishes at both ends
        assert_abs_diff_eq!(samples[2].first().1, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(samples[2].last().1, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reference_problem_agreement() {
        init_logger();
        let samples = reference_samples(GalerkinFormulation::Consistent, 10);
        let (shooting, fd, galerkin) = (&samples[0], &samples[1], &samples[2]);
        for x in CHECK_POINTS {
            let y_fd = fd.nearest(x).1;
            let y_shooting = shooting.nearest(x).1;
            let y_galerkin = galerkin.interpolate(x).unwrap();
            assert!((y_shooting - y_fd).abs() < 0.1, "x = {}", x);
            assert!((y_galerkin - y_fd).abs() < 0.1, "x = {}", x);
            assert!((y_galerkin - y_shooting).abs() < 0.1, "x = {}", x);
        }
        // second order FD vs an accurate IVP integration on the same grid
        assert!(shooting.max_deviation_from(fd) < 1e-3);
    }

    #[test]
    fn test_reference_formulation_drops_advection() {
        init_logger();
        let samples = reference_samples(GalerkinFormulation::Reference, 10);
        let deviation = samples[2].max_deviation_from(&samples[1]);
        // the omitted p term shows as a visible but bounded difference
        assert!(deviation > 0.1, "deviation {}", deviation);
        assert!(deviation < 0.3, "deviation {}", deviation);
    }

    #[test]
    fn test_more_sine_terms_do_not_increase_deviation() {
        init_logger();
        let fd = fd_reference();
        let problem = ProblemDefinition::reference();
        for formulation in GalerkinFormulation::iter() {
            let deviation = |n_terms: usize| {
                VariationalSolver::new(n_terms)
                    .with_formulation(formulation)
                    .solve(&problem)
                    .unwrap()
                    .max_deviation_from(&fd)
            };
            let (d3, d10) = (deviation(3), deviation(10));
            assert!(d10 <= d3 + 1e-3, "{}: {} -> {}", formulation, d3, d10);
        }
    }

    #[test]
    fn test_consistent_formulation_converges_to_fd() {
        init_logger();
        let fd = fd_reference();
        let problem = ProblemDefinition::reference();
        let d3 = VariationalSolver::new(3)
            .with_formulation(GalerkinFormulation::Consistent)
            .solve(&problem)
            .unwrap()
            .max_deviation_from(&fd);
        let d10 = VariationalSolver::new(10)
            .with_formulation(GalerkinFormulation::Consistent)
            .solve(&problem)
            .unwrap()
            .max_deviation_from(&fd);
        assert!(d3 < 1e-2);
        assert!(d10 < 1e-3);
        assert!(d10 < d3);
    }

    #[test]
    fn test_fd_reference_matrix() {
        let system = FiniteDifferenceSolver::new(0.1)
            .assemble(&ProblemDefinition::reference())
            .unwrap();
        assert_eq!(system.matrix().shape(), (9, 9));
        for i in 0..9 {
            assert_abs_diff_eq!(system.diagonal[i], 2.02, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_fd_non_integral_step() {
        let res = FiniteDifferenceSolver::new(0.07).solve(&ProblemDefinition::reference());
        assert!(matches!(res, Err(BVPError::Configuration(_))));
    }

    #[test]
    fn test_tiny_step_keeps_the_comparison_alive() {
        init_logger();
        let problem = ProblemDefinition::reference();
        let mut shooting = LinearShootingSolver::new(1e-300);
        assert!(matches!(
            shooting.solve(&problem),
            Err(BVPError::Configuration(_))
        ));
        assert!(matches!(
            FiniteDifferenceSolver::new(1e-300).solve(&problem),
            Err(BVPError::Configuration(_))
        ));
        let report = LinearBVPTask::new(problem, 1e-300, 10).run();
        let failed: Vec<Method> = report.failures().iter().map(|(m, _)| *m).collect();
        assert_eq!(failed, vec![Method::Shooting, Method::FiniteDifference]);
        assert!(report.sample(Method::Variational).is_some());
    }

    #[test]
    fn test_closed_form_solutions() {
        init_logger();
        // y'' = y on [0, 1], y = sinh(x)
        let sinh =
            ProblemDefinition::new(|_| 0.0, |_| 1.0, |_| 0.0, 0.0, 1.0, 0.0, 1.0_f64.sinh())
                .unwrap();
        // y'' = 0 on [-1, 3], y = 2 + 0.5 (x + 1)
        let line = ProblemDefinition::new(|_| 0.0, |_| 0.0, |_| 0.0, -1.0, 3.0, 2.0, 4.0).unwrap();
        for (problem, exact, eps) in [
            (&sinh, (|x: f64| x.sinh()) as fn(f64) -> f64, 2e-3),
            (&line, (|x: f64| 2.0 + 0.5 * (x + 1.0)) as fn(f64) -> f64, 1e-9),
        ] {
            let mut task = LinearBVPTask::new(problem.clone(), 0.1, 10);
            task.variational = task
                .variational
                .with_formulation(GalerkinFormulation::Consistent)
                .with_quadrature(QuadratureRule::GaussLegendre { degree: 40 });
            let report = task.run();
            for method in Method::iter() {
                let sample = report.sample(method).unwrap();
                for (x, y) in sample.points() {
                    assert_abs_diff_eq!(y, exact(x), epsilon = eps);
                }
            }
        }
    }

    #[test]
    fn test_resonance_reported_as_degeneracy() {
        init_logger();
        // y'' = -pi^2 y, y(0) = 0, y(1) = 1 has no solution
        let problem =
            ProblemDefinition::new(|_| 0.0, |_| -PI * PI, |_| 0.0, 0.0, 1.0, 0.0, 1.0).unwrap();
        let mut shooting = LinearShootingSolver::new(0.1);
        assert!(matches!(
            shooting.solve(&problem),
            Err(BVPError::NumericalDegeneracy(_))
        ));
    }

    #[test]
    fn test_banded_and_dense_backends_agree_on_reference() {
        let problem = ProblemDefinition::reference();
        let dense = FiniteDifferenceSolver::new(0.05).solve(&problem).unwrap();
        let banded = FiniteDifferenceSolver::new(0.05)
            .with_linear_solver(LinearSolverKind::Banded)
            .solve(&problem)
            .unwrap();
        assert_eq!(dense.x(), banded.x());
        assert!(dense.max_deviation_from(&banded) < 1e-12);
    }

    #[test]
    fn test_task_from_str_runs_end_to_end() {
        init_logger();
        let input = r#"
        discretization
        h: 0.2
        n_terms: 6
        variational
        formulation: consistent
        comparison
        parallel: true
        table_step: 0.5
        "#;
        let task =
            LinearBVPTask::parse_settings_from_str(ProblemDefinition::reference(), input).unwrap();
        let report = task.run();
        assert!(report.failures().is_empty());
        assert_eq!(report.table_abscissas().unwrap(), vec![0.0, 0.5, 1.0]);
        assert_eq!(report.sample(Method::FiniteDifference).unwrap().len(), 6);
        let deviation = report
            .max_deviation(Method::Variational, Method::FiniteDifference)
            .unwrap();
        assert!(deviation < 0.05, "deviation {}", deviation);
    }
}
