use RustedLinearBVP::numerical::BVP_linear::BVP_comparison::LinearBVPTask;
use RustedLinearBVP::numerical::BVP_linear::BVP_problem::ProblemDefinition;
use RustedLinearBVP::numerical::BVP_linear::FD_linear::{FiniteDifferenceSolver, LinearSolverKind};
use RustedLinearBVP::numerical::BVP_linear::Galerkin_sine::{GalerkinFormulation, VariationalSolver};
use RustedLinearBVP::numerical::BVP_linear::Shooting_linear::LinearShootingSolver;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_shooting(c: &mut Criterion) {
    let problem = ProblemDefinition::reference();
    c.bench_function("shooting h=0.01", |b| {
        b.iter(|| {
            let mut solver = LinearShootingSolver::new(black_box(0.01));
            solver.solve(&problem)
        })
    });
}

fn bench_finite_differences(c: &mut Criterion) {
    let problem = ProblemDefinition::reference();
    let mut group = c.benchmark_group("finite differences h=0.002");
    for kind in [LinearSolverKind::Dense, LinearSolverKind::Banded] {
        group.bench_function(kind.to_string(), |b| {
            b.iter(|| {
                FiniteDifferenceSolver::new(black_box(0.002))
                    .with_linear_solver(kind)
                    .solve(&problem)
            })
        });
    }
    group.finish();
}

fn bench_variational(c: &mut Criterion) {
    let problem = ProblemDefinition::reference();
    let mut group = c.benchmark_group("variational 20 terms");
    for formulation in [GalerkinFormulation::Reference, GalerkinFormulation::Consistent] {
        group.bench_function(formulation.to_string(), |b| {
            b.iter(|| {
                VariationalSolver::new(black_box(20))
                    .with_formulation(formulation)
                    .solve(&problem)
            })
        });
    }
    group.finish();
}

fn bench_comparison(c: &mut Criterion) {
    let mut task = LinearBVPTask::new(ProblemDefinition::reference(), 0.01, 10);
    c.bench_function("comparison sequential", |b| b.iter(|| task.run()));
    task.comparison.parallel = true;
    c.bench_function("comparison parallel", |b| b.iter(|| task.run()));
}

criterion_group!(
    benches,
    bench_shooting,
    bench_finite_differences,
    bench_variational,
    bench_comparison
);
criterion_main!(benches);
