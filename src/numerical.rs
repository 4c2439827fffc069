/// Linear BVP: shooting, finite differences and the variational method with a sine basis
///  Example
/// ```
/// use RustedLinearBVP::numerical::BVP_linear::BVP_comparison::LinearBVPTask;
/// use RustedLinearBVP::numerical::BVP_linear::BVP_problem::ProblemDefinition;
/// // y'' = -(x+1) y' + 2 y + (1 - x^2) exp(-x), y(0) = 1, y(1) = 2
/// let problem = ProblemDefinition::reference();
/// // step 0.1 for shooting and finite differences, 10 sine terms
/// let task = LinearBVPTask::new(problem, 0.1, 10);
/// let report = task.run();
/// assert!(report.failures().is_empty());
/// ```
pub mod BVP_linear;
