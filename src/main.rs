#![allow(non_snake_case)]
use RustedLinearBVP::Utils::logger::init_logger;
use RustedLinearBVP::numerical::BVP_linear::BVP_comparison::LinearBVPTask;
use RustedLinearBVP::numerical::BVP_linear::BVP_problem::ProblemDefinition;
use RustedLinearBVP::numerical::BVP_linear::task_parser_linear::create_template_file;
use std::path::PathBuf;
use std::process::ExitCode;

/// linear_bvp                 reference problem with default settings
/// linear_bvp <task_file>     reference coefficients, settings from the task file
/// linear_bvp --template      write bvp_task_template.txt
fn main() -> ExitCode {
    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("--template") {
        return match create_template_file(None) {
            Ok(path) => {
                println!("template written to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("failed to write template: {}", e);
                ExitCode::FAILURE
            }
        };
    }
    let problem = ProblemDefinition::reference();
    let task = match arg {
        Some(path) => match LinearBVPTask::parse_file(problem, Some(PathBuf::from(path))) {
            Ok(task) => task,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => LinearBVPTask::with_defaults(problem),
    };
    if let Err(e) = init_logger(task.postprocessing.loglevel, task.postprocessing.save_log) {
        eprintln!("failed to initialize logger: {}", e);
    }
    let report = task.run();
    if let Err(e) = task.postprocessing(&report) {
        eprintln!("postprocessing failed: {}", e);
        return ExitCode::FAILURE;
    }
    let failures = report.failures();
    if failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        for (method, error) in failures {
            eprintln!("{}: {}", method, error);
        }
        ExitCode::FAILURE
    }
}
