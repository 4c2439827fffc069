//! # Task file for the linear BVP comparison
//!
//! Maps a document parsed by [`crate::Utils::task_parser`] onto a [`LinearBVPTask`]. The
//! coefficient functions p, q, r always come from code (the `base` problem); the file sets the
//! domain, boundary values, discretization, solver options and postprocessing. Every section
//! and every key is optional, a missing one keeps the default. Section titles and keys are
//! case-insensitive and a few common alternative names are accepted (see
//! [`header_pseudonims`], [`field_pseudonims`]).
//!
//! ```text
//! problem
//! a: 0.0
//! b: 1.0
//! alpha: 1.0
//! beta: 2.0
//! discretization
//! h: 0.1
//! n_terms: 10
//! shooting
//! rtol: 1e-6
//! atol: 1e-9
//! max_steps: 100000
//! resonance_tol: 1e-4
//! finite_difference
//! linear_solver: dense
//! variational
//! formulation: reference
//! quadrature: trapezoid
//! quadrature_points: 100
//! evaluation_points: 100
//! comparison
//! table_step: 0.2
//! parallel: false
//! postprocessing
//! plot: true
//! plot_filename: bvp_comparison.png
//! save_to_csv: false
//! csv_filename: bvp_comparison.csv
//! print_table: true
//! loglevel: info
//! save_log: false
//! ```
//! A commented copy of this layout is written by [`create_template_file`].
use crate::Utils::task_parser::{DocumentMap, DocumentParser, SectionMap, Value};
use crate::numerical::BVP_linear::BVP_comparison::LinearBVPTask;
use crate::numerical::BVP_linear::BVP_errors::{BVPError, BVPResult};
use crate::numerical::BVP_linear::BVP_problem::ProblemDefinition;
use crate::numerical::BVP_linear::FD_linear::LinearSolverKind;
use crate::numerical::BVP_linear::Galerkin_sine::GalerkinFormulation;
use crate::numerical::BVP_linear::quadrature::{
    DEFAULT_GAUSS_DEGREE, DEFAULT_TRAPEZOID_POINTS, QuadratureRule,
};
use log::{LevelFilter, info, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_STEP: f64 = 0.1;
pub const DEFAULT_N_TERMS: usize = 10;

const KNOWN_KEYS: [(&str, &[&str]); 7] = [
    ("problem", &["a", "b", "alpha", "beta"]),
    ("discretization", &["h", "n_terms"]),
    ("shooting", &["rtol", "atol", "max_steps", "resonance_tol"]),
    ("finite_difference", &["linear_solver"]),
    (
        "variational",
        &[
            "formulation",
            "quadrature",
            "quadrature_points",
            "evaluation_points",
        ],
    ),
    ("comparison", &["table_step", "parallel"]),
    (
        "postprocessing",
        &[
            "plot",
            "plot_filename",
            "save_to_csv",
            "csv_filename",
            "print_table",
            "loglevel",
            "save_log",
        ],
    ),
];

pub fn header_pseudonims() -> HashMap<String, Vec<String>> {
    HashMap::from([
        (
            "finite_difference".to_string(),
            vec![
                "finite_differences".to_string(),
                "fd".to_string(),
                "finite_difference_method".to_string(),
            ],
        ),
        (
            "variational".to_string(),
            vec![
                "galerkin".to_string(),
                "ritz".to_string(),
                "variational_method".to_string(),
            ],
        ),
        (
            "postprocessing".to_string(),
            vec!["postprocess".to_string(), "output".to_string()],
        ),
        (
            "discretization".to_string(),
            vec!["discretisation".to_string(), "mesh".to_string()],
        ),
    ])
}

pub fn field_pseudonims() -> HashMap<String, Vec<String>> {
    HashMap::from([
        (
            "h".to_string(),
            vec!["step".to_string(), "step_size".to_string()],
        ),
        (
            "n_terms".to_string(),
            vec![
                "nterms".to_string(),
                "terms".to_string(),
                "basis_size".to_string(),
            ],
        ),
        (
            "loglevel".to_string(),
            vec!["log_level".to_string()],
        ),
    ])
}

fn single<'a>(section: &'a SectionMap, title: &str, key: &str) -> BVPResult<Option<&'a Value>> {
    match section.get(key) {
        None => Ok(None),
        Some(values) => match values.as_slice() {
            [value] => Ok(Some(value)),
            [] => Err(BVPError::configuration(format!(
                "{}.{}: value is missing",
                title, key
            ))),
            _ => Err(BVPError::configuration(format!(
                "{}.{}: expected a single value, got {}",
                title,
                key,
                values.len()
            ))),
        },
    }
}

fn wrong_type(title: &str, key: &str, expected: &str, value: &Value) -> BVPError {
    BVPError::configuration(format!(
        "{}.{}: expected {}, got {} '{}'",
        title,
        key,
        expected,
        value.type_name(),
        value
    ))
}

fn get_float(section: &SectionMap, title: &str, key: &str) -> BVPResult<Option<f64>> {
    single(section, title, key)?
        .map(|v| v.as_float().ok_or_else(|| wrong_type(title, key, "a number", v)))
        .transpose()
}

fn get_usize(section: &SectionMap, title: &str, key: &str) -> BVPResult<Option<usize>> {
    single(section, title, key)?
        .map(|v| {
            v.as_integer()
                .and_then(|i| usize::try_from(i).ok())
                .ok_or_else(|| wrong_type(title, key, "a non-negative integer", v))
        })
        .transpose()
}

fn get_bool(section: &SectionMap, title: &str, key: &str) -> BVPResult<Option<bool>> {
    single(section, title, key)?
        .map(|v| {
            v.as_boolean()
                .ok_or_else(|| wrong_type(title, key, "true or false", v))
        })
        .transpose()
}

fn get_string(section: &SectionMap, title: &str, key: &str) -> BVPResult<Option<String>> {
    single(section, title, key)?
        .map(|v| match v {
            Value::String(s) => Ok(s.clone()),
            other => Err(wrong_type(title, key, "a string", other)),
        })
        .transpose()
}

/// enumerated value, parsed case-insensitively with `FromStr`
fn get_enum<T: FromStr>(
    section: &SectionMap,
    title: &str,
    key: &str,
    allowed: &str,
) -> BVPResult<Option<T>> {
    match get_string(section, title, key)? {
        None => Ok(None),
        Some(s) => T::from_str(&s).map(Some).map_err(|_| {
            BVPError::configuration(format!(
                "{}.{}: unknown value '{}', expected one of: {}",
                title, key, s, allowed
            ))
        }),
    }
}

fn warn_unknown_entries(result: &DocumentMap) {
    for (title, section) in result {
        match KNOWN_KEYS.iter().find(|(t, _)| *t == title.as_str()) {
            None => warn!("task file: unknown section '{}' is ignored", title),
            Some((_, keys)) => {
                for key in section.keys() {
                    if !keys.contains(&key.as_str()) {
                        warn!("task file: unknown key '{}.{}' is ignored", title, key);
                    }
                }
            }
        }
    }
}

impl LinearBVPTask {
    /// Task with all defaults: the base problem, h = 0.1, 10 sine terms
    pub fn with_defaults(problem: ProblemDefinition) -> Self {
        LinearBVPTask::new(problem, DEFAULT_STEP, DEFAULT_N_TERMS)
    }

    /// Applies the parsed document on top of the current settings
    pub fn set_params_from_hashmap(&mut self, result: &DocumentMap) -> BVPResult<()> {
        warn_unknown_entries(result);
        let empty = SectionMap::new();
        let section = |title: &str| result.get(title).unwrap_or(&empty);

        let s = section("problem");
        let a = get_float(s, "problem", "a")?.unwrap_or(self.problem.a);
        let b = get_float(s, "problem", "b")?.unwrap_or(self.problem.b);
        let alpha = get_float(s, "problem", "alpha")?.unwrap_or(self.problem.alpha);
        let beta = get_float(s, "problem", "beta")?.unwrap_or(self.problem.beta);
        self.problem = self
            .problem
            .clone()
            .with_domain(a, b)?
            .with_boundary_values(alpha, beta)?;

        let s = section("discretization");
        if let Some(h) = get_float(s, "discretization", "h")? {
            self.shooting.step_size = h;
            self.finite_difference.step_size = h;
        }
        if let Some(n_terms) = get_usize(s, "discretization", "n_terms")? {
            self.variational.n_terms = n_terms;
        }

        let s = section("shooting");
        if let Some(rtol) = get_float(s, "shooting", "rtol")? {
            self.shooting.ivp.rtol = rtol;
        }
        if let Some(atol) = get_float(s, "shooting", "atol")? {
            self.shooting.ivp.atol = atol;
        }
        if let Some(max_steps) = get_usize(s, "shooting", "max_steps")? {
            self.shooting.ivp.max_steps = max_steps;
        }
        if let Some(resonance_tol) = get_float(s, "shooting", "resonance_tol")? {
            self.shooting.resonance_tol = resonance_tol;
        }

        let s = section("finite_difference");
        if let Some(kind) =
            get_enum::<LinearSolverKind>(s, "finite_difference", "linear_solver", "dense, banded")?
        {
            self.finite_difference.linear_solver = kind;
        }

        let s = section("variational");
        if let Some(formulation) = get_enum::<GalerkinFormulation>(
            s,
            "variational",
            "formulation",
            "reference, consistent",
        )? {
            self.variational.formulation = formulation;
        }
        let rule = get_string(s, "variational", "quadrature")?;
        let points = get_usize(s, "variational", "quadrature_points")?;
        self.variational.quadrature = match (rule.as_deref(), points) {
            (None, None) => self.variational.quadrature,
            (None, Some(p)) => match self.variational.quadrature {
                QuadratureRule::Trapezoid { .. } => QuadratureRule::Trapezoid { points: p },
                QuadratureRule::GaussLegendre { .. } => {
                    QuadratureRule::GaussLegendre { degree: p }
                }
            },
            (Some(name), p) => match name.to_lowercase().as_str() {
                "trapezoid" | "trapezoidal" => QuadratureRule::Trapezoid {
                    points: p.unwrap_or(DEFAULT_TRAPEZOID_POINTS),
                },
                "gauss_legendre" | "gauss" | "gausslegendre" => QuadratureRule::GaussLegendre {
                    degree: p.unwrap_or(DEFAULT_GAUSS_DEGREE),
                },
                other => {
                    return Err(BVPError::configuration(format!(
                        "variational.quadrature: unknown value '{}', expected one of: {}",
                        other, "trapezoid, gauss_legendre"
                    )));
                }
            },
        };
        if let Some(n) = get_usize(s, "variational", "evaluation_points")? {
            self.variational.evaluation_points = n;
        }

        let s = section("comparison");
        if let Some(step) = get_float(s, "comparison", "table_step")? {
            if !(step.is_finite() && step > 0.0) {
                return Err(BVPError::configuration(format!(
                    "comparison.table_step must be positive, got {}",
                    step
                )));
            }
            self.comparison.table_step = step;
        }
        if let Some(parallel) = get_bool(s, "comparison", "parallel")? {
            self.comparison.parallel = parallel;
        }

        let s = section("postprocessing");
        let pp = &mut self.postprocessing;
        if let Some(plot) = get_bool(s, "postprocessing", "plot")? {
            pp.plot = plot;
        }
        if let Some(name) = get_string(s, "postprocessing", "plot_filename")? {
            pp.plot_filename = name;
        }
        if let Some(save) = get_bool(s, "postprocessing", "save_to_csv")? {
            pp.save_to_csv = save;
        }
        if let Some(name) = get_string(s, "postprocessing", "csv_filename")? {
            pp.csv_filename = name;
        }
        if let Some(print) = get_bool(s, "postprocessing", "print_table")? {
            pp.print_table = print;
        }
        if let Some(level) = get_enum::<LevelFilter>(
            s,
            "postprocessing",
            "loglevel",
            "off, error, warn, info, debug, trace",
        )? {
            pp.loglevel = level;
        }
        if let Some(save_log) = get_bool(s, "postprocessing", "save_log")? {
            pp.save_log = save_log;
        }
        info!("task settings: {:?}", self);
        Ok(())
    }

    fn from_parser(problem: ProblemDefinition, parser: &mut DocumentParser) -> BVPResult<Self> {
        parser.with_pseudonims(Some(header_pseudonims()), Some(field_pseudonims()));
        parser
            .parse_document()
            .map_err(|e| BVPError::configuration(format!("task file: {}", e)))?;
        parser.keys_to_lower_case(None);
        let result = parser
            .get_result()
            .ok_or_else(|| BVPError::configuration("task file: no result after parsing"))?;
        let mut task = LinearBVPTask::with_defaults(problem);
        task.set_params_from_hashmap(result)?;
        Ok(task)
    }

    /// Task from a settings string; p, q, r are taken from `problem`
    pub fn parse_settings_from_str(problem: ProblemDefinition, input: &str) -> BVPResult<Self> {
        let mut parser = DocumentParser::new(input.to_owned());
        Self::from_parser(problem, &mut parser)
    }

    /// Task from a file (default: ./bvp_task.txt)
    pub fn parse_file(problem: ProblemDefinition, path: Option<PathBuf>) -> BVPResult<Self> {
        let mut parser = DocumentParser::new(String::new());
        parser
            .setting_from_file(path)
            .map_err(BVPError::configuration)?;
        Self::from_parser(problem, &mut parser)
    }
}

pub const TEMPLATE: &str = r#"
// Linear BVP comparison: y'' = p(x) y' + q(x) y + r(x), y(a) = alpha, y(b) = beta
// every section and key is optional
problem
    a: 0.0
    b: 1.0
    alpha: 1.0
    beta: 2.0
discretization
    // grid step of shooting and finite differences; (b - a)/h must be an integer for FD
    h: 0.1
    // number of sine basis functions
    n_terms: 10
shooting
    rtol: 1e-6
    atol: 1e-9
    max_steps: 100000
    // |y2(b)| <= resonance_tol * max|y2| is reported as resonance
    resonance_tol: 1e-4
finite_difference
    // dense or banded
    linear_solver: dense
variational
    // reference or consistent
    formulation: reference
    // trapezoid or gauss_legendre
    quadrature: trapezoid
    // trapezoid points or Gauss-Legendre degree
    quadrature_points: 100
    evaluation_points: 100
comparison
    table_step: 0.2
    parallel: false
postprocessing
    plot: true
    plot_filename: bvp_comparison.png
    save_to_csv: false
    csv_filename: bvp_comparison.csv
    print_table: true
    // off, error, warn, info, debug, trace
    loglevel: info
    save_log: false
"#;

/// Writes the commented template (default: ./bvp_task_template.txt) and returns its path
pub fn create_template_file(path: Option<PathBuf>) -> std::io::Result<PathBuf> {
    let file_path = match path {
        Some(p) => p,
        None => {
            let mut default_path =
                std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            default_path.push("bvp_task_template.txt");
            default_path
        }
    };
    std::fs::write(&file_path, TEMPLATE)?;
    info!("template written to {}", file_path.display());
    Ok(file_path)
}
