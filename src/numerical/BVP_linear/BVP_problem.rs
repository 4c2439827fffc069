//! # Linear BVP problem definition and solution samples
//!
//! The problem is y'' = p(x)y' + q(x)y + r(x) on [a, b] with y(a) = alpha, y(b) = beta.
//! Coefficients are plain Rust closures so any p, q, r can be plugged in; the reference
//! instance used throughout the examples is
//!
//! p(x) = -(x + 1),  q(x) = 2,  r(x) = (1 - x^2) e^{-x},  a = 0, b = 1, alpha = 1, beta = 2.
//!
//! ```rust, ignore
//! let problem = ProblemDefinition::new(
//!     |_x| 0.0,          // p
//!     |_x| 1.0,          // q
//!     |_x| 0.0,          // r
//!     0.0, 1.0,          // a, b
//!     0.0, 1.0_f64.sinh() // alpha, beta
//! )?;
//! ```
use crate::numerical::BVP_linear::BVP_errors::{BVPError, BVPResult};
use nalgebra::DVector;
use std::fmt;
use std::sync::Arc;
use strum_macros::{Display, EnumIter};

/// scalar coefficient function of the ODE
pub type CoefficientFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Immutable definition of the Dirichlet problem. Construct with [`ProblemDefinition::new`],
/// which enforces a < b and finite data. Cloning shares the coefficient closures.
#[derive(Clone)]
pub struct ProblemDefinition {
    p: CoefficientFn,
    q: CoefficientFn,
    r: CoefficientFn,
    pub a: f64,
    pub b: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl ProblemDefinition {
    pub fn new<P, Q, R>(p: P, q: Q, r: R, a: f64, b: f64, alpha: f64, beta: f64) -> BVPResult<Self>
    where
        P: Fn(f64) -> f64 + Send + Sync + 'static,
        Q: Fn(f64) -> f64 + Send + Sync + 'static,
        R: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        validate_bounds(a, b, alpha, beta)?;
        Ok(Self {
            p: Arc::new(p),
            q: Arc::new(q),
            r: Arc::new(r),
            a,
            b,
            alpha,
            beta,
        })
    }

    /// p(x) = -(x+1), q(x) = 2, r(x) = (1-x^2)exp(-x) on [0, 1] with y(0) = 1, y(1) = 2
    pub fn reference() -> Self {
        Self {
            p: Arc::new(|x| -(x + 1.0)),
            q: Arc::new(|_x| 2.0),
            r: Arc::new(|x| (1.0 - x * x) * (-x).exp()),
            a: 0.0,
            b: 1.0,
            alpha: 1.0,
            beta: 2.0,
        }
    }

    /// same coefficients on another interval
    pub fn with_domain(self, a: f64, b: f64) -> BVPResult<Self> {
        validate_bounds(a, b, self.alpha, self.beta)?;
        Ok(Self { a, b, ..self })
    }

    /// same coefficients with other boundary values
    pub fn with_boundary_values(self, alpha: f64, beta: f64) -> BVPResult<Self> {
        validate_bounds(self.a, self.b, alpha, beta)?;
        Ok(Self {
            alpha,
            beta,
            ..self
        })
    }

    pub fn p(&self, x: f64) -> f64 {
        (self.p)(x)
    }
    pub fn q(&self, x: f64) -> f64 {
        (self.q)(x)
    }
    pub fn r(&self, x: f64) -> f64 {
        (self.r)(x)
    }

    pub fn length(&self) -> f64 {
        self.b - self.a
    }
}

impl fmt::Debug for ProblemDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemDefinition")
            .field("a", &self.a)
            .field("b", &self.b)
            .field("alpha", &self.alpha)
            .field("beta", &self.beta)
            .finish_non_exhaustive()
    }
}

fn validate_bounds(a: f64, b: f64, alpha: f64, beta: f64) -> BVPResult<()> {
    if ![a, b, alpha, beta].iter().all(|v| v.is_finite()) {
        return Err(BVPError::configuration(format!(
            "domain and boundary values must be finite: a={}, b={}, alpha={}, beta={}",
            a, b, alpha, beta
        )));
    }
    if a >= b {
        return Err(BVPError::configuration(format!(
            "left bound must be smaller than right bound: a={} >= b={}",
            a, b
        )));
    }
    Ok(())
}

/// The three methods being compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Method {
    #[strum(to_string = "Shooting")]
    Shooting,
    #[strum(to_string = "Finite difference")]
    FiniteDifference,
    #[strum(to_string = "Variational")]
    Variational,
}

/// Ordered (x, y) samples produced by one solver. x is strictly increasing; length and
/// spacing belong to the solver's own discretization.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionSample {
    pub method: Method,
    x: DVector<f64>,
    y: DVector<f64>,
}

impl SolutionSample {
    pub fn new(method: Method, x: DVector<f64>, y: DVector<f64>) -> BVPResult<Self> {
        if x.len() != y.len() {
            return Err(BVPError::configuration(format!(
                "{} solution: {} abscissas but {} values",
                method,
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(BVPError::configuration(format!(
                "{} solution is empty",
                method
            )));
        }
        if x.as_slice().windows(2).any(|w| w[1] <= w[0]) {
            return Err(BVPError::configuration(format!(
                "{} solution abscissas are not strictly increasing",
                method
            )));
        }
        if let Some(i) = y.iter().position(|v| !v.is_finite()) {
            return Err(BVPError::degeneracy(format!(
                "{} solution is not finite at x = {}",
                method, x[i]
            )));
        }
        Ok(Self { method, x, y })
    }

    pub fn x(&self) -> &DVector<f64> {
        &self.x
    }

    pub fn y(&self) -> &DVector<f64> {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn first(&self) -> (f64, f64) {
        (self.x[0], self.y[0])
    }

    pub fn last(&self) -> (f64, f64) {
        let n = self.len() - 1;
        (self.x[n], self.y[n])
    }

    /// sample whose abscissa is closest to `x` (ties go to the left sample)
    pub fn nearest(&self, x: f64) -> (f64, f64) {
        let idx = match self
            .x
            .as_slice()
            .binary_search_by(|xi| xi.total_cmp(&x))
        {
            Ok(i) => i,
            Err(0) => 0,
            Err(i) if i >= self.len() => self.len() - 1,
            Err(i) => {
                if (x - self.x[i - 1]) <= (self.x[i] - x) {
                    i - 1
                } else {
                    i
                }
            }
        };
        (self.x[idx], self.y[idx])
    }

    /// piecewise linear interpolation, None outside [x_0, x_n]
    pub fn interpolate(&self, x: f64) -> Option<f64> {
        let (x0, _) = self.first();
        let (xn, yn) = self.last();
        if x < x0 || x > xn {
            return None;
        }
        if x == xn {
            return Some(yn);
        }
        let i = match self
            .x
            .as_slice()
            .binary_search_by(|xi| xi.total_cmp(&x))
        {
            Ok(i) => return Some(self.y[i]),
            Err(i) => i,
        };
        let (xl, xr) = (self.x[i - 1], self.x[i]);
        let (yl, yr) = (self.y[i - 1], self.y[i]);
        Some(yl + (yr - yl) * (x - xl) / (xr - xl))
    }

    /// largest |self(x_i) - other(x_i)| over the abscissas of `other` inside this sample's range
    pub fn max_deviation_from(&self, other: &SolutionSample) -> f64 {
        other
            .points()
            .filter_map(|(x, y)| self.interpolate(x).map(|v| (v - y).abs()))
            .fold(0.0, f64::max)
    }
}

/// grids with more intervals than this are rejected as a configuration error
pub const MAX_INTERVALS: f64 = 1e7;

fn interval_ratio(a: f64, b: f64, h: f64) -> BVPResult<f64> {
    if !(h.is_finite() && h > 0.0) {
        return Err(BVPError::configuration(format!(
            "step size must be positive and finite, got h={}",
            h
        )));
    }
    let ratio = (b - a) / h;
    if !ratio.is_finite() || ratio > MAX_INTERVALS {
        return Err(BVPError::configuration(format!(
            "step size h={} gives (b - a)/h = {:e} intervals on [{}, {}], the limit is {:e}",
            h, ratio, a, b, MAX_INTERVALS
        )));
    }
    Ok(ratio)
}

/// Uniform output grid a, a+h, ... ending exactly at b. When (b-a)/h is not integral the last
/// step is shorter; a last point closer than 1e-9*h to b is merged into b.
pub fn create_mesh(a: f64, b: f64, h: f64) -> BVPResult<DVector<f64>> {
    let ratio = interval_ratio(a, b, h)?;
    let n_full = (ratio * (1.0 + 1e-12)).floor() as usize;
    let capacity = n_full.checked_add(2).ok_or_else(|| {
        BVPError::configuration(format!("grid with {} intervals is too large", n_full))
    })?;
    let mut x_mesh: Vec<f64> = Vec::with_capacity(capacity);
    x_mesh.extend((0..=n_full).map(|i| a + i as f64 * h));
    let last = x_mesh.len() - 1;
    if (b - x_mesh[last]).abs() <= 1e-9 * h {
        x_mesh[last] = b;
    } else {
        x_mesh.push(b);
    }
    Ok(DVector::from_vec(x_mesh))
}

/// Number of intervals n = (b-a)/h for methods that need an exact uniform grid
pub fn exact_interval_count(a: f64, b: f64, h: f64) -> BVPResult<usize> {
    let ratio = interval_ratio(a, b, h)?;
    let n = ratio.round();
    if (ratio - n).abs() > 1e-9 * ratio.max(1.0) {
        return Err(BVPError::configuration(format!(
            "(b - a)/h = {} is not an integer for a={}, b={}, h={}",
            ratio, a, b, h
        )));
    }
    Ok(n as usize)
}
