//! Quadrature rules for the Galerkin integrals.
//!
//! `Trapezoid` is the composite trapezoid rule on a uniform grid with a fixed number of points
//! (the endpoints included). `GaussLegendre` delegates to the gauss-quad crate; its nodes and
//! weights are computed once when the rule is built and reused for every integral.
use crate::numerical::BVP_linear::BVP_errors::{BVPError, BVPResult};
use gauss_quad::GaussLegendre;
use log::debug;
use std::fmt;

pub const DEFAULT_TRAPEZOID_POINTS: usize = 100;
/// degree used when a task file selects Gauss-Legendre without `quadrature_points`
pub const DEFAULT_GAUSS_DEGREE: usize = 30;

/// Which rule to use, as read from a task file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadratureRule {
    Trapezoid { points: usize },
    GaussLegendre { degree: usize },
}

impl Default for QuadratureRule {
    fn default() -> Self {
        QuadratureRule::Trapezoid {
            points: DEFAULT_TRAPEZOID_POINTS,
        }
    }
}

impl fmt::Display for QuadratureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuadratureRule::Trapezoid { points } => write!(f, "trapezoid ({} points)", points),
            QuadratureRule::GaussLegendre { degree } => {
                write!(f, "Gauss-Legendre (degree {})", degree)
            }
        }
    }
}

impl QuadratureRule {
    pub fn build(&self) -> BVPResult<Quadrature> {
        debug!("building quadrature rule: {}", self);
        match *self {
            QuadratureRule::Trapezoid { points } => {
                if points < 2 {
                    return Err(BVPError::configuration(format!(
                        "trapezoid rule needs at least 2 points, got {}",
                        points
                    )));
                }
                Ok(Quadrature::Trapezoid { points })
            }
            QuadratureRule::GaussLegendre { degree } => {
                let rule = GaussLegendre::new(degree).map_err(|e| {
                    BVPError::configuration(format!(
                        "Gauss-Legendre rule of degree {}: {}",
                        degree, e
                    ))
                })?;
                Ok(Quadrature::GaussLegendre(rule))
            }
        }
    }
}

/// A ready to use rule
#[derive(Debug, Clone)]
pub enum Quadrature {
    Trapezoid { points: usize },
    GaussLegendre(GaussLegendre),
}

impl Quadrature {
    /// approximates the integral of `f` over [a, b]
    pub fn integrate<F>(&self, a: f64, b: f64, f: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        match self {
            Quadrature::Trapezoid { points } => trapezoid(a, b, *points, f),
            Quadrature::GaussLegendre(rule) => rule.integrate(a, b, f),
        }
    }
}

fn trapezoid<F>(a: f64, b: f64, points: usize, f: F) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = points - 1;
    let dx = (b - a) / n as f64;
    let interior: f64 = (1..n).map(|k| f(a + k as f64 * dx)).sum();
    dx * (0.5 * (f(a) + f(b)) + interior)
}
