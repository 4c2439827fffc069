//! # Linear two-point boundary value problems
//!
//! y'' = p(x) y' + q(x) y + r(x),  y(a) = alpha,  y(b) = beta
//!
//! solved by three independent methods whose results are compared side by side:
//! - linear shooting (two IVPs integrated with Dormand-Prince, superposed to meet y(b));
//! - second order central finite differences (tridiagonal system, dense or banded LU);
//! - variational (Galerkin/Ritz) method with a sine basis on top of a linear lift.
//!
//! [`BVP_comparison::LinearBVPTask`] runs all of them and presents the results as a table,
//! a PNG plot and optionally a csv file. Settings can be read from a task file, see
//! [`task_parser_linear`].
mod BVP_linear_tests;
pub mod BVP_comparison;
pub mod BVP_errors;
pub mod BVP_problem;
pub mod BVP_utils;
pub mod FD_linear;
pub mod Galerkin_sine;
pub mod Shooting_linear;
pub mod ivp_DormandPrince;
pub mod quadrature;
pub mod task_parser_linear;
