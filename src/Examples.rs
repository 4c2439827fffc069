//! examples of usage of RustedLinearBVP
/// linear BVP: shooting vs finite differences vs variational method
pub mod linear_bvp_examples;
