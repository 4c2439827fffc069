//! Error taxonomy shared by the three linear BVP solvers.
use thiserror::Error;

/// Everything a solver call, the task-file mapping or the comparison driver can fail with.
///
/// Failures are deterministic: the same inputs always fail the same way, so nothing is retried.
/// The fix is a different discretization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BVPError {
    /// invalid problem or discretization: a >= b, (b - a)/h not integral or too large,
    /// n_terms < 1, bad task file...
    #[error("configuration error: {0}")]
    Configuration(String),
    /// resonance in the shooting method or a singular linear system
    #[error("numerical degeneracy: {0}")]
    NumericalDegeneracy(String),
    /// the adaptive IVP stepper could not advance
    #[error("integration error: {0}")]
    Integration(String),
}

impl BVPError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        BVPError::Configuration(msg.into())
    }
    pub fn degeneracy(msg: impl Into<String>) -> Self {
        BVPError::NumericalDegeneracy(msg.into())
    }
    pub fn integration(msg: impl Into<String>) -> Self {
        BVPError::Integration(msg.into())
    }
}

pub type BVPResult<T> = Result<T, BVPError>;
