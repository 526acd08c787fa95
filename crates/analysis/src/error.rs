//! Error types for the analysis stages.

use thiserror::Error;

/// Failures of the regression fit itself.
///
/// Too few usable rows is not an error; `RegressionModel::fit` reports it as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum RegressionError {
    /// The least-squares solve did not produce a usable solution.
    #[error("least-squares solve failed: {0}")]
    Numerical(String),
}

/// Invalid clustering setup, caught when the engine is built.
#[derive(Debug, Error)]
pub enum ClusteringError {
    #[error("unknown clustering feature `{0}`")]
    UnknownFeature(String),
}

pub type Result<T> = std::result::Result<T, RegressionError>;
