//! Error types of the regression harness
//!

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Cross-validation needs at least one sample per fold
    #[error("not enough samples for cross-validation: {samples} samples, {folds} folds")]
    InsufficientData { samples: usize, folds: usize },
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("invalid parameter {0}")]
    InvalidParams(String),
    #[error("fitting the estimator failed: {0}")]
    ExternalFit(String),
    #[error("prediction failed: {0}")]
    ExternalPredict(String),
    #[error(transparent)]
    BaseCrate(#[from] linfa::Error),
}

impl From<linfa_svm::SvmError> for Error {
    fn from(err: linfa_svm::SvmError) -> Self {
        Error::ExternalFit(err.to_string())
    }
}
