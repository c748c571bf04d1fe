//! Fixture runner errors

use thiserror::Error;

/// Fixture loading or checking failure
#[derive(Error, Debug)]
pub enum TestError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed fixture JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Fork name without a preset
    #[error("unsupported fork: {0}")]
    UnsupportedFork(String),

    /// Execution disagrees with the fixture
    #[error("{test}: {reason}")]
    Mismatch {
        /// Test name
        test: String,
        /// What differed
        reason: String,
    },
}

impl TestError {
    pub(crate) fn mismatch(test: &str, reason: impl Into<String>) -> Self {
        TestError::Mismatch {
            test: test.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for fixture runs
pub type TestResult<T> = Result<T, TestError>;
