use thiserror::Error;

/// Recoverable failures surfaced to the learner. Infrastructure errors
/// (I/O, JSON, HTTP) travel as `anyhow::Error` and never reach this type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TestError {
    #[error("{0}")]
    Validation(String),
    #[error("No questions are available right now. Check the question source and try again.")]
    EmptyBank,
    #[error("There is no saved progress to resume.")]
    NoSavedProgress,
    #[error("No test is in progress.")]
    NoActiveSession,
    #[error("Take the placement test first to unlock registration.")]
    Locked,
}

impl TestError {
    /// Whether the learner can simply try the same action again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TestError::EmptyBank)
    }
}
