use std::io;

use thiserror::Error;

use crate::data::LoadError;
use crate::store::StoreError;

/// Field-level input error from an admin form or signup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Error type for quiz operations.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Every question source was exhausted without usable data.
    #[error("{0}")]
    NoQuestions(String),

    /// The trivia source answered with HTTP 429.
    #[error("Server rate limit reached")]
    RateLimited,

    /// Transport failure with no backup to fall back on.
    #[error("{0}")]
    FetchFailed(String),

    /// Saving the finished attempt failed.
    #[error("Failed to save quiz attempt: {0}")]
    Persistence(#[source] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Operation not allowed in the session's current phase.
    #[error("Quiz session is {0}")]
    InvalidState(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to load questions: {0}")]
    Load(#[from] LoadError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type QuizResult<T> = Result<T, QuizError>;
