//! External question sources: the public trivia API and the static backup file.

mod opentdb;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use crate::data::load_backup_questions;
use crate::models::{Level, RemoteQuestion};

pub use opentdb::OpenTdbClient;

/// Outcome of a single sourcing attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Success(Vec<RemoteQuestion>),
    /// The source answered but had nothing for the request.
    Empty,
    /// HTTP 429.
    RateLimited,
    /// Transport failure, timeout, or an unexpected status.
    TransportError(String),
}

impl StepOutcome {
    /// Treats a successful but empty result list as [`StepOutcome::Empty`].
    pub fn from_results(results: Vec<RemoteQuestion>) -> Self {
        if results.is_empty() {
            StepOutcome::Empty
        } else {
            StepOutcome::Success(results)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StepOutcome::Success(_) => "success",
            StepOutcome::Empty => "empty",
            StepOutcome::RateLimited => "rate-limited",
            StepOutcome::TransportError(_) => "transport-error",
        }
    }
}

/// A remote multiple-choice question provider.
pub trait TriviaSource: Send + Sync {
    fn fetch(
        &self,
        category: &str,
        level: Option<Level>,
        amount: u32,
    ) -> impl Future<Output = StepOutcome> + Send;
}

/// The last-resort question list.
pub trait BackupSource: Send + Sync {
    /// `None` when no usable backup exists.
    fn load(&self) -> impl Future<Output = Option<Vec<RemoteQuestion>>> + Send;
}

/// Backup questions read from a JSON file, bounded by a timeout.
#[derive(Debug, Clone)]
pub struct BackupFile {
    path: Option<PathBuf>,
    timeout: Duration,
}

impl BackupFile {
    pub fn new(path: Option<PathBuf>, timeout: Duration) -> Self {
        Self { path, timeout }
    }
}

impl BackupSource for BackupFile {
    async fn load(&self) -> Option<Vec<RemoteQuestion>> {
        let path = self.path.as_ref()?;
        match tokio::time::timeout(self.timeout, load_backup_questions(path)).await {
            Ok(Ok(questions)) => Some(questions),
            Ok(Err(e)) => {
                tracing::warn!("backup questions unavailable: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!("backup questions timed out after {:?}", self.timeout);
                None
            }
        }
    }
}

/// No backup configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackup;

impl BackupSource for NoBackup {
    async fn load(&self) -> Option<Vec<RemoteQuestion>> {
        None
    }
}
