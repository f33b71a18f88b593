//! Quiz session engine: question sourcing, fetch guarding, per-question
//! timing, answer tracking, scoring, and attempt persistence.

mod guard;
mod session;
mod shuffle;
mod sourcing;
mod timer;

use std::fmt;

use crate::error::ValidationError;
use crate::models::{Level, QuizAttempt};
use crate::store::DataStore;

pub use guard::{LoadEvent, QuizMount};
pub use session::{Advance, Phase, QuizSession, ReviewItem, GUEST_EMAIL, GUEST_NAME};
pub use shuffle::{merge_options, present};
pub use sourcing::{
    LoadedQuiz, QuestionLoader, QuestionProvider, SourcingPolicy, MSG_CUSTOM_FETCH_FAILED, MSG_LOAD_FAILED,
    MSG_NO_CUSTOM_QUESTIONS, MSG_NO_QUESTIONS, NOTICE_BACKUP_API_FAILED, NOTICE_BACKUP_NO_DATA, NOTICE_RATE_LIMITED,
};
pub use timer::Countdown;

/// Route prefix marking a community-authored subcategory target.
pub const LOCAL_PREFIX: &str = "local-";

/// Where a session's questions come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetSource {
    /// A category id of the external trivia source.
    Remote { category: String },
    /// A locally authored subcategory.
    Local { sub_category_id: String },
}

/// The (category-or-subcategory, difficulty) pair a session loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub source: TargetSource,
    pub level: Option<Level>,
}

impl Target {
    pub fn remote(category: impl Into<String>, level: Option<Level>) -> Self {
        Self {
            source: TargetSource::Remote {
                category: category.into(),
            },
            level,
        }
    }

    pub fn local(sub_category_id: impl Into<String>, level: Option<Level>) -> Self {
        Self {
            source: TargetSource::Local {
                sub_category_id: sub_category_id.into(),
            },
            level,
        }
    }

    /// Parses route-style parameters: `local-<subId>` or a remote category id,
    /// and an optional difficulty.
    pub fn parse(id: &str, level: Option<&str>) -> Result<Self, ValidationError> {
        let id = id.trim();
        let level = level
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.parse::<Level>().map_err(|e| ValidationError::new("level", e)))
            .transpose()?;

        match id.strip_prefix(LOCAL_PREFIX) {
            Some("") => Err(ValidationError::new("target", "Missing subcategory id")),
            Some(sub) => Ok(Self::local(sub, level)),
            None if id.is_empty() => Err(ValidationError::new("target", "Missing category id")),
            None => Ok(Self::remote(id, level)),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self.source, TargetSource::Local { .. })
    }

    /// Identity used by the fetch-once guard.
    pub fn fetch_key(&self) -> String {
        let (kind, id) = match &self.source {
            TargetSource::Remote { category } => ("remote", category.as_str()),
            TargetSource::Local { sub_category_id } => ("custom", sub_category_id.as_str()),
        };
        let level = self.level.map(Level::as_str).unwrap_or("any");
        format!("{}::{}::{}", kind, id, level)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fetch_key())
    }
}

/// Persists a finished attempt. Failures are logged and swallowed so the
/// learner still sees their results.
pub async fn record_attempt<S: DataStore>(store: &S, attempt: &QuizAttempt) -> bool {
    match store.create_attempt(attempt).await {
        Ok(()) => {
            tracing::info!(
                "saved attempt {} ({}/{})",
                attempt.id.as_deref().unwrap_or("-"),
                attempt.score,
                attempt.total_questions
            );
            true
        }
        Err(e) => {
            tracing::warn!("failed to save quiz attempt: {}", e);
            false
        }
    }
}
