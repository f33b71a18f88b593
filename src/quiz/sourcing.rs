//! The question-sourcing pipeline.
//!
//! Local targets read authored question sets from the data store. Remote
//! targets walk an ordered fallback chain, first success wins:
//!
//! 1. primary request (category + level), retried once after a fixed
//!    backoff when rate limited;
//! 2. after an empty primary with a level set, the same category at any level;
//! 3. the static backup file;
//! 4. otherwise an error.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;

use crate::config::{DEFAULT_QUESTION_AMOUNT, DEFAULT_RATE_LIMIT_BACKOFF};
use crate::error::{QuizError, QuizResult};
use crate::models::{Level, QuizQuestion, RemoteQuestion, Subcategory};
use crate::store::{DataStore, QuestionSetQuery};
use crate::trivia::{BackupSource, StepOutcome, TriviaSource};

use super::shuffle::present;
use super::{Target, TargetSource};

pub const NOTICE_RATE_LIMITED: &str = "Server rate limit reached. Retrying shortly...";
pub const NOTICE_BACKUP_NO_DATA: &str = "Using local backup questions (API had no data).";
pub const NOTICE_BACKUP_API_FAILED: &str = "Loaded local backup questions (API failed).";
pub const MSG_NO_QUESTIONS: &str = "No questions found for this category/difficulty";
pub const MSG_NO_CUSTOM_QUESTIONS: &str = "No custom questions available for this level";
pub const MSG_LOAD_FAILED: &str = "Failed to load quiz. Please try again later.";
pub const MSG_CUSTOM_FETCH_FAILED: &str = "Failed to load custom questions.";

/// A question set ready to start a session.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedQuiz {
    pub questions: Vec<QuizQuestion>,
    /// Non-fatal message to show alongside the quiz.
    pub notice: Option<String>,
    /// Subcategory record for local targets, when it could be fetched.
    pub meta: Option<Subcategory>,
}

/// Anything that can turn a target into a question set.
pub trait QuestionProvider: Send + Sync {
    fn load(
        &self,
        target: &Target,
        notices: &(dyn Fn(String) + Send + Sync),
    ) -> impl Future<Output = QuizResult<LoadedQuiz>> + Send;
}

#[derive(Debug, Clone, Copy)]
pub struct SourcingPolicy {
    /// Questions requested from the trivia source.
    pub amount: u32,
    /// Wait before the single retry after a 429.
    pub rate_limit_backoff: Duration,
}

impl Default for SourcingPolicy {
    fn default() -> Self {
        Self {
            amount: DEFAULT_QUESTION_AMOUNT,
            rate_limit_backoff: DEFAULT_RATE_LIMIT_BACKOFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Primary,
    AnyDifficulty,
    Backup,
}

impl Strategy {
    fn name(self) -> &'static str {
        match self {
            Strategy::Primary => "primary",
            Strategy::AnyDifficulty => "any-difficulty",
            Strategy::Backup => "backup",
        }
    }
}

/// Loads questions from the store, the trivia source, and the backup file.
pub struct QuestionLoader<S, T, B, R> {
    store: Arc<S>,
    trivia: T,
    backup: B,
    rng: Mutex<R>,
    policy: SourcingPolicy,
}

impl<S, T, B, R> QuestionLoader<S, T, B, R>
where
    S: DataStore,
    T: TriviaSource,
    B: BackupSource,
    R: Rng + Send,
{
    pub fn new(store: Arc<S>, trivia: T, backup: B, rng: R, policy: SourcingPolicy) -> Self {
        Self {
            store,
            trivia,
            backup,
            rng: Mutex::new(rng),
            policy,
        }
    }

    fn present_all(&self, questions: Vec<RemoteQuestion>) -> Vec<QuizQuestion> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        questions.into_iter().map(|q| present(q, &mut *rng)).collect()
    }

    async fn load_local(&self, sub_category_id: &str, level: Option<Level>) -> QuizResult<LoadedQuiz> {
        let query = QuestionSetQuery {
            sub_category_id: Some(sub_category_id),
            level,
        };
        let (sets, meta) = futures_util::join!(
            self.store.question_sets(query),
            self.store.subcategory(sub_category_id)
        );

        let sets = sets.map_err(|e| {
            tracing::error!("custom questions fetch error: {}", e);
            QuizError::FetchFailed(MSG_CUSTOM_FETCH_FAILED.to_string())
        })?;

        let flattened: Vec<RemoteQuestion> = sets
            .iter()
            .flat_map(|set| set.questions.iter())
            .map(RemoteQuestion::from)
            .collect();

        if flattened.is_empty() {
            return Err(QuizError::NoQuestions(MSG_NO_CUSTOM_QUESTIONS.to_string()));
        }

        let meta = match meta {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!("failed to fetch subcategory meta: {}", e);
                None
            }
        };

        tracing::info!("loaded {} custom questions for {}", flattened.len(), sub_category_id);
        Ok(LoadedQuiz {
            questions: self.present_all(flattened),
            notice: None,
            meta,
        })
    }

    async fn attempt(&self, strategy: Strategy, category: &str, level: Option<Level>) -> StepOutcome {
        let outcome = match strategy {
            Strategy::Primary => self.trivia.fetch(category, level, self.policy.amount).await,
            Strategy::AnyDifficulty => self.trivia.fetch(category, None, self.policy.amount).await,
            Strategy::Backup => match self.backup.load().await {
                Some(questions) => StepOutcome::from_results(questions),
                None => StepOutcome::Empty,
            },
        };

        match &outcome {
            StepOutcome::TransportError(e) => {
                tracing::warn!("{} strategy for category {} failed: {}", strategy.name(), category, e)
            }
            other => tracing::debug!("{} strategy for category {}: {}", strategy.name(), category, other.label()),
        }
        outcome
    }

    async fn load_remote(
        &self,
        category: &str,
        level: Option<Level>,
        notices: &(dyn Fn(String) + Send + Sync),
    ) -> QuizResult<LoadedQuiz> {
        let mut primary = self.attempt(Strategy::Primary, category, level).await;

        if primary == StepOutcome::RateLimited {
            tracing::warn!("rate limited, retrying in {:?}", self.policy.rate_limit_backoff);
            notices(NOTICE_RATE_LIMITED.to_string());
            tokio::time::sleep(self.policy.rate_limit_backoff).await;
            primary = self.attempt(Strategy::Primary, category, level).await;
        }

        let primary_was_empty = primary == StepOutcome::Empty;
        let fallbacks: Vec<Strategy> = match primary {
            StepOutcome::Success(questions) => {
                return Ok(LoadedQuiz {
                    questions: self.present_all(questions),
                    notice: None,
                    meta: None,
                });
            }
            StepOutcome::Empty if level.is_some() => vec![Strategy::AnyDifficulty, Strategy::Backup],
            _ => vec![Strategy::Backup],
        };

        for strategy in fallbacks {
            if let StepOutcome::Success(questions) = self.attempt(strategy, category, level).await {
                let notice = match (strategy, primary_was_empty) {
                    (Strategy::Backup, true) => Some(NOTICE_BACKUP_NO_DATA.to_string()),
                    (Strategy::Backup, false) => Some(NOTICE_BACKUP_API_FAILED.to_string()),
                    _ => None,
                };
                return Ok(LoadedQuiz {
                    questions: self.present_all(questions),
                    notice,
                    meta: None,
                });
            }
        }

        if primary_was_empty {
            Err(QuizError::NoQuestions(MSG_NO_QUESTIONS.to_string()))
        } else {
            Err(QuizError::FetchFailed(MSG_LOAD_FAILED.to_string()))
        }
    }
}

impl<S, T, B, R> QuestionProvider for QuestionLoader<S, T, B, R>
where
    S: DataStore,
    T: TriviaSource,
    B: BackupSource,
    R: Rng + Send,
{
    async fn load(&self, target: &Target, notices: &(dyn Fn(String) + Send + Sync)) -> QuizResult<LoadedQuiz> {
        match &target.source {
            TargetSource::Local { sub_category_id } => self.load_local(sub_category_id, target.level).await,
            TargetSource::Remote { category } => self.load_remote(category, target.level, notices).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::models::{Question, QuestionSet};
    use crate::store::MemoryStore;
    use crate::trivia::NoBackup;

    /// Replays canned outcomes and records every request.
    struct Scripted {
        outcomes: Mutex<VecDeque<StepOutcome>>,
        calls: Mutex<Vec<Option<Level>>>,
    }

    impl Scripted {
        fn new(outcomes: Vec<StepOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Option<Level>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl TriviaSource for &Scripted {
        async fn fetch(&self, _category: &str, level: Option<Level>, _amount: u32) -> StepOutcome {
            self.calls.lock().unwrap().push(level);
            self.outcomes.lock().unwrap().pop_front().unwrap_or(StepOutcome::Empty)
        }
    }

    struct FixedBackup(Vec<RemoteQuestion>);

    impl BackupSource for FixedBackup {
        async fn load(&self) -> Option<Vec<RemoteQuestion>> {
            Some(self.0.clone()).filter(|q| !q.is_empty())
        }
    }

    fn remote(text: &str) -> RemoteQuestion {
        RemoteQuestion {
            question: text.to_string(),
            correct_answer: "yes".to_string(),
            incorrect_answers: vec!["no".to_string(), "maybe".to_string(), "never".to_string()],
        }
    }

    fn loader<'a, B: BackupSource>(
        trivia: &'a Scripted,
        backup: B,
    ) -> QuestionLoader<MemoryStore, &'a Scripted, B, StdRng> {
        QuestionLoader::new(
            Arc::new(MemoryStore::default()),
            trivia,
            backup,
            StdRng::seed_from_u64(1),
            SourcingPolicy {
                amount: 10,
                rate_limit_backoff: Duration::from_millis(2000),
            },
        )
    }

    fn quiet(_: String) {}

    #[tokio::test]
    async fn test_primary_success() {
        let trivia = Scripted::new(vec![StepOutcome::Success(vec![remote("q1"), remote("q2")])]);
        let loaded = loader(&trivia, NoBackup)
            .load(&Target::remote("9", Some(Level::Easy)), &quiet)
            .await
            .unwrap();
        assert_eq!(loaded.questions.len(), 2);
        assert_eq!(loaded.notice, None);
        assert_eq!(trivia.calls(), vec![Some(Level::Easy)]);
    }

    #[tokio::test]
    async fn test_empty_retries_without_difficulty_before_backup() {
        let trivia = Scripted::new(vec![StepOutcome::Empty, StepOutcome::Success(vec![remote("q1")])]);
        let loaded = loader(&trivia, FixedBackup(vec![remote("backup")]))
            .load(&Target::remote("9", Some(Level::Hard)), &quiet)
            .await
            .unwrap();
        assert_eq!(loaded.questions[0].question, "q1");
        assert_eq!(trivia.calls(), vec![Some(Level::Hard), None]);
    }

    #[tokio::test]
    async fn test_empty_everywhere_uses_backup_with_notice() {
        let trivia = Scripted::new(vec![StepOutcome::Empty, StepOutcome::Empty]);
        let loaded = loader(&trivia, FixedBackup(vec![remote("backup")]))
            .load(&Target::remote("9", Some(Level::Hard)), &quiet)
            .await
            .unwrap();
        assert_eq!(loaded.questions[0].question, "backup");
        assert_eq!(loaded.notice.as_deref(), Some(NOTICE_BACKUP_NO_DATA));
        assert_eq!(trivia.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_without_level_skips_any_difficulty_retry() {
        let trivia = Scripted::new(vec![StepOutcome::Empty]);
        let err = loader(&trivia, NoBackup)
            .load(&Target::remote("9", None), &quiet)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::NoQuestions(m) if m == MSG_NO_QUESTIONS));
        assert_eq!(trivia.calls(), vec![None]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_retries_once_after_backoff() {
        let trivia = Scripted::new(vec![
            StepOutcome::RateLimited,
            StepOutcome::Success(vec![remote("after-retry")]),
        ]);
        let notices = Mutex::new(Vec::new());
        let record = |msg: String| notices.lock().unwrap().push(msg);

        let started = tokio::time::Instant::now();
        let loaded = loader(&trivia, NoBackup)
            .load(&Target::remote("9", Some(Level::Easy)), &record)
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(2000));
        assert_eq!(loaded.questions[0].question, "after-retry");
        assert_eq!(trivia.calls(), vec![Some(Level::Easy), Some(Level::Easy)]);
        assert_eq!(notices.lock().unwrap().as_slice(), [NOTICE_RATE_LIMITED.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_rate_limit_falls_to_backup() {
        let trivia = Scripted::new(vec![StepOutcome::RateLimited, StepOutcome::RateLimited]);
        let loaded = loader(&trivia, FixedBackup(vec![remote("backup")]))
            .load(&Target::remote("9", Some(Level::Easy)), &quiet)
            .await
            .unwrap();
        assert_eq!(loaded.notice.as_deref(), Some(NOTICE_BACKUP_API_FAILED));
        assert_eq!(trivia.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_goes_straight_to_backup() {
        let trivia = Scripted::new(vec![StepOutcome::TransportError("timeout".to_string())]);
        let err = loader(&trivia, NoBackup)
            .load(&Target::remote("9", Some(Level::Easy)), &quiet)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::FetchFailed(m) if m == MSG_LOAD_FAILED));
        assert_eq!(trivia.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_local_target_flattens_sets() {
        let store = Arc::new(MemoryStore::default());
        let question = |text: &str, correct: &str| Question {
            question: text.to_string(),
            option_a: "a".to_string(),
            option_b: "b".to_string(),
            option_c: "c".to_string(),
            option_d: "d".to_string(),
            correct: correct.to_string(),
        };
        for texts in [vec!["one", "two"], vec!["three"]] {
            store
                .create_question_set(&QuestionSet {
                    id: None,
                    category_id: "c1".to_string(),
                    sub_category_id: "s1".to_string(),
                    level: Level::Easy,
                    questions: texts.iter().map(|t| question(t, "C")).collect(),
                })
                .await
                .unwrap();
        }

        let trivia = Scripted::new(Vec::new());
        let loader = QuestionLoader::new(
            store,
            &trivia,
            NoBackup,
            StdRng::seed_from_u64(5),
            SourcingPolicy::default(),
        );
        let loaded = loader.load(&Target::local("s1", Some(Level::Easy)), &quiet).await.unwrap();
        let texts: Vec<_> = loaded.questions.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert!(loaded.questions.iter().all(|q| q.correct_answer == "c"));

        let err = loader.load(&Target::local("s1", Some(Level::Hard)), &quiet).await.unwrap_err();
        assert!(matches!(err, QuizError::NoQuestions(m) if m == MSG_NO_CUSTOM_QUESTIONS));
        assert!(trivia.calls().is_empty());
    }
}
