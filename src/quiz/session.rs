use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::{QuizError, QuizResult};
use crate::models::{decode_entities, MissedQuestion, QuizAttempt, QuizQuestion, Subcategory, User};

use super::sourcing::{LoadedQuiz, MSG_NO_CUSTOM_QUESTIONS, MSG_NO_QUESTIONS};
use super::timer::Countdown;
use super::{Target, TargetSource};

pub const GUEST_NAME: &str = "Guest User";
pub const GUEST_EMAIL: &str = "guest@example.com";
const DEFAULT_ATTEMPT_LEVEL: &str = "medium";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    /// Answering and navigating.
    Ready,
    Finished,
    Failed,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Loading => "still loading",
            Phase::Ready => "in progress",
            Phase::Finished => "already finished",
            Phase::Failed => "failed",
        }
    }
}

/// Result of asking to move past the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved,
    /// Time remains and nothing is selected.
    Blocked,
    /// Already on the last question; the caller should confirm submission.
    ConfirmSubmit,
}

/// One row of the post-submission breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewItem {
    pub index: usize,
    pub question: String,
    pub answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    pub flagged: bool,
}

/// State of a single quiz run, from loading to the submitted attempt.
#[derive(Debug)]
pub struct QuizSession {
    target: Target,
    phase: Phase,
    questions: Vec<QuizQuestion>,
    answers: HashMap<usize, String>,
    flagged: HashMap<usize, bool>,
    index: usize,
    countdown: Countdown,
    started_at: Option<DateTime<Utc>>,
    notice: Option<String>,
    error: Option<String>,
    meta: Option<Subcategory>,
    attempt: Option<QuizAttempt>,
}

impl QuizSession {
    pub fn new(target: Target, seconds_per_question: u32) -> Self {
        Self {
            target,
            phase: Phase::Loading,
            questions: Vec::new(),
            answers: HashMap::new(),
            flagged: HashMap::new(),
            index: 0,
            countdown: Countdown::new(seconds_per_question),
            started_at: None,
            notice: None,
            error: None,
            meta: None,
            attempt: None,
        }
    }

    /// Moves `Loading` to `Ready`. An empty question set fails the session.
    pub fn ready(&mut self, loaded: LoadedQuiz, now: DateTime<Utc>) -> QuizResult<()> {
        if self.phase != Phase::Loading {
            return Err(QuizError::InvalidState(self.phase.name()));
        }
        if loaded.questions.is_empty() {
            let msg = if self.target.is_local() {
                MSG_NO_CUSTOM_QUESTIONS
            } else {
                MSG_NO_QUESTIONS
            };
            let err = QuizError::NoQuestions(msg.to_string());
            self.fail(&err);
            return Err(err);
        }

        self.questions = loaded.questions;
        self.notice = loaded.notice.or(self.notice.take());
        self.meta = loaded.meta;
        self.index = 0;
        self.countdown.reset();
        self.started_at = Some(now);
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Records a fatal load error. Only valid while loading.
    pub fn fail(&mut self, err: &QuizError) {
        if self.phase == Phase::Loading {
            self.error = Some(err.to_string());
            self.phase = Phase::Failed;
        }
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn current(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn meta(&self) -> Option<&Subcategory> {
        self.meta.as_ref()
    }

    pub fn attempt(&self) -> Option<&QuizAttempt> {
        self.attempt.as_ref()
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    pub fn is_flagged(&self, index: usize) -> bool {
        self.flagged.get(&index).copied().unwrap_or(false)
    }

    /// One-second tick of the current question's countdown.
    pub fn tick(&mut self) -> bool {
        self.phase == Phase::Ready && self.countdown.tick()
    }

    /// Stores `option` as the answer to the current question. A no-op once
    /// time is up, outside `Ready`, or for text that is not one of the options.
    pub fn select_option(&mut self, option: &str) -> bool {
        if self.phase != Phase::Ready || self.countdown.expired() {
            return false;
        }
        let Some(question) = self.questions.get(self.index) else {
            return false;
        };
        if !question.merged.iter().any(|o| o == option) {
            return false;
        }
        self.answers.insert(self.index, option.to_string());
        true
    }

    pub fn toggle_flag(&mut self) {
        if self.phase != Phase::Ready {
            return;
        }
        let flag = self.flagged.entry(self.index).or_insert(false);
        *flag = !*flag;
    }

    /// Jumps to `index`, restarting the countdown when the question changes.
    pub fn go_to(&mut self, index: usize) -> bool {
        if self.phase != Phase::Ready || index >= self.questions.len() {
            return false;
        }
        if index != self.index {
            self.index = index;
            self.countdown.reset();
        }
        true
    }

    pub fn prev(&mut self) -> bool {
        match self.index.checked_sub(1) {
            Some(i) => self.go_to(i),
            None => false,
        }
    }

    /// "Next" needs an answer until the countdown runs out.
    pub fn can_advance(&self) -> bool {
        self.phase == Phase::Ready && (self.countdown.expired() || self.answers.contains_key(&self.index))
    }

    pub fn next(&mut self) -> Advance {
        if !self.can_advance() {
            return Advance::Blocked;
        }
        if self.is_last() {
            return Advance::ConfirmSubmit;
        }
        self.go_to(self.index + 1);
        Advance::Moved
    }

    /// Count of stored answers equal to the correct answer text.
    pub fn score(&self) -> u32 {
        let correct = self
            .answers
            .iter()
            .filter(|(i, answer)| self.questions.get(**i).is_some_and(|q| q.is_correct(answer)))
            .count();
        u32::try_from(correct).unwrap_or(u32::MAX)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn unanswered_count(&self) -> usize {
        self.questions.len().saturating_sub(self.answers.len())
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged.values().filter(|f| **f).count()
    }

    /// Position of the current question in the quiz, 0..=100, rounded.
    pub fn progress_percent(&self) -> u16 {
        let total = self.questions.len();
        if total == 0 {
            return 0;
        }
        (((self.index + 1) * 100 + total / 2) / total) as u16
    }

    /// Locks the session and builds the attempt record. `user` of `None`
    /// records a guest.
    pub fn finish(&mut self, user: Option<&User>, now: DateTime<Utc>) -> QuizResult<QuizAttempt> {
        if self.phase != Phase::Ready {
            return Err(QuizError::InvalidState(self.phase.name()));
        }
        self.phase = Phase::Finished;

        let missed_questions = self
            .questions
            .iter()
            .enumerate()
            .filter(|(i, q)| !self.answers.get(i).is_some_and(|a| q.is_correct(a)))
            .map(|(i, q)| MissedQuestion {
                question_id: Some(format!("q-{}", i)),
                question: q.text(),
            })
            .collect();

        let elapsed_ms = self
            .started_at
            .map(|start| (now - start).num_milliseconds().max(0))
            .unwrap_or(0);
        let duration_seconds = ((elapsed_ms + 500) / 1000) as u64;

        let (category_id, sub_category_id) = match &self.target.source {
            TargetSource::Remote { category } => (category.clone(), None),
            TargetSource::Local { sub_category_id } => {
                let parent = self
                    .meta
                    .as_ref()
                    .map(|m| m.category_id.clone())
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| sub_category_id.clone());
                (parent, Some(sub_category_id.clone()))
            }
        };

        let attempt = QuizAttempt {
            id: Some(Uuid::new_v4().to_string()),
            user_name: Some(user.map_or(GUEST_NAME, |u| u.name.as_str()).to_string()),
            user_email: Some(user.map_or(GUEST_EMAIL, |u| u.email.as_str()).to_string()),
            category_id,
            sub_category_id,
            level: Some(
                self.target
                    .level
                    .map_or(DEFAULT_ATTEMPT_LEVEL, |l| l.as_str())
                    .to_string(),
            ),
            score: self.score(),
            total_questions: u32::try_from(self.questions.len()).unwrap_or(u32::MAX),
            duration_seconds,
            date: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            missed_questions,
        };

        tracing::info!(
            "quiz {} finished: {}/{} in {}s",
            self.target,
            attempt.score,
            attempt.total_questions,
            attempt.duration_seconds
        );
        self.attempt = Some(attempt.clone());
        Ok(attempt)
    }

    /// Per-question breakdown with decoded text.
    pub fn review(&self) -> Vec<ReviewItem> {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let answer = self.answers.get(&i);
                ReviewItem {
                    index: i,
                    question: q.text(),
                    answer: answer.map(|a| decode_entities(a)),
                    correct_answer: decode_entities(&q.correct_answer),
                    is_correct: answer.is_some_and(|a| q.is_correct(a)),
                    flagged: self.is_flagged(i),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::models::Level;

    fn question(text: &str, correct: &str) -> QuizQuestion {
        let incorrect: Vec<String> = ["w1", "w2", "w3"].iter().map(|s| s.to_string()).collect();
        let mut merged = incorrect.clone();
        merged.insert(1, correct.to_string());
        QuizQuestion {
            question: text.to_string(),
            correct_answer: correct.to_string(),
            incorrect_answers: incorrect,
            merged,
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn ready_session(questions: Vec<QuizQuestion>) -> QuizSession {
        let mut session = QuizSession::new(Target::remote("9", Some(Level::Easy)), 45);
        session
            .ready(
                LoadedQuiz {
                    questions,
                    notice: None,
                    meta: None,
                },
                start(),
            )
            .unwrap();
        session
    }

    #[test]
    fn test_empty_set_fails_session() {
        let mut session = QuizSession::new(Target::local("s1", None), 45);
        let err = session
            .ready(
                LoadedQuiz {
                    questions: Vec::new(),
                    notice: None,
                    meta: None,
                },
                start(),
            )
            .unwrap_err();
        assert!(matches!(err, QuizError::NoQuestions(_)));
        assert_eq!(session.phase(), Phase::Failed);
        assert_eq!(session.error(), Some(MSG_NO_CUSTOM_QUESTIONS));
    }

    #[test]
    fn test_last_selection_wins() {
        let mut session = ready_session(vec![question("Q1", "right")]);
        assert!(session.select_option("w1"));
        assert!(session.select_option("right"));
        assert_eq!(session.answer(0), Some("right"));
        assert!(!session.select_option("not an option"));
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_expired_timer_locks_selection_but_allows_next() {
        let mut session = ready_session(vec![question("Q1", "right"), question("Q2", "right")]);
        assert_eq!(session.next(), Advance::Blocked);

        while session.tick() {}
        assert!(session.countdown().expired());
        assert!(!session.select_option("right"));
        assert_eq!(session.answer(0), None);
        assert!(session.can_advance());
        assert_eq!(session.next(), Advance::Moved);
        assert_eq!(session.countdown().remaining(), 45);
    }

    #[test]
    fn test_navigation_resets_countdown() {
        let mut session = ready_session(vec![question("Q1", "a"), question("Q2", "b")]);
        session.tick();
        session.tick();
        assert!(session.go_to(1));
        assert_eq!(session.countdown().remaining(), 45);
        session.tick();
        assert!(session.prev());
        assert_eq!(session.index(), 0);
        assert_eq!(session.countdown().remaining(), 45);
        assert!(!session.prev());
        assert!(!session.go_to(5));
    }

    #[test]
    fn test_next_on_last_asks_for_confirmation() {
        let mut session = ready_session(vec![question("Q1", "a")]);
        session.select_option("a");
        assert_eq!(session.next(), Advance::ConfirmSubmit);
        assert_eq!(session.index(), 0);
    }

    #[test]
    fn test_flags_toggle_independently() {
        let mut session = ready_session(vec![question("Q1", "a"), question("Q2", "b")]);
        session.toggle_flag();
        session.go_to(1);
        session.toggle_flag();
        session.toggle_flag();
        assert!(session.is_flagged(0));
        assert!(!session.is_flagged(1));
        assert_eq!(session.flagged_count(), 1);
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn test_finish_builds_guest_attempt() {
        let mut session = ready_session(vec![
            question("What&#039;s 2+2?", "4"),
            question("Q2", "b"),
            question("Q3", "c"),
        ]);
        session.select_option("4");
        session.go_to(1);
        session.select_option("w1");

        let now = start() + Duration::milliseconds(61_600);
        let attempt = session.finish(None, now).unwrap();

        assert_eq!(attempt.score, 1);
        assert_eq!(attempt.total_questions, 3);
        assert_eq!(attempt.duration_seconds, 62);
        assert_eq!(attempt.user_name.as_deref(), Some(GUEST_NAME));
        assert_eq!(attempt.user_email.as_deref(), Some(GUEST_EMAIL));
        assert_eq!(attempt.category_id, "9");
        assert_eq!(attempt.sub_category_id, None);
        assert_eq!(attempt.level.as_deref(), Some("easy"));
        assert_eq!(attempt.date.as_deref(), Some("2024-05-01T12:01:01.600Z"));
        let missed: Vec<_> = attempt.missed_questions.iter().map(|m| m.key()).collect();
        assert_eq!(missed, vec!["q-1", "q-2"]);

        assert_eq!(session.phase(), Phase::Finished);
        assert!(!session.select_option("b"));
        assert!(session.finish(None, now).is_err());
    }

    #[test]
    fn test_review_decodes_text() {
        let mut session = ready_session(vec![question("Tom &amp; Jerry?", "yes")]);
        session.select_option("yes");
        session.toggle_flag();
        let review = session.review();
        assert_eq!(review[0].question, "Tom & Jerry?");
        assert!(review[0].is_correct);
        assert!(review[0].flagged);
        assert_eq!(session.progress_percent(), 100);
    }

    #[test]
    fn test_progress_follows_position_not_answers() {
        let mut session = ready_session(vec![question("A?", "a"), question("B?", "b"), question("C?", "c")]);
        assert_eq!(session.progress_percent(), 33);
        session.select_option("a");
        assert_eq!(session.progress_percent(), 33);
        session.go_to(1);
        assert_eq!(session.progress_percent(), 67);
        session.go_to(2);
        assert_eq!(session.progress_percent(), 100);
    }

    #[test]
    fn test_local_attempt_uses_parent_category() {
        let mut session = QuizSession::new(Target::local("sub-1", None), 45);
        session
            .ready(
                LoadedQuiz {
                    questions: vec![question("Q", "a")],
                    notice: None,
                    meta: Some(Subcategory {
                        id: "sub-1".to_string(),
                        name: "Rust".to_string(),
                        category_id: "cat-7".to_string(),
                        image_url: String::new(),
                        color: String::new(),
                    }),
                },
                start(),
            )
            .unwrap();
        let attempt = session.finish(None, start()).unwrap();
        assert_eq!(attempt.category_id, "cat-7");
        assert_eq!(attempt.sub_category_id.as_deref(), Some("sub-1"));
        assert_eq!(attempt.level.as_deref(), Some("medium"));
        assert_eq!(attempt.duration_seconds, 0);
    }
}
