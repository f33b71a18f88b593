use chrono::{DateTime, Utc};

use crate::error::QuizResult;
use crate::models::{QuizAttempt, User};
use crate::quiz::{Advance, LoadEvent, Phase, QuizSession, Target};

/// Which screen the terminal shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Quiz,
    ConfirmSubmit,
    Result,
    Failed,
}

/// Terminal state around a [`QuizSession`]: option cursor, dialogs, scroll.
pub struct App {
    session: QuizSession,
    cursor: usize,
    confirm_submit: bool,
    result_scroll: usize,
    banner: Option<String>,
    saved: Option<bool>,
}

impl App {
    pub fn new(target: Target, seconds_per_question: u32) -> Self {
        Self {
            session: QuizSession::new(target, seconds_per_question),
            cursor: 0,
            confirm_submit: false,
            result_scroll: 0,
            banner: None,
            saved: None,
        }
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn screen(&self) -> Screen {
        match self.session.phase() {
            Phase::Loading => Screen::Loading,
            Phase::Ready if self.confirm_submit => Screen::ConfirmSubmit,
            Phase::Ready => Screen::Quiz,
            Phase::Finished => Screen::Result,
            Phase::Failed => Screen::Failed,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref().or(self.session.notice())
    }

    /// `Some(false)` when the finished attempt could not be saved.
    pub fn saved(&self) -> Option<bool> {
        self.saved
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    /// Applies a message from the question loader.
    pub fn apply(&mut self, event: LoadEvent, now: DateTime<Utc>) {
        match event {
            LoadEvent::Notice(msg) => self.banner = Some(msg),
            LoadEvent::Loaded { result: Ok(loaded), .. } => {
                self.banner = None;
                if let Err(e) = self.session.ready(loaded, now) {
                    tracing::warn!("quiz could not start: {}", e);
                }
                self.sync_cursor();
            }
            LoadEvent::Loaded { result: Err(e), key } => {
                tracing::error!("loading {} failed: {}", key, e);
                self.banner = None;
                self.session.fail(&e);
            }
        }
    }

    pub fn tick(&mut self) {
        self.session.tick();
    }

    fn option_count(&self) -> usize {
        self.session.current().map_or(0, |q| q.merged.len())
    }

    pub fn select_next_option(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.cursor = (self.cursor + 1) % count;
        }
    }

    pub fn select_previous_option(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.cursor = (self.cursor + count - 1) % count;
        }
    }

    /// Stores the option under the cursor as the answer.
    pub fn choose(&mut self) -> bool {
        let Some(option) = self.session.current().and_then(|q| q.merged.get(self.cursor)).cloned() else {
            return false;
        };
        self.session.select_option(&option)
    }

    /// Selects by option number (0-based) and moves the cursor there.
    pub fn choose_index(&mut self, index: usize) -> bool {
        if index >= self.option_count() {
            return false;
        }
        self.cursor = index;
        self.choose()
    }

    pub fn toggle_flag(&mut self) {
        self.session.toggle_flag();
    }

    pub fn next_question(&mut self) {
        match self.session.next() {
            Advance::Moved => self.sync_cursor(),
            Advance::ConfirmSubmit => self.confirm_submit = true,
            Advance::Blocked => {}
        }
    }

    pub fn previous_question(&mut self) {
        if self.session.prev() {
            self.sync_cursor();
        }
    }

    pub fn request_submit(&mut self) {
        if self.session.phase() == Phase::Ready {
            self.confirm_submit = true;
        }
    }

    pub fn cancel_submit(&mut self) {
        self.confirm_submit = false;
    }

    /// Ends the session. The caller persists the returned attempt.
    pub fn submit(&mut self, user: Option<&User>, now: DateTime<Utc>) -> QuizResult<QuizAttempt> {
        self.confirm_submit = false;
        self.session.finish(user, now)
    }

    pub fn mark_saved(&mut self, saved: bool) {
        self.saved = Some(saved);
    }

    pub fn scroll_results_down(&mut self) {
        let max = self.session.total().saturating_sub(1);
        self.result_scroll = (self.result_scroll + 1).min(max);
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    /// Puts the cursor on the stored answer of the current question, if any.
    fn sync_cursor(&mut self) {
        let index = self.session.index();
        self.cursor = self
            .session
            .current()
            .zip(self.session.answer(index))
            .and_then(|(q, answer)| q.merged.iter().position(|o| o == answer))
            .unwrap_or(0);
    }
}
