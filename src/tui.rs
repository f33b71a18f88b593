//! Event loops for the terminal screens.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tokio::sync::oneshot;

use crate::app::{App, Screen};
use crate::config::Config;
use crate::error::QuizResult;
use crate::models::{QuizAttempt, User};
use crate::quiz::{record_attempt, QuestionProvider, QuizMount, Target};
use crate::store::DataStore;
use crate::terminal::TerminalGuard;
use crate::ui::{self, LeaderboardView};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Submit,
    Quit,
}

/// Runs one quiz from loading to the result screen. Returns the attempt when
/// the learner submitted.
pub async fn run_quiz<P, S>(
    provider: Arc<P>,
    store: Arc<S>,
    target: Target,
    user: Option<User>,
    config: &Config,
) -> QuizResult<Option<QuizAttempt>>
where
    P: QuestionProvider + 'static,
    S: DataStore + 'static,
{
    let mut terminal = TerminalGuard::enter()?;
    let (mut mount, mut events) = QuizMount::new(provider, config.debounce);
    mount.trigger(target.clone());

    let mut app = App::new(target, config.seconds_per_question);
    let mut submitted = None;
    let mut last_tick = Instant::now();
    let mut last_index = None;
    let mut pending_save = None;

    loop {
        while let Ok(event) = events.try_recv() {
            app.apply(event, Utc::now());
        }
        poll_save(&mut app, &mut pending_save);

        let index = (app.screen() == Screen::Quiz).then(|| app.session().index());
        if index != last_index {
            last_index = index;
            last_tick = Instant::now();
        } else if last_tick.elapsed() >= TICK {
            app.tick();
            last_tick += TICK;
        }

        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_input(&mut app, key.code) {
                    Action::Quit => break,
                    Action::Submit => match app.submit(user.as_ref(), Utc::now()) {
                        Ok(attempt) => {
                            pending_save = Some(spawn_save(Arc::clone(&store), attempt.clone()));
                            submitted = Some(attempt);
                        }
                        Err(e) => tracing::warn!("submit ignored: {}", e),
                    },
                    Action::None => {}
                }
            }
        }
    }

    mount.unmount();
    drop(terminal);
    if let Some(rx) = pending_save {
        let _ = rx.await;
    }
    Ok(submitted)
}

/// Persists the attempt off the input loop. The receiver yields whether the
/// store accepted it.
fn spawn_save<S: DataStore + 'static>(store: Arc<S>, attempt: QuizAttempt) -> oneshot::Receiver<bool> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let saved = record_attempt(&*store, &attempt).await;
        let _ = tx.send(saved);
    });
    rx
}

fn poll_save(app: &mut App, pending: &mut Option<oneshot::Receiver<bool>>) {
    let Some(rx) = pending.as_mut() else {
        return;
    };
    match rx.try_recv() {
        Ok(saved) => app.mark_saved(saved),
        Err(oneshot::error::TryRecvError::Empty) => return,
        Err(oneshot::error::TryRecvError::Closed) => app.mark_saved(false),
    }
    *pending = None;
}

fn handle_input(app: &mut App, key: KeyCode) -> Action {
    match app.screen() {
        Screen::Loading | Screen::Failed => match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
            _ => Action::None,
        },
        Screen::Quiz => handle_quiz_input(app, key),
        Screen::ConfirmSubmit => match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Action::Submit,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.cancel_submit();
                Action::None
            }
            _ => Action::None,
        },
        Screen::Result => {
            match key {
                KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
                KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Action::Quit,
                _ => {}
            }
            Action::None
        }
    }
}

fn handle_quiz_input(app: &mut App, key: KeyCode) -> Action {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.choose();
        }
        KeyCode::Char(c @ '1'..='4') => {
            app.choose_index(c as usize - '1' as usize);
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => app.next_question(),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => app.previous_question(),
        KeyCode::Char('f') | KeyCode::Char('F') => app.toggle_flag(),
        KeyCode::Char('s') | KeyCode::Char('S') => app.request_submit(),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Action::Quit,
        _ => {}
    }
    Action::None
}

/// Shows the leaderboard until the user quits.
pub fn run_leaderboard(mut view: LeaderboardView) -> std::io::Result<()> {
    let mut terminal = TerminalGuard::enter()?;
    loop {
        terminal.draw(|frame| ui::render_leaderboard(frame, &view))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Down | KeyCode::Char('j') => {
                    view.scroll = (view.scroll + 1).min(view.rows.len().saturating_sub(1));
                }
                KeyCode::Up | KeyCode::Char('k') => view.scroll = view.scroll.saturating_sub(1),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => break,
                _ => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Level, QuizQuestion};
    use crate::quiz::{LoadEvent, LoadedQuiz};
    use crate::store::MemoryStore;

    fn ready_app() -> App {
        let mut app = App::new(Target::remote("9", Some(Level::Easy)), 45);
        app.apply(
            LoadEvent::Loaded {
                key: "remote::9::easy".to_string(),
                result: Ok(LoadedQuiz {
                    questions: vec![QuizQuestion {
                        question: "Q".to_string(),
                        correct_answer: "a".to_string(),
                        incorrect_answers: vec!["b".to_string()],
                        merged: vec!["b".to_string(), "a".to_string()],
                    }],
                    notice: None,
                    meta: None,
                }),
            },
            Utc::now(),
        );
        app
    }

    #[test]
    fn test_number_keys_answer() {
        let mut app = ready_app();
        assert_eq!(handle_input(&mut app, KeyCode::Char('2')), Action::None);
        assert_eq!(app.session().answer(0), Some("a"));
        assert_eq!(app.cursor(), 1);
    }

    #[test]
    fn test_submit_flow_keys() {
        let mut app = ready_app();
        handle_input(&mut app, KeyCode::Char('s'));
        assert_eq!(app.screen(), Screen::ConfirmSubmit);
        assert_eq!(handle_input(&mut app, KeyCode::Char('n')), Action::None);
        assert_eq!(app.screen(), Screen::Quiz);
        handle_input(&mut app, KeyCode::Char('s'));
        assert_eq!(handle_input(&mut app, KeyCode::Char('y')), Action::Submit);
    }

    #[test]
    fn test_quit_from_any_screen() {
        let mut app = ready_app();
        assert_eq!(handle_input(&mut app, KeyCode::Char('q')), Action::Quit);
        let mut loading = App::new(Target::remote("9", None), 45);
        assert_eq!(handle_input(&mut loading, KeyCode::Esc), Action::Quit);
    }

    #[tokio::test]
    async fn test_save_runs_in_background_and_reports_back() {
        let store = Arc::new(MemoryStore::default());
        let mut app = ready_app();
        handle_input(&mut app, KeyCode::Char('2'));
        handle_input(&mut app, KeyCode::Char('s'));
        assert_eq!(handle_input(&mut app, KeyCode::Char('y')), Action::Submit);
        let attempt = app.submit(None, Utc::now()).unwrap();

        let mut pending = Some(spawn_save(Arc::clone(&store), attempt));
        poll_save(&mut app, &mut pending);
        assert_eq!(app.screen(), Screen::Result);
        assert_eq!(app.saved(), None);

        while pending.is_some() {
            tokio::task::yield_now().await;
            poll_save(&mut app, &mut pending);
        }
        assert_eq!(app.saved(), Some(true));
        assert_eq!(store.attempts().await.unwrap().len(), 1);
    }
}
