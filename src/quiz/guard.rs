use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::QuizResult;

use super::sourcing::{LoadedQuiz, QuestionProvider};
use super::Target;

/// Messages delivered to the owner of a [`QuizMount`].
#[derive(Debug)]
pub enum LoadEvent {
    /// Transient status text, e.g. a rate-limit warning.
    Notice(String),
    Loaded { key: String, result: QuizResult<LoadedQuiz> },
}

struct Pending {
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Owns question loading for one mounted quiz screen.
///
/// A trigger waits out the debounce before loading; a newer trigger cancels
/// a debounce that has not fired yet. Each fetch key loads at most once per
/// mount. Results arriving after unmount, or for a key that is no longer
/// current, are dropped.
pub struct QuizMount<P> {
    provider: Arc<P>,
    debounce: Duration,
    fetched: Arc<Mutex<HashSet<String>>>,
    current: Arc<Mutex<Option<String>>>,
    alive: Arc<AtomicBool>,
    pending: Option<Pending>,
    events: mpsc::UnboundedSender<LoadEvent>,
}

impl<P: QuestionProvider + 'static> QuizMount<P> {
    pub fn new(provider: Arc<P>, debounce: Duration) -> (Self, mpsc::UnboundedReceiver<LoadEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let mount = Self {
            provider,
            debounce,
            fetched: Arc::default(),
            current: Arc::default(),
            alive: Arc::new(AtomicBool::new(true)),
            pending: None,
            events,
        };
        (mount, rx)
    }

    pub fn is_mounted(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    pub fn current_key(&self) -> Option<String> {
        lock(&self.current).clone()
    }

    /// Schedules a load for `target` after the debounce delay.
    pub fn trigger(&mut self, target: Target) {
        if !self.is_mounted() {
            return;
        }
        if let Some(previous) = self.pending.take() {
            previous.cancelled.store(true, Ordering::SeqCst);
        }

        let key = target.fetch_key();
        *lock(&self.current) = Some(key.clone());

        let cancelled = Arc::new(AtomicBool::new(false));
        let task = LoadTask {
            provider: Arc::clone(&self.provider),
            fetched: Arc::clone(&self.fetched),
            current: Arc::clone(&self.current),
            alive: Arc::clone(&self.alive),
            cancelled: Arc::clone(&cancelled),
            events: self.events.clone(),
            debounce: self.debounce,
        };
        let handle = tokio::spawn(task.run(target, key));
        self.pending = Some(Pending { cancelled, handle });
    }

    /// Stops delivering events and aborts any scheduled work.
    pub fn unmount(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        if let Some(pending) = self.pending.take() {
            pending.cancelled.store(true, Ordering::SeqCst);
            pending.handle.abort();
        }
    }
}

impl<P> Drop for QuizMount<P> {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}

struct LoadTask<P> {
    provider: Arc<P>,
    fetched: Arc<Mutex<HashSet<String>>>,
    current: Arc<Mutex<Option<String>>>,
    alive: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<LoadEvent>,
    debounce: Duration,
}

impl<P: QuestionProvider> LoadTask<P> {
    async fn run(self, target: Target, key: String) {
        tokio::time::sleep(self.debounce).await;
        if self.cancelled.load(Ordering::SeqCst) || !self.alive.load(Ordering::SeqCst) {
            tracing::debug!("debounced load for {} cancelled", key);
            return;
        }
        if !lock(&self.fetched).insert(key.clone()) {
            tracing::debug!("skipping duplicate fetch for {}", key);
            return;
        }

        tracing::info!("loading questions for {}", key);
        let notices = {
            let alive = Arc::clone(&self.alive);
            let events = self.events.clone();
            move |msg: String| {
                if alive.load(Ordering::SeqCst) {
                    let _ = events.send(LoadEvent::Notice(msg));
                }
            }
        };
        let result = self.provider.load(&target, &notices).await;

        let still_current = lock(&self.current).as_deref() == Some(key.as_str());
        if !self.alive.load(Ordering::SeqCst) || !still_current {
            tracing::debug!("dropping stale result for {}", key);
            return;
        }
        let _ = self.events.send(LoadEvent::Loaded { key, result });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::models::{Level, QuizQuestion};

    /// Counts loads and takes a fixed time to answer.
    struct Counting {
        calls: AtomicUsize,
        latency: Duration,
    }

    impl Counting {
        fn new(latency: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                latency,
            })
        }
    }

    impl QuestionProvider for Counting {
        async fn load(&self, _target: &Target, notices: &(dyn Fn(String) + Send + Sync)) -> QuizResult<LoadedQuiz> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            notices("working".to_string());
            tokio::time::sleep(self.latency).await;
            Ok(LoadedQuiz {
                questions: vec![QuizQuestion {
                    question: "Q".to_string(),
                    correct_answer: "a".to_string(),
                    incorrect_answers: vec!["b".to_string()],
                    merged: vec!["a".to_string(), "b".to_string()],
                }],
                notice: None,
                meta: None,
            })
        }
    }

    fn target() -> Target {
        Target::remote("9", Some(Level::Easy))
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_triggers_fetch_once() {
        let provider = Counting::new(Duration::from_millis(10));
        let (mut mount, mut rx) = QuizMount::new(Arc::clone(&provider), Duration::from_millis(300));

        mount.trigger(target());
        mount.trigger(target());
        settle().await;
        mount.trigger(target());
        settle().await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        let mut loaded = 0;
        while let Ok(event) = rx.try_recv() {
            if let LoadEvent::Loaded { key, result } = event {
                assert_eq!(key, "remote::9::easy");
                assert!(result.is_ok());
                loaded += 1;
            }
        }
        assert_eq!(loaded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_trigger_cancels_pending_debounce() {
        let provider = Counting::new(Duration::from_millis(10));
        let (mut mount, mut rx) = QuizMount::new(Arc::clone(&provider), Duration::from_millis(300));

        mount.trigger(Target::remote("9", Some(Level::Hard)));
        tokio::time::sleep(Duration::from_millis(100)).await;
        mount.trigger(target());
        settle().await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(mount.current_key().as_deref(), Some("remote::9::easy"));
        let keys: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter_map(|e| match e {
                LoadEvent::Loaded { key, .. } => Some(key),
                LoadEvent::Notice(_) => None,
            })
            .collect();
        assert_eq!(keys, vec!["remote::9::easy".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_drops_in_flight_result() {
        let provider = Counting::new(Duration::from_secs(2));
        let (mut mount, mut rx) = QuizMount::new(Arc::clone(&provider), Duration::from_millis(300));

        mount.trigger(target());
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        mount.unmount();
        settle().await;

        let loaded = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|e| matches!(e, LoadEvent::Loaded { .. }))
            .count();
        assert_eq!(loaded, 0);
        assert!(!mount.is_mounted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_before_debounce_skips_load() {
        let provider = Counting::new(Duration::from_millis(10));
        let (mut mount, _rx) = QuizMount::new(Arc::clone(&provider), Duration::from_millis(300));

        mount.trigger(target());
        mount.unmount();
        settle().await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
