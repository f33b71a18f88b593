#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use trivia_trek::models::{Category, Level, Question, QuestionSet, QuizAttempt, RemoteQuestion, Subcategory};
use trivia_trek::store::{MemoryStore, Snapshot};
use trivia_trek::trivia::{BackupSource, StepOutcome, TriviaSource};

/// Trivia source that replays canned outcomes. Clones share the script.
#[derive(Clone, Default)]
pub struct ScriptedTrivia {
    outcomes: Arc<Mutex<VecDeque<StepOutcome>>>,
    calls: Arc<Mutex<Vec<Option<Level>>>>,
}

impl ScriptedTrivia {
    pub fn new(outcomes: Vec<StepOutcome>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into())),
            calls: Arc::default(),
        }
    }

    /// Difficulty of every request made so far.
    pub fn calls(&self) -> Vec<Option<Level>> {
        self.calls.lock().unwrap().clone()
    }
}

impl TriviaSource for ScriptedTrivia {
    async fn fetch(&self, _category: &str, level: Option<Level>, _amount: u32) -> StepOutcome {
        self.calls.lock().unwrap().push(level);
        self.outcomes.lock().unwrap().pop_front().unwrap_or(StepOutcome::Empty)
    }
}

pub struct FixedBackup(pub Vec<RemoteQuestion>);

impl BackupSource for FixedBackup {
    async fn load(&self) -> Option<Vec<RemoteQuestion>> {
        Some(self.0.clone()).filter(|q| !q.is_empty())
    }
}

pub fn remote(text: &str, correct: &str) -> RemoteQuestion {
    RemoteQuestion {
        question: text.to_string(),
        correct_answer: correct.to_string(),
        incorrect_answers: vec!["wrong 1".to_string(), "wrong 2".to_string(), "wrong 3".to_string()],
    }
}

pub fn authored(text: &str, correct: &str) -> Question {
    Question {
        question: text.to_string(),
        option_a: format!("{} A", text),
        option_b: format!("{} B", text),
        option_c: format!("{} C", text),
        option_d: format!("{} D", text),
        correct: correct.to_string(),
    }
}

/// Category `cat-7` with subcategory `sub-42` holding one easy set of two
/// questions: the first answered by B, the second by D.
pub fn seeded_store() -> MemoryStore {
    MemoryStore::new(Snapshot {
        categories: vec![Category {
            id: "cat-7".to_string(),
            name: "Science".to_string(),
        }],
        subcategories: vec![Subcategory {
            id: "sub-42".to_string(),
            name: "Astronomy".to_string(),
            category_id: "cat-7".to_string(),
            image_url: "https://img.example/astro.png".to_string(),
            color: "#F0F9FF".to_string(),
        }],
        questions: vec![QuestionSet {
            id: Some("set-1".to_string()),
            category_id: "cat-7".to_string(),
            sub_category_id: "sub-42".to_string(),
            level: Level::Easy,
            questions: vec![authored("Q1", "B"), authored("Q2", "D")],
        }],
        users: Vec::new(),
        quiz_attempts: Vec::new(),
    })
}

pub fn attempt(email: &str, level: &str, score: u32, total: u32) -> QuizAttempt {
    QuizAttempt {
        id: None,
        user_name: Some(email.split('@').next().unwrap_or(email).to_string()),
        user_email: Some(email.to_string()),
        category_id: "9".to_string(),
        sub_category_id: None,
        level: Some(level.to_string()),
        score,
        total_questions: total,
        duration_seconds: 60,
        date: Some("2024-03-01T10:00:00.000Z".to_string()),
        missed_questions: Vec::new(),
    }
}
