use std::cmp::Reverse;
use std::collections::HashSet;

use serde::Serialize;

use crate::models::{Category, Level, QuestionSet, QuizAttempt, Subcategory};
use crate::store::{DataStore, QuestionSetQuery, StoreError};

use super::{mean, recent_activity};

const RECENT_LIMIT: usize = 5;
const COVERAGE_LIMIT: usize = 4;
const TOP_PERFORMERS_LIMIT: usize = 3;

/// Everything the admin dashboard reads, fetched together.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub categories: Vec<Category>,
    pub subcategories: Vec<Subcategory>,
    pub question_sets: Vec<QuestionSet>,
    pub attempts: Vec<QuizAttempt>,
}

/// Loads the four collections concurrently; any failure fails the whole load.
pub async fn load_dashboard<S: DataStore>(store: &S) -> Result<DashboardData, StoreError> {
    let (categories, subcategories, question_sets, attempts) = futures_util::try_join!(
        store.categories(),
        store.subcategories(None),
        store.question_sets(QuestionSetQuery::default()),
        store.attempts(),
    )?;
    Ok(DashboardData {
        categories,
        subcategories,
        question_sets,
        attempts,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRow {
    pub category_id: String,
    pub name: String,
    pub question_count: usize,
    pub attempt_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_categories: usize,
    /// Sum of question counts across all question sets.
    pub total_questions: usize,
    pub quizzes_taken: usize,
    pub active_users: usize,
    /// Mean of per-attempt accuracy.
    pub average_accuracy: f64,
    pub average_duration_seconds: f64,
    /// easy, medium and hard first, then any other level in first-seen order.
    pub level_distribution: Vec<(String, usize)>,
    pub question_coverage: Vec<CoverageRow>,
    pub top_performers: Vec<QuizAttempt>,
    pub recent_activity: Vec<QuizAttempt>,
}

fn question_count<'a>(sets: impl IntoIterator<Item = &'a QuestionSet>) -> usize {
    sets.into_iter().map(|s| s.questions.len()).sum()
}

pub fn dashboard_summary(data: &DashboardData) -> DashboardSummary {
    let attempts = &data.attempts;

    let active_users = attempts.iter().map(QuizAttempt::user_key).collect::<HashSet<_>>().len();
    let accuracy_sum: f64 = attempts.iter().map(QuizAttempt::accuracy).sum();
    let duration_sum: u64 = attempts.iter().map(|a| a.duration_seconds).sum();

    let mut level_distribution: Vec<(String, usize)> =
        Level::ALL.iter().map(|l| (l.as_str().to_string(), 0)).collect();
    for level in attempts.iter().filter_map(|a| a.level.as_deref()).filter(|l| !l.is_empty()) {
        let level = level.to_lowercase();
        match level_distribution.iter_mut().find(|(name, _)| *name == level) {
            Some((_, count)) => *count += 1,
            None => level_distribution.push((level, 1)),
        }
    }

    let mut question_coverage: Vec<CoverageRow> = data
        .categories
        .iter()
        .map(|cat| CoverageRow {
            category_id: cat.id.clone(),
            name: cat.name.clone(),
            question_count: question_count(data.question_sets.iter().filter(|s| s.category_id == cat.id)),
            attempt_count: attempts.iter().filter(|a| a.category_id == cat.id).count(),
        })
        .collect();
    question_coverage.sort_by_key(|row| Reverse(row.question_count));
    question_coverage.truncate(COVERAGE_LIMIT);

    let mut top_performers = attempts.clone();
    top_performers.sort_by(|a, b| b.accuracy().total_cmp(&a.accuracy()));
    top_performers.truncate(TOP_PERFORMERS_LIMIT);

    DashboardSummary {
        total_categories: data.categories.len(),
        total_questions: question_count(&data.question_sets),
        quizzes_taken: attempts.len(),
        active_users,
        average_accuracy: mean(accuracy_sum, attempts.len()),
        average_duration_seconds: mean(duration_sum as f64, attempts.len()),
        level_distribution,
        question_coverage,
        top_performers,
        recent_activity: recent_activity(attempts, RECENT_LIMIT),
    }
}
