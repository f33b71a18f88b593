//! Pure rollups over quiz attempts for dashboards, leaderboards and profiles.
//!
//! Every function is a pure function of its inputs: groups keep the order in
//! which their keys were first seen, empty input gives empty output, and
//! per-attempt accuracy is zero for attempts with no questions.

mod dashboard;
mod leaderboard;
mod profile;
mod reports;

use std::collections::HashMap;

use crate::models::{Category, QuizAttempt, Subcategory};

pub use dashboard::{dashboard_summary, load_dashboard, CoverageRow, DashboardData, DashboardSummary};
pub use leaderboard::{leaderboard_ranking, LeaderboardRow};
pub use profile::{profile_attempts, profile_stats, ProfileStats};
pub use reports::{
    difficulty_analytics, most_missed_questions, quiz_wise_report, recent_activity, user_wise_report, DifficultyRow,
    MissedQuestionRow, QuizReportRow, UserReportRow, MOST_MISSED_LIMIT,
};

/// Literal accepted by level and category filters to mean "no filter".
pub const ALL: &str = "all";

/// Keeps attempts whose level equals `level` exactly; `"all"` keeps everything.
pub fn filter_by_level(attempts: &[QuizAttempt], level: &str) -> Vec<QuizAttempt> {
    AttemptFilter {
        level: Some(level.to_string()),
        category: None,
    }
    .apply(attempts)
}

/// Level and category selection for the leaderboard and reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptFilter {
    pub level: Option<String>,
    pub category: Option<String>,
}

impl AttemptFilter {
    pub fn matches(&self, attempt: &QuizAttempt) -> bool {
        let level_ok = match self.level.as_deref() {
            None | Some(ALL) => true,
            Some(level) => attempt.level.as_deref() == Some(level),
        };
        let category_ok = match self.category.as_deref() {
            None | Some(ALL) => true,
            Some(category) => attempt.category_id == category,
        };
        level_ok && category_ok
    }

    pub fn apply(&self, attempts: &[QuizAttempt]) -> Vec<QuizAttempt> {
        attempts.iter().filter(|a| self.matches(a)).cloned().collect()
    }
}

/// Id to display-name tables for categories and subcategories.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    categories: HashMap<String, String>,
    subcategories: HashMap<String, String>,
}

impl Lookups {
    pub fn new(categories: &[Category], subcategories: &[Subcategory]) -> Self {
        Self {
            categories: categories.iter().map(|c| (c.id.clone(), c.name.clone())).collect(),
            subcategories: subcategories.iter().map(|s| (s.id.clone(), s.name.clone())).collect(),
        }
    }

    /// Category name, or the raw id when unknown.
    pub fn category<'a>(&'a self, id: &'a str) -> &'a str {
        self.categories.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Subcategory name, or the raw id when unknown.
    pub fn subcategory<'a>(&'a self, id: &'a str) -> &'a str {
        self.subcategories.get(id).map(String::as_str).unwrap_or(id)
    }
}

/// Groups items by key, preserving first-seen key order.
pub(crate) fn group_by<'a, T, K, F>(items: &'a [T], mut key: F) -> Vec<(K, Vec<&'a T>)>
where
    K: Eq + std::hash::Hash + Clone,
    F: FnMut(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&T>)> = Vec::new();
    for item in items {
        let k = key(item);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }
    groups
}

pub(crate) fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// 100 × score / questions, zero when there were no questions.
pub(crate) fn ratio_percent(score: u64, questions: u64) -> f64 {
    if questions == 0 {
        0.0
    } else {
        score as f64 / questions as f64 * 100.0
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{MissedQuestion, QuizAttempt};

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
            date: None,
            missed_questions: Vec::new(),
        }
    }

    pub fn missed(ids: &[&str]) -> Vec<MissedQuestion> {
        ids.iter()
            .map(|id| MissedQuestion {
                question_id: Some(id.to_string()),
                question: format!("text of {}", id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::attempt;
    use super::*;

    #[test]
    fn test_filter_by_level() {
        let attempts = vec![attempt("a@x", "easy", 1, 2), attempt("b@x", "hard", 1, 2)];
        assert_eq!(filter_by_level(&attempts, "all").len(), 2);
        let easy = filter_by_level(&attempts, "easy");
        assert_eq!(easy.len(), 1);
        assert_eq!(easy[0].user_key(), "a@x");
        assert!(filter_by_level(&attempts, "Easy").is_empty());
    }

    #[test]
    fn test_filter_by_category_and_level() {
        let mut other = attempt("b@x", "easy", 1, 2);
        other.category_id = "22".to_string();
        let attempts = vec![attempt("a@x", "easy", 1, 2), other];
        let filter = AttemptFilter {
            level: Some("easy".to_string()),
            category: Some("22".to_string()),
        };
        let kept = filter.apply(&attempts);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].category_id, "22");
    }

    #[test]
    fn test_lookups_fall_back_to_id() {
        let lookups = Lookups::new(
            &[Category {
                id: "9".to_string(),
                name: "General".to_string(),
            }],
            &[],
        );
        assert_eq!(lookups.category("9"), "General");
        assert_eq!(lookups.category("10"), "10");
        assert_eq!(lookups.subcategory("s1"), "s1");
    }

    #[test]
    fn test_group_by_keeps_first_seen_order() {
        let groups = group_by(&[3, 1, 3, 2, 1], |n| *n);
        let keys: Vec<_> = groups.iter().map(|(k, v)| (*k, v.len())).collect();
        assert_eq!(keys, vec![(3, 2), (1, 2), (2, 1)]);
    }
}
