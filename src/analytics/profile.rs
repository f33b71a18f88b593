use serde::Serialize;

use crate::models::{QuizAttempt, User};

use super::{mean, ratio_percent};

/// Totals shown on a learner's profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub total_attempts: usize,
    pub total_score: u64,
    pub total_questions: u64,
    pub average_accuracy: f64,
    pub best_score: u32,
    pub best_accuracy: f64,
    pub total_time_seconds: u64,
    pub average_time_seconds: f64,
}

/// Attempts recorded under the user's email or name.
pub fn profile_attempts(attempts: &[QuizAttempt], user: &User) -> Vec<QuizAttempt> {
    attempts
        .iter()
        .filter(|a| {
            a.user_email.as_deref() == Some(user.email.as_str()) || a.user_name.as_deref() == Some(user.name.as_str())
        })
        .cloned()
        .collect()
}

pub fn profile_stats(attempts: &[QuizAttempt]) -> ProfileStats {
    if attempts.is_empty() {
        return ProfileStats::default();
    }
    let total_score: u64 = attempts.iter().map(|a| u64::from(a.score)).sum();
    let total_questions: u64 = attempts.iter().map(|a| u64::from(a.total_questions)).sum();
    let total_time_seconds: u64 = attempts.iter().map(|a| a.duration_seconds).sum();

    ProfileStats {
        total_attempts: attempts.len(),
        total_score,
        total_questions,
        average_accuracy: ratio_percent(total_score, total_questions),
        best_score: attempts.iter().map(|a| a.score).max().unwrap_or(0),
        best_accuracy: attempts.iter().map(QuizAttempt::accuracy).fold(0.0, f64::max),
        total_time_seconds,
        average_time_seconds: mean(total_time_seconds as f64, attempts.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::attempt;
    use super::*;

    #[test]
    fn test_profile_matches_email_or_name() {
        let user = User {
            id: Some("1".to_string()),
            name: "sam".to_string(),
            email: "sam@x".to_string(),
            password: String::new(),
            role: None,
            google_id: None,
        };
        let mut by_name = attempt("other@x", "easy", 1, 1);
        by_name.user_name = Some("sam".to_string());
        let attempts = vec![attempt("sam@x", "easy", 1, 2), by_name, attempt("kim@x", "easy", 1, 1)];

        let mine = profile_attempts(&attempts, &user);
        assert_eq!(mine.len(), 2);

        let stats = profile_stats(&mine);
        assert_eq!(stats.total_attempts, 2);
        assert_eq!(stats.total_score, 2);
        assert_eq!(stats.total_questions, 3);
        assert_eq!(stats.best_accuracy, 100.0);
        assert_eq!(stats.total_time_seconds, 120);
        assert_eq!(stats.average_time_seconds, 60.0);
    }

    #[test]
    fn test_no_attempts_gives_zero_stats() {
        assert_eq!(profile_stats(&[]), ProfileStats::default());
    }
}
