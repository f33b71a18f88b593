use serde::Serialize;

use crate::models::QuizAttempt;

use super::{group_by, mean, ratio_percent};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    /// 1-based.
    pub rank: usize,
    pub user_key: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub total_attempts: usize,
    pub total_score: u64,
    pub total_questions: u64,
    pub best_score: u32,
    pub best_accuracy: f64,
    pub average_accuracy: f64,
    pub average_duration_seconds: f64,
    /// Raw `date` of the newest attempt.
    pub recent_date: Option<String>,
}

/// Ranks users by best single-attempt accuracy, then by attempt count.
pub fn leaderboard_ranking(attempts: &[QuizAttempt]) -> Vec<LeaderboardRow> {
    let mut rows: Vec<LeaderboardRow> = group_by(attempts, |a| a.user_key().to_string())
        .into_iter()
        .map(|(user_key, group)| {
            let total_score: u64 = group.iter().map(|a| u64::from(a.score)).sum();
            let total_questions: u64 = group.iter().map(|a| u64::from(a.total_questions)).sum();
            let total_duration: u64 = group.iter().map(|a| a.duration_seconds).sum();
            let newest = group
                .iter()
                .filter(|a| a.timestamp().is_some())
                .max_by_key(|a| a.timestamp())
                .or_else(|| group.first());

            LeaderboardRow {
                rank: 0,
                user_name: group[0].user_name.clone(),
                user_email: group[0].user_email.clone(),
                total_attempts: group.len(),
                total_score,
                total_questions,
                best_score: group.iter().map(|a| a.score).max().unwrap_or(0),
                best_accuracy: group.iter().map(|a| a.accuracy()).fold(0.0, f64::max),
                average_accuracy: ratio_percent(total_score, total_questions),
                average_duration_seconds: mean(total_duration as f64, group.len()),
                recent_date: newest.and_then(|a| a.date.clone()),
                user_key,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.best_accuracy
            .total_cmp(&a.best_accuracy)
            .then_with(|| b.total_attempts.cmp(&a.total_attempts))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::attempt;
    use super::*;

    #[test]
    fn test_ties_broken_by_attempt_count() {
        let mut attempts = Vec::new();
        attempts.push(attempt("u1@x", "easy", 9, 10));
        attempts.push(attempt("u1@x", "easy", 5, 10));
        attempts.push(attempt("u1@x", "easy", 5, 10));
        for _ in 0..4 {
            attempts.push(attempt("u2@x", "easy", 4, 10));
        }
        attempts.push(attempt("u2@x", "easy", 9, 10));

        let board = leaderboard_ranking(&attempts);
        assert_eq!(board[0].user_key, "u2@x");
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].total_attempts, 5);
        assert_eq!(board[1].user_key, "u1@x");
        assert_eq!(board[1].rank, 2);
        assert_eq!(board[0].best_accuracy, board[1].best_accuracy);
    }

    #[test]
    fn test_row_statistics() {
        let mut first = attempt("a@x", "easy", 2, 4);
        first.duration_seconds = 30;
        first.date = Some("2024-03-01T10:00:00.000Z".to_string());
        let mut second = attempt("a@x", "hard", 4, 4);
        second.duration_seconds = 45;
        second.date = Some("2024-04-01T10:00:00.000Z".to_string());

        let board = leaderboard_ranking(&[first, second, attempt("b@x", "easy", 1, 4)]);
        let a = &board[0];
        assert_eq!(a.user_key, "a@x");
        assert_eq!(a.best_score, 4);
        assert_eq!(a.best_accuracy, 100.0);
        assert_eq!(a.average_accuracy, 75.0);
        assert_eq!(a.average_duration_seconds, 37.5);
        assert_eq!(a.recent_date.as_deref(), Some("2024-04-01T10:00:00.000Z"));
        assert_eq!(board[1].rank, 2);
    }

    #[test]
    fn test_zero_question_attempt_has_zero_accuracy() {
        let board = leaderboard_ranking(&[attempt("a@x", "easy", 0, 0)]);
        assert_eq!(board[0].best_accuracy, 0.0);
        assert_eq!(board[0].average_accuracy, 0.0);
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let attempts = vec![attempt("a@x", "easy", 3, 4), attempt("b@x", "easy", 4, 4)];
        assert_eq!(leaderboard_ranking(&attempts), leaderboard_ranking(&attempts));
        assert!(leaderboard_ranking(&[]).is_empty());
    }
}
