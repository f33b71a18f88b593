use std::cmp::Reverse;

use serde::Serialize;

use crate::models::QuizAttempt;

use super::{group_by, mean, ratio_percent, Lookups};

pub const MOST_MISSED_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizReportRow {
    pub category_id: String,
    pub sub_category_id: Option<String>,
    pub category_name: String,
    pub sub_category_name: Option<String>,
    pub attempts: usize,
    pub total_score: u64,
    pub total_questions: u64,
    /// Mean score per attempt, not accuracy.
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReportRow {
    pub user_key: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub attempts: usize,
    pub total_score: u64,
    pub total_questions: u64,
    pub best_score: u32,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyRow {
    pub level: String,
    pub attempts: usize,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedQuestionRow {
    pub key: String,
    pub question: String,
    pub misses: usize,
}

fn total_score(group: &[&QuizAttempt]) -> u64 {
    group.iter().map(|a| u64::from(a.score)).sum()
}

fn total_questions(group: &[&QuizAttempt]) -> u64 {
    group.iter().map(|a| u64::from(a.total_questions)).sum()
}

/// Per (category, subcategory) pair.
pub fn quiz_wise_report(attempts: &[QuizAttempt], lookups: &Lookups) -> Vec<QuizReportRow> {
    group_by(attempts, |a| (a.category_id.clone(), a.sub_category_id.clone()))
        .into_iter()
        .map(|((category_id, sub_category_id), group)| {
            let total_score = total_score(&group);
            QuizReportRow {
                category_name: lookups.category(&category_id).to_string(),
                sub_category_name: sub_category_id.as_deref().map(|s| lookups.subcategory(s).to_string()),
                attempts: group.len(),
                total_score,
                total_questions: total_questions(&group),
                average_score: mean(total_score as f64, group.len()),
                category_id,
                sub_category_id,
            }
        })
        .collect()
}

/// Per user, keyed by email falling back to name.
pub fn user_wise_report(attempts: &[QuizAttempt]) -> Vec<UserReportRow> {
    group_by(attempts, |a| a.user_key().to_string())
        .into_iter()
        .map(|(user_key, group)| {
            let total_score = total_score(&group);
            let total_questions = total_questions(&group);
            UserReportRow {
                user_name: group[0].user_name.clone(),
                user_email: group[0].user_email.clone(),
                attempts: group.len(),
                total_score,
                total_questions,
                best_score: group.iter().map(|a| a.score).max().unwrap_or(0),
                accuracy: ratio_percent(total_score, total_questions),
                user_key,
            }
        })
        .collect()
}

/// Per level; attempts without one are grouped as `"unknown"`.
pub fn difficulty_analytics(attempts: &[QuizAttempt]) -> Vec<DifficultyRow> {
    group_by(attempts, |a| {
        a.level
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    })
    .into_iter()
    .map(|(level, group)| DifficultyRow {
        level,
        attempts: group.len(),
        average_score: mean(total_score(&group) as f64, group.len()),
    })
    .collect()
}

/// Top `limit` missed questions by miss count; ties keep encounter order.
pub fn most_missed_questions(attempts: &[QuizAttempt], limit: usize) -> Vec<MissedQuestionRow> {
    let missed: Vec<_> = attempts.iter().flat_map(|a| a.missed_questions.iter()).collect();
    let mut rows: Vec<MissedQuestionRow> = group_by(&missed, |m| m.key().to_string())
        .into_iter()
        .map(|(key, group)| MissedQuestionRow {
            question: group[0].question.clone(),
            misses: group.len(),
            key,
        })
        .collect();
    rows.sort_by_key(|row| Reverse(row.misses));
    rows.truncate(limit);
    rows
}

/// Newest first by `date`; missing or unparseable dates sort last.
pub fn recent_activity(attempts: &[QuizAttempt], limit: usize) -> Vec<QuizAttempt> {
    let mut sorted = attempts.to_vec();
    sorted.sort_by_key(|a| Reverse(a.timestamp()));
    sorted.truncate(limit);
    sorted
}
