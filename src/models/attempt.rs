use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{id, zero};

/// A question the learner left unanswered or got wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedQuestion {
    #[serde(default, deserialize_with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(default)]
    pub question: String,
}

impl MissedQuestion {
    /// Grouping key for miss counts: the id, or the text when no id was stored.
    pub fn key(&self) -> &str {
        self.question_id.as_deref().unwrap_or(&self.question)
    }
}

/// One submitted quiz session. Append-only: created once on submit and never
/// mutated. Numeric fields missing from stored records read as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    #[serde(default, deserialize_with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default, deserialize_with = "id::required")]
    pub category_id: String,
    #[serde(default, deserialize_with = "id::optional")]
    pub sub_category_id: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default, deserialize_with = "zero::or_null")]
    pub score: u32,
    #[serde(default, deserialize_with = "zero::or_null")]
    pub total_questions: u32,
    #[serde(default, deserialize_with = "zero::or_null")]
    pub duration_seconds: u64,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub missed_questions: Vec<MissedQuestion>,
}

impl QuizAttempt {
    /// Key identifying the attempt's user: email, falling back to name.
    pub fn user_key(&self) -> &str {
        self.user_email
            .as_deref()
            .filter(|e| !e.is_empty())
            .or(self.user_name.as_deref())
            .unwrap_or_default()
    }

    /// 100 × score / total questions; zero when the attempt had no questions.
    pub fn accuracy(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.score) / f64::from(self.total_questions) * 100.0
    }

    /// Parsed `date`, `None` when missing or unparseable. A bare
    /// `YYYY-MM-DD` date reads as midnight UTC.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let date = self.date.as_deref()?.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc())
    }
}
