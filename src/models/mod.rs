//! Data model shared by the quiz engine, analytics, and the data store.

mod attempt;
mod catalog;
mod question;
mod user;

pub use attempt::{MissedQuestion, QuizAttempt};
pub use catalog::{Category, NewSubcategory, QuestionSet, Subcategory, DEFAULT_SUBCATEGORY_COLOR};
pub use question::{decode_entities, Level, OptionLetter, Question, QuizQuestion, RemoteQuestion};
pub use user::{Role, User};

/// json-server hands out numeric or string ids depending on version, so ids
/// are accepted in either form and kept as strings.
pub(crate) mod id {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn stringify(value: Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn required<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(stringify(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn optional<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(stringify(Value::deserialize(deserializer)?).filter(|s| !s.is_empty()))
    }
}

/// Stored counters may be `null`; those read as zero like a missing key.
pub(crate) mod zero {
    use serde::{Deserialize, Deserializer};

    pub fn or_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }
}
