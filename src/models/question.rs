use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Difficulty of a question set or a quiz target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Easy, Level::Medium, Level::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Easy => "easy",
            Level::Medium => "medium",
            Level::Hard => "hard",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Level::Easy),
            "medium" => Ok(Level::Medium),
            "hard" => Ok(Level::Hard),
            other => Err(format!("Unknown difficulty: {}", other)),
        }
    }
}

/// Letter naming one of the four options of an authored question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [OptionLetter::A, OptionLetter::B, OptionLetter::C, OptionLetter::D];

    pub fn index(self) -> usize {
        match self {
            OptionLetter::A => 0,
            OptionLetter::B => 1,
            OptionLetter::C => 2,
            OptionLetter::D => 3,
        }
    }

    /// Lenient parse used on stored data: trims and upper-cases first.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "A" => Some(OptionLetter::A),
            "B" => Some(OptionLetter::B),
            "C" => Some(OptionLetter::C),
            "D" => Some(OptionLetter::D),
            _ => None,
        }
    }
}

/// An authored multiple-choice question inside a [`QuestionSet`](super::QuestionSet).
///
/// `correct` is kept as the raw stored string so that sets written by older
/// admin forms (lower-case letters, blanks) still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub option_a: String,
    #[serde(default)]
    pub option_b: String,
    #[serde(default)]
    pub option_c: String,
    #[serde(default)]
    pub option_d: String,
    #[serde(default)]
    pub correct: String,
}

impl Question {
    pub fn options(&self) -> [&str; 4] {
        [&self.option_a, &self.option_b, &self.option_c, &self.option_d]
    }

    pub fn correct_letter(&self) -> Option<OptionLetter> {
        OptionLetter::parse(&self.correct)
    }

    /// True when the question text, all four options, and the correct
    /// letter are present.
    pub fn is_complete(&self) -> bool {
        !self.question.trim().is_empty()
            && self.options().iter().all(|opt| !opt.trim().is_empty())
            && self.correct_letter().is_some()
    }
}

/// A question as served by the external trivia source or the backup file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteQuestion {
    pub question: String,
    pub correct_answer: String,
    #[serde(default)]
    pub incorrect_answers: Vec<String>,
}

impl From<&Question> for RemoteQuestion {
    /// Resolves the correct letter to its option text. Empty options are
    /// dropped and an unrecognised letter falls back to the first option.
    fn from(q: &Question) -> Self {
        let options: Vec<&str> = q.options().into_iter().filter(|opt| !opt.is_empty()).collect();
        let correct_index = q.correct_letter().map(OptionLetter::index).unwrap_or(0);
        let correct_answer = options
            .get(correct_index)
            .or_else(|| options.first())
            .map(|s| s.to_string())
            .unwrap_or_default();
        let incorrect_answers = options
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != correct_index)
            .map(|(_, opt)| opt.to_string())
            .collect();

        Self {
            question: q.question.clone(),
            correct_answer,
            incorrect_answers,
        }
    }
}

/// A question ready to be presented: the raw source data plus the shuffled
/// option order fixed at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizQuestion {
    pub question: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    pub merged: Vec<String>,
}

impl QuizQuestion {
    /// Question text with HTML entities decoded.
    pub fn text(&self) -> String {
        decode_entities(&self.question)
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}

/// Decodes HTML entities such as `&quot;` and `&#039;` for display.
pub fn decode_entities(raw: &str) -> String {
    html_escape::decode_html_entities(raw).into_owned()
}
