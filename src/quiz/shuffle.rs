use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{QuizQuestion, RemoteQuestion};

/// Places the correct answer among the incorrect ones in a uniformly random
/// order. Re-merging the same question gives a fresh order.
pub fn merge_options<R: Rng + ?Sized>(correct: &str, incorrect: &[String], rng: &mut R) -> Vec<String> {
    let mut merged = Vec::with_capacity(incorrect.len() + 1);
    merged.push(correct.to_string());
    merged.extend(incorrect.iter().cloned());
    merged.shuffle(rng);
    merged
}

/// Fixes the presentation order of a fetched question.
pub fn present<R: Rng + ?Sized>(question: RemoteQuestion, rng: &mut R) -> QuizQuestion {
    let merged = merge_options(&question.correct_answer, &question.incorrect_answers, rng);
    QuizQuestion {
        question: question.question,
        correct_answer: question.correct_answer,
        incorrect_answers: question.incorrect_answers,
        merged,
    }
}
