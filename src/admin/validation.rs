use crate::error::ValidationError;
use crate::models::{Level, NewSubcategory, Question, QuestionSet, Subcategory, DEFAULT_SUBCATEGORY_COLOR};

pub const MIN_CATEGORY_NAME_LEN: usize = 3;

/// Question-set fields as entered in the admin form.
#[derive(Debug, Clone, Default)]
pub struct QuestionSetForm {
    pub category_id: String,
    pub sub_category_id: String,
    pub level: Option<Level>,
    pub questions: Vec<Question>,
}

/// Trimmed name for a new category.
pub fn category_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::new("name", "Category name is required"));
    }
    if name.chars().count() < MIN_CATEGORY_NAME_LEN {
        return Err(ValidationError::new(
            "name",
            format!("Category name must be at least {} characters long", MIN_CATEGORY_NAME_LEN),
        ));
    }
    Ok(name.to_string())
}

/// Trimmed name for renaming a category; only emptiness is rejected.
pub fn category_rename(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::new("name", "Name cannot be empty."));
    }
    Ok(name.to_string())
}

pub fn new_subcategory(form: &NewSubcategory) -> Result<NewSubcategory, ValidationError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ValidationError::new("name", "Please enter a subcategory name."));
    }
    if form.category_id.trim().is_empty() {
        return Err(ValidationError::new("categoryId", "Please select a category."));
    }
    let image_url = form.image_url.trim();
    if image_url.is_empty() {
        return Err(ValidationError::new("imageUrl", "Please provide an image URL."));
    }
    let color = match form.color.trim() {
        "" => DEFAULT_SUBCATEGORY_COLOR,
        color => color,
    };
    Ok(NewSubcategory {
        name: name.to_string(),
        category_id: form.category_id.trim().to_string(),
        image_url: image_url.to_string(),
        color: color.to_string(),
    })
}

pub fn subcategory_update(sub: &Subcategory) -> Result<Subcategory, ValidationError> {
    let name = sub.name.trim();
    if name.is_empty() || sub.category_id.trim().is_empty() {
        return Err(ValidationError::new("name", "Name and category are required."));
    }
    Ok(Subcategory {
        name: name.to_string(),
        ..sub.clone()
    })
}

/// A new set must name its category, subcategory and level, and every
/// question must be complete.
pub fn new_question_set(form: &QuestionSetForm) -> Result<QuestionSet, ValidationError> {
    if form.category_id.trim().is_empty() || form.sub_category_id.trim().is_empty() {
        return Err(ValidationError::new(
            "subCategoryId",
            "Please select category and subcategory",
        ));
    }
    let level = form
        .level
        .ok_or_else(|| ValidationError::new("level", "Please select a difficulty level"))?;
    if form.questions.is_empty() || form.questions.iter().any(|q| !q.is_complete()) {
        return Err(ValidationError::new(
            "questions",
            "Please fill in all fields for all questions",
        ));
    }
    Ok(QuestionSet {
        id: None,
        category_id: form.category_id.trim().to_string(),
        sub_category_id: form.sub_category_id.trim().to_string(),
        level,
        questions: form.questions.clone(),
    })
}

/// Normalises an edited set: fields trimmed, letters upper-cased with A as
/// the default, incomplete questions dropped. At least one must remain.
pub fn edited_question_set(set: &QuestionSet) -> Result<QuestionSet, ValidationError> {
    if set.category_id.trim().is_empty() || set.sub_category_id.trim().is_empty() {
        return Err(ValidationError::new(
            "subCategoryId",
            "Category and subcategory are required.",
        ));
    }
    let questions: Vec<Question> = set
        .questions
        .iter()
        .map(normalise_question)
        .filter(Question::is_complete)
        .collect();
    if questions.is_empty() {
        return Err(ValidationError::new("questions", "Add at least one complete MCQ."));
    }
    Ok(QuestionSet {
        questions,
        ..set.clone()
    })
}

fn normalise_question(q: &Question) -> Question {
    let correct = q.correct.trim();
    Question {
        question: q.question.trim().to_string(),
        option_a: q.option_a.trim().to_string(),
        option_b: q.option_b.trim().to_string(),
        option_c: q.option_c.trim().to_string(),
        option_d: q.option_d.trim().to_string(),
        correct: if correct.is_empty() {
            "A".to_string()
        } else {
            correct.to_uppercase()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, correct: &str) -> Question {
        Question {
            question: text.to_string(),
            option_a: " a ".to_string(),
            option_b: "b".to_string(),
            option_c: "c".to_string(),
            option_d: "d".to_string(),
            correct: correct.to_string(),
        }
    }

    #[test]
    fn test_category_name_rules() {
        assert_eq!(category_name("  Science ").unwrap(), "Science");
        assert_eq!(category_name("   ").unwrap_err().message, "Category name is required");
        assert!(category_name("ab").is_err());
        assert_eq!(category_rename(" ab ").unwrap(), "ab");
    }

    #[test]
    fn test_subcategory_defaults_color() {
        let sub = new_subcategory(&NewSubcategory {
            name: " Rust ".to_string(),
            category_id: "c1".to_string(),
            image_url: "https://img".to_string(),
            color: String::new(),
        })
        .unwrap();
        assert_eq!(sub.name, "Rust");
        assert_eq!(sub.color, DEFAULT_SUBCATEGORY_COLOR);
    }

    #[test]
    fn test_subcategory_requires_image() {
        let err = new_subcategory(&NewSubcategory {
            name: "Rust".to_string(),
            category_id: "c1".to_string(),
            image_url: " ".to_string(),
            color: String::new(),
        })
        .unwrap_err();
        assert_eq!(err.field, "imageUrl");
    }

    #[test]
    fn test_new_set_requires_level_and_complete_questions() {
        let mut form = QuestionSetForm {
            category_id: "c1".to_string(),
            sub_category_id: "s1".to_string(),
            level: None,
            questions: vec![question("Q1", "A")],
        };
        assert_eq!(new_question_set(&form).unwrap_err().field, "level");

        form.level = Some(Level::Easy);
        form.questions.push(question("", "B"));
        assert_eq!(new_question_set(&form).unwrap_err().field, "questions");

        form.questions.pop();
        let set = new_question_set(&form).unwrap();
        assert_eq!(set.level, Level::Easy);
    }

    #[test]
    fn test_edited_set_is_normalised() {
        let set = QuestionSet {
            id: Some("q1".to_string()),
            category_id: "c1".to_string(),
            sub_category_id: "s1".to_string(),
            level: Level::Hard,
            questions: vec![question(" Q1 ", "b"), question("Q2", ""), question("", "A"), question("Q4", "x")],
        };
        let cleaned = edited_question_set(&set).unwrap();
        assert_eq!(cleaned.questions.len(), 2);
        assert_eq!(cleaned.questions[0].question, "Q1");
        assert_eq!(cleaned.questions[0].option_a, "a");
        assert_eq!(cleaned.questions[0].correct, "B");
        assert_eq!(cleaned.questions[1].correct, "A");

        let empty = QuestionSet {
            questions: vec![question("", "A")],
            ..set
        };
        assert!(edited_question_set(&empty).is_err());
    }
}
