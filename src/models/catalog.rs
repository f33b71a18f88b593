use serde::{Deserialize, Serialize};

use super::id;
use super::question::{Level, Question};

pub const DEFAULT_SUBCATEGORY_COLOR: &str = "#F0F9FF";

/// A top-level quiz category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "id::required")]
    pub id: String,
    pub name: String,
}

/// A community subcategory belonging to one category by id reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    #[serde(deserialize_with = "id::required")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "id::required")]
    pub category_id: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub color: String,
}

/// Subcategory fields as submitted by the admin form, before an id exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubcategory {
    pub name: String,
    pub category_id: String,
    pub image_url: String,
    pub color: String,
}

impl NewSubcategory {
    pub fn with_id(self, id: String) -> Subcategory {
        Subcategory {
            id,
            name: self.name,
            category_id: self.category_id,
            image_url: self.image_url,
            color: self.color,
        }
    }
}

/// Authored questions grouped under one category/subcategory/level triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSet {
    #[serde(default, deserialize_with = "id::optional", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "id::required")]
    pub category_id: String,
    #[serde(default, deserialize_with = "id::required")]
    pub sub_category_id: String,
    pub level: Level,
    #[serde(default)]
    pub questions: Vec<Question>,
}
