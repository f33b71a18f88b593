//! Access to the flat REST collection backing the app.
//!
//! The collection is json-server shaped: `categories`, `subcategories`,
//! `questions` (question sets), `users` and `quizAttempts`. Writes are single
//! fire-and-forget calls with no transaction or concurrency token.

mod http;
mod memory;

use std::future::Future;

use thiserror::Error;

use crate::models::{Category, Level, NewSubcategory, QuestionSet, QuizAttempt, Role, Subcategory, User};

pub use http::RestStore;
pub use memory::{MemoryStore, Snapshot};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{method} {path} returned {status}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
    },
    #[error("{collection} record {id} not found")]
    NotFound { collection: &'static str, id: String },
    #[error("{0}")]
    Rejected(String),
    #[error("failed to load seed data: {0}")]
    Seed(#[from] crate::data::LoadError),
    #[error("failed to write snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Filter for listing question sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionSetQuery<'a> {
    pub sub_category_id: Option<&'a str>,
    pub level: Option<Level>,
}

impl<'a> QuestionSetQuery<'a> {
    pub fn matches(&self, set: &QuestionSet) -> bool {
        self.sub_category_id.is_none_or(|id| set.sub_category_id == id)
            && self.level.is_none_or(|level| set.level == level)
    }
}

/// The CRUD surface of the data store.
pub trait DataStore: Send + Sync {
    fn categories(&self) -> impl Future<Output = Result<Vec<Category>, StoreError>> + Send;

    fn subcategories(
        &self,
        category_id: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Subcategory>, StoreError>> + Send;

    fn subcategory(&self, id: &str) -> impl Future<Output = Result<Option<Subcategory>, StoreError>> + Send;

    fn question_sets(
        &self,
        query: QuestionSetQuery<'_>,
    ) -> impl Future<Output = Result<Vec<QuestionSet>, StoreError>> + Send;

    fn users(&self) -> impl Future<Output = Result<Vec<User>, StoreError>> + Send;

    fn attempts(&self) -> impl Future<Output = Result<Vec<QuizAttempt>, StoreError>> + Send;

    fn create_attempt(&self, attempt: &QuizAttempt) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn create_user(&self, user: &User) -> impl Future<Output = Result<User, StoreError>> + Send;

    fn update_user_role(&self, id: &str, role: Role) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn create_category(&self, name: &str) -> impl Future<Output = Result<Category, StoreError>> + Send;

    fn rename_category(&self, id: &str, name: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete_category(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn create_subcategory(
        &self,
        subcategory: &NewSubcategory,
    ) -> impl Future<Output = Result<Subcategory, StoreError>> + Send;

    fn update_subcategory(&self, subcategory: &Subcategory) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete_subcategory(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn create_question_set(&self, set: &QuestionSet) -> impl Future<Output = Result<QuestionSet, StoreError>> + Send;

    fn replace_question_set(&self, id: &str, set: &QuestionSet) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete_question_set(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Either backend, chosen at startup from configuration.
pub enum AnyStore {
    Rest(RestStore),
    Memory(MemoryStore),
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            AnyStore::Rest($store) => $call.await,
            AnyStore::Memory($store) => $call.await,
        }
    };
}

impl DataStore for AnyStore {
    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        dispatch!(self, s => s.categories())
    }

    async fn subcategories(&self, category_id: Option<&str>) -> Result<Vec<Subcategory>, StoreError> {
        dispatch!(self, s => s.subcategories(category_id))
    }

    async fn subcategory(&self, id: &str) -> Result<Option<Subcategory>, StoreError> {
        dispatch!(self, s => s.subcategory(id))
    }

    async fn question_sets(&self, query: QuestionSetQuery<'_>) -> Result<Vec<QuestionSet>, StoreError> {
        dispatch!(self, s => s.question_sets(query))
    }

    async fn users(&self) -> Result<Vec<User>, StoreError> {
        dispatch!(self, s => s.users())
    }

    async fn attempts(&self) -> Result<Vec<QuizAttempt>, StoreError> {
        dispatch!(self, s => s.attempts())
    }

    async fn create_attempt(&self, attempt: &QuizAttempt) -> Result<(), StoreError> {
        dispatch!(self, s => s.create_attempt(attempt))
    }

    async fn create_user(&self, user: &User) -> Result<User, StoreError> {
        dispatch!(self, s => s.create_user(user))
    }

    async fn update_user_role(&self, id: &str, role: Role) -> Result<(), StoreError> {
        dispatch!(self, s => s.update_user_role(id, role))
    }

    async fn create_category(&self, name: &str) -> Result<Category, StoreError> {
        dispatch!(self, s => s.create_category(name))
    }

    async fn rename_category(&self, id: &str, name: &str) -> Result<(), StoreError> {
        dispatch!(self, s => s.rename_category(id, name))
    }

    async fn delete_category(&self, id: &str) -> Result<(), StoreError> {
        dispatch!(self, s => s.delete_category(id))
    }

    async fn create_subcategory(&self, subcategory: &NewSubcategory) -> Result<Subcategory, StoreError> {
        dispatch!(self, s => s.create_subcategory(subcategory))
    }

    async fn update_subcategory(&self, subcategory: &Subcategory) -> Result<(), StoreError> {
        dispatch!(self, s => s.update_subcategory(subcategory))
    }

    async fn delete_subcategory(&self, id: &str) -> Result<(), StoreError> {
        dispatch!(self, s => s.delete_subcategory(id))
    }

    async fn create_question_set(&self, set: &QuestionSet) -> Result<QuestionSet, StoreError> {
        dispatch!(self, s => s.create_question_set(set))
    }

    async fn replace_question_set(&self, id: &str, set: &QuestionSet) -> Result<(), StoreError> {
        dispatch!(self, s => s.replace_question_set(id, set))
    }

    async fn delete_question_set(&self, id: &str) -> Result<(), StoreError> {
        dispatch!(self, s => s.delete_question_set(id))
    }
}
