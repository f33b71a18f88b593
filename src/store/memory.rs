use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::data::load_json;
use crate::models::{Category, NewSubcategory, QuestionSet, QuizAttempt, Role, Subcategory, User};

use super::{DataStore, QuestionSetQuery, StoreError};

/// The whole collection, in `db.json` layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
    #[serde(default)]
    pub questions: Vec<QuestionSet>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub quiz_attempts: Vec<QuizAttempt>,
}

/// In-process store. Optionally writes the snapshot back to its `db.json`
/// after every mutation so offline runs keep their attempts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<Snapshot>,
    backing_file: Option<PathBuf>,
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn not_found(collection: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection,
        id: id.to_string(),
    }
}

impl MemoryStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            data: Mutex::new(snapshot),
            backing_file: None,
        }
    }

    /// Seeds from a `db.json` file and persists mutations back to it.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let snapshot: Snapshot = load_json(path).await?;
        tracing::info!(
            "loaded offline store from {} ({} attempts)",
            path.display(),
            snapshot.quiz_attempts.len()
        );
        Ok(Self {
            data: Mutex::new(snapshot),
            backing_file: Some(path.to_path_buf()),
        })
    }

    /// A copy of the current contents.
    pub async fn snapshot(&self) -> Snapshot {
        self.data.lock().await.clone()
    }

    async fn flush(&self, data: &Snapshot) -> Result<(), StoreError> {
        if let Some(path) = &self.backing_file {
            let json = serde_json::to_string_pretty(data)?;
            tokio::fs::write(path, json).await?;
        }
        Ok(())
    }

    /// Applies `change` to a copy and swaps it in once the write-back
    /// succeeded. On any error the store keeps its previous contents.
    async fn commit<T>(&self, change: impl FnOnce(&mut Snapshot) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let out = change(&mut next)?;
        self.flush(&next).await?;
        *data = next;
        Ok(out)
    }
}

impl DataStore for MemoryStore {
    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.data.lock().await.categories.clone())
    }

    async fn subcategories(&self, category_id: Option<&str>) -> Result<Vec<Subcategory>, StoreError> {
        let data = self.data.lock().await;
        Ok(data
            .subcategories
            .iter()
            .filter(|s| category_id.is_none_or(|id| s.category_id == id))
            .cloned()
            .collect())
    }

    async fn subcategory(&self, id: &str) -> Result<Option<Subcategory>, StoreError> {
        let data = self.data.lock().await;
        Ok(data.subcategories.iter().find(|s| s.id == id).cloned())
    }

    async fn question_sets(&self, query: QuestionSetQuery<'_>) -> Result<Vec<QuestionSet>, StoreError> {
        let data = self.data.lock().await;
        Ok(data.questions.iter().filter(|set| query.matches(set)).cloned().collect())
    }

    async fn users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.data.lock().await.users.clone())
    }

    async fn attempts(&self) -> Result<Vec<QuizAttempt>, StoreError> {
        Ok(self.data.lock().await.quiz_attempts.clone())
    }

    async fn create_attempt(&self, attempt: &QuizAttempt) -> Result<(), StoreError> {
        let mut attempt = attempt.clone();
        attempt.id.get_or_insert_with(new_id);
        self.commit(|data| {
            data.quiz_attempts.push(attempt);
            Ok(())
        })
        .await
    }

    async fn create_user(&self, user: &User) -> Result<User, StoreError> {
        let mut user = user.clone();
        user.id.get_or_insert_with(new_id);
        self.commit(|data| {
            data.users.push(user.clone());
            Ok(user)
        })
        .await
    }

    async fn update_user_role(&self, id: &str, role: Role) -> Result<(), StoreError> {
        self.commit(|data| {
            let user = data
                .users
                .iter_mut()
                .find(|u| u.id.as_deref() == Some(id))
                .ok_or_else(|| not_found("users", id))?;
            user.role = Some(role);
            Ok(())
        })
        .await
    }

    async fn create_category(&self, name: &str) -> Result<Category, StoreError> {
        let category = Category {
            id: new_id(),
            name: name.to_string(),
        };
        self.commit(|data| {
            data.categories.push(category.clone());
            Ok(category)
        })
        .await
    }

    async fn rename_category(&self, id: &str, name: &str) -> Result<(), StoreError> {
        self.commit(|data| {
            let category = data
                .categories
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| not_found("categories", id))?;
            category.name = name.to_string();
            Ok(())
        })
        .await
    }

    async fn delete_category(&self, id: &str) -> Result<(), StoreError> {
        self.commit(|data| {
            let before = data.categories.len();
            data.categories.retain(|c| c.id != id);
            if data.categories.len() == before {
                return Err(not_found("categories", id));
            }
            Ok(())
        })
        .await
    }

    async fn create_subcategory(&self, subcategory: &NewSubcategory) -> Result<Subcategory, StoreError> {
        let created = subcategory.clone().with_id(new_id());
        self.commit(|data| {
            data.subcategories.push(created.clone());
            Ok(created)
        })
        .await
    }

    async fn update_subcategory(&self, subcategory: &Subcategory) -> Result<(), StoreError> {
        self.commit(|data| {
            let existing = data
                .subcategories
                .iter_mut()
                .find(|s| s.id == subcategory.id)
                .ok_or_else(|| not_found("subcategories", &subcategory.id))?;
            *existing = subcategory.clone();
            Ok(())
        })
        .await
    }

    async fn delete_subcategory(&self, id: &str) -> Result<(), StoreError> {
        self.commit(|data| {
            let before = data.subcategories.len();
            data.subcategories.retain(|s| s.id != id);
            if data.subcategories.len() == before {
                return Err(not_found("subcategories", id));
            }
            Ok(())
        })
        .await
    }

    async fn create_question_set(&self, set: &QuestionSet) -> Result<QuestionSet, StoreError> {
        let mut set = set.clone();
        set.id.get_or_insert_with(new_id);
        self.commit(|data| {
            data.questions.push(set.clone());
            Ok(set)
        })
        .await
    }

    async fn replace_question_set(&self, id: &str, set: &QuestionSet) -> Result<(), StoreError> {
        self.commit(|data| {
            let existing = data
                .questions
                .iter_mut()
                .find(|s| s.id.as_deref() == Some(id))
                .ok_or_else(|| not_found("questions", id))?;
            *existing = QuestionSet {
                id: Some(id.to_string()),
                ..set.clone()
            };
            Ok(())
        })
        .await
    }

    async fn delete_question_set(&self, id: &str) -> Result<(), StoreError> {
        self.commit(|data| {
            let before = data.questions.len();
            data.questions.retain(|s| s.id.as_deref() != Some(id));
            if data.questions.len() == before {
                return Err(not_found("questions", id));
            }
            Ok(())
        })
        .await
    }
}
