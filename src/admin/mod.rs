//! Admin CRUD over categories, subcategories and question sets.

mod validation;

use std::sync::Arc;

use crate::error::{QuizError, QuizResult};
use crate::models::{Category, NewSubcategory, QuestionSet, Subcategory};
use crate::store::{DataStore, QuestionSetQuery, StoreError};

pub use validation::{
    category_name, category_rename, edited_question_set, new_question_set, new_subcategory, subcategory_update,
    QuestionSetForm, MIN_CATEGORY_NAME_LEN,
};

/// What happens to records that still reference a deleted parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DeletePolicy {
    /// Delete anyway; children are left orphaned.
    #[default]
    Permissive,
    /// Refuse while anything references the record.
    Restrict,
}

/// Case-insensitive substring search over names.
pub fn matches_search(name: &str, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty() || name.to_lowercase().contains(&query)
}

pub struct Catalog<S> {
    store: Arc<S>,
    delete_policy: DeletePolicy,
}

impl<S: DataStore> Catalog<S> {
    pub fn new(store: Arc<S>, delete_policy: DeletePolicy) -> Self {
        Self { store, delete_policy }
    }

    pub async fn categories(&self, search: &str) -> QuizResult<Vec<Category>> {
        let mut categories = self.store.categories().await?;
        categories.retain(|c| matches_search(&c.name, search));
        Ok(categories)
    }

    pub async fn subcategories(&self, category_id: Option<&str>, search: &str) -> QuizResult<Vec<Subcategory>> {
        let mut subs = self.store.subcategories(category_id).await?;
        subs.retain(|s| matches_search(&s.name, search));
        Ok(subs)
    }

    pub async fn question_sets(&self, query: QuestionSetQuery<'_>) -> QuizResult<Vec<QuestionSet>> {
        Ok(self.store.question_sets(query).await?)
    }

    pub async fn add_category(&self, name: &str) -> QuizResult<Category> {
        let name = category_name(name)?;
        let created = self.store.create_category(&name).await?;
        tracing::info!("added category {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn rename_category(&self, id: &str, name: &str) -> QuizResult<()> {
        let name = category_rename(name)?;
        self.store.rename_category(id, &name).await?;
        tracing::info!("renamed category {} to {}", id, name);
        Ok(())
    }

    pub async fn delete_category(&self, id: &str) -> QuizResult<()> {
        if self.delete_policy == DeletePolicy::Restrict {
            let subs = self.store.subcategories(Some(id)).await?;
            let sets = self.store.question_sets(QuestionSetQuery::default()).await?;
            let referencing_sets = sets.iter().filter(|s| s.category_id == id).count();
            if !subs.is_empty() || referencing_sets > 0 {
                return Err(rejected(format!(
                    "Category {} is still used by {} subcategories and {} question sets",
                    id,
                    subs.len(),
                    referencing_sets
                )));
            }
        }
        self.store.delete_category(id).await?;
        tracing::info!("deleted category {}", id);
        Ok(())
    }

    pub async fn add_subcategory(&self, form: &NewSubcategory) -> QuizResult<Subcategory> {
        let form = new_subcategory(form)?;
        let created = self.store.create_subcategory(&form).await?;
        tracing::info!("added subcategory {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn update_subcategory(&self, sub: &Subcategory) -> QuizResult<()> {
        let sub = subcategory_update(sub)?;
        self.store.update_subcategory(&sub).await?;
        tracing::info!("updated subcategory {}", sub.id);
        Ok(())
    }

    pub async fn delete_subcategory(&self, id: &str) -> QuizResult<()> {
        if self.delete_policy == DeletePolicy::Restrict {
            let sets = self
                .store
                .question_sets(QuestionSetQuery {
                    sub_category_id: Some(id),
                    level: None,
                })
                .await?;
            if !sets.is_empty() {
                return Err(rejected(format!(
                    "Subcategory {} is still used by {} question sets",
                    id,
                    sets.len()
                )));
            }
        }
        self.store.delete_subcategory(id).await?;
        tracing::info!("deleted subcategory {}", id);
        Ok(())
    }

    pub async fn add_question_set(&self, form: &QuestionSetForm) -> QuizResult<QuestionSet> {
        let set = new_question_set(form)?;
        let created = self.store.create_question_set(&set).await?;
        tracing::info!(
            "added {} questions to {} ({})",
            created.questions.len(),
            created.sub_category_id,
            created.level
        );
        Ok(created)
    }

    /// Replaces a stored set with its normalised edit.
    pub async fn update_question_set(&self, id: &str, set: &QuestionSet) -> QuizResult<QuestionSet> {
        let set = edited_question_set(set)?;
        self.store.replace_question_set(id, &set).await?;
        tracing::info!("updated question set {} ({} questions)", id, set.questions.len());
        Ok(set)
    }

    pub async fn delete_question_set(&self, id: &str) -> QuizResult<()> {
        self.store.delete_question_set(id).await?;
        tracing::info!("deleted question set {}", id);
        Ok(())
    }
}

fn rejected(message: String) -> QuizError {
    tracing::warn!("{}", message);
    QuizError::Store(StoreError::Rejected(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Level, Question};
    use crate::store::MemoryStore;

    fn question() -> Question {
        Question {
            question: "Q".to_string(),
            option_a: "a".to_string(),
            option_b: "b".to_string(),
            option_c: "c".to_string(),
            option_d: "d".to_string(),
            correct: "A".to_string(),
        }
    }

    async fn seeded(policy: DeletePolicy) -> (Catalog<MemoryStore>, Category, Subcategory) {
        let catalog = Catalog::new(Arc::new(MemoryStore::default()), policy);
        let cat = catalog.add_category("Science").await.unwrap();
        let sub = catalog
            .add_subcategory(&NewSubcategory {
                name: "Physics".to_string(),
                category_id: cat.id.clone(),
                image_url: "https://img/physics.png".to_string(),
                color: String::new(),
            })
            .await
            .unwrap();
        catalog
            .add_question_set(&QuestionSetForm {
                category_id: cat.id.clone(),
                sub_category_id: sub.id.clone(),
                level: Some(Level::Easy),
                questions: vec![question()],
            })
            .await
            .unwrap();
        (catalog, cat, sub)
    }

    #[tokio::test]
    async fn test_invalid_category_never_reaches_store() {
        let catalog = Catalog::new(Arc::new(MemoryStore::default()), DeletePolicy::Permissive);
        assert!(matches!(catalog.add_category("ab").await, Err(QuizError::Validation(_))));
        assert!(catalog.categories("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_permissive_delete_leaves_orphans() {
        let (catalog, cat, sub) = seeded(DeletePolicy::Permissive).await;
        catalog.delete_category(&cat.id).await.unwrap();
        assert!(catalog.categories("").await.unwrap().is_empty());
        assert_eq!(catalog.subcategories(None, "").await.unwrap()[0].id, sub.id);
    }

    #[tokio::test]
    async fn test_restrict_delete_rejects_referenced_records() {
        let (catalog, cat, sub) = seeded(DeletePolicy::Restrict).await;
        assert!(matches!(
            catalog.delete_category(&cat.id).await,
            Err(QuizError::Store(StoreError::Rejected(_)))
        ));
        assert!(catalog.delete_subcategory(&sub.id).await.is_err());

        let sets = catalog.question_sets(QuestionSetQuery::default()).await.unwrap();
        for set in sets {
            catalog.delete_question_set(set.id.as_deref().unwrap()).await.unwrap();
        }
        catalog.delete_subcategory(&sub.id).await.unwrap();
        catalog.delete_category(&cat.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let (catalog, _, _) = seeded(DeletePolicy::Permissive).await;
        assert_eq!(catalog.categories("sci").await.unwrap().len(), 1);
        assert!(catalog.categories("history").await.unwrap().is_empty());
        assert_eq!(catalog.subcategories(None, "PHYS").await.unwrap().len(), 1);
    }
}
