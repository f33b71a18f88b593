use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::models::{Category, NewSubcategory, QuestionSet, QuizAttempt, Role, Subcategory, User};

use super::{DataStore, QuestionSetQuery, StoreError};

/// json-server style REST backend.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}/{}", self.base_url, path))
    }

    async fn send(&self, method: Method, path: &str, builder: RequestBuilder) -> Result<Response, StoreError> {
        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!("{method} {path} returned {status}");
            return Err(StoreError::Status {
                method: method_name(&method),
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, StoreError> {
        let builder = self.request(Method::GET, path).query(query);
        let resp = self.send(Method::GET, path, builder).await?;
        Ok(resp.json().await?)
    }

    async fn write<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method.clone(), path).json(body);
        let resp = self.send(method, path, builder).await?;
        Ok(resp.json().await?)
    }

    async fn write_discard<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: &B) -> Result<(), StoreError> {
        let builder = self.request(method.clone(), path).json(body);
        self.send(method, path, builder).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let builder = self.request(Method::DELETE, path);
        self.send(Method::DELETE, path, builder).await?;
        Ok(())
    }
}

fn method_name(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::PATCH => "PATCH",
        Method::DELETE => "DELETE",
        _ => "REQUEST",
    }
}

impl DataStore for RestStore {
    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        self.get("categories", &[]).await
    }

    async fn subcategories(&self, category_id: Option<&str>) -> Result<Vec<Subcategory>, StoreError> {
        match category_id {
            Some(id) => self.get("subcategories", &[("categoryId", id)]).await,
            None => self.get("subcategories", &[]).await,
        }
    }

    async fn subcategory(&self, id: &str) -> Result<Option<Subcategory>, StoreError> {
        let found: Vec<Subcategory> = self.get("subcategories", &[("id", id)]).await?;
        Ok(found.into_iter().next())
    }

    async fn question_sets(&self, query: QuestionSetQuery<'_>) -> Result<Vec<QuestionSet>, StoreError> {
        let mut params = Vec::new();
        if let Some(id) = query.sub_category_id {
            params.push(("subCategoryId", id));
        }
        if let Some(level) = query.level {
            params.push(("level", level.as_str()));
        }
        self.get("questions", &params).await
    }

    async fn users(&self) -> Result<Vec<User>, StoreError> {
        self.get("users", &[]).await
    }

    async fn attempts(&self) -> Result<Vec<QuizAttempt>, StoreError> {
        self.get("quizAttempts", &[]).await
    }

    async fn create_attempt(&self, attempt: &QuizAttempt) -> Result<(), StoreError> {
        self.write_discard(Method::POST, "quizAttempts", attempt).await
    }

    async fn create_user(&self, user: &User) -> Result<User, StoreError> {
        self.write(Method::POST, "users", user).await
    }

    async fn update_user_role(&self, id: &str, role: Role) -> Result<(), StoreError> {
        self.write_discard(Method::PATCH, &format!("users/{}", id), &json!({ "role": role }))
            .await
    }

    async fn create_category(&self, name: &str) -> Result<Category, StoreError> {
        self.write(Method::POST, "categories", &json!({ "name": name })).await
    }

    async fn rename_category(&self, id: &str, name: &str) -> Result<(), StoreError> {
        self.write_discard(Method::PATCH, &format!("categories/{}", id), &json!({ "name": name }))
            .await
    }

    async fn delete_category(&self, id: &str) -> Result<(), StoreError> {
        self.delete(&format!("categories/{}", id)).await
    }

    async fn create_subcategory(&self, subcategory: &NewSubcategory) -> Result<Subcategory, StoreError> {
        self.write(Method::POST, "subcategories", subcategory).await
    }

    async fn update_subcategory(&self, subcategory: &Subcategory) -> Result<(), StoreError> {
        let path = format!("subcategories/{}", subcategory.id);
        self.write_discard(Method::PATCH, &path, subcategory).await
    }

    async fn delete_subcategory(&self, id: &str) -> Result<(), StoreError> {
        self.delete(&format!("subcategories/{}", id)).await
    }

    async fn create_question_set(&self, set: &QuestionSet) -> Result<QuestionSet, StoreError> {
        self.write(Method::POST, "questions", set).await
    }

    async fn replace_question_set(&self, id: &str, set: &QuestionSet) -> Result<(), StoreError> {
        self.write_discard(Method::PUT, &format!("questions/{}", id), set).await
    }

    async fn delete_question_set(&self, id: &str) -> Result<(), StoreError> {
        self.delete(&format!("questions/{}", id)).await
    }
}
