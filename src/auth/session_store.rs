use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::models::User;

use super::AuthError;

/// Where the logged-in user is remembered between runs.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<Option<User>, AuthError>> + Send;
    fn save(&self, user: &User) -> impl Future<Output = Result<(), AuthError>> + Send;
    fn clear(&self) -> impl Future<Output = Result<(), AuthError>> + Send;
}

/// Keeps the current user as a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<User>, AuthError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn save(&self, user: &User) -> Result<(), AuthError> {
        tokio::fs::write(&self.path, serde_json::to_string_pretty(user)?).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AuthError> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
