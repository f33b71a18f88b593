use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::RemoteQuestion;

/// Error reading a static JSON document (backup questions, offline seed).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} must contain at least one question", .0.display())]
    Empty(PathBuf),
}

/// Reads and deserializes a JSON document.
pub async fn load_json<T, P>(path: P) -> Result<T, LoadError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let json_content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&json_content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the static backup question list. An empty list is an error.
pub async fn load_backup_questions<P: AsRef<Path>>(path: P) -> Result<Vec<RemoteQuestion>, LoadError> {
    let path = path.as_ref();
    let questions: Vec<RemoteQuestion> = load_json(path).await?;

    if questions.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("trivia_trek_{}_{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_backup_questions() {
        let path = temp_file(
            "backup_ok.json",
            r#"[{"question":"2+2?","correct_answer":"4","incorrect_answers":["3","5","22"]}]"#,
        );
        let questions = load_backup_questions(&path).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, "4");
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_empty_backup_is_rejected() {
        let path = temp_file("backup_empty.json", "[]");
        assert!(matches!(load_backup_questions(&path).await, Err(LoadError::Empty(_))));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let path = std::env::temp_dir().join("trivia_trek_definitely_missing.json");
        assert!(matches!(load_backup_questions(&path).await, Err(LoadError::Read { .. })));
    }
}
