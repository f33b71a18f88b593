mod loader;

pub use loader::{load_backup_questions, load_json, LoadError};
