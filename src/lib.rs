//! # trivia-trek
//!
//! A terminal trivia quiz backed by a json-server style REST collection and
//! an Open Trivia Database compatible question API.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use rand::{rngs::StdRng, SeedableRng};
//! use trivia_trek::config::Config;
//! use trivia_trek::quiz::{QuestionLoader, Target};
//! use trivia_trek::store::RestStore;
//! use trivia_trek::trivia::{BackupFile, OpenTdbClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let store = Arc::new(RestStore::new(&config.store_url, config.request_timeout)?);
//! let loader = QuestionLoader::new(
//!     store.clone(),
//!     OpenTdbClient::new(&config.trivia_url, config.request_timeout)?,
//!     BackupFile::new(config.backup_file.clone(), config.backup_timeout),
//!     StdRng::from_entropy(),
//!     config.sourcing(),
//! );
//! let target = Target::parse("9", Some("easy"))?;
//! trivia_trek::tui::run_quiz(Arc::new(loader), store.clone(), target, None, &config).await?;
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod analytics;
pub mod app;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod models;
pub mod quiz;
pub mod store;
pub mod terminal;
pub mod trivia;
pub mod tui;
pub mod ui;

pub use app::{App, Screen};
pub use config::Config;
pub use error::{QuizError, QuizResult, ValidationError};
pub use quiz::{QuestionLoader, QuizSession, Target};
pub use store::{AnyStore, DataStore, MemoryStore, RestStore, StoreError};
