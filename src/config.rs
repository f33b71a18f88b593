use std::path::PathBuf;
use std::time::Duration;

use crate::admin::DeletePolicy;
use crate::auth::RolePolicy;
use crate::quiz::SourcingPolicy;

pub const DEFAULT_STORE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TRIVIA_URL: &str = "https://opentdb.com/api.php";
pub const DEFAULT_BACKUP_FILE: &str = "backupQuestions.json";
pub const DEFAULT_SESSION_FILE: &str = ".trivia-trek-session.json";
pub const DEFAULT_LOG_FILE: &str = "trivia-trek.log";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);
pub const DEFAULT_BACKUP_TIMEOUT: Duration = Duration::from_secs(4);
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_millis(2000);
pub const DEFAULT_SECONDS_PER_QUESTION: u32 = 45;
pub const DEFAULT_QUESTION_AMOUNT: u32 = 10;

/// Runtime settings shared by the CLI commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store_url: String,
    pub trivia_url: String,
    pub backup_file: Option<PathBuf>,
    /// json-server style seed file; when set, an in-memory store replaces HTTP.
    pub offline_db: Option<PathBuf>,
    pub session_file: PathBuf,
    pub log_file: PathBuf,
    pub request_timeout: Duration,
    pub backup_timeout: Duration,
    pub debounce: Duration,
    pub rate_limit_backoff: Duration,
    pub seconds_per_question: u32,
    pub question_amount: u32,
    pub role_policy: RolePolicy,
    pub delete_policy: DeletePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: DEFAULT_STORE_URL.to_string(),
            trivia_url: DEFAULT_TRIVIA_URL.to_string(),
            backup_file: Some(PathBuf::from(DEFAULT_BACKUP_FILE)),
            offline_db: None,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            backup_timeout: DEFAULT_BACKUP_TIMEOUT,
            debounce: DEFAULT_DEBOUNCE,
            rate_limit_backoff: DEFAULT_RATE_LIMIT_BACKOFF,
            seconds_per_question: DEFAULT_SECONDS_PER_QUESTION,
            question_amount: DEFAULT_QUESTION_AMOUNT,
            role_policy: RolePolicy::default(),
            delete_policy: DeletePolicy::default(),
        }
    }
}

impl Config {
    pub fn sourcing(&self) -> SourcingPolicy {
        SourcingPolicy {
            amount: self.question_amount,
            rate_limit_backoff: self.rate_limit_backoff,
        }
    }
}
