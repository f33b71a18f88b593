//! Login state as an explicit context object.
//!
//! [`AuthSession`] is created once, restored with [`AuthSession::init`] and
//! torn down with [`AuthSession::logout`]; nothing about the current user
//! lives in globals.

mod google;
mod session_store;

use std::sync::Arc;

use thiserror::Error;

use crate::error::ValidationError;
use crate::models::{Role, User};
use crate::store::{DataStore, StoreError};

pub use google::GoogleProfile;
pub use session_store::{FileSessionStore, SessionStore};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid Google credential: {0}")]
    InvalidToken(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// How a user's role is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum RolePolicy {
    /// Only the stored `role` field counts; missing means user.
    #[default]
    Explicit,
    /// Stored admin role, or any email containing "admin".
    EmailHeuristic,
}

impl RolePolicy {
    pub fn resolve(self, user: &User) -> Role {
        match self {
            RolePolicy::Explicit => user.role.unwrap_or_default(),
            RolePolicy::EmailHeuristic => {
                if user.role == Some(Role::Admin) || Self::email_suggests_admin(&user.email) {
                    Role::Admin
                } else {
                    Role::User
                }
            }
        }
    }

    /// Role given to a brand-new account.
    fn for_new_account(self, email: &str) -> Role {
        match self {
            RolePolicy::EmailHeuristic if Self::email_suggests_admin(email) => Role::Admin,
            _ => Role::User,
        }
    }

    fn email_suggests_admin(email: &str) -> bool {
        email.to_lowercase().contains("admin")
    }
}

/// Signup form fields.
#[derive(Debug, Clone)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Signup {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "Name is required"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::new("email", "Email is required"));
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::new("password", "Passwords do not match!"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::new(
                "password",
                format!("Password must be at least {} characters long!", MIN_PASSWORD_LEN),
            ));
        }
        Ok(())
    }
}

pub struct AuthSession<S, P> {
    store: Arc<S>,
    sessions: P,
    policy: RolePolicy,
    current: Option<User>,
}

impl<S: DataStore, P: SessionStore> AuthSession<S, P> {
    pub fn new(store: Arc<S>, sessions: P, policy: RolePolicy) -> Self {
        Self {
            store,
            sessions,
            policy,
            current: None,
        }
    }

    /// Restores a persisted login. An unreadable session file is discarded.
    pub async fn init(&mut self) -> Option<&User> {
        match self.sessions.load().await {
            Ok(user) => self.current = user,
            Err(e) => {
                tracing::warn!("discarding stored session: {}", e);
                if let Err(e) = self.sessions.clear().await {
                    tracing::warn!("failed to clear session: {}", e);
                }
                self.current = None;
            }
        }
        self.current.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.current.as_ref().map(|u| self.policy.resolve(u))
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// Matches by email, accepting any password for accounts without one.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let users = self.store.users().await?;
        let found = users
            .into_iter()
            .find(|u| u.email == email && (u.password == password || u.password.is_empty()))
            .ok_or(AuthError::InvalidCredentials)?;

        let mut user = found;
        user.role = Some(self.policy.resolve(&user));
        tracing::info!("{} logged in", user.email);
        self.establish(user).await
    }

    pub async fn signup(&mut self, form: Signup) -> Result<User, AuthError> {
        form.validate()?;
        let user = User {
            id: None,
            role: Some(self.policy.for_new_account(&form.email)),
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password,
            google_id: None,
        };
        let created = self.store.create_user(&user).await?;
        tracing::info!("created account {}", created.email);
        self.establish(created).await
    }

    /// Creates the account on first Google login, otherwise reconciles the
    /// stored role with the policy.
    pub async fn google_login(&mut self, profile: GoogleProfile) -> Result<User, AuthError> {
        let users = self.store.users().await?;
        let user = match users.into_iter().find(|u| u.email == profile.email) {
            None => {
                let user = User {
                    id: None,
                    role: Some(self.policy.for_new_account(&profile.email)),
                    name: profile.name,
                    email: profile.email,
                    password: String::new(),
                    google_id: Some(profile.sub),
                };
                tracing::info!("created Google account {}", user.email);
                self.store.create_user(&user).await?
            }
            Some(mut existing) => {
                let role = self.policy.resolve(&existing);
                if existing.role != Some(role) {
                    if let Some(id) = existing.id.as_deref() {
                        self.store.update_user_role(id, role).await?;
                        tracing::info!("updated role of {} to {:?}", existing.email, role);
                    }
                    existing.role = Some(role);
                }
                existing.google_id.get_or_insert(profile.sub);
                existing
            }
        };
        self.establish(user).await
    }

    pub async fn logout(&mut self) -> Result<(), AuthError> {
        if let Some(user) = self.current.take() {
            tracing::info!("{} logged out", user.email);
        }
        self.sessions.clear().await
    }

    async fn establish(&mut self, user: User) -> Result<User, AuthError> {
        self.sessions.save(&user).await?;
        self.current = Some(user.clone());
        Ok(user)
    }
}
