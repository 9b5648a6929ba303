//! Domain service for account registration and login.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Registration result: the fresh account plus its session token.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredAccount {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub level: i32,
    pub exp: i32,
    pub created_at: String,
}

/// Login result with a freshly issued session token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedAccount {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub token: String,
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates an account with the default role.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::EmailTaken`] when the email is already in use.
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisteredAccount, AccountError>;

    /// Verifies credentials and issues a new token.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCredentials`] for an unknown email or
    /// a wrong password, without distinguishing the two.
    async fn login(&self, email: &str, password: &str)
    -> Result<AuthenticatedAccount, AccountError>;
}
