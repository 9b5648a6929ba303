//! `SeaORM` implementation of the `AccountService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::Store;
use crate::services::accounts::{
    AccountError, AccountService, AuthenticatedAccount, RegisteredAccount,
};
use crate::services::credentials::CredentialVerifier;

pub struct SeaOrmAccountService {
    store: Store,
    verifier: Arc<dyn CredentialVerifier>,
}

impl SeaOrmAccountService {
    #[must_use]
    pub fn new(store: Store, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { store, verifier }
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisteredAccount, AccountError> {
        if self.store.get_user_by_email(email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let user_id = Uuid::new_v4().to_string();
        let token = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        self.store
            .create_user_with_role(&user_id, username, email, password, &created_at)
            .await?;

        Ok(RegisteredAccount {
            token,
            user_id,
            username: username.to_string(),
            email: email.to_string(),
            role: "user".to_string(),
            level: 1,
            exp: 0,
            created_at,
        })
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedAccount, AccountError> {
        let Some(user) = self.store.get_user_by_email(email).await? else {
            return Err(AccountError::InvalidCredentials);
        };

        if !self.verifier.verify(&user.password, password).await {
            return Err(AccountError::InvalidCredentials);
        }

        let role = self
            .store
            .role_of(&user.user_id)
            .await?
            .unwrap_or_else(|| "user".to_string());

        Ok(AuthenticatedAccount {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            role,
            token: Uuid::new_v4().to_string(),
        })
    }
}
