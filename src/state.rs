use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, AvatarStore, CredentialVerifier, PlaintextVerifier, SeaOrmAccountService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub accounts: Arc<dyn AccountService>,

    pub verifier: Arc<dyn CredentialVerifier>,

    pub avatars: Arc<AvatarStore>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.database.path,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;

        let avatars = Arc::new(AvatarStore::new(config.clone()));
        let config_arc = Arc::new(RwLock::new(config));

        let verifier: Arc<dyn CredentialVerifier> = Arc::new(PlaintextVerifier);
        let accounts: Arc<dyn AccountService> =
            Arc::new(SeaOrmAccountService::new(store.clone(), verifier.clone()));

        Ok(Self {
            config: config_arc,
            store,
            accounts,
            verifier,
            avatars,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
