pub mod accounts;
pub use accounts::{AccountError, AccountService};

pub mod accounts_impl;
pub use accounts_impl::SeaOrmAccountService;

pub mod avatars;
pub use avatars::AvatarStore;

pub mod credentials;
pub use credentials::{CredentialVerifier, PlaintextVerifier};

pub mod leveling;
