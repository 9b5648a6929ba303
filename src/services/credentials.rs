//! Secret comparison seam.
//!
//! Login passwords and the administrator setup key are checked through
//! this trait, so the storage scheme can move to hashing without touching
//! the account flows. The only implementation today compares plaintext,
//! which is what the database holds.

#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Compares a supplied secret against the stored one.
    async fn verify(&self, stored: &str, supplied: &str) -> bool;
}

pub struct PlaintextVerifier;

#[async_trait::async_trait]
impl CredentialVerifier for PlaintextVerifier {
    async fn verify(&self, stored: &str, supplied: &str) -> bool {
        stored == supplied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_matching_secret() {
        assert!(PlaintextVerifier.verify("hunter2", "hunter2").await);
    }

    #[tokio::test]
    async fn rejects_mismatch_and_case_changes() {
        assert!(!PlaintextVerifier.verify("hunter2", "hunter3").await);
        assert!(!PlaintextVerifier.verify("hunter2", "Hunter2").await);
        assert!(!PlaintextVerifier.verify("hunter2", "").await);
    }
}
