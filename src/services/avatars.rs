use crate::config::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Writes uploaded avatars to disk under the configured directory.
///
/// Files are named after the user id with the upload's extension, so a
/// re-upload replaces the previous avatar in place.
pub struct AvatarStore {
    config: Config,
}

impl AvatarStore {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Stores the bytes and returns the public path the row should carry.
    pub async fn save(&self, user_id: &str, original_name: &str, bytes: &[u8]) -> Result<String> {
        let file_name = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map_or_else(|| user_id.to_string(), |ext| format!("{user_id}.{ext}"));

        let avatars_dir = PathBuf::from(&self.config.media.avatars_path);
        if !avatars_dir.exists() {
            fs::create_dir_all(&avatars_dir).await?;
        }

        let file_path = avatars_dir.join(&file_name);

        fs::write(&file_path, bytes)
            .await
            .with_context(|| format!("Failed to write avatar to {}", file_path.display()))?;

        info!(user_id = %user_id, path = %file_path.display(), "Stored avatar");

        Ok(format!("/avatars/{file_name}"))
    }
}
