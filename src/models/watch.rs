use std::fmt;

/// Watch state of one (user, anime) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStatus {
    Planned,
    Watching,
    Completed,
    Dropped,
}

impl WatchStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Watching => "watching",
            Self::Completed => "completed",
            Self::Dropped => "dropped",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "planned" => Some(Self::Planned),
            "watching" => Some(Self::Watching),
            "completed" => Some(Self::Completed),
            "dropped" => Some(Self::Dropped),
            _ => None,
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated input for a progress upsert, after the handler has checked the
/// status string and resolved the caller.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub user_id: String,
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub status: WatchStatus,
    pub episodes_watched: i32,
    pub total_episodes: Option<i32>,
}
