pub mod favorites;
pub use favorites::{FavoriteAction, FavoriteOutcome};

pub mod watch;
pub use watch::{ProgressUpdate, WatchStatus};
