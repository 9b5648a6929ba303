pub mod prelude;

pub mod achievements;
pub mod administrators;
pub mod episode_progress;
pub mod favorites;
pub mod news;
pub mod now_watching;
pub mod recent;
pub mod reviews;
pub mod roles;
pub mod user_achievements;
pub mod users;
pub mod watch_progress;
