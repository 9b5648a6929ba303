pub use super::achievements::Entity as Achievements;
pub use super::administrators::Entity as Administrators;
pub use super::episode_progress::Entity as EpisodeProgress;
pub use super::favorites::Entity as Favorites;
pub use super::news::Entity as News;
pub use super::now_watching::Entity as NowWatching;
pub use super::recent::Entity as Recent;
pub use super::reviews::Entity as Reviews;
pub use super::roles::Entity as Roles;
pub use super::user_achievements::Entity as UserAchievements;
pub use super::users::Entity as Users;
pub use super::watch_progress::Entity as WatchProgress;
