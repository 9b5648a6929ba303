pub mod achievements;
pub mod activity;
pub mod admin;
pub mod favorites;
pub mod news;
pub mod progress;
pub mod user;
