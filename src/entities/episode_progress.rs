use sea_orm::entity::prelude::*;

/// Per-episode playback position, unique per (user, anime, episode).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "episode_progress")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: String,

    pub anime_id: String,

    pub episode_number: i32,

    /// Fraction or seconds, whatever the player reports; opaque to us.
    pub progress: f64,

    pub timestamp: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
