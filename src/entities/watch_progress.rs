use sea_orm::entity::prelude::*;

/// One row per (user, anime); uniqueness enforced by a composite index
/// created in the initial migration.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "watch_progress")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: String,

    pub anime_id: String,

    /// Denormalized display cache, coalesced on update.
    pub title: Option<String>,

    pub image_url: Option<String>,

    /// One of planned/watching/completed/dropped.
    pub status: String,

    pub episodes_watched: i32,

    pub total_episodes: Option<i32>,

    pub last_watch_date: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
