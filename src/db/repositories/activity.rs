use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{now_watching, prelude::*, recent};

pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn recent_for(&self, user_id: &str, limit: u64) -> Result<Vec<recent::Model>> {
        Recent::find()
            .filter(recent::Column::UserId.eq(user_id))
            .order_by_desc(recent::Column::ViewedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list recent anime")
    }

    /// Explicit recent entry. Unlike the progress cascade this overwrites
    /// the stored title and image as well.
    pub async fn push_recent(
        &self,
        user_id: &str,
        anime_id: &str,
        title: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<()> {
        let marker = recent::ActiveModel {
            user_id: Set(user_id.to_string()),
            anime_id: Set(anime_id.to_string()),
            title: Set(title.map(ToString::to_string)),
            image_url: Set(image_url.map(ToString::to_string)),
            viewed_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        Recent::insert(marker)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    recent::Column::UserId,
                    recent::Column::AnimeId,
                ])
                .update_columns([
                    recent::Column::Title,
                    recent::Column::ImageUrl,
                    recent::Column::ViewedAt,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    /// Site-wide spotlight list, one row per anime.
    pub async fn set_now_watching(
        &self,
        anime_id: &str,
        title: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<()> {
        let row = now_watching::ActiveModel {
            anime_id: Set(anime_id.to_string()),
            title: Set(title.map(ToString::to_string)),
            image_url: Set(image_url.map(ToString::to_string)),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        NowWatching::insert(row)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(now_watching::Column::AnimeId)
                    .update_columns([
                        now_watching::Column::Title,
                        now_watching::Column::ImageUrl,
                        now_watching::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn now_watching(&self, limit: u64) -> Result<Vec<now_watching::Model>> {
        NowWatching::find()
            .order_by_desc(now_watching::Column::UpdatedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list now-watching entries")
    }
}
