use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use tracing::info;

use crate::entities::{favorites, prelude::*, watch_progress};
use crate::models::{FavoriteAction, FavoriteOutcome};

pub struct FavoritesRepository {
    conn: DatabaseConnection,
}

impl FavoritesRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Adds, refreshes or removes a favorite inside one transaction.
    /// Re-adding an existing favorite overwrites its display fields and
    /// bumps it to the top of the list.
    pub async fn toggle(
        &self,
        user_id: &str,
        action: FavoriteAction,
        anime_id: &str,
        title: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<FavoriteOutcome> {
        let txn = self.conn.begin().await?;

        let outcome = match action {
            FavoriteAction::Add => {
                let existing = Favorites::find()
                    .filter(favorites::Column::UserId.eq(user_id))
                    .filter(favorites::Column::AnimeId.eq(anime_id))
                    .one(&txn)
                    .await
                    .context("Failed to query existing favorite")?;

                let now = chrono::Utc::now().to_rfc3339();
                if let Some(row) = existing {
                    let mut active: favorites::ActiveModel = row.into();
                    active.title = Set(title.map(ToString::to_string));
                    active.image_url = Set(image_url.map(ToString::to_string));
                    active.created_at = Set(now);
                    active.update(&txn).await?;
                    FavoriteOutcome::Updated
                } else {
                    let row = favorites::ActiveModel {
                        user_id: Set(user_id.to_string()),
                        anime_id: Set(anime_id.to_string()),
                        title: Set(title.map(ToString::to_string)),
                        image_url: Set(image_url.map(ToString::to_string)),
                        created_at: Set(now),
                        ..Default::default()
                    };
                    Favorites::insert(row).exec(&txn).await?;
                    FavoriteOutcome::Added
                }
            }
            FavoriteAction::Remove => {
                let result = Favorites::delete_many()
                    .filter(favorites::Column::UserId.eq(user_id))
                    .filter(favorites::Column::AnimeId.eq(anime_id))
                    .exec(&txn)
                    .await?;

                if result.rows_affected > 0 {
                    FavoriteOutcome::Removed
                } else {
                    FavoriteOutcome::Missing
                }
            }
        };

        txn.commit().await?;

        info!(
            "Favorite {} for user {} anime {}: {:?}",
            action.as_str(),
            user_id,
            anime_id,
            outcome
        );
        Ok(outcome)
    }

    /// Favorites newest first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<favorites::Model>> {
        Favorites::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .order_by_desc(favorites::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list favorites")
    }

    pub async fn count(&self, user_id: &str) -> Result<u64> {
        Favorites::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count favorites")
    }

    /// Favorites enriched with the user's watch history for the same
    /// anime, most recently watched first.
    pub async fn detailed(&self, user_id: &str) -> Result<Vec<FavoriteDetailedRow>> {
        Favorites::find()
            .select_only()
            .column(favorites::Column::AnimeId)
            .column(favorites::Column::Title)
            .column(favorites::Column::ImageUrl)
            .column_as(
                Expr::col((watch_progress::Entity, watch_progress::Column::AnimeId)).count(),
                "episodes_watched",
            )
            .column_as(
                Expr::col((watch_progress::Entity, watch_progress::Column::LastWatchDate)).max(),
                "last_watch_date",
            )
            .join(
                JoinType::LeftJoin,
                favorites::Entity::belongs_to(watch_progress::Entity)
                    .from(favorites::Column::AnimeId)
                    .to(watch_progress::Column::AnimeId)
                    .on_condition(|_left, _right| {
                        sea_orm::Condition::all().add(
                            sea_orm::sea_query::Expr::col((
                                favorites::Entity,
                                favorites::Column::UserId,
                            ))
                            .equals((watch_progress::Entity, watch_progress::Column::UserId)),
                        )
                    })
                    .into(),
            )
            .filter(favorites::Column::UserId.eq(user_id))
            .group_by(favorites::Column::AnimeId)
            .group_by(favorites::Column::Title)
            .group_by(favorites::Column::ImageUrl)
            .order_by_desc(
                Expr::col((watch_progress::Entity, watch_progress::Column::LastWatchDate)).max(),
            )
            .into_model::<FavoriteDetailedRow>()
            .all(&self.conn)
            .await
            .context("Failed to join favorites with watch history")
    }
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct FavoriteDetailedRow {
    pub anime_id: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub episodes_watched: i64,
    pub last_watch_date: Option<String>,
}
