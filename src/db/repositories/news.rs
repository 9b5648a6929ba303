use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};
use tracing::info;

use crate::entities::{news, prelude::*, reviews};

pub struct NewsRepository {
    conn: DatabaseConnection,
}

impl NewsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        title: &str,
        description: &str,
        author: Option<&str>,
    ) -> Result<()> {
        let post = news::ActiveModel {
            title: Set(title.to_string()),
            description: Set(description.to_string()),
            author: Set(author.map(ToString::to_string)),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        News::insert(post).exec(&self.conn).await?;

        info!("Published news post: {}", title);
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<news::Model>> {
        News::find()
            .order_by_desc(news::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list news")
    }

    pub async fn latest(&self, limit: u64) -> Result<Vec<news::Model>> {
        News::find()
            .order_by_desc(news::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list latest news")
    }

    pub async fn delete(&self, news_id: i32) -> Result<()> {
        News::delete_by_id(news_id).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn add_review(&self, username: Option<&str>, text: &str) -> Result<()> {
        let review = reviews::ActiveModel {
            username: Set(username.map(ToString::to_string)),
            text: Set(text.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        Reviews::insert(review).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn list_reviews(&self, limit: u64, offset: u64) -> Result<Vec<reviews::Model>> {
        Reviews::find()
            .order_by_desc(reviews::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("Failed to list reviews")
    }
}
