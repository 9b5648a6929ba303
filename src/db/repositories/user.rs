use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait, sea_query::Expr,
};
use tracing::info;

use crate::entities::{prelude::*, roles, users};
use crate::services::leveling::{self, LevelSnapshot};

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<users::Model>> {
        Users::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user by id")
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")
    }

    pub async fn exists(&self, user_id: &str) -> Result<bool> {
        Ok(self.get(user_id).await?.is_some())
    }

    /// Inserts the user row and its default role in one transaction.
    pub async fn create_with_role(
        &self,
        user_id: &str,
        username: &str,
        email: &str,
        password: &str,
        created_at: &str,
    ) -> Result<()> {
        let txn = self.conn.begin().await?;

        let user = users::ActiveModel {
            user_id: Set(user_id.to_string()),
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password: Set(password.to_string()),
            avatar_path: Set(None),
            level: Set(1),
            exp: Set(0),
            created_at: Set(created_at.to_string()),
        };
        Users::insert(user).exec(&txn).await?;

        let role = roles::ActiveModel {
            user_id: Set(user_id.to_string()),
            role: Set("user".to_string()),
        };
        Roles::insert(role).exec(&txn).await?;

        txn.commit().await?;

        info!("Registered user {} ({})", username, user_id);
        Ok(())
    }

    /// Create-or-update for the profile upsert endpoint. A missing email
    /// keeps the stored value; a fresh row gets the remaining columns
    /// filled with their registration defaults.
    pub async fn upsert_profile(
        &self,
        user_id: &str,
        username: &str,
        email: Option<&str>,
    ) -> Result<()> {
        let txn = self.conn.begin().await?;

        let existing = Users::find_by_id(user_id)
            .one(&txn)
            .await
            .context("Failed to query user for profile upsert")?;

        if let Some(user) = existing {
            let mut active: users::ActiveModel = user.into();
            active.username = Set(username.to_string());
            if let Some(email) = email {
                active.email = Set(email.to_lowercase());
            }
            active.update(&txn).await?;
        } else {
            let user = users::ActiveModel {
                user_id: Set(user_id.to_string()),
                username: Set(username.to_string()),
                email: Set(email.map(str::to_lowercase).unwrap_or_default()),
                password: Set(String::new()),
                avatar_path: Set(None),
                level: Set(1),
                exp: Set(0),
                created_at: Set(chrono::Utc::now().to_rfc3339()),
            };
            Users::insert(user).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }

    /// Full profile update; the avatar path is only touched when a new one
    /// was uploaded. Returns the number of matched rows.
    pub async fn update_profile(
        &self,
        user_id: &str,
        username: &str,
        email: &str,
        avatar_path: Option<&str>,
    ) -> Result<u64> {
        let mut update = Users::update_many()
            .col_expr(users::Column::Username, Expr::value(username))
            .col_expr(users::Column::Email, Expr::value(email));
        if let Some(path) = avatar_path {
            update = update.col_expr(users::Column::AvatarPath, Expr::value(path));
        }
        let result = update
            .filter(users::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn set_avatar_path(&self, user_id: &str, avatar_path: &str) -> Result<u64> {
        let result = Users::update_many()
            .col_expr(users::Column::AvatarPath, Expr::value(avatar_path))
            .filter(users::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn avatar_path(&self, user_id: &str) -> Result<Option<String>> {
        let user = self.get(user_id).await?;
        Ok(user.and_then(|u| u.avatar_path))
    }

    pub async fn level_progress(&self, user_id: &str) -> Result<Option<LevelSnapshot>> {
        let user = self.get(user_id).await?;
        Ok(user.map(|u| LevelSnapshot {
            level: u.level,
            exp: u.exp,
        }))
    }

    /// Single-step experience award, usable inside a caller-owned
    /// transaction (progress cascade, achievement unlock). Returns `None`
    /// when the user does not exist.
    pub async fn award_exp<C: ConnectionTrait>(
        conn: &C,
        user_id: &str,
        award: i32,
    ) -> Result<Option<LevelSnapshot>> {
        let Some(user) = Users::find_by_id(user_id).one(conn).await? else {
            return Ok(None);
        };

        let snapshot = leveling::award_single_step(user.level, user.exp, award);

        let mut active: users::ActiveModel = user.into();
        active.level = Set(snapshot.level);
        active.exp = Set(snapshot.exp);
        active.update(conn).await?;

        Ok(Some(snapshot))
    }

    /// Rollover experience award for the watch-episode action.
    pub async fn award_episode_exp(
        &self,
        user_id: &str,
        award: i32,
    ) -> Result<Option<LevelSnapshot>> {
        let txn = self.conn.begin().await?;

        let Some(user) = Users::find_by_id(user_id).one(&txn).await? else {
            return Ok(None);
        };

        let snapshot = leveling::award_with_rollover(user.level, user.exp, award);

        let mut active: users::ActiveModel = user.into();
        active.level = Set(snapshot.level);
        active.exp = Set(snapshot.exp);
        active.update(&txn).await?;

        txn.commit().await?;

        Ok(Some(snapshot))
    }

    pub async fn list_all(&self) -> Result<Vec<users::Model>> {
        Users::find()
            .all(&self.conn)
            .await
            .context("Failed to list users")
    }
}
