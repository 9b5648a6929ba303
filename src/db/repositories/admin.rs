use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use tracing::info;

use crate::entities::{administrators, prelude::*, roles, users};

pub struct AdminRepository {
    conn: DatabaseConnection,
}

impl AdminRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn role_of(&self, user_id: &str) -> Result<Option<String>> {
        let role = Roles::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query role")?;
        Ok(role.map(|r| r.role))
    }

    pub async fn any_admins(&self) -> Result<bool> {
        let count = Administrators::find()
            .count(&self.conn)
            .await
            .context("Failed to count administrators")?;
        Ok(count > 0)
    }

    /// Makes the user the (first) administrator: an administrators row
    /// plus the admin role, in one transaction.
    pub async fn appoint(&self, user_id: &str) -> Result<()> {
        let txn = self.conn.begin().await?;

        let admin = administrators::ActiveModel {
            user_id: Set(user_id.to_string()),
            admin_level: Set(1),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        Administrators::insert(admin).exec(&txn).await?;

        let role = roles::ActiveModel {
            user_id: Set(user_id.to_string()),
            role: Set("admin".to_string()),
        };
        Roles::insert(role)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(roles::Column::UserId)
                    .update_column(roles::Column::Role)
                    .to_owned(),
            )
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!("Appointed {} as administrator", user_id);
        Ok(())
    }

    /// Clears every administrator and demotes all roles back to user.
    pub async fn reset(&self) -> Result<()> {
        let txn = self.conn.begin().await?;

        Administrators::delete_many().exec(&txn).await?;
        Roles::update_many()
            .col_expr(roles::Column::Role, Expr::value("user"))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!("Administrator roster reset");
        Ok(())
    }

    /// Writes the role and keeps the administrators table in sync with it.
    pub async fn set_role(&self, user_id: &str, role: &str) -> Result<()> {
        let txn = self.conn.begin().await?;

        let assignment = roles::ActiveModel {
            user_id: Set(user_id.to_string()),
            role: Set(role.to_string()),
        };
        Roles::insert(assignment)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(roles::Column::UserId)
                    .update_column(roles::Column::Role)
                    .to_owned(),
            )
            .exec(&txn)
            .await?;

        if role == "admin" {
            let existing = Administrators::find()
                .filter(administrators::Column::UserId.eq(user_id))
                .one(&txn)
                .await?;
            if existing.is_none() {
                let admin = administrators::ActiveModel {
                    user_id: Set(user_id.to_string()),
                    admin_level: Set(1),
                    created_at: Set(chrono::Utc::now().to_rfc3339()),
                    ..Default::default()
                };
                Administrators::insert(admin).exec(&txn).await?;
            }
        } else {
            Administrators::delete_many()
                .filter(administrators::Column::UserId.eq(user_id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        info!("Role of {} set to {}", user_id, role);
        Ok(())
    }

    /// `None` when the user does not exist; otherwise whether their role
    /// is admin.
    pub async fn admin_check(&self, user_id: &str) -> Result<Option<bool>> {
        let user = Users::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for admin check")?;
        if user.is_none() {
            return Ok(None);
        }

        let role = self.role_of(user_id).await?;
        Ok(Some(role.as_deref() == Some("admin")))
    }

    pub async fn counts_by_role(&self) -> Result<(u64, u64)> {
        let users = Roles::find()
            .filter(roles::Column::Role.eq("user"))
            .count(&self.conn)
            .await
            .context("Failed to count user roles")?;
        let admins = Roles::find()
            .filter(roles::Column::Role.eq("admin"))
            .count(&self.conn)
            .await
            .context("Failed to count admin roles")?;
        Ok((users, admins))
    }

    /// Every account with its role, ordered by username.
    pub async fn list_users(&self) -> Result<Vec<AdminUserRow>> {
        Users::find()
            .select_only()
            .column(users::Column::UserId)
            .column(users::Column::Username)
            .column(users::Column::Email)
            .column(users::Column::AvatarPath)
            .column_as(Expr::col((roles::Entity, roles::Column::Role)), "role")
            .column(users::Column::CreatedAt)
            .join(
                JoinType::LeftJoin,
                users::Entity::belongs_to(roles::Entity)
                    .from(users::Column::UserId)
                    .to(roles::Column::UserId)
                    .into(),
            )
            .order_by_asc(users::Column::Username)
            .into_model::<AdminUserRow>()
            .all(&self.conn)
            .await
            .context("Failed to list users with roles")
    }

    /// Raw registration timestamps for the signup charts.
    pub async fn registration_dates(&self) -> Result<Vec<String>> {
        Users::find()
            .select_only()
            .column(users::Column::CreatedAt)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to collect registration dates")
    }
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct AdminUserRow {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub avatar_path: Option<String>,
    pub role: Option<String>,
    pub created_at: String,
}
