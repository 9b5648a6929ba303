use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QuerySelect, RelationTrait, Set, TransactionTrait, sea_query::Expr,
};
use tracing::info;

use crate::entities::{achievements, prelude::*, user_achievements};
use crate::services::leveling::LevelSnapshot;

use super::user::UserRepository;

pub struct AchievementRepository {
    conn: DatabaseConnection,
}

impl AchievementRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        name: &str,
        description: &str,
        icon_path: Option<&str>,
        exp_reward: i32,
    ) -> Result<i32> {
        let row = achievements::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            icon_path: Set(icon_path.map(ToString::to_string)),
            exp_reward: Set(exp_reward),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let result = Achievements::insert(row).exec(&self.conn).await?;

        info!("Created achievement {} ({})", name, result.last_insert_id);
        Ok(result.last_insert_id)
    }

    pub async fn list(&self) -> Result<Vec<achievements::Model>> {
        Achievements::find()
            .all(&self.conn)
            .await
            .context("Failed to list achievements")
    }

    pub async fn get(&self, achievement_id: i32) -> Result<Option<achievements::Model>> {
        Achievements::find_by_id(achievement_id)
            .one(&self.conn)
            .await
            .context("Failed to query achievement")
    }

    /// Achievements the user has unlocked, joined with their definitions.
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<UnlockedAchievementRow>> {
        UserAchievements::find()
            .select_only()
            .column_as(
                Expr::col((achievements::Entity, achievements::Column::Id)),
                "id",
            )
            .column_as(
                Expr::col((achievements::Entity, achievements::Column::Name)),
                "name",
            )
            .column_as(
                Expr::col((achievements::Entity, achievements::Column::Description)),
                "description",
            )
            .column_as(
                Expr::col((achievements::Entity, achievements::Column::IconPath)),
                "icon_path",
            )
            .column_as(
                Expr::col((achievements::Entity, achievements::Column::ExpReward)),
                "exp_reward",
            )
            .column(user_achievements::Column::UnlockedAt)
            .join(
                JoinType::InnerJoin,
                user_achievements::Relation::Achievements.def(),
            )
            .filter(user_achievements::Column::UserId.eq(user_id))
            .into_model::<UnlockedAchievementRow>()
            .all(&self.conn)
            .await
            .context("Failed to list unlocked achievements")
    }

    /// Records the unlock and credits the reward in one transaction. A
    /// second unlock of the same achievement is reported instead of
    /// crediting twice.
    pub async fn unlock(&self, user_id: &str, achievement_id: i32) -> Result<UnlockOutcome> {
        let txn = self.conn.begin().await?;

        let already = UserAchievements::find()
            .filter(user_achievements::Column::UserId.eq(user_id))
            .filter(user_achievements::Column::AchievementId.eq(achievement_id))
            .one(&txn)
            .await
            .context("Failed to query unlocked achievement")?;
        if already.is_some() {
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }

        let Some(achievement) = Achievements::find_by_id(achievement_id).one(&txn).await? else {
            return Ok(UnlockOutcome::UnknownAchievement);
        };

        let unlock = user_achievements::ActiveModel {
            user_id: Set(user_id.to_string()),
            achievement_id: Set(achievement_id),
            unlocked_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        UserAchievements::insert(unlock).exec(&txn).await?;

        let snapshot = UserRepository::award_exp(&txn, user_id, achievement.exp_reward).await?;
        let Some(snapshot) = snapshot else {
            return Ok(UnlockOutcome::UnknownUser);
        };

        txn.commit().await?;

        info!(
            "User {} unlocked achievement {} (+{} exp)",
            user_id, achievement_id, achievement.exp_reward
        );
        Ok(UnlockOutcome::Unlocked {
            exp_gained: achievement.exp_reward,
            snapshot,
        })
    }
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct UnlockedAchievementRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub icon_path: Option<String>,
    pub exp_reward: i32,
    pub unlocked_at: String,
}

#[derive(Debug, Clone)]
pub enum UnlockOutcome {
    Unlocked {
        exp_gained: i32,
        snapshot: LevelSnapshot,
    },
    AlreadyUnlocked,
    UnknownAchievement,
    UnknownUser,
}
