use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,

    pub username: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Stored as-is; comparison happens behind `CredentialVerifier`.
    pub password: String,

    /// `/avatars/<user_id><ext>` once an avatar has been uploaded.
    pub avatar_path: Option<String>,

    pub level: i32,

    pub exp: i32,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
