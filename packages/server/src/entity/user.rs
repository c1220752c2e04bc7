use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "identity_user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uid: String,

    #[sea_orm(unique)]
    pub email: String,
    /// E.164, e.g. `+18314590111`.
    #[sea_orm(unique)]
    pub phone_number: Option<String>,
    pub display_name: Option<String>,

    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Custom claims embedded in issued tokens, e.g. `{"role": "hacker"}`.
    pub custom_claims: Json,
    pub disabled: bool,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
