use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One JSON document, addressed by its full slash-separated path.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub path: String,

    /// Path of the enclosing collection, e.g. `users/a@b.co/user_items`.
    #[sea_orm(indexed)]
    pub parent: String,
    /// Last segment of `parent`; collection-group queries filter on it.
    #[sea_orm(indexed)]
    pub collection_id: String,
    pub document_id: String,

    /// Document body; always a JSON object.
    pub data: Json,

    pub create_time: DateTimeUtc,
    pub update_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
