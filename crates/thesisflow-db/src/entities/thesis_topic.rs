//! ThesisTopic entity
//!
//! Read-only shim over the topic registry: the lifecycle engine only ever
//! reads `title` when composing notification text. Topic management itself
//! happens upstream.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "thesis_topics")]
pub struct Model {
    /// Topic UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Topic title, used verbatim in notification messages
    pub title: String,

    /// When the topic was registered
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Teams working on this topic
    #[sea_orm(has_many = "super::team::Entity")]
    Teams,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teams.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
