//! SupervisorProfile entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "supervisor_profiles")]
pub struct Model {
    /// Profile UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning account (one profile per account)
    #[sea_orm(unique)]
    pub account_id: Uuid,

    pub full_name: String,

    /// When the profile was created
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Account,

    /// Teams this supervisor is assigned to
    #[sea_orm(has_many = "super::team::Entity")]
    SupervisedTeams,

    /// Requests targeting this supervisor
    #[sea_orm(has_many = "super::supervisor_request::Entity")]
    IncomingRequests,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::supervisor_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IncomingRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
