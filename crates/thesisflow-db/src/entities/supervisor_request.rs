//! SupervisorRequest entity: a team owner's request for a supervisor
//!
//! A partial unique index on `team_id WHERE status = 'pending'` caps a team
//! at one open request at any time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use super::join_request::RequestStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "supervisor_requests")]
pub struct Model {
    /// Request UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Requesting team
    pub team_id: Uuid,

    /// Targeted supervisor profile
    pub supervisor_id: Uuid,

    pub status: RequestStatus,

    /// When the request was filed
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Team,

    #[sea_orm(
        belongs_to = "super::supervisor_profile::Entity",
        from = "Column::SupervisorId",
        to = "super::supervisor_profile::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Supervisor,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::supervisor_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supervisor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
