//! Team entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of a team in the approval workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum TeamStatus {
    /// Freshly formed, no supervisor yet
    #[sea_orm(string_value = "pending")]
    Pending,

    /// A supervisor accepted responsibility for the team
    #[sea_orm(string_value = "accepted")]
    Accepted,

    /// Returned by the dean with a comment
    #[sea_orm(string_value = "returned")]
    Returned,

    /// Approved by the dean
    #[sea_orm(string_value = "approved")]
    Approved,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    /// Team UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Account that administers the team. Initially the founding student;
    /// reassigned to the supervisor's account on supervisor acceptance.
    pub owner_account_id: Uuid,

    /// Thesis topic the team works on, optional until chosen
    pub thesis_topic_id: Option<Uuid>,

    /// Assigned supervisor, set only by supervisor-request acceptance
    pub supervisor_id: Option<Uuid>,

    /// Where the team stands in the approval workflow
    pub status: TeamStatus,

    /// Free-text comment persisted when the dean returns the team
    pub return_comment: Option<String>,

    /// When the team was created
    pub created_at: ChronoDateTimeUtc,

    /// When the team was last updated
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Team is administered by an account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::OwnerAccountId",
        to = "super::account::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Owner,

    /// Team works on a thesis topic
    #[sea_orm(
        belongs_to = "super::thesis_topic::Entity",
        from = "Column::ThesisTopicId",
        to = "super::thesis_topic::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    ThesisTopic,

    /// Team is supervised by a supervisor profile
    #[sea_orm(
        belongs_to = "super::supervisor_profile::Entity",
        from = "Column::SupervisorId",
        to = "super::supervisor_profile::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Supervisor,

    /// Team has student members
    #[sea_orm(has_many = "super::team_member::Entity")]
    Members,

    /// Join requests targeting this team
    #[sea_orm(has_many = "super::join_request::Entity")]
    JoinRequests,

    /// Supervisor requests filed by this team
    #[sea_orm(has_many = "super::supervisor_request::Entity")]
    SupervisorRequests,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::thesis_topic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ThesisTopic.def()
    }
}

impl Related<super::supervisor_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supervisor.def()
    }
}

impl Related<super::team_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::join_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JoinRequests.def()
    }
}

impl Related<super::supervisor_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupervisorRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
