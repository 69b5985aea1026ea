//! Account entity mirroring the upstream identity system

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role marker. Deans carry no profile row; their capability is
/// flagged directly on the account.
pub const DEAN_ROLE: &str = "dean";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Account UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Login email (unique)
    #[sea_orm(unique)]
    pub email: String,

    /// Display name
    pub full_name: String,

    /// Coarse account role ("member" by default, "dean" for dean capability)
    pub role: String,

    /// When the account was created
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Optional student profile attached to this account
    #[sea_orm(has_one = "super::student_profile::Entity")]
    StudentProfile,

    /// Optional supervisor profile attached to this account
    #[sea_orm(has_one = "super::supervisor_profile::Entity")]
    SupervisorProfile,

    /// Durable notifications delivered to this account
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::student_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentProfile.def()
    }
}

impl Related<super::supervisor_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupervisorProfile.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
