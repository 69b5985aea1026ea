//! Shared read helpers over the lifecycle entities

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{team, team_member};

/// How an account resolves to a team
#[derive(Debug, Clone, PartialEq)]
pub enum TeamLookup {
    /// The account administers this team
    Owned(team::Model),
    /// The account's student profile is a member of this team
    Member(team::Model),
}

impl TeamLookup {
    pub fn into_team(self) -> team::Model {
        match self {
            TeamLookup::Owned(team) | TeamLookup::Member(team) => team,
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, TeamLookup::Owned(_))
    }
}

/// Resolve the team for an account: owner match first, then membership
/// through the student profile when one is given.
pub async fn team_for_account<C: ConnectionTrait>(
    db: &C,
    account_id: Uuid,
    student_profile: Option<Uuid>,
) -> Result<Option<TeamLookup>, DbErr> {
    if let Some(team) = team::Entity::find()
        .filter(team::Column::OwnerAccountId.eq(account_id))
        .one(db)
        .await?
    {
        return Ok(Some(TeamLookup::Owned(team)));
    }

    if let Some(student_id) = student_profile {
        if let Some(membership) = student_membership(db, student_id).await? {
            if let Some(team) = team::Entity::find_by_id(membership.team_id).one(db).await? {
                return Ok(Some(TeamLookup::Member(team)));
            }
        }
    }

    Ok(None)
}

/// Current team membership of a student, if any. At most one row exists.
pub async fn student_membership<C: ConnectionTrait>(
    db: &C,
    student_id: Uuid,
) -> Result<Option<team_member::Model>, DbErr> {
    team_member::Entity::find()
        .filter(team_member::Column::StudentId.eq(student_id))
        .one(db)
        .await
}
