//! Actor resolution: one role lookup at the boundary
//!
//! The profile-role capability is resolved once per incoming action and
//! passed into every engine call; operations never re-derive it.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use thesisflow_db::entities::{account, student_profile, supervisor_profile};

use crate::error::{LifecycleError, LifecycleResult};

/// Profile-role capability held by an acting account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Account holds a student profile
    Student { profile: Uuid },
    /// Account holds a supervisor profile
    Supervisor { profile: Uuid },
    /// Account carries the dean capability (no profile row)
    Dean,
}

/// An authenticated account with its resolved role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub account_id: Uuid,
    pub role: Role,
}

impl Actor {
    /// Resolve the role for an account: student profile first, then
    /// supervisor profile, then the dean flag on the account itself.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NoProfile`] when none of the three
    /// capabilities resolve.
    pub async fn resolve(db: &DatabaseConnection, account_id: Uuid) -> LifecycleResult<Self> {
        if let Some(profile) = student_profile::Entity::find()
            .filter(student_profile::Column::AccountId.eq(account_id))
            .one(db)
            .await?
        {
            return Ok(Self {
                account_id,
                role: Role::Student {
                    profile: profile.id,
                },
            });
        }

        if let Some(profile) = supervisor_profile::Entity::find()
            .filter(supervisor_profile::Column::AccountId.eq(account_id))
            .one(db)
            .await?
        {
            return Ok(Self {
                account_id,
                role: Role::Supervisor {
                    profile: profile.id,
                },
            });
        }

        if let Some(acct) = account::Entity::find_by_id(account_id).one(db).await? {
            if acct.role == account::DEAN_ROLE {
                return Ok(Self {
                    account_id,
                    role: Role::Dean,
                });
            }
        }

        Err(LifecycleError::NoProfile)
    }

    /// Student profile id, if the actor holds the student capability.
    pub fn student_profile(&self) -> Option<Uuid> {
        match self.role {
            Role::Student { profile } => Some(profile),
            _ => None,
        }
    }

    /// Supervisor profile id, if the actor holds the supervisor capability.
    pub fn supervisor_profile(&self) -> Option<Uuid> {
        match self.role {
            Role::Supervisor { profile } => Some(profile),
            _ => None,
        }
    }

    pub fn is_dean(&self) -> bool {
        matches!(self.role, Role::Dean)
    }
}
