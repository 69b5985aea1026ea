//! Team reads, onboarding and supervisor-initiated deletion

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use thesisflow_db::entities::{
    team::{self, TeamStatus},
    team_member,
};
use thesisflow_db::queries;

use crate::actor::{Actor, Role};
use crate::error::{LifecycleError, LifecycleResult};

use super::LifecycleEngine;

impl LifecycleEngine {
    /// Resolve the actor's team: owner match first, then membership.
    /// Returns the team together with whether the actor administers it.
    pub async fn my_team(&self, actor: &Actor) -> LifecycleResult<(team::Model, bool)> {
        let lookup = queries::team_for_account(&self.db, actor.account_id, actor.student_profile())
            .await?
            .ok_or(LifecycleError::NotFound("team"))?;

        let is_owner = lookup.is_owner();
        Ok((lookup.into_team(), is_owner))
    }

    /// Onboarding trigger (also the vestigial manual path): create a team
    /// with the acting student as owner and sole member.
    pub async fn create_team(&self, actor: &Actor) -> LifecycleResult<team::Model> {
        let Role::Student {
            profile: student_id,
        } = actor.role
        else {
            return Err(LifecycleError::Forbidden("only students can create teams"));
        };

        let txn = self.db.begin().await?;

        if queries::student_membership(&txn, student_id)
            .await?
            .is_some()
        {
            return Err(LifecycleError::AlreadyInTeam);
        }

        let now = Utc::now();
        let created = team::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_account_id: Set(actor.account_id),
            thesis_topic_id: Set(None),
            supervisor_id: Set(None),
            status: Set(TeamStatus::Pending),
            return_comment: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        team_member::ActiveModel {
            team_id: Set(created.id),
            student_id: Set(student_id),
            joined_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| LifecycleError::or_conflict(e, LifecycleError::AlreadyInTeam))?;

        txn.commit().await?;

        tracing::info!(team_id = %created.id, student_id = %student_id, "Team created");
        Ok(created)
    }

    /// All teams.
    pub async fn list_teams(&self) -> LifecycleResult<Vec<team::Model>> {
        Ok(team::Entity::find().all(&self.db).await?)
    }

    /// A single team by id.
    pub async fn get_team(&self, team_id: Uuid) -> LifecycleResult<team::Model> {
        self.load_team(&self.db, team_id).await
    }

    /// Teams the acting supervisor is assigned to.
    pub async fn supervised_teams(&self, actor: &Actor) -> LifecycleResult<Vec<team::Model>> {
        let Role::Supervisor {
            profile: supervisor_id,
        } = actor.role
        else {
            return Err(LifecycleError::Forbidden(
                "only supervisors can list supervised teams",
            ));
        };

        Ok(team::Entity::find()
            .filter(team::Column::SupervisorId.eq(supervisor_id))
            .all(&self.db)
            .await?)
    }

    /// Supervisor-initiated team deletion. Foreign keys cascade, so all
    /// memberships and both request kinds go with the team.
    pub async fn delete_team(&self, actor: &Actor, team_id: Uuid) -> LifecycleResult<()> {
        let Role::Supervisor {
            profile: supervisor_id,
        } = actor.role
        else {
            return Err(LifecycleError::Forbidden(
                "only supervisors can delete teams",
            ));
        };

        let team = self.load_team(&self.db, team_id).await?;
        if team.supervisor_id != Some(supervisor_id) {
            return Err(LifecycleError::Forbidden(
                "only the assigned supervisor can delete the team",
            ));
        }

        team.delete(&self.db).await?;

        tracing::info!(team_id = %team_id, supervisor_id = %supervisor_id, "Team deleted");
        Ok(())
    }

    /// Membership rows for a team, exposed for boundary layers that need
    /// the roster.
    pub async fn team_members(&self, team_id: Uuid) -> LifecycleResult<Vec<team_member::Model>> {
        Ok(team_member::Entity::find()
            .filter(team_member::Column::TeamId.eq(team_id))
            .all(&self.db)
            .await?)
    }
}
