//! Supervisor flow: pending -> accepted | rejected, deletable while pending
//!
//! Acceptance hands team ownership to the supervisor's account; the
//! transfer is kept in one function (`assign_supervisor`) so the policy
//! can change without touching the rest of the state machine.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use thesisflow_db::entities::{
    join_request::RequestStatus,
    supervisor_profile, supervisor_request,
    team::{self, TeamStatus},
};
use thesisflow_db::queries;

use crate::actor::{Actor, Role};
use crate::error::{LifecycleError, LifecycleResult};

use super::LifecycleEngine;

impl LifecycleEngine {
    /// Team owner requests a supervisor for their team.
    ///
    /// Fails with [`LifecycleError::Conflict`] when the team already has a
    /// pending request or an assigned supervisor.
    pub async fn create_supervisor_request(
        &self,
        actor: &Actor,
        supervisor_id: Uuid,
    ) -> LifecycleResult<supervisor_request::Model> {
        let txn = self.db.begin().await?;

        let team = team::Entity::find()
            .filter(team::Column::OwnerAccountId.eq(actor.account_id))
            .one(&txn)
            .await?
            .ok_or(LifecycleError::Forbidden(
                "only team owners can request a supervisor",
            ))?;

        if supervisor_request::Entity::find()
            .filter(supervisor_request::Column::TeamId.eq(team.id))
            .filter(supervisor_request::Column::Status.eq(RequestStatus::Pending))
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(LifecycleError::Conflict(
                "team already has a pending supervisor request",
            ));
        }

        if team.supervisor_id.is_some() {
            return Err(LifecycleError::Conflict("team already has a supervisor"));
        }

        let supervisor = supervisor_profile::Entity::find_by_id(supervisor_id)
            .one(&txn)
            .await?
            .ok_or(LifecycleError::NotFound("supervisor profile"))?;

        let request = supervisor_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team.id),
            supervisor_id: Set(supervisor.id),
            status: Set(RequestStatus::Pending),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            LifecycleError::or_conflict(
                e,
                LifecycleError::Conflict("team already has a pending supervisor request"),
            )
        })?;

        let requester = self.load_account(&txn, actor.account_id).await?;
        txn.commit().await?;

        tracing::info!(team_id = %team.id, supervisor_id = %supervisor.id, "Supervisor request created");
        self.send(
            supervisor.account_id,
            format!("{} requests you as supervisor.", requester.full_name),
        )
        .await;

        Ok(request)
    }

    /// Target supervisor accepts a pending request.
    ///
    /// Single atomic update: the team gets its supervisor, ownership moves
    /// to the supervisor's account and the team becomes `accepted`. The
    /// original owner is notified.
    pub async fn accept_supervisor_request(
        &self,
        actor: &Actor,
        request_id: Uuid,
    ) -> LifecycleResult<supervisor_request::Model> {
        let Role::Supervisor {
            profile: supervisor_id,
        } = actor.role
        else {
            return Err(LifecycleError::Forbidden(
                "only supervisors can accept supervisor requests",
            ));
        };

        let txn = self.db.begin().await?;

        let request = self
            .pending_supervisor_request(&txn, request_id, supervisor_id)
            .await?;

        let team = self.load_team(&txn, request.team_id).await?;
        let original_owner = team.owner_account_id;

        assign_supervisor(&txn, team, supervisor_id, actor.account_id).await?;

        let mut active: supervisor_request::ActiveModel = request.into();
        active.status = Set(RequestStatus::Accepted);
        let request = active.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            team_id = %request.team_id,
            supervisor_id = %supervisor_id,
            "Supervisor request accepted, team ownership transferred"
        );
        self.send(
            original_owner,
            "Your supervisor request was accepted!".to_string(),
        )
        .await;

        Ok(request)
    }

    /// Target supervisor rejects a pending request. The team keeps no
    /// supervisor and its status is unchanged.
    pub async fn reject_supervisor_request(
        &self,
        actor: &Actor,
        request_id: Uuid,
    ) -> LifecycleResult<supervisor_request::Model> {
        let Role::Supervisor {
            profile: supervisor_id,
        } = actor.role
        else {
            return Err(LifecycleError::Forbidden(
                "only supervisors can reject supervisor requests",
            ));
        };

        let txn = self.db.begin().await?;

        let request = self
            .pending_supervisor_request(&txn, request_id, supervisor_id)
            .await?;
        let team = self.load_team(&txn, request.team_id).await?;

        let mut active: supervisor_request::ActiveModel = request.into();
        active.status = Set(RequestStatus::Rejected);
        let request = active.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(team_id = %team.id, supervisor_id = %supervisor_id, "Supervisor request rejected");
        self.send(
            team.owner_account_id,
            "Your supervisor request was rejected.".to_string(),
        )
        .await;

        Ok(request)
    }

    /// Team owner withdraws their team's pending supervisor request.
    pub async fn cancel_supervisor_request(&self, actor: &Actor) -> LifecycleResult<()> {
        let txn = self.db.begin().await?;

        let team = team::Entity::find()
            .filter(team::Column::OwnerAccountId.eq(actor.account_id))
            .one(&txn)
            .await?
            .ok_or(LifecycleError::NotFound("pending supervisor request"))?;

        let request = supervisor_request::Entity::find()
            .filter(supervisor_request::Column::TeamId.eq(team.id))
            .filter(supervisor_request::Column::Status.eq(RequestStatus::Pending))
            .one(&txn)
            .await?
            .ok_or(LifecycleError::NotFound("pending supervisor request"))?;

        let request_id = request.id;
        request.delete(&txn).await?;
        txn.commit().await?;

        tracing::info!(team_id = %team.id, request_id = %request_id, "Supervisor request canceled");
        Ok(())
    }

    /// Pending requests targeting the acting supervisor.
    pub async fn incoming_supervisor_requests(
        &self,
        actor: &Actor,
    ) -> LifecycleResult<Vec<supervisor_request::Model>> {
        let Role::Supervisor {
            profile: supervisor_id,
        } = actor.role
        else {
            return Err(LifecycleError::Forbidden(
                "only supervisors can see incoming requests",
            ));
        };

        Ok(supervisor_request::Entity::find()
            .filter(supervisor_request::Column::SupervisorId.eq(supervisor_id))
            .filter(supervisor_request::Column::Status.eq(RequestStatus::Pending))
            .all(&self.db)
            .await?)
    }

    /// Latest supervisor request for the actor's current team, regardless
    /// of status.
    pub async fn my_team_supervisor_request(
        &self,
        actor: &Actor,
    ) -> LifecycleResult<supervisor_request::Model> {
        let team = queries::team_for_account(&self.db, actor.account_id, actor.student_profile())
            .await?
            .ok_or(LifecycleError::NotFound("team"))?
            .into_team();

        supervisor_request::Entity::find()
            .filter(supervisor_request::Column::TeamId.eq(team.id))
            .order_by_desc(supervisor_request::Column::CreatedAt)
            .one(&self.db)
            .await?
            .ok_or(LifecycleError::NotFound("supervisor request"))
    }

    async fn pending_supervisor_request<C: ConnectionTrait>(
        &self,
        db: &C,
        request_id: Uuid,
        supervisor_id: Uuid,
    ) -> LifecycleResult<supervisor_request::Model> {
        supervisor_request::Entity::find_by_id(request_id)
            .filter(supervisor_request::Column::SupervisorId.eq(supervisor_id))
            .filter(supervisor_request::Column::Status.eq(RequestStatus::Pending))
            .one(db)
            .await?
            .ok_or(LifecycleError::NotFound("pending supervisor request"))
    }
}

/// Assign the supervisor and hand team ownership to their account.
///
/// Ownership transfer on acceptance models the supervisor taking
/// administrative responsibility for the team's subsequent workflow. The
/// policy is under product review; keep every write of it here.
async fn assign_supervisor<C: ConnectionTrait>(
    db: &C,
    team: team::Model,
    supervisor_profile: Uuid,
    supervisor_account: Uuid,
) -> Result<team::Model, DbErr> {
    let mut active: team::ActiveModel = team.into();
    active.supervisor_id = Set(Some(supervisor_profile));
    active.owner_account_id = Set(supervisor_account);
    active.status = Set(TeamStatus::Accepted);
    active.updated_at = Set(Utc::now());
    active.update(db).await
}
