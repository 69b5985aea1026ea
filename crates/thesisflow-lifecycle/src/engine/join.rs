//! Join flow: pending -> accepted | rejected, deletable while pending

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use thesisflow_db::entities::{
    join_request::{self, RequestStatus},
    team, team_member,
};
use thesisflow_db::queries;

use crate::actor::{Actor, Role};
use crate::error::{LifecycleError, LifecycleResult};

use super::LifecycleEngine;

impl LifecycleEngine {
    /// Student applies to join a team.
    ///
    /// Fails with [`LifecycleError::AlreadyInTeam`] when the student is a
    /// member of any team, and with [`LifecycleError::DuplicatePending`]
    /// when a pending application already exists anywhere.
    pub async fn apply_to_team(
        &self,
        actor: &Actor,
        team_id: Uuid,
    ) -> LifecycleResult<join_request::Model> {
        let Role::Student {
            profile: student_id,
        } = actor.role
        else {
            return Err(LifecycleError::Forbidden("only students can join teams"));
        };

        let txn = self.db.begin().await?;

        if queries::student_membership(&txn, student_id)
            .await?
            .is_some()
        {
            return Err(LifecycleError::AlreadyInTeam);
        }

        if join_request::Entity::find()
            .filter(join_request::Column::StudentId.eq(student_id))
            .filter(join_request::Column::Status.eq(RequestStatus::Pending))
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(LifecycleError::DuplicatePending);
        }

        let team = self.load_team(&txn, team_id).await?;
        let student = self.load_student(&txn, student_id).await?;

        let request = join_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team.id),
            student_id: Set(student_id),
            status: Set(RequestStatus::Pending),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(|e| LifecycleError::or_conflict(e, LifecycleError::DuplicatePending))?;

        txn.commit().await?;

        tracing::info!(team_id = %team.id, student_id = %student_id, "Join request created");
        self.send(
            team.owner_account_id,
            format!(
                "{} {} wants to join your team.",
                student.first_name, student.last_name
            ),
        )
        .await;

        Ok(request)
    }

    /// Team owner accepts a pending join request.
    ///
    /// Atomically adds the student to the team and marks the request
    /// accepted. Re-accepting an already-accepted request fails with
    /// [`LifecycleError::NotFound`]: terminal states stay terminal.
    pub async fn accept_join(
        &self,
        actor: &Actor,
        team_id: Uuid,
        student_id: Uuid,
    ) -> LifecycleResult<join_request::Model> {
        let txn = self.db.begin().await?;

        let team = self.load_team(&txn, team_id).await?;
        if team.owner_account_id != actor.account_id {
            return Err(LifecycleError::Forbidden(
                "only the team owner can accept join requests",
            ));
        }

        let request = self.pending_request(&txn, team.id, student_id).await?;

        team_member::ActiveModel {
            team_id: Set(team.id),
            student_id: Set(student_id),
            joined_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(|e| LifecycleError::or_conflict(e, LifecycleError::AlreadyInTeam))?;

        let mut active: join_request::ActiveModel = request.into();
        active.status = Set(RequestStatus::Accepted);
        let request = active.update(&txn).await?;

        let student = self.load_student(&txn, student_id).await?;
        let title = self.topic_title(&txn, &team).await?;
        txn.commit().await?;

        tracing::info!(team_id = %team.id, student_id = %student_id, "Join request accepted");
        let message = match title {
            Some(title) => format!("Your request to join '{title}' was accepted."),
            None => "Your join request was accepted.".to_string(),
        };
        self.send(student.account_id, message).await;

        Ok(request)
    }

    /// Team owner rejects a pending join request. The student stays
    /// eligible to apply elsewhere.
    pub async fn reject_join(
        &self,
        actor: &Actor,
        team_id: Uuid,
        student_id: Uuid,
    ) -> LifecycleResult<join_request::Model> {
        let txn = self.db.begin().await?;

        let team = self.load_team(&txn, team_id).await?;
        if team.owner_account_id != actor.account_id {
            return Err(LifecycleError::Forbidden(
                "only the team owner can reject join requests",
            ));
        }

        let request = self.pending_request(&txn, team.id, student_id).await?;

        let mut active: join_request::ActiveModel = request.into();
        active.status = Set(RequestStatus::Rejected);
        let request = active.update(&txn).await?;

        let student = self.load_student(&txn, student_id).await?;
        let title = self.topic_title(&txn, &team).await?;
        txn.commit().await?;

        tracing::info!(team_id = %team.id, student_id = %student_id, "Join request rejected");
        let message = match title {
            Some(title) => format!("Your request to join '{title}' was rejected."),
            None => "Your join request was rejected.".to_string(),
        };
        self.send(student.account_id, message).await;

        Ok(request)
    }

    /// Student cancels their own pending request. Requests in a terminal
    /// status cannot be canceled.
    pub async fn cancel_join(&self, actor: &Actor, request_id: Uuid) -> LifecycleResult<()> {
        let Role::Student {
            profile: student_id,
        } = actor.role
        else {
            return Err(LifecycleError::Forbidden(
                "only students can cancel join requests",
            ));
        };

        let request = join_request::Entity::find_by_id(request_id)
            .one(&self.db)
            .await?
            .filter(|req| req.student_id == student_id)
            .ok_or(LifecycleError::NotFound("join request"))?;

        if request.status != RequestStatus::Pending {
            return Err(LifecycleError::InvalidState(
                "only pending join requests can be canceled",
            ));
        }

        let request_team = request.team_id;
        request.delete(&self.db).await?;

        tracing::info!(request_id = %request_id, team_id = %request_team, "Join request canceled");
        Ok(())
    }

    /// All join requests filed by the acting student.
    pub async fn my_join_requests(
        &self,
        actor: &Actor,
    ) -> LifecycleResult<Vec<join_request::Model>> {
        let Role::Student {
            profile: student_id,
        } = actor.role
        else {
            return Err(LifecycleError::Forbidden(
                "only students can view their join requests",
            ));
        };

        Ok(join_request::Entity::find()
            .filter(join_request::Column::StudentId.eq(student_id))
            .all(&self.db)
            .await?)
    }

    /// The acting student's current pending application, if any.
    pub async fn pending_join_request(
        &self,
        actor: &Actor,
    ) -> LifecycleResult<Option<join_request::Model>> {
        let Role::Student {
            profile: student_id,
        } = actor.role
        else {
            return Err(LifecycleError::Forbidden(
                "only students can check join requests",
            ));
        };

        Ok(join_request::Entity::find()
            .filter(join_request::Column::StudentId.eq(student_id))
            .filter(join_request::Column::Status.eq(RequestStatus::Pending))
            .one(&self.db)
            .await?)
    }

    /// Join requests for the team the actor owns, newest first.
    pub async fn team_join_requests(
        &self,
        actor: &Actor,
    ) -> LifecycleResult<Vec<join_request::Model>> {
        let team = team::Entity::find()
            .filter(team::Column::OwnerAccountId.eq(actor.account_id))
            .one(&self.db)
            .await?
            .ok_or(LifecycleError::NotFound("owned team"))?;

        Ok(join_request::Entity::find()
            .filter(join_request::Column::TeamId.eq(team.id))
            .order_by_desc(join_request::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn pending_request<C: sea_orm::ConnectionTrait>(
        &self,
        db: &C,
        team_id: Uuid,
        student_id: Uuid,
    ) -> LifecycleResult<join_request::Model> {
        join_request::Entity::find()
            .filter(join_request::Column::TeamId.eq(team_id))
            .filter(join_request::Column::StudentId.eq(student_id))
            .filter(join_request::Column::Status.eq(RequestStatus::Pending))
            .one(db)
            .await?
            .ok_or(LifecycleError::NotFound("pending join request"))
    }
}
