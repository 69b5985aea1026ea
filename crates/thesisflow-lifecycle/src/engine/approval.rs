//! Dean approval workflow
//!
//! Touches the Team entity only; join and supervisor requests are never
//! read or written here.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use thesisflow_db::entities::team::{self, TeamStatus};

use crate::actor::Actor;
use crate::error::{LifecycleError, LifecycleResult};

use super::LifecycleEngine;

impl LifecycleEngine {
    /// Dean approves a team. No prerequisite beyond dean capability and
    /// team existence.
    pub async fn approve_team(&self, actor: &Actor, team_id: Uuid) -> LifecycleResult<team::Model> {
        if !actor.is_dean() {
            return Err(LifecycleError::Forbidden("only the dean can approve teams"));
        }

        let team = self.load_team(&self.db, team_id).await?;
        let owner = team.owner_account_id;

        let mut active: team::ActiveModel = team.into();
        active.status = Set(TeamStatus::Approved);
        active.updated_at = Set(Utc::now());
        let team = active.update(&self.db).await?;

        tracing::info!(team_id = %team.id, "Team approved by dean");
        self.send(owner, "Your team was approved by the dean.".to_string())
            .await;

        Ok(team)
    }

    /// Dean returns a team with a free-text comment. The comment is
    /// persisted alongside the status change.
    pub async fn return_team(
        &self,
        actor: &Actor,
        team_id: Uuid,
        comment: &str,
    ) -> LifecycleResult<team::Model> {
        if !actor.is_dean() {
            return Err(LifecycleError::Forbidden("only the dean can return teams"));
        }

        let team = self.load_team(&self.db, team_id).await?;
        let owner = team.owner_account_id;

        let mut active: team::ActiveModel = team.into();
        active.status = Set(TeamStatus::Returned);
        active.return_comment = Set(Some(comment.to_string()));
        active.updated_at = Set(Utc::now());
        let team = active.update(&self.db).await?;

        tracing::info!(team_id = %team.id, "Team returned by dean");
        self.send(owner, format!("Your team was returned by the dean: {comment}"))
            .await;

        Ok(team)
    }
}
