//! Lifecycle engine: validated state transitions over the store
//!
//! Every mutating operation runs its precondition reads and its write
//! inside one transaction; the notification fires only after commit.

mod approval;
mod join;
mod supervise;
mod team;

use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait};
use uuid::Uuid;

use thesisflow_db::entities::{account, student_profile, team as team_entity, thesis_topic};

use crate::error::{LifecycleError, LifecycleResult};
use crate::notify::Notifier;

/// The component enforcing valid state transitions across Team,
/// JoinRequest and SupervisorRequest.
pub struct LifecycleEngine {
    db: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
}

impl LifecycleEngine {
    pub fn new(db: DatabaseConnection, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    /// Best-effort notification. A delivery failure is logged and never
    /// propagated: the lifecycle mutation has already committed.
    async fn send(&self, account_id: Uuid, message: String) {
        if let Err(err) = self.notifier.notify(account_id, &message).await {
            tracing::warn!(
                account_id = %account_id,
                error = %err,
                "Notification delivery failed"
            );
        }
    }

    async fn load_team<C: ConnectionTrait>(
        &self,
        db: &C,
        team_id: Uuid,
    ) -> LifecycleResult<team_entity::Model> {
        team_entity::Entity::find_by_id(team_id)
            .one(db)
            .await?
            .ok_or(LifecycleError::NotFound("team"))
    }

    async fn load_student<C: ConnectionTrait>(
        &self,
        db: &C,
        student_id: Uuid,
    ) -> LifecycleResult<student_profile::Model> {
        student_profile::Entity::find_by_id(student_id)
            .one(db)
            .await?
            .ok_or(LifecycleError::NotFound("student profile"))
    }

    async fn load_account<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: Uuid,
    ) -> LifecycleResult<account::Model> {
        account::Entity::find_by_id(account_id)
            .one(db)
            .await?
            .ok_or(LifecycleError::NotFound("account"))
    }

    /// Topic title for notification text, when the team has one linked.
    async fn topic_title<C: ConnectionTrait>(
        &self,
        db: &C,
        team: &team_entity::Model,
    ) -> LifecycleResult<Option<String>> {
        let Some(topic_id) = team.thesis_topic_id else {
            return Ok(None);
        };

        Ok(thesis_topic::Entity::find_by_id(topic_id)
            .one(db)
            .await?
            .map(|topic| topic.title))
    }
}
