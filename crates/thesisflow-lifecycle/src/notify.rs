//! Notifier capability: durable record plus live-push hook
//!
//! The engine treats delivery as a capability injected at construction,
//! never ambient state, so tests can substitute a recording fake. Delivery
//! is best-effort: the durable row is written first, and a missed live push
//! never fails the lifecycle mutation that triggered it.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use thiserror::Error;
use uuid::Uuid;

use thesisflow_db::entities::notification;

/// Errors that can occur while delivering a notification
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to persist notification: {0}")]
    Store(#[from] sea_orm::DbErr),
}

/// Delivery capability injected into the lifecycle engine
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, account_id: Uuid, message: &str) -> Result<(), NotifyError>;
}

/// Notifier that writes the durable notification row, then surfaces the
/// live push as a tracing event for the transport layer to hook.
pub struct PersistentNotifier {
    db: DatabaseConnection,
}

impl PersistentNotifier {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Notifier for PersistentNotifier {
    async fn notify(&self, account_id: Uuid, message: &str) -> Result<(), NotifyError> {
        notification::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account_id),
            message: Set(message.to_string()),
            is_read: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(account_id = %account_id, %message, "Notification recorded, ready for live push");
        Ok(())
    }
}
