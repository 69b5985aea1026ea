//! Lifecycle store for the thesis-team coordination backend
//!
//! Holds the Team, JoinRequest and SupervisorRequest records (plus the
//! profile and notification tables they reference) and enforces their
//! invariants at write time through database constraints:
//!
//! - a student belongs to at most one team (unique index on membership),
//! - at most one pending join request per student across all teams
//!   (partial unique index),
//! - at most one pending supervisor request per team (partial unique index).
//!
//! All transition logic lives in `thesisflow-lifecycle`; this crate only
//! provides the entities, the migrations and shared read helpers.

pub mod entities;
pub mod migrator;
pub mod queries;

use migrator::Migrator;
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

/// Connect to the lifecycle database.
///
/// Accepts any sea-orm connection URL, e.g. `sqlite::memory:` for tests or
/// a `postgres://` URL in production.
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    tracing::debug!(%url, "Connecting to lifecycle database");
    Database::connect(url).await
}

/// Run all pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    tracing::info!("Running lifecycle database migrations");
    Migrator::up(db, None).await
}
