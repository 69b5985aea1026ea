//! Error taxonomy for lifecycle transitions
//!
//! All variants are recoverable and surfaced to the caller; none are
//! process-fatal. Precondition failures are never swallowed: each
//! operation returns the specific kind so a boundary layer can map it to
//! a user-facing status.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Errors that can occur in lifecycle operations
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Actor role or ownership does not permit the operation
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    /// Entity or matching-state record is absent
    #[error("not found: {0}")]
    NotFound(&'static str),

    /// The acting account has no resolvable profile role
    #[error("no profile found for account")]
    NoProfile,

    /// The student already belongs to a team
    #[error("student is already a member of a team")]
    AlreadyInTeam,

    /// The student already has a pending join request
    #[error("student already has a pending join request")]
    DuplicatePending,

    /// A store invariant would be violated; the message names it
    #[error("conflict: {0}")]
    Conflict(&'static str),

    /// The operation is not legal in the record's current status
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

impl LifecycleError {
    /// Map a write failure to the given invariant error when it stems from
    /// a unique constraint (a concurrent racer got there first). Any other
    /// database failure passes through unchanged.
    pub(crate) fn or_conflict(err: DbErr, conflict: LifecycleError) -> LifecycleError {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => conflict,
            _ => LifecycleError::Database(err),
        }
    }
}
