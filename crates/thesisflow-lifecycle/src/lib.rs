//! Lifecycle engine for the thesis-team coordination backend
//!
//! Students form teams, request supervisors, and deans approve the result.
//! This crate enforces the valid transitions across Team, JoinRequest and
//! SupervisorRequest: every operation validates the actor's role and the
//! current state, applies one atomic mutation through the store, and fires
//! at most one notification through the injected [`Notifier`] capability.

pub mod actor;
pub mod engine;
pub mod error;
pub mod notify;

pub use actor::{Actor, Role};
pub use engine::LifecycleEngine;
pub use error::{LifecycleError, LifecycleResult};
pub use notify::{Notifier, NotifyError, PersistentNotifier};
