//! Integration tests for the lifecycle engine
//!
//! Full state-machine scenarios against a real SQLite in-memory database,
//! with a recording notifier standing in for the delivery transport.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use thesisflow_db::entities::{
    account,
    join_request::{self, RequestStatus},
    notification, student_profile, supervisor_profile,
    team::{self, TeamStatus},
    thesis_topic,
};
use thesisflow_db::{connect, migrate, queries};
use thesisflow_lifecycle::{
    Actor, LifecycleEngine, LifecycleError, Notifier, NotifyError, PersistentNotifier, Role,
};

/// Notifier that records every delivery for later inspection.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(Uuid, String)>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<(Uuid, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, account_id: Uuid, message: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((account_id, message.to_string()));
        Ok(())
    }
}

/// Notifier whose delivery always fails.
struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _account_id: Uuid, _message: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Store(sea_orm::DbErr::Custom(
            "notification store unavailable".to_string(),
        )))
    }
}

struct Harness {
    db: DatabaseConnection,
    engine: LifecycleEngine,
    notifier: Arc<RecordingNotifier>,
}

async fn setup() -> Harness {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    migrate(&db).await.expect("Failed to run migrations");

    let notifier = Arc::new(RecordingNotifier::default());
    let engine = LifecycleEngine::new(db.clone(), notifier.clone());

    Harness {
        db,
        engine,
        notifier,
    }
}

async fn seed_account(db: &DatabaseConnection, email: &str, role: &str) -> account::Model {
    account::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        full_name: Set(email.split('@').next().unwrap().to_string()),
        role: Set(role.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert account")
}

async fn student(h: &Harness, email: &str, first_name: &str, last_name: &str) -> Actor {
    let acct = seed_account(&h.db, email, "member").await;

    student_profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        account_id: Set(acct.id),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(&h.db)
    .await
    .expect("Failed to insert student profile");

    Actor::resolve(&h.db, acct.id)
        .await
        .expect("Failed to resolve student actor")
}

async fn supervisor(h: &Harness, email: &str, full_name: &str) -> Actor {
    let acct = seed_account(&h.db, email, "member").await;

    supervisor_profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        account_id: Set(acct.id),
        full_name: Set(full_name.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(&h.db)
    .await
    .expect("Failed to insert supervisor profile");

    Actor::resolve(&h.db, acct.id)
        .await
        .expect("Failed to resolve supervisor actor")
}

async fn dean(h: &Harness, email: &str) -> Actor {
    let acct = seed_account(&h.db, email, "dean").await;

    Actor::resolve(&h.db, acct.id)
        .await
        .expect("Failed to resolve dean actor")
}

async fn reload_team(db: &DatabaseConnection, team_id: Uuid) -> team::Model {
    team::Entity::find_by_id(team_id)
        .one(db)
        .await
        .expect("Failed to query team")
        .expect("Team not found")
}

// ============================================================
// Join flow
// ============================================================

#[tokio::test]
async fn student_applies_owner_sees_and_accepts() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    h.engine
        .apply_to_team(&alice, team.id)
        .await
        .expect("apply_to_team");

    // The owner was notified about the application.
    assert!(h
        .notifier
        .sent()
        .contains(&(owner.account_id, "Alice Ivanova wants to join your team.".to_string())));

    // The owner sees the request.
    let requests = h
        .engine
        .team_join_requests(&owner)
        .await
        .expect("team_join_requests");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].student_id, alice.student_profile().unwrap());

    // Accepting adds the member and flips the request status.
    let accepted = h
        .engine
        .accept_join(&owner, team.id, alice.student_profile().unwrap())
        .await
        .expect("accept_join");
    assert_eq!(accepted.status, RequestStatus::Accepted);

    let membership = queries::student_membership(&h.db, alice.student_profile().unwrap())
        .await
        .expect("membership query")
        .expect("Alice should be a member");
    assert_eq!(membership.team_id, team.id);

    // The student was notified about the acceptance.
    assert!(h
        .notifier
        .sent()
        .iter()
        .any(|(acct, msg)| *acct == alice.account_id && msg.contains("accepted")));
}

#[tokio::test]
async fn accept_message_carries_topic_title() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let topic = thesis_topic::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("Distributed Tracing".to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(&h.db)
    .await
    .expect("Failed to insert topic");

    let mut active: team::ActiveModel = team.clone().into();
    active.thesis_topic_id = Set(Some(topic.id));
    active.update(&h.db).await.expect("Failed to link topic");

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    h.engine.apply_to_team(&alice, team.id).await.expect("apply");
    h.engine
        .accept_join(&owner, team.id, alice.student_profile().unwrap())
        .await
        .expect("accept");

    assert!(h.notifier.sent().contains(&(
        alice.account_id,
        "Your request to join 'Distributed Tracing' was accepted.".to_string()
    )));
}

#[tokio::test]
async fn apply_requires_student_capability() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let prof = supervisor(&h, "prof@uni.edu", "Prof. Voronov").await;
    let err = h.engine.apply_to_team(&prof, team.id).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Forbidden(_)));
}

#[tokio::test]
async fn apply_fails_when_already_in_team() {
    let h = setup().await;

    // Team creators are members of their own team.
    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    h.engine.create_team(&owner).await.expect("create_team");

    let other = student(&h, "other@uni.edu", "Oleg", "Orlov").await;
    let other_team = h.engine.create_team(&other).await.expect("create_team");

    let err = h
        .engine
        .apply_to_team(&owner, other_team.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::AlreadyInTeam));
}

#[tokio::test]
async fn apply_fails_with_pending_request_elsewhere() {
    let h = setup().await;

    let owner_a = student(&h, "owner-a@uni.edu", "Anna", "A").await;
    let team_a = h.engine.create_team(&owner_a).await.expect("create_team");
    let owner_b = student(&h, "owner-b@uni.edu", "Boris", "B").await;
    let team_b = h.engine.create_team(&owner_b).await.expect("create_team");

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    h.engine
        .apply_to_team(&alice, team_a.id)
        .await
        .expect("first apply");

    let err = h.engine.apply_to_team(&alice, team_b.id).await.unwrap_err();
    assert!(matches!(err, LifecycleError::DuplicatePending));
}

#[tokio::test]
async fn apply_to_unknown_team_fails_not_found() {
    let h = setup().await;

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    let err = h
        .engine
        .apply_to_team(&alice, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
async fn accept_requires_ownership() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    h.engine.apply_to_team(&alice, team.id).await.expect("apply");

    let intruder = student(&h, "mallory@uni.edu", "Mallory", "M").await;
    let err = h
        .engine
        .accept_join(&intruder, team.id, alice.student_profile().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Forbidden(_)));
}

#[tokio::test]
async fn reaccepting_accepted_request_fails_not_found() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    h.engine.apply_to_team(&alice, team.id).await.expect("apply");
    h.engine
        .accept_join(&owner, team.id, alice.student_profile().unwrap())
        .await
        .expect("first accept");

    let err = h
        .engine
        .accept_join(&owner, team.id, alice.student_profile().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
async fn rejected_student_stays_eligible() {
    let h = setup().await;

    let owner_a = student(&h, "owner-a@uni.edu", "Anna", "A").await;
    let team_a = h.engine.create_team(&owner_a).await.expect("create_team");
    let owner_b = student(&h, "owner-b@uni.edu", "Boris", "B").await;
    let team_b = h.engine.create_team(&owner_b).await.expect("create_team");

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    h.engine
        .apply_to_team(&alice, team_a.id)
        .await
        .expect("apply");
    let rejected = h
        .engine
        .reject_join(&owner_a, team_a.id, alice.student_profile().unwrap())
        .await
        .expect("reject");
    assert_eq!(rejected.status, RequestStatus::Rejected);

    // No membership was added, and a new application elsewhere is legal.
    assert!(
        queries::student_membership(&h.db, alice.student_profile().unwrap())
            .await
            .expect("membership query")
            .is_none()
    );
    h.engine
        .apply_to_team(&alice, team_b.id)
        .await
        .expect("second apply after rejection");
}

#[tokio::test]
async fn cancel_join_deletes_pending_request() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    let request = h.engine.apply_to_team(&alice, team.id).await.expect("apply");

    h.engine
        .cancel_join(&alice, request.id)
        .await
        .expect("cancel");

    let remaining = join_request::Entity::find()
        .count(&h.db)
        .await
        .expect("count");
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn cancel_join_rejects_terminal_status() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    let request = h.engine.apply_to_team(&alice, team.id).await.expect("apply");
    h.engine
        .accept_join(&owner, team.id, alice.student_profile().unwrap())
        .await
        .expect("accept");

    let err = h.engine.cancel_join(&alice, request.id).await.unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidState(_)));
}

#[tokio::test]
async fn cancel_join_hides_other_students_requests() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    let request = h.engine.apply_to_team(&alice, team.id).await.expect("apply");

    let bob = student(&h, "bob@uni.edu", "Bob", "Petrov").await;
    let err = h.engine.cancel_join(&bob, request.id).await.unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
async fn team_join_requests_ordered_newest_first() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    h.engine.apply_to_team(&alice, team.id).await.expect("apply");

    tokio::time::sleep(Duration::from_millis(5)).await;

    let bob = student(&h, "bob@uni.edu", "Bob", "Petrov").await;
    h.engine.apply_to_team(&bob, team.id).await.expect("apply");

    let requests = h
        .engine
        .team_join_requests(&owner)
        .await
        .expect("team_join_requests");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].student_id, bob.student_profile().unwrap());
    assert_eq!(requests[1].student_id, alice.student_profile().unwrap());
}

#[tokio::test]
async fn pending_join_request_reflects_current_application() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    assert!(h
        .engine
        .pending_join_request(&alice)
        .await
        .expect("pending_join_request")
        .is_none());

    let request = h.engine.apply_to_team(&alice, team.id).await.expect("apply");
    let pending = h
        .engine
        .pending_join_request(&alice)
        .await
        .expect("pending_join_request")
        .expect("Expected a pending request");
    assert_eq!(pending.id, request.id);

    let mine = h
        .engine
        .my_join_requests(&alice)
        .await
        .expect("my_join_requests");
    assert_eq!(mine.len(), 1);
}

// ============================================================
// Supervisor flow
// ============================================================

#[tokio::test]
async fn supervisor_acceptance_assigns_and_transfers_ownership() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let prof = supervisor(&h, "prof@uni.edu", "Prof. Voronov").await;
    let request = h
        .engine
        .create_supervisor_request(&owner, prof.supervisor_profile().unwrap())
        .await
        .expect("create_supervisor_request");

    // The supervisor was notified and sees the request as incoming.
    assert!(h
        .notifier
        .sent()
        .iter()
        .any(|(acct, msg)| *acct == prof.account_id && msg.contains("requests you as supervisor")));
    let incoming = h
        .engine
        .incoming_supervisor_requests(&prof)
        .await
        .expect("incoming");
    assert_eq!(incoming.len(), 1);

    let accepted = h
        .engine
        .accept_supervisor_request(&prof, request.id)
        .await
        .expect("accept_supervisor_request");
    assert_eq!(accepted.status, RequestStatus::Accepted);

    let team = reload_team(&h.db, team.id).await;
    assert_eq!(team.supervisor_id, prof.supervisor_profile());
    assert_eq!(team.owner_account_id, prof.account_id);
    assert_eq!(team.status, TeamStatus::Accepted);

    // The original owner was notified about the acceptance.
    assert!(h
        .notifier
        .sent()
        .contains(&(owner.account_id, "Your supervisor request was accepted!".to_string())));
}

#[tokio::test]
async fn create_supervisor_request_requires_team_ownership() {
    let h = setup().await;

    let prof = supervisor(&h, "prof@uni.edu", "Prof. Voronov").await;
    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;

    let err = h
        .engine
        .create_supervisor_request(&alice, prof.supervisor_profile().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Forbidden(_)));
}

#[tokio::test]
async fn create_supervisor_request_conflicts_on_pending_or_assigned() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    h.engine.create_team(&owner).await.expect("create_team");

    let prof_a = supervisor(&h, "prof-a@uni.edu", "Prof. A").await;
    let prof_b = supervisor(&h, "prof-b@uni.edu", "Prof. B").await;

    let request = h
        .engine
        .create_supervisor_request(&owner, prof_a.supervisor_profile().unwrap())
        .await
        .expect("first request");

    // Pending request blocks a second one.
    let err = h
        .engine
        .create_supervisor_request(&owner, prof_b.supervisor_profile().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Conflict(_)));

    // After acceptance the supervisor's account owns the team, and an
    // assigned supervisor blocks any further request.
    h.engine
        .accept_supervisor_request(&prof_a, request.id)
        .await
        .expect("accept");
    let err = h
        .engine
        .create_supervisor_request(&prof_a, prof_b.supervisor_profile().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Conflict(_)));
}

#[tokio::test]
async fn create_supervisor_request_unknown_profile_fails_not_found() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    h.engine.create_team(&owner).await.expect("create_team");

    let err = h
        .engine
        .create_supervisor_request(&owner, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
async fn cancel_then_accept_fails_not_found() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    h.engine.create_team(&owner).await.expect("create_team");

    let prof = supervisor(&h, "prof@uni.edu", "Prof. Voronov").await;
    let request = h
        .engine
        .create_supervisor_request(&owner, prof.supervisor_profile().unwrap())
        .await
        .expect("create");

    h.engine
        .cancel_supervisor_request(&owner)
        .await
        .expect("cancel");

    let err = h
        .engine
        .accept_supervisor_request(&prof, request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
async fn cancel_without_pending_request_fails_not_found() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    h.engine.create_team(&owner).await.expect("create_team");

    let err = h.engine.cancel_supervisor_request(&owner).await.unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
async fn rejection_leaves_team_untouched() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let prof = supervisor(&h, "prof@uni.edu", "Prof. Voronov").await;
    let request = h
        .engine
        .create_supervisor_request(&owner, prof.supervisor_profile().unwrap())
        .await
        .expect("create");

    let rejected = h
        .engine
        .reject_supervisor_request(&prof, request.id)
        .await
        .expect("reject");
    assert_eq!(rejected.status, RequestStatus::Rejected);

    let team = reload_team(&h.db, team.id).await;
    assert!(team.supervisor_id.is_none());
    assert_eq!(team.owner_account_id, owner.account_id);
    assert_eq!(team.status, TeamStatus::Pending);

    assert!(h
        .notifier
        .sent()
        .contains(&(owner.account_id, "Your supervisor request was rejected.".to_string())));
}

#[tokio::test]
async fn incoming_requests_show_only_pending_for_target() {
    let h = setup().await;

    let owner_a = student(&h, "owner-a@uni.edu", "Anna", "A").await;
    h.engine.create_team(&owner_a).await.expect("create_team");
    let owner_b = student(&h, "owner-b@uni.edu", "Boris", "B").await;
    h.engine.create_team(&owner_b).await.expect("create_team");

    let prof = supervisor(&h, "prof@uni.edu", "Prof. Voronov").await;
    let other = supervisor(&h, "other@uni.edu", "Prof. Other").await;

    h.engine
        .create_supervisor_request(&owner_a, prof.supervisor_profile().unwrap())
        .await
        .expect("request to prof");
    let to_reject = h
        .engine
        .create_supervisor_request(&owner_b, prof.supervisor_profile().unwrap())
        .await
        .expect("second request to prof");
    h.engine
        .reject_supervisor_request(&prof, to_reject.id)
        .await
        .expect("reject");

    let incoming = h
        .engine
        .incoming_supervisor_requests(&prof)
        .await
        .expect("incoming");
    assert_eq!(incoming.len(), 1);

    let none = h
        .engine
        .incoming_supervisor_requests(&other)
        .await
        .expect("incoming for other");
    assert!(none.is_empty());
}

#[tokio::test]
async fn my_team_supervisor_request_returns_latest_regardless_of_status() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    h.engine.create_team(&owner).await.expect("create_team");

    let err = h
        .engine
        .my_team_supervisor_request(&owner)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));

    let prof_a = supervisor(&h, "prof-a@uni.edu", "Prof. A").await;
    let prof_b = supervisor(&h, "prof-b@uni.edu", "Prof. B").await;

    let first = h
        .engine
        .create_supervisor_request(&owner, prof_a.supervisor_profile().unwrap())
        .await
        .expect("first request");
    h.engine
        .reject_supervisor_request(&prof_a, first.id)
        .await
        .expect("reject");

    tokio::time::sleep(Duration::from_millis(5)).await;

    let second = h
        .engine
        .create_supervisor_request(&owner, prof_b.supervisor_profile().unwrap())
        .await
        .expect("second request");

    let latest = h
        .engine
        .my_team_supervisor_request(&owner)
        .await
        .expect("latest request");
    assert_eq!(latest.id, second.id);
}

// ============================================================
// Team resolution, onboarding and deletion
// ============================================================

#[tokio::test]
async fn my_team_resolves_owner_and_member_paths() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let (resolved, is_owner) = h.engine.my_team(&owner).await.expect("my_team for owner");
    assert_eq!(resolved.id, team.id);
    assert!(is_owner);

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    h.engine.apply_to_team(&alice, team.id).await.expect("apply");
    h.engine
        .accept_join(&owner, team.id, alice.student_profile().unwrap())
        .await
        .expect("accept");

    let (resolved, is_owner) = h.engine.my_team(&alice).await.expect("my_team for member");
    assert_eq!(resolved.id, team.id);
    assert!(!is_owner);

    let loner = student(&h, "loner@uni.edu", "Lev", "L").await;
    let err = h.engine.my_team(&loner).await.unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
async fn actor_resolution_fails_without_profile_or_dean_flag() {
    let h = setup().await;

    let acct = seed_account(&h.db, "ghost@uni.edu", "member").await;
    let err = Actor::resolve(&h.db, acct.id).await.unwrap_err();
    assert!(matches!(err, LifecycleError::NoProfile));

    // An unknown account is indistinguishable from one without a role.
    let err = Actor::resolve(&h.db, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, LifecycleError::NoProfile));
}

#[tokio::test]
async fn actor_resolution_prefers_student_then_supervisor_then_dean() {
    let h = setup().await;

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    assert!(matches!(alice.role, Role::Student { .. }));

    let prof = supervisor(&h, "prof@uni.edu", "Prof. Voronov").await;
    assert!(matches!(prof.role, Role::Supervisor { .. }));

    let d = dean(&h, "dean@uni.edu").await;
    assert!(matches!(d.role, Role::Dean));

    // An account holding both profiles resolves to its student profile.
    supervisor_profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        account_id: Set(alice.account_id),
        full_name: Set("Alice Ivanova".to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(&h.db)
    .await
    .expect("Failed to insert supervisor profile");
    let both = Actor::resolve(&h.db, alice.account_id).await.expect("resolve");
    assert_eq!(both.role, alice.role);

    // The dean flag yields only when no profile resolves.
    let flagged = seed_account(&h.db, "flagged@uni.edu", "dean").await;
    supervisor_profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        account_id: Set(flagged.id),
        full_name: Set("Flagged Dean".to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(&h.db)
    .await
    .expect("Failed to insert supervisor profile");
    let resolved = Actor::resolve(&h.db, flagged.id).await.expect("resolve");
    assert!(matches!(resolved.role, Role::Supervisor { .. }));
}

#[tokio::test]
async fn create_team_makes_owner_sole_member() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    assert_eq!(team.owner_account_id, owner.account_id);
    assert_eq!(team.status, TeamStatus::Pending);

    let members = h.engine.team_members(team.id).await.expect("team_members");
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].student_id, owner.student_profile().unwrap());

    // The creator cannot form a second team while being a member.
    let err = h.engine.create_team(&owner).await.unwrap_err();
    assert!(matches!(err, LifecycleError::AlreadyInTeam));
}

#[tokio::test]
async fn delete_team_requires_assigned_supervisor_and_cascades() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let prof = supervisor(&h, "prof@uni.edu", "Prof. Voronov").await;
    let outsider = supervisor(&h, "outsider@uni.edu", "Prof. Outsider").await;

    let request = h
        .engine
        .create_supervisor_request(&owner, prof.supervisor_profile().unwrap())
        .await
        .expect("create");
    h.engine
        .accept_supervisor_request(&prof, request.id)
        .await
        .expect("accept");

    let err = h.engine.delete_team(&outsider, team.id).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Forbidden(_)));

    h.engine.delete_team(&prof, team.id).await.expect("delete");

    // Membership is cascade-cleared, so the student has no team now.
    assert!(
        queries::student_membership(&h.db, owner.student_profile().unwrap())
            .await
            .expect("membership query")
            .is_none()
    );
    let err = h.engine.my_team(&owner).await.unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
async fn supervised_teams_lists_assignments() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let prof = supervisor(&h, "prof@uni.edu", "Prof. Voronov").await;
    assert!(h
        .engine
        .supervised_teams(&prof)
        .await
        .expect("supervised_teams")
        .is_empty());

    let request = h
        .engine
        .create_supervisor_request(&owner, prof.supervisor_profile().unwrap())
        .await
        .expect("create");
    h.engine
        .accept_supervisor_request(&prof, request.id)
        .await
        .expect("accept");

    let supervised = h
        .engine
        .supervised_teams(&prof)
        .await
        .expect("supervised_teams");
    assert_eq!(supervised.len(), 1);
    assert_eq!(supervised[0].id, team.id);
}

// ============================================================
// Dean approval
// ============================================================

#[tokio::test]
async fn dean_approves_team() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let d = dean(&h, "dean@uni.edu").await;
    let approved = h.engine.approve_team(&d, team.id).await.expect("approve");
    assert_eq!(approved.status, TeamStatus::Approved);

    assert!(h
        .notifier
        .sent()
        .iter()
        .any(|(acct, msg)| *acct == owner.account_id && msg.contains("approved")));
}

#[tokio::test]
async fn dean_approves_supervised_team() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let prof = supervisor(&h, "prof@uni.edu", "Prof. Voronov").await;
    let request = h
        .engine
        .create_supervisor_request(&owner, prof.supervisor_profile().unwrap())
        .await
        .expect("create");
    h.engine
        .accept_supervisor_request(&prof, request.id)
        .await
        .expect("accept");
    assert_eq!(reload_team(&h.db, team.id).await.status, TeamStatus::Accepted);

    // Approval is legal from `accepted` just as from `pending`.
    let d = dean(&h, "dean@uni.edu").await;
    let approved = h.engine.approve_team(&d, team.id).await.expect("approve");
    assert_eq!(approved.status, TeamStatus::Approved);
}

#[tokio::test]
async fn dean_returns_team_with_comment() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let d = dean(&h, "dean@uni.edu").await;
    let returned = h
        .engine
        .return_team(&d, team.id, "Topic statement is too broad.")
        .await
        .expect("return");
    assert_eq!(returned.status, TeamStatus::Returned);
    assert_eq!(
        returned.return_comment.as_deref(),
        Some("Topic statement is too broad.")
    );

    assert!(h
        .notifier
        .sent()
        .iter()
        .any(|(acct, msg)| *acct == owner.account_id && msg.contains("too broad")));
}

#[tokio::test]
async fn approval_requires_dean_capability() {
    let h = setup().await;

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let err = h.engine.approve_team(&owner, team.id).await.unwrap_err();
    assert!(matches!(err, LifecycleError::Forbidden(_)));

    let err = h
        .engine
        .return_team(&owner, team.id, "nope")
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Forbidden(_)));
}

// ============================================================
// Notifier behavior
// ============================================================

#[tokio::test]
async fn notifier_failure_does_not_fail_the_mutation() {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect");
    migrate(&db).await.expect("Failed to run migrations");
    let engine = LifecycleEngine::new(db.clone(), Arc::new(FailingNotifier));
    let h = Harness {
        db: db.clone(),
        engine,
        notifier: Arc::new(RecordingNotifier::default()),
    };

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    h.engine
        .apply_to_team(&alice, team.id)
        .await
        .expect("apply must succeed despite the failing notifier");

    let count = join_request::Entity::find().count(&db).await.expect("count");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn persistent_notifier_writes_durable_row() {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect");
    migrate(&db).await.expect("Failed to run migrations");
    let engine = LifecycleEngine::new(db.clone(), Arc::new(PersistentNotifier::new(db.clone())));
    let h = Harness {
        db: db.clone(),
        engine,
        notifier: Arc::new(RecordingNotifier::default()),
    };

    let owner = student(&h, "owner@uni.edu", "Olga", "Orlova").await;
    let team = h.engine.create_team(&owner).await.expect("create_team");

    let alice = student(&h, "alice@uni.edu", "Alice", "Ivanova").await;
    h.engine.apply_to_team(&alice, team.id).await.expect("apply");

    let rows = notification::Entity::find()
        .filter(notification::Column::AccountId.eq(owner.account_id))
        .all(&db)
        .await
        .expect("query notifications");
    assert_eq!(rows.len(), 1);
    assert!(rows[0].message.contains("wants to join your team"));
    assert!(!rows[0].is_read);
}
