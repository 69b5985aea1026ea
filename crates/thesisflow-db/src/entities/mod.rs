//! Database entities

pub mod account;
pub mod join_request;
pub mod notification;
pub mod student_profile;
pub mod supervisor_profile;
pub mod supervisor_request;
pub mod team;
pub mod team_member;
pub mod thesis_topic;

pub use account::Entity as Account;
pub use join_request::Entity as JoinRequest;
pub use notification::Entity as Notification;
pub use student_profile::Entity as StudentProfile;
pub use supervisor_profile::Entity as SupervisorProfile;
pub use supervisor_request::Entity as SupervisorRequest;
pub use team::Entity as Team;
pub use team_member::Entity as TeamMember;
pub use thesis_topic::Entity as ThesisTopic;

pub mod prelude {
    pub use super::account::Entity as Account;
    pub use super::join_request::Entity as JoinRequest;
    pub use super::notification::Entity as Notification;
    pub use super::student_profile::Entity as StudentProfile;
    pub use super::supervisor_profile::Entity as SupervisorProfile;
    pub use super::supervisor_request::Entity as SupervisorRequest;
    pub use super::team::Entity as Team;
    pub use super::team_member::Entity as TeamMember;
    pub use super::thesis_topic::Entity as ThesisTopic;
}
