//! Consolidated initial schema migration

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Create accounts table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(uuid(Account::Id).primary_key())
                    .col(string_len(Account::Email, 255).not_null().unique_key())
                    .col(string_len(Account::FullName, 255).not_null())
                    .col(string_len(Account::Role, 32).not_null().default("member"))
                    .col(
                        timestamp_with_time_zone(Account::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_accounts_email")
                    .table(Account::Table)
                    .col(Account::Email)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Create student_profiles table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(StudentProfile::Table)
                    .if_not_exists()
                    .col(uuid(StudentProfile::Id).primary_key())
                    .col(uuid(StudentProfile::AccountId).not_null().unique_key())
                    .col(string_len(StudentProfile::FirstName, 255).not_null())
                    .col(string_len(StudentProfile::LastName, 255).not_null())
                    .col(
                        timestamp_with_time_zone(StudentProfile::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_profiles_account_id")
                            .from(StudentProfile::Table, StudentProfile::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. Create supervisor_profiles table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(SupervisorProfile::Table)
                    .if_not_exists()
                    .col(uuid(SupervisorProfile::Id).primary_key())
                    .col(uuid(SupervisorProfile::AccountId).not_null().unique_key())
                    .col(string_len(SupervisorProfile::FullName, 255).not_null())
                    .col(
                        timestamp_with_time_zone(SupervisorProfile::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supervisor_profiles_account_id")
                            .from(SupervisorProfile::Table, SupervisorProfile::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. Create thesis_topics table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(ThesisTopic::Table)
                    .if_not_exists()
                    .col(uuid(ThesisTopic::Id).primary_key())
                    .col(string_len(ThesisTopic::Title, 255).not_null())
                    .col(
                        timestamp_with_time_zone(ThesisTopic::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. Create teams table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(uuid(Team::Id).primary_key())
                    .col(uuid(Team::OwnerAccountId).not_null())
                    .col(uuid_null(Team::ThesisTopicId))
                    .col(uuid_null(Team::SupervisorId))
                    .col(string_len(Team::Status, 32).not_null().default("pending"))
                    .col(text_null(Team::ReturnComment))
                    .col(
                        timestamp_with_time_zone(Team::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Team::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_owner_account_id")
                            .from(Team::Table, Team::OwnerAccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_thesis_topic_id")
                            .from(Team::Table, Team::ThesisTopicId)
                            .to(ThesisTopic::Table, ThesisTopic::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_supervisor_id")
                            .from(Team::Table, Team::SupervisorId)
                            .to(SupervisorProfile::Table, SupervisorProfile::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_teams_owner_account_id")
                    .table(Team::Table)
                    .col(Team::OwnerAccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_teams_supervisor_id")
                    .table(Team::Table)
                    .col(Team::SupervisorId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 6. Create team_members junction table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(TeamMember::Table)
                    .if_not_exists()
                    .col(uuid(TeamMember::TeamId).not_null())
                    .col(uuid(TeamMember::StudentId).not_null())
                    .col(
                        timestamp_with_time_zone(TeamMember::JoinedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(TeamMember::TeamId)
                            .col(TeamMember::StudentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_team_id")
                            .from(TeamMember::Table, TeamMember::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_student_id")
                            .from(TeamMember::Table, TeamMember::StudentId)
                            .to(StudentProfile::Table, StudentProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A student belongs to at most one team.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_team_members_student_id")
                    .table(TeamMember::Table)
                    .col(TeamMember::StudentId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 7. Create join_requests table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(JoinRequest::Table)
                    .if_not_exists()
                    .col(uuid(JoinRequest::Id).primary_key())
                    .col(uuid(JoinRequest::TeamId).not_null())
                    .col(uuid(JoinRequest::StudentId).not_null())
                    .col(
                        string_len(JoinRequest::Status, 32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(timestamp_with_time_zone(JoinRequest::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_join_requests_team_id")
                            .from(JoinRequest::Table, JoinRequest::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_join_requests_student_id")
                            .from(JoinRequest::Table, JoinRequest::StudentId)
                            .to(StudentProfile::Table, StudentProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_join_requests_team_id")
                    .table(JoinRequest::Table)
                    .col(JoinRequest::TeamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_join_requests_created_at")
                    .table(JoinRequest::Table)
                    .col(JoinRequest::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // At most one pending join request per student, across all teams.
        // Partial indexes are not expressible through the query builder;
        // the same syntax works on SQLite and PostgreSQL.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_join_requests_pending_student \
                 ON join_requests (student_id) WHERE status = 'pending'",
            )
            .await?;

        // ============================================================
        // 8. Create supervisor_requests table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(SupervisorRequest::Table)
                    .if_not_exists()
                    .col(uuid(SupervisorRequest::Id).primary_key())
                    .col(uuid(SupervisorRequest::TeamId).not_null())
                    .col(uuid(SupervisorRequest::SupervisorId).not_null())
                    .col(
                        string_len(SupervisorRequest::Status, 32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(timestamp_with_time_zone(SupervisorRequest::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supervisor_requests_team_id")
                            .from(SupervisorRequest::Table, SupervisorRequest::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supervisor_requests_supervisor_id")
                            .from(SupervisorRequest::Table, SupervisorRequest::SupervisorId)
                            .to(SupervisorProfile::Table, SupervisorProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_supervisor_requests_supervisor_id")
                    .table(SupervisorRequest::Table)
                    .col(SupervisorRequest::SupervisorId)
                    .to_owned(),
            )
            .await?;

        // At most one pending supervisor request per team.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_supervisor_requests_pending_team \
                 ON supervisor_requests (team_id) WHERE status = 'pending'",
            )
            .await?;

        // ============================================================
        // 9. Create notifications table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Notification::Table)
                    .if_not_exists()
                    .col(uuid(Notification::Id).primary_key())
                    .col(uuid(Notification::AccountId).not_null())
                    .col(text(Notification::Message).not_null())
                    .col(boolean(Notification::IsRead).not_null().default(false))
                    .col(timestamp_with_time_zone(Notification::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_account_id")
                            .from(Notification::Table, Notification::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notifications_account_id")
                    .table(Notification::Table)
                    .col(Notification::AccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order (respecting foreign keys)
        manager
            .drop_table(Table::drop().table(Notification::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SupervisorRequest::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(JoinRequest::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TeamMember::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Team::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ThesisTopic::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SupervisorProfile::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(StudentProfile::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await?;

        Ok(())
    }
}

// ============================================================
// Table identifiers
// ============================================================

#[derive(DeriveIden)]
enum Account {
    #[sea_orm(iden = "accounts")]
    Table,
    Id,
    Email,
    FullName,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StudentProfile {
    #[sea_orm(iden = "student_profiles")]
    Table,
    Id,
    AccountId,
    FirstName,
    LastName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SupervisorProfile {
    #[sea_orm(iden = "supervisor_profiles")]
    Table,
    Id,
    AccountId,
    FullName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ThesisTopic {
    #[sea_orm(iden = "thesis_topics")]
    Table,
    Id,
    Title,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Team {
    #[sea_orm(iden = "teams")]
    Table,
    Id,
    OwnerAccountId,
    ThesisTopicId,
    SupervisorId,
    Status,
    ReturnComment,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeamMember {
    #[sea_orm(iden = "team_members")]
    Table,
    TeamId,
    StudentId,
    JoinedAt,
}

#[derive(DeriveIden)]
enum JoinRequest {
    #[sea_orm(iden = "join_requests")]
    Table,
    Id,
    TeamId,
    StudentId,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SupervisorRequest {
    #[sea_orm(iden = "supervisor_requests")]
    Table,
    Id,
    TeamId,
    SupervisorId,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Notification {
    #[sea_orm(iden = "notifications")]
    Table,
    Id,
    AccountId,
    Message,
    IsRead,
    CreatedAt,
}
