//! Create test_plans, test_runs, test_run_cases and comments tables.

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_projects::Project;
use super::m20260301_000002_create_access_control::User;
use super::m20260301_000003_create_statuses::Status;
use super::m20260301_000004_create_catalog::TestCase;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestPlan::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestPlan::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestPlan::ProjectId).integer().not_null())
                    .col(ColumnDef::new(TestPlan::Title).string().not_null())
                    .col(ColumnDef::new(TestPlan::Status).string().not_null())
                    .col(ColumnDef::new(TestPlan::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(TestPlan::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(TestPlan::CreatedBy).integer())
                    .col(ColumnDef::new(TestPlan::UpdatedBy).integer())
                    .col(
                        ColumnDef::new(TestPlan::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestPlan::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestPlan::Table, TestPlan::ProjectId)
                            .to(Project::Table, Project::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TestRun::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestRun::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestRun::ProjectId).integer().not_null())
                    .col(ColumnDef::new(TestRun::TestPlanId).integer().not_null())
                    .col(ColumnDef::new(TestRun::Title).string().not_null())
                    .col(ColumnDef::new(TestRun::Status).string().not_null())
                    .col(ColumnDef::new(TestRun::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(TestRun::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(TestRun::CreatedBy).integer())
                    .col(ColumnDef::new(TestRun::UpdatedBy).integer())
                    .col(ColumnDef::new(TestRun::FrozenSnapshot).text())
                    .col(
                        ColumnDef::new(TestRun::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestRun::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestRun::Table, TestRun::ProjectId)
                            .to(Project::Table, Project::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestRun::Table, TestRun::TestPlanId)
                            .to(TestPlan::Table, TestPlan::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_runs_test_plan_id")
                    .table(TestRun::Table)
                    .col(TestRun::TestPlanId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TestRunCase::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestRunCase::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestRunCase::TestRunId).integer().not_null())
                    .col(ColumnDef::new(TestRunCase::TestCaseId).integer().not_null())
                    .col(ColumnDef::new(TestRunCase::AssignedToId).integer())
                    .col(ColumnDef::new(TestRunCase::StatusId).integer().not_null())
                    .col(
                        ColumnDef::new(TestRunCase::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestRunCase::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestRunCase::Table, TestRunCase::TestRunId)
                            .to(TestRun::Table, TestRun::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestRunCase::Table, TestRunCase::TestCaseId)
                            .to(TestCase::Table, TestCase::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestRunCase::Table, TestRunCase::AssignedToId)
                            .to(User::Table, User::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestRunCase::Table, TestRunCase::StatusId)
                            .to(Status::Table, Status::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_run_cases_run_case")
                    .table(TestRunCase::Table)
                    .col(TestRunCase::TestRunId)
                    .col(TestRunCase::TestCaseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Comment::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Comment::TestRunCaseId).integer().not_null())
                    .col(ColumnDef::new(Comment::StatusId).integer())
                    .col(ColumnDef::new(Comment::Content).text().not_null())
                    .col(ColumnDef::new(Comment::CreatedBy).integer())
                    .col(ColumnDef::new(Comment::UpdatedBy).integer())
                    .col(
                        ColumnDef::new(Comment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Comment::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Comment::Table, Comment::TestRunCaseId)
                            .to(TestRunCase::Table, TestRunCase::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Comment::Table, Comment::StatusId)
                            .to(Status::Table, Status::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_test_run_case_id")
                    .table(Comment::Table)
                    .col(Comment::TestRunCaseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TestRunCase::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TestRun::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TestPlan::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TestPlan {
    #[sea_orm(iden = "test_plans")]
    Table,
    Id,
    ProjectId,
    Title,
    Status,
    StartedAt,
    CompletedAt,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TestRun {
    #[sea_orm(iden = "test_runs")]
    Table,
    Id,
    ProjectId,
    TestPlanId,
    Title,
    Status,
    StartedAt,
    CompletedAt,
    CreatedBy,
    UpdatedBy,
    FrozenSnapshot,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TestRunCase {
    #[sea_orm(iden = "test_run_cases")]
    Table,
    Id,
    TestRunId,
    TestCaseId,
    AssignedToId,
    StatusId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Comment {
    #[sea_orm(iden = "comments")]
    Table,
    Id,
    TestRunCaseId,
    StatusId,
    Content,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}
