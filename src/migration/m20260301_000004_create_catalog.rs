//! Create test_suites and test_cases tables.
//!
//! Suites reference their parent suite in the same table. Cases with a null
//! `test_suite_id` are unfiled.

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_projects::{Milestone, Project};
use super::m20260301_000002_create_access_control::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestSuite::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestSuite::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestSuite::ProjectId).integer().not_null())
                    .col(ColumnDef::new(TestSuite::ParentId).integer())
                    .col(ColumnDef::new(TestSuite::Name).string().not_null())
                    .col(
                        ColumnDef::new(TestSuite::OrderIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TestSuite::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestSuite::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestSuite::Table, TestSuite::ProjectId)
                            .to(Project::Table, Project::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestSuite::Table, TestSuite::ParentId)
                            .to(TestSuite::Table, TestSuite::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_suites_project_parent")
                    .table(TestSuite::Table)
                    .col(TestSuite::ProjectId)
                    .col(TestSuite::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TestCase::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestCase::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestCase::ProjectId).integer().not_null())
                    .col(ColumnDef::new(TestCase::TestSuiteId).integer())
                    .col(ColumnDef::new(TestCase::MilestoneId).integer())
                    .col(ColumnDef::new(TestCase::Title).string().not_null())
                    .col(
                        ColumnDef::new(TestCase::Content)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(TestCase::OrderIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TestCase::CreatedBy).integer())
                    .col(ColumnDef::new(TestCase::UpdatedBy).integer())
                    .col(
                        ColumnDef::new(TestCase::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCase::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCase::Table, TestCase::ProjectId)
                            .to(Project::Table, Project::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCase::Table, TestCase::TestSuiteId)
                            .to(TestSuite::Table, TestSuite::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCase::Table, TestCase::MilestoneId)
                            .to(Milestone::Table, Milestone::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCase::Table, TestCase::CreatedBy)
                            .to(User::Table, User::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCase::Table, TestCase::UpdatedBy)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_cases_project_suite")
                    .table(TestCase::Table)
                    .col(TestCase::ProjectId)
                    .col(TestCase::TestSuiteId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestCase::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TestSuite::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestSuite {
    #[sea_orm(iden = "test_suites")]
    Table,
    Id,
    ProjectId,
    ParentId,
    Name,
    OrderIndex,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum TestCase {
    #[sea_orm(iden = "test_cases")]
    Table,
    Id,
    ProjectId,
    TestSuiteId,
    MilestoneId,
    Title,
    Content,
    OrderIndex,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}
