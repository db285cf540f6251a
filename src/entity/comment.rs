//! Comment entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub test_run_case_id: i32,
    /// Status the run-case was moved to alongside this comment, if any.
    pub status_id: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_run_case::Entity",
        from = "Column::TestRunCaseId",
        to = "super::test_run_case::Column::Id"
    )]
    TestRunCase,
    #[sea_orm(
        belongs_to = "super::status::Entity",
        from = "Column::StatusId",
        to = "super::status::Column::Id"
    )]
    Status,
}

impl Related<super::test_run_case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestRunCase.def()
    }
}

impl Related<super::status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
