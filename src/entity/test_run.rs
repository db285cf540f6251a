//! TestRun entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_runs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub test_plan_id: i32,
    pub title: String,
    pub status: String,
    pub started_at: Option<DateTimeUtc>,
    pub completed_at: Option<DateTimeUtc>,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    /// Serialized run view, written once when the run is completed.
    #[sea_orm(column_type = "Text", nullable)]
    pub frozen_snapshot: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_plan::Entity",
        from = "Column::TestPlanId",
        to = "super::test_plan::Column::Id"
    )]
    TestPlan,
    #[sea_orm(has_many = "super::test_run_case::Entity")]
    TestRunCases,
}

impl Related<super::test_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestPlan.def()
    }
}

impl Related<super::test_run_case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestRunCases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
