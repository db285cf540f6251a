//! Status entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "statuses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub color: String,
    /// Exactly one row carries the default flag.
    pub is_default: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::test_run_case::Entity")]
    TestRunCases,
}

impl Related<super::test_run_case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestRunCases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
