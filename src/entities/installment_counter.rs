//! Monthly sequence counter backing contract number allocation.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "installment_counters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Buddhist-calendar year (CE + 543), matching the contract number format
    pub year_be: i32,
    pub month: i32,
    pub seq: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
