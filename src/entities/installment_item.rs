//! Line item entity for installment orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "installment_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub order_id: i64,
    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub name: String,
    /// Device serial. Absent for accessories and services.
    #[sea_orm(column_type = "String(StringLen::N(32))", nullable)]
    pub imei: Option<String>,
    pub price: f64,
    pub qty: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::installment_order::Entity",
        from = "Column::OrderId",
        to = "super::installment_order::Column::Id"
    )]
    InstallmentOrder,
}

impl Related<super::installment_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstallmentOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
