//! Installment order entity. One row per hire-purchase contract.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "installment_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Contract number, e.g. INST25680700042 (Buddhist year + month + sequence)
    #[sea_orm(column_type = "String(StringLen::N(32))", unique)]
    pub contract_no: String,
    /// Contract status: ongoing, active, completed, cancelled
    #[sea_orm(column_type = "String(StringLen::N(16))")]
    pub status: String,
    #[sea_orm(column_type = "String(StringLen::N(128))", nullable)]
    pub customer_first_name: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(128))", nullable)]
    pub customer_last_name: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
    pub company_name: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub phone_number: String,
    /// Installment plan: plan1, plan2 or plan3
    #[sea_orm(column_type = "String(StringLen::N(16))")]
    pub plan_type: String,
    pub total_amount: f64,
    pub down_payment: Option<f64>,
    /// Operator user id from the upstream auth layer, if present
    #[sea_orm(column_type = "String(StringLen::N(64))", nullable)]
    pub created_by_user: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(128))", nullable)]
    pub created_by_name: Option<String>,
    /// Client address of the submitting request (for abuse tracing)
    #[sea_orm(column_type = "String(StringLen::N(45))")]
    pub created_by_ip: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::installment_item::Entity")]
    InstallmentItem,
}

impl Related<super::installment_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstallmentItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
