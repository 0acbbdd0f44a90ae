//! Persistence access for installment contracts.
//!
//! The admission policy only sees the [`ContractStore`] trait, so tests can
//! substitute stores that answer or fail deterministically.

use chrono::{Datelike, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, QueryFilter,
    TransactionTrait,
};
use tracing::info;

use crate::entities::{installment_counter, installment_item, installment_order};
use crate::models::installment::CreateContractRequest;

/// Contract statuses that hold an IMEI exclusively.
pub const ACTIVE_STATUSES: [&str; 2] = ["ongoing", "active"];

/// Status assigned to freshly created contracts.
pub const INITIAL_STATUS: &str = "ongoing";

/// Offset between the Common Era and Buddhist Era calendars.
const BUDDHIST_YEAR_OFFSET: i32 = 543;

/// The conflict-query capability consumed by the admission policy: find any
/// contract referencing a device serial while in an active status.
pub trait ContractStore {
    fn find_active_contract(
        &self,
        imei: &str,
    ) -> impl Future<Output = Result<Option<String>, DbErr>> + Send;
}

#[derive(Clone)]
pub struct SqlContractStore {
    database: DatabaseConnection,
}

impl SqlContractStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// Inserts the contract and its line items in one transaction and
    /// returns the allocated contract number.
    pub async fn create_contract(
        &self,
        payload: &CreateContractRequest,
        created_by_user: Option<String>,
        created_by_name: Option<String>,
        created_by_ip: String,
    ) -> Result<String, DbErr> {
        let txn = self.database.begin().await?;

        let contract_no = allocate_contract_no(&txn).await?;
        let now_fixed = Utc::now().fixed_offset();

        let order = installment_order::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            contract_no: Set(contract_no.clone()),
            status: Set(INITIAL_STATUS.to_string()),
            customer_first_name: Set(payload.customer.first_name.clone()),
            customer_last_name: Set(payload.customer.last_name.clone()),
            company_name: Set(payload.customer.company_name.clone()),
            phone_number: Set(payload
                .customer
                .phone_number
                .clone()
                .unwrap_or_default()),
            plan_type: Set(payload.plan_type.clone().unwrap_or_default()),
            total_amount: Set(payload.total_amount.unwrap_or(0.0)),
            down_payment: Set(payload.down_payment),
            created_by_user: Set(created_by_user),
            created_by_name: Set(created_by_name),
            created_by_ip: Set(created_by_ip),
            created_at: Set(now_fixed),
        };
        let inserted = installment_order::Entity::insert(order)
            .exec(&txn)
            .await?;

        let items: Vec<installment_item::ActiveModel> = payload
            .items
            .iter()
            .map(|item| installment_item::ActiveModel {
                id: sea_orm::ActiveValue::NotSet,
                order_id: Set(inserted.last_insert_id),
                name: Set(item.name.clone().unwrap_or_default()),
                imei: Set(item.imei.clone()),
                price: Set(item.price.unwrap_or(0.0)),
                qty: Set(item.qty.unwrap_or(0.0) as i32),
            })
            .collect();
        if !items.is_empty() {
            installment_item::Entity::insert_many(items).exec(&txn).await?;
        }

        txn.commit().await?;
        info!("Created installment contract {contract_no}");
        Ok(contract_no)
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }
}

impl ContractStore for SqlContractStore {
    async fn find_active_contract(&self, imei: &str) -> Result<Option<String>, DbErr> {
        let hit = installment_item::Entity::find()
            .filter(installment_item::Column::Imei.eq(imei))
            .find_also_related(installment_order::Entity)
            .filter(installment_order::Column::Status.is_in(ACTIVE_STATUSES))
            .one(&self.database)
            .await?;

        Ok(hit.and_then(|(_, order)| order.map(|order| order.contract_no)))
    }
}

/// Allocates the next contract number for the current Buddhist-calendar
/// month: `INST{yearBE}{MM}{seq:04}`. The unique index on `contract_no`
/// backstops the read-increment race between concurrent transactions.
async fn allocate_contract_no(txn: &sea_orm::DatabaseTransaction) -> Result<String, DbErr> {
    let now = Utc::now();
    let year_be = now.year() + BUDDHIST_YEAR_OFFSET;
    let month = now.month() as i32;
    assert!((1..=12).contains(&month), "Month out of calendar bounds");

    let existing = installment_counter::Entity::find()
        .filter(installment_counter::Column::YearBe.eq(year_be))
        .filter(installment_counter::Column::Month.eq(month))
        .one(txn)
        .await?;

    let seq = match existing {
        Some(row) => {
            let next = row.seq + 1;
            let mut active = row.into_active_model();
            active.seq = Set(next);
            installment_counter::Entity::update(active).exec(txn).await?;
            next
        }
        None => {
            let counter = installment_counter::ActiveModel {
                id: sea_orm::ActiveValue::NotSet,
                year_be: Set(year_be),
                month: Set(month),
                seq: Set(1),
            };
            installment_counter::Entity::insert(counter).exec(txn).await?;
            1
        }
    };

    Ok(format!("INST{year_be}{month:02}{seq:04}"))
}
