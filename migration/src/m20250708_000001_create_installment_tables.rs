use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::Expr;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Installment orders table. One row per hire-purchase contract.
        manager
            .create_table(
                Table::create()
                    .table(InstallmentOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InstallmentOrders::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InstallmentOrders::ContractNo)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(InstallmentOrders::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InstallmentOrders::CustomerFirstName).string_len(128))
                    .col(ColumnDef::new(InstallmentOrders::CustomerLastName).string_len(128))
                    .col(ColumnDef::new(InstallmentOrders::CompanyName).string_len(255))
                    .col(
                        ColumnDef::new(InstallmentOrders::PhoneNumber)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstallmentOrders::PlanType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstallmentOrders::TotalAmount)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InstallmentOrders::DownPayment).double())
                    .col(ColumnDef::new(InstallmentOrders::CreatedByUser).string_len(64))
                    .col(ColumnDef::new(InstallmentOrders::CreatedByName).string_len(128))
                    .col(
                        ColumnDef::new(InstallmentOrders::CreatedByIp)
                            .string_len(45) // IPv6 max length
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstallmentOrders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // Index for status-scoped lookups (conflict checks)
                    .index(
                        Index::create()
                            .name("idx_installment_orders_status")
                            .col(InstallmentOrders::Status),
                    )
                    .to_owned(),
            )
            .await?;

        // Line items table. IMEI is nullable: accessories have no serial.
        manager
            .create_table(
                Table::create()
                    .table(InstallmentItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InstallmentItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InstallmentItems::OrderId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstallmentItems::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InstallmentItems::Imei).string_len(32))
                    .col(ColumnDef::new(InstallmentItems::Price).double().not_null())
                    .col(ColumnDef::new(InstallmentItems::Qty).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_installment_items_order")
                            .from(InstallmentItems::Table, InstallmentItems::OrderId)
                            .to(InstallmentOrders::Table, InstallmentOrders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // Index for IMEI conflict lookups
                    .index(
                        Index::create()
                            .name("idx_installment_items_imei")
                            .col(InstallmentItems::Imei),
                    )
                    .index(
                        Index::create()
                            .name("idx_installment_items_order")
                            .col(InstallmentItems::OrderId),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InstallmentItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InstallmentOrders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InstallmentOrders {
    Table,
    Id,
    ContractNo,
    Status,
    CustomerFirstName,
    CustomerLastName,
    CompanyName,
    PhoneNumber,
    PlanType,
    TotalAmount,
    DownPayment,
    CreatedByUser,
    CreatedByName,
    CreatedByIp,
    CreatedAt,
}

#[derive(Iden)]
enum InstallmentItems {
    Table,
    Id,
    OrderId,
    Name,
    Imei,
    Price,
    Qty,
}
