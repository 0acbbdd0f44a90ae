use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Monthly contract-number counter, keyed by Buddhist-calendar year.
        manager
            .create_table(
                Table::create()
                    .table(InstallmentCounters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InstallmentCounters::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InstallmentCounters::YearBe)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstallmentCounters::Month)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstallmentCounters::Seq)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .index(
                        Index::create()
                            .name("idx_installment_counters_period")
                            .col(InstallmentCounters::YearBe)
                            .col(InstallmentCounters::Month)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InstallmentCounters::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InstallmentCounters {
    Table,
    Id,
    YearBe,
    Month,
    Seq,
}
