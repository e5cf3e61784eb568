//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: authentication plus the last-active timestamp the batch
//!   scheduler consults
//! - `invoices`: inflow records (read-only for the engine)
//! - `expenses`: outflow records (read-only for the engine)
//! - `balance_snapshots`: explicit ledger balance per user
//! - `forecasts`: one cached forecast document per user

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    LastActiveAt,
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    UserId,
    IssuedOn,
    AmountMinor,
    Status,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    UserId,
    PaidOn,
    AmountMinor,
    Status,
}

#[derive(Iden)]
enum BalanceSnapshots {
    Table,
    UserId,
    BalanceMinor,
    UpdatedAt,
}

#[derive(Iden)]
enum Forecasts {
    Table,
    UserId,
    GeneratedAt,
    HorizonDays,
    Payload,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::LastActiveAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invoices::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invoices::UserId).string().not_null())
                    // Nullable: malformed source records keep their row but
                    // are skipped by the aggregator.
                    .col(ColumnDef::new(Invoices::IssuedOn).date())
                    .col(ColumnDef::new(Invoices::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Invoices::Status).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoices-user_id")
                            .from(Invoices::Table, Invoices::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-user-issued")
                    .table(Invoices::Table)
                    .col(Invoices::UserId)
                    .col(Invoices::IssuedOn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::UserId).string().not_null())
                    .col(ColumnDef::new(Expenses::PaidOn).date())
                    .col(ColumnDef::new(Expenses::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::Status).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-user_id")
                            .from(Expenses::Table, Expenses::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-user-paid")
                    .table(Expenses::Table)
                    .col(Expenses::UserId)
                    .col(Expenses::PaidOn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BalanceSnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BalanceSnapshots::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::BalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-balance_snapshots-user_id")
                            .from(BalanceSnapshots::Table, BalanceSnapshots::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Forecasts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Forecasts::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Forecasts::GeneratedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Forecasts::HorizonDays)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Forecasts::Payload).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-forecasts-user_id")
                            .from(Forecasts::Table, Forecasts::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Forecasts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BalanceSnapshots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
