use sea_orm_migration::{prelude::*, schema::*};

use super::m20250601_000001_create_marketplace_tables::{Businesses, Products};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Business-level documents found missing by the latest analysis
        manager
            .create_table(
                Table::create()
                    .table(MissingLegals::Table)
                    .if_not_exists()
                    .col(pk_auto(MissingLegals::Id))
                    .col(integer(MissingLegals::BusinessId))
                    .col(string(MissingLegals::LegalType))
                    .col(text_null(MissingLegals::Notes))
                    .col(timestamp_with_time_zone(MissingLegals::CreatedAt))
                    .col(timestamp_with_time_zone(MissingLegals::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_missing_legal_business")
                            .from(MissingLegals::Table, MissingLegals::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MissingLegalSteps::Table)
                    .if_not_exists()
                    .col(pk_auto(MissingLegalSteps::Id))
                    .col(integer(MissingLegalSteps::MissingLegalId))
                    .col(integer(MissingLegalSteps::StepNumber))
                    .col(text(MissingLegalSteps::Description))
                    .col(string_null(MissingLegalSteps::RedirectUrl))
                    .col(timestamp_with_time_zone(MissingLegalSteps::CreatedAt))
                    .col(timestamp_with_time_zone(MissingLegalSteps::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_missing_legal_step_parent")
                            .from(MissingLegalSteps::Table, MissingLegalSteps::MissingLegalId)
                            .to(MissingLegals::Table, MissingLegals::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Product-level documents found missing by the latest analysis
        manager
            .create_table(
                Table::create()
                    .table(MissingProductLegals::Table)
                    .if_not_exists()
                    .col(pk_auto(MissingProductLegals::Id))
                    .col(integer(MissingProductLegals::ProductId))
                    .col(string(MissingProductLegals::LegalType))
                    .col(text_null(MissingProductLegals::Notes))
                    .col(timestamp_with_time_zone(MissingProductLegals::CreatedAt))
                    .col(timestamp_with_time_zone(MissingProductLegals::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_missing_product_legal_product")
                            .from(MissingProductLegals::Table, MissingProductLegals::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MissingProductLegalSteps::Table)
                    .if_not_exists()
                    .col(pk_auto(MissingProductLegalSteps::Id))
                    .col(integer(MissingProductLegalSteps::MissingProductLegalId))
                    .col(integer(MissingProductLegalSteps::StepNumber))
                    .col(text(MissingProductLegalSteps::Description))
                    .col(string_null(MissingProductLegalSteps::RedirectUrl))
                    .col(timestamp_with_time_zone(MissingProductLegalSteps::CreatedAt))
                    .col(timestamp_with_time_zone(MissingProductLegalSteps::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_missing_product_legal_step_parent")
                            .from(
                                MissingProductLegalSteps::Table,
                                MissingProductLegalSteps::MissingProductLegalId,
                            )
                            .to(MissingProductLegals::Table, MissingProductLegals::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MissingProductLegalSteps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MissingProductLegals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MissingLegalSteps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MissingLegals::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MissingLegals {
    Table,
    Id,
    BusinessId,
    LegalType,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MissingLegalSteps {
    Table,
    Id,
    MissingLegalId,
    StepNumber,
    Description,
    RedirectUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MissingProductLegals {
    Table,
    Id,
    ProductId,
    LegalType,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MissingProductLegalSteps {
    Table,
    Id,
    MissingProductLegalId,
    StepNumber,
    Description,
    RedirectUrl,
    CreatedAt,
    UpdatedAt,
}
