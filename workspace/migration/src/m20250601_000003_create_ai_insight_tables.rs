use sea_orm_migration::{prelude::*, schema::*};

use super::m20250601_000001_create_marketplace_tables::Businesses;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BusinessAiSuggestions::Table)
                    .if_not_exists()
                    .col(pk_auto(BusinessAiSuggestions::Id))
                    .col(integer(BusinessAiSuggestions::BusinessId))
                    .col(string(BusinessAiSuggestions::BusinessName))
                    .col(timestamp_with_time_zone(BusinessAiSuggestions::GeneratedAt))
                    .col(timestamp_with_time_zone(BusinessAiSuggestions::CreatedAt))
                    .col(timestamp_with_time_zone(BusinessAiSuggestions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ai_suggestion_business")
                            .from(BusinessAiSuggestions::Table, BusinessAiSuggestions::BusinessId)
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
                    .table(BusinessAiSuggestionItems::Table)
                    .if_not_exists()
                    .col(pk_auto(BusinessAiSuggestionItems::Id))
                    .col(integer(BusinessAiSuggestionItems::SuggestionId))
                    .col(text(BusinessAiSuggestionItems::Suggestion))
                    .col(string(BusinessAiSuggestionItems::Category))
                    .col(string_len(BusinessAiSuggestionItems::Priority, 20))
                    .col(timestamp_with_time_zone(BusinessAiSuggestionItems::CreatedAt))
                    .col(timestamp_with_time_zone(BusinessAiSuggestionItems::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ai_suggestion_item_parent")
                            .from(
                                BusinessAiSuggestionItems::Table,
                                BusinessAiSuggestionItems::SuggestionId,
                            )
                            .to(BusinessAiSuggestions::Table, BusinessAiSuggestions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BusinessProjections::Table)
                    .if_not_exists()
                    .col(pk_auto(BusinessProjections::Id))
                    .col(integer(BusinessProjections::BusinessId))
                    .col(string(BusinessProjections::BusinessName))
                    .col(timestamp_with_time_zone(BusinessProjections::GeneratedAt))
                    .col(timestamp_with_time_zone(BusinessProjections::CreatedAt))
                    .col(timestamp_with_time_zone(BusinessProjections::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projection_business")
                            .from(BusinessProjections::Table, BusinessProjections::BusinessId)
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
                    .table(BusinessProjectionItems::Table)
                    .if_not_exists()
                    .col(pk_auto(BusinessProjectionItems::Id))
                    .col(integer(BusinessProjectionItems::ProjectionId))
                    .col(integer(BusinessProjectionItems::Year))
                    .col(double(BusinessProjectionItems::Revenue))
                    .col(double(BusinessProjectionItems::Expenses))
                    .col(double(BusinessProjectionItems::NetIncome))
                    .col(double(BusinessProjectionItems::CashFlow))
                    .col(timestamp_with_time_zone(BusinessProjectionItems::CreatedAt))
                    .col(timestamp_with_time_zone(BusinessProjectionItems::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projection_item_parent")
                            .from(
                                BusinessProjectionItems::Table,
                                BusinessProjectionItems::ProjectionId,
                            )
                            .to(BusinessProjections::Table, BusinessProjections::Id)
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
            .drop_table(Table::drop().table(BusinessProjectionItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BusinessProjections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BusinessAiSuggestionItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BusinessAiSuggestions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BusinessAiSuggestions {
    Table,
    Id,
    BusinessId,
    BusinessName,
    GeneratedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BusinessAiSuggestionItems {
    Table,
    Id,
    SuggestionId,
    Suggestion,
    Category,
    Priority,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BusinessProjections {
    Table,
    Id,
    BusinessId,
    BusinessName,
    GeneratedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BusinessProjectionItems {
    Table,
    Id,
    ProjectionId,
    Year,
    Revenue,
    Expenses,
    NetIncome,
    CashFlow,
    CreatedAt,
    UpdatedAt,
}
