use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone(Users::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Users::DeletedAt))
                    .to_owned(),
            )
            .await?;

        // Create businesses table
        manager
            .create_table(
                Table::create()
                    .table(Businesses::Table)
                    .if_not_exists()
                    .col(pk_auto(Businesses::Id))
                    .col(integer(Businesses::UserId))
                    .col(string(Businesses::Name))
                    .col(string_null(Businesses::BusinessType))
                    .col(text_null(Businesses::Description))
                    .col(string_null(Businesses::Industry))
                    .col(date_null(Businesses::FoundedAt))
                    .col(timestamp_with_time_zone_null(Businesses::LegalAnalyzedAt))
                    .col(timestamp_with_time_zone(Businesses::CreatedAt))
                    .col(timestamp_with_time_zone(Businesses::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Businesses::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_business_owner")
                            .from(Businesses::Table, Businesses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_businesses_user_id")
                    .table(Businesses::Table)
                    .col(Businesses::UserId)
                    .to_owned(),
            )
            .await?;

        // Create business_additional_infos table
        manager
            .create_table(
                Table::create()
                    .table(BusinessAdditionalInfos::Table)
                    .if_not_exists()
                    .col(pk_auto(BusinessAdditionalInfos::Id))
                    .col(integer(BusinessAdditionalInfos::BusinessId))
                    .col(string(BusinessAdditionalInfos::Name))
                    .col(text(BusinessAdditionalInfos::Value))
                    .col(timestamp_with_time_zone(BusinessAdditionalInfos::CreatedAt))
                    .col(timestamp_with_time_zone(BusinessAdditionalInfos::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_additional_info_business")
                            .from(BusinessAdditionalInfos::Table, BusinessAdditionalInfos::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create products table
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::Id))
                    .col(integer(Products::BusinessId))
                    .col(string(Products::Name))
                    .col(text_null(Products::Description))
                    .col(string_null(Products::Category))
                    .col(string_null(Products::Unit))
                    .col(decimal_null(Products::Hpp).decimal_len(16, 4))
                    .col(decimal_null(Products::Revenue).decimal_len(16, 4))
                    .col(decimal_null(Products::Profit).decimal_len(16, 4))
                    .col(timestamp_with_time_zone(Products::CreatedAt))
                    .col(timestamp_with_time_zone(Products::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Products::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_business")
                            .from(Products::Table, Products::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_business_id")
                    .table(Products::Table)
                    .col(Products::BusinessId)
                    .to_owned(),
            )
            .await?;

        // Create legals table
        manager
            .create_table(
                Table::create()
                    .table(Legals::Table)
                    .if_not_exists()
                    .col(pk_auto(Legals::Id))
                    .col(integer(Legals::BusinessId))
                    .col(string(Legals::LegalType))
                    .col(string_null(Legals::IssuedBy))
                    .col(date_null(Legals::IssuedAt))
                    .col(date_null(Legals::ValidUntil))
                    .col(string_null(Legals::FileName))
                    .col(string_null(Legals::FileUrl))
                    .col(text_null(Legals::Notes))
                    .col(timestamp_with_time_zone(Legals::CreatedAt))
                    .col(timestamp_with_time_zone(Legals::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_legal_business")
                            .from(Legals::Table, Legals::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create product_legals table
        manager
            .create_table(
                Table::create()
                    .table(ProductLegals::Table)
                    .if_not_exists()
                    .col(pk_auto(ProductLegals::Id))
                    .col(integer(ProductLegals::ProductId))
                    .col(string(ProductLegals::LegalType))
                    .col(string_null(ProductLegals::IssuedBy))
                    .col(date_null(ProductLegals::IssuedAt))
                    .col(date_null(ProductLegals::ValidUntil))
                    .col(string_null(ProductLegals::FileName))
                    .col(string_null(ProductLegals::FileUrl))
                    .col(text_null(ProductLegals::Notes))
                    .col(timestamp_with_time_zone(ProductLegals::CreatedAt))
                    .col(timestamp_with_time_zone(ProductLegals::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_legal_product")
                            .from(ProductLegals::Table, ProductLegals::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create financials table
        manager
            .create_table(
                Table::create()
                    .table(Financials::Table)
                    .if_not_exists()
                    .col(pk_auto(Financials::Id))
                    .col(integer(Financials::BusinessId))
                    .col(decimal(Financials::Revenue).decimal_len(16, 4))
                    .col(decimal(Financials::Ebitda).decimal_len(16, 4))
                    .col(decimal(Financials::Assets).decimal_len(16, 4))
                    .col(decimal(Financials::Liabilities).decimal_len(16, 4))
                    .col(decimal(Financials::Equity).decimal_len(16, 4))
                    .col(string_null(Financials::ReportFileUrl))
                    .col(text_null(Financials::Notes))
                    .col(timestamp_with_time_zone(Financials::CreatedAt))
                    .col(timestamp_with_time_zone(Financials::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_financial_business")
                            .from(Financials::Table, Financials::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_financials_business_created")
                    .table(Financials::Table)
                    .col(Financials::BusinessId)
                    .col(Financials::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Create investments table
        manager
            .create_table(
                Table::create()
                    .table(Investments::Table)
                    .if_not_exists()
                    .col(pk_auto(Investments::Id))
                    .col(integer(Investments::InvestorId))
                    .col(integer(Investments::BusinessId))
                    .col(decimal(Investments::Amount).decimal_len(16, 4))
                    .col(string_len(Investments::Status, 20).default("pending"))
                    .col(timestamp_with_time_zone_null(Investments::TimeBought))
                    .col(timestamp_with_time_zone_null(Investments::TimeSold))
                    .col(timestamp_with_time_zone(Investments::CreatedAt))
                    .col(timestamp_with_time_zone(Investments::UpdatedAt))
                    .col(timestamp_with_time_zone_null(Investments::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_investment_investor")
                            .from(Investments::Table, Investments::InvestorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_investment_business")
                            .from(Investments::Table, Investments::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
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
            .drop_table(Table::drop().table(Investments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Financials::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductLegals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Legals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BusinessAdditionalInfos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Businesses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Businesses {
    Table,
    Id,
    UserId,
    Name,
    BusinessType,
    Description,
    Industry,
    FoundedAt,
    LegalAnalyzedAt,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum BusinessAdditionalInfos {
    Table,
    Id,
    BusinessId,
    Name,
    Value,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Products {
    Table,
    Id,
    BusinessId,
    Name,
    Description,
    Category,
    Unit,
    Hpp,
    Revenue,
    Profit,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Legals {
    Table,
    Id,
    BusinessId,
    LegalType,
    IssuedBy,
    IssuedAt,
    ValidUntil,
    FileName,
    FileUrl,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProductLegals {
    Table,
    Id,
    ProductId,
    LegalType,
    IssuedBy,
    IssuedAt,
    ValidUntil,
    FileName,
    FileUrl,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Financials {
    Table,
    Id,
    BusinessId,
    Revenue,
    Ebitda,
    Assets,
    Liabilities,
    Equity,
    ReportFileUrl,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Investments {
    Table,
    Id,
    InvestorId,
    BusinessId,
    Amount,
    Status,
    TimeBought,
    TimeSold,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
