//! SeaORM entities for the marketplace: users, the businesses they list,
//! the documents and financials attached to those businesses, investments,
//! and the stored output of AI-backed analyses.
//!
//! Every table carries an explicit `id`/`created_at`/`updated_at` group.
//! Users, businesses, products and investments additionally carry a
//! `deleted_at` tombstone; rows with a tombstone are filtered by every reader.

pub mod business;
pub mod business_additional_info;
pub mod business_ai_suggestion;
pub mod business_ai_suggestion_item;
pub mod business_projection;
pub mod business_projection_item;
pub mod financial;
pub mod investment;
pub mod legal;
pub mod missing_legal;
pub mod missing_legal_step;
pub mod missing_product_legal;
pub mod missing_product_legal_step;
pub mod product;
pub mod product_legal;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::business::Entity as Business;
    pub use super::business_additional_info::Entity as BusinessAdditionalInfo;
    pub use super::business_ai_suggestion::Entity as BusinessAiSuggestion;
    pub use super::business_ai_suggestion_item::Entity as BusinessAiSuggestionItem;
    pub use super::business_projection::Entity as BusinessProjection;
    pub use super::business_projection_item::Entity as BusinessProjectionItem;
    pub use super::financial::Entity as Financial;
    pub use super::investment::Entity as Investment;
    pub use super::legal::Entity as Legal;
    pub use super::missing_legal::Entity as MissingLegal;
    pub use super::missing_legal_step::Entity as MissingLegalStep;
    pub use super::missing_product_legal::Entity as MissingProductLegal;
    pub use super::missing_product_legal_step::Entity as MissingProductLegalStep;
    pub use super::product::Entity as Product;
    pub use super::product_legal::Entity as ProductLegal;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::{NaiveDate, Utc};
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use investment::InvestmentStatus;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    async fn insert_user(db: &DatabaseConnection, name: &str) -> Result<user::Model, DbErr> {
        let now = Utc::now();
        user::ActiveModel {
            username: Set(name.to_string()),
            email: Set(format!("{}@example.com", name)),
            password_hash: Set("not-a-real-hash".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let now = Utc::now();

        let owner = insert_user(&db, "owner").await?;
        let investor = insert_user(&db, "investor").await?;

        let shop = business::ActiveModel {
            user_id: Set(owner.id),
            name: Set("Kopi Senja".to_string()),
            business_type: Set(Some("CV".to_string())),
            industry: Set(Some("Food & Beverage".to_string())),
            founded_at: Set(NaiveDate::from_ymd_opt(2019, 4, 1)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let coffee = product::ActiveModel {
            business_id: Set(shop.id),
            name: Set("Es Kopi Susu".to_string()),
            hpp: Set(Some(Decimal::new(8_000, 0))),
            revenue: Set(Some(Decimal::new(18_000, 0))),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        product_legal::ActiveModel {
            product_id: Set(coffee.id),
            legal_type: Set("Halal".to_string()),
            issued_by: Set(Some("BPJPH".to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        financial::ActiveModel {
            business_id: Set(shop.id),
            revenue: Set(Decimal::new(4_000_000_000, 0)),
            ebitda: Set(Decimal::new(500_000_000, 0)),
            assets: Set(Decimal::ZERO),
            liabilities: Set(Decimal::ZERO),
            equity: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let stake = investment::ActiveModel {
            investor_id: Set(investor.id),
            business_id: Set(shop.id),
            amount: Set(Decimal::new(25_000_000, 0)),
            status: Set(InvestmentStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Relations resolve in both directions
        let owned = owner.find_related(Business).all(&db).await?;
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].name, "Kopi Senja");

        let products = shop.find_related(Product).all(&db).await?;
        assert_eq!(products.len(), 1);
        let product_docs = products[0].find_related(ProductLegal).all(&db).await?;
        assert_eq!(product_docs[0].legal_type, "Halal");

        let financials = shop.find_related(Financial).all(&db).await?;
        assert_eq!(financials[0].revenue, Decimal::new(4_000_000_000, 0));

        // Status enum round-trips through the string column
        let loaded = Investment::find_by_id(stake.id).one(&db).await?.unwrap();
        assert_eq!(loaded.status, InvestmentStatus::Pending);
        let pending = Investment::find()
            .filter(investment::Column::Status.eq(InvestmentStatus::Pending))
            .all(&db)
            .await?;
        assert_eq!(pending.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_unique_username_is_enforced() -> Result<(), DbErr> {
        let db = setup_db().await?;
        insert_user(&db, "duplicate").await?;

        let second = user::ActiveModel {
            username: Set("duplicate".to_string()),
            email: Set("other@example.com".to_string()),
            password_hash: Set("x".to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await;

        assert!(second.is_err());
        Ok(())
    }

    #[test]
    fn test_investment_status_parsing() {
        assert_eq!("active".parse::<InvestmentStatus>(), Ok(InvestmentStatus::Active));
        assert_eq!(" Exited ".parse::<InvestmentStatus>(), Ok(InvestmentStatus::Exited));
        assert!("sold".parse::<InvestmentStatus>().is_err());
        assert_eq!(InvestmentStatus::Cancelled.to_string(), "cancelled");
    }
}
