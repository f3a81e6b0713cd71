//! Database fixtures shared by the compute tests.

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use model::entities::{business, legal, product, product_legal, user};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn seed_business(db: &DatabaseConnection, name: &str) -> business::Model {
    let now = Utc::now();
    let owner = user::ActiveModel {
        username: Set(format!("owner-{}", name.to_lowercase().replace(' ', "-"))),
        email: Set(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        password_hash: Set("unused".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed owner");

    business::ActiveModel {
        user_id: Set(owner.id),
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed business")
}

pub async fn seed_product(db: &DatabaseConnection, business_id: i32, name: &str) -> product::Model {
    let now = Utc::now();
    product::ActiveModel {
        business_id: Set(business_id),
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed product")
}

pub async fn seed_legal(db: &DatabaseConnection, business_id: i32, legal_type: &str) -> legal::Model {
    let now = Utc::now();
    legal::ActiveModel {
        business_id: Set(business_id),
        legal_type: Set(legal_type.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed legal document")
}

pub async fn seed_product_legal(
    db: &DatabaseConnection,
    product_id: i32,
    legal_type: &str,
) -> product_legal::Model {
    let now = Utc::now();
    product_legal::ActiveModel {
        product_id: Set(product_id),
        legal_type: Set(legal_type.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed product legal document")
}
