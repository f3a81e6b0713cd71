//! Lookups shared by handlers. Soft-deleted rows are treated as missing.

use model::entities::{business, investment, product, user};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::{debug, warn};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};

pub async fn find_user(db: &DatabaseConnection, user_id: i32) -> ApiResult<user::Model> {
    user::Entity::find_by_id(user_id)
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User with ID {} not found", user_id)))
}

pub async fn find_business(db: &DatabaseConnection, business_id: i32) -> ApiResult<business::Model> {
    business::Entity::find_by_id(business_id)
        .filter(business::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Business with ID {} not found", business_id)))
}

/// The business, provided the caller owns it.
pub async fn owned_business(
    db: &DatabaseConnection,
    business_id: i32,
    auth: &AuthUser,
) -> ApiResult<business::Model> {
    let business = find_business(db, business_id).await?;
    if business.user_id != auth.user_id {
        warn!(
            "User {} attempted to modify business {} owned by {}",
            auth.user_id, business_id, business.user_id
        );
        return Err(ApiError::forbidden("You do not own this business"));
    }
    debug!("User {} owns business {}", auth.user_id, business_id);
    Ok(business)
}

/// A live product of the given business. Products of other businesses are reported as missing.
pub async fn find_product(
    db: &DatabaseConnection,
    business_id: i32,
    product_id: i32,
) -> ApiResult<product::Model> {
    product::Entity::find_by_id(product_id)
        .filter(product::Column::BusinessId.eq(business_id))
        .filter(product::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "Product with ID {} not found in business {}",
                product_id, business_id
            ))
        })
}

pub async fn find_investment(db: &DatabaseConnection, investment_id: i32) -> ApiResult<investment::Model> {
    investment::Entity::find_by_id(investment_id)
        .filter(investment::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Investment with ID {} not found", investment_id)))
}

/// The investment, provided the caller is its investor.
pub async fn owned_investment(
    db: &DatabaseConnection,
    investment_id: i32,
    auth: &AuthUser,
) -> ApiResult<investment::Model> {
    let investment = find_investment(db, investment_id).await?;
    if investment.investor_id != auth.user_id {
        warn!(
            "User {} attempted to modify investment {} of investor {}",
            auth.user_id, investment_id, investment.investor_id
        );
        return Err(ApiError::forbidden("You are not the investor of this investment"));
    }
    Ok(investment)
}
