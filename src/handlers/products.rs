use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::product;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::helpers::access::{find_business, find_product, owned_business};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// A product to register under a business
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Sales unit, e.g. "pcs", "kg"
    pub unit: Option<String>,
    /// Cost of goods per unit (harga pokok penjualan)
    pub hpp: Option<Decimal>,
    pub revenue: Option<Decimal>,
    pub profit: Option<Decimal>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct AddProductsRequest {
    #[validate(length(min = 1), nested)]
    pub products: Vec<CreateProductRequest>,
}

/// Request body for updating a product. Only provided fields change.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub hpp: Option<Decimal>,
    pub revenue: Option<Decimal>,
    pub profit: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub business_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub hpp: Option<Decimal>,
    pub revenue: Option<Decimal>,
    pub profit: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            business_id: model.business_id,
            name: model.name,
            description: model.description,
            category: model.category,
            unit: model.unit,
            hpp: model.hpp,
            revenue: model.revenue,
            profit: model.profit,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub(crate) fn new_product(business_id: i32, request: CreateProductRequest, now: DateTime<Utc>) -> product::ActiveModel {
    product::ActiveModel {
        business_id: Set(business_id),
        name: Set(request.name.trim().to_string()),
        description: Set(request.description),
        category: Set(request.category),
        unit: Set(request.unit),
        hpp: Set(request.hpp),
        revenue: Set(request.revenue),
        profit: Set(request.profit),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

/// Products of a business
#[utoipa::path(
    get,
    path = "/business/{id}/products",
    tag = "products",
    params(("id" = i32, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Products of the business", body = ApiResponse<Vec<ProductResponse>>),
        (status = 404, description = "Business not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<Vec<ProductResponse>>>> {
    find_business(&state.db, id).await?;

    let products: Vec<ProductResponse> = product::Entity::find()
        .filter(product::Column::BusinessId.eq(id))
        .filter(product::Column::DeletedAt.is_null())
        .order_by_asc(product::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();
    debug!("Business {} has {} products", id, products.len());

    Ok(Json(ApiResponse::new(products, "Products retrieved successfully")))
}

/// Add products to a business owned by the caller
#[utoipa::path(
    post,
    path = "/business/{id}/products",
    tag = "products",
    params(("id" = i32, Path, description = "Business ID")),
    request_body = AddProductsRequest,
    responses(
        (status = 201, description = "Products added", body = ApiResponse<Vec<ProductResponse>>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Business not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, request))]
pub async fn add_products(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Valid(Json(request)): Valid<Json<AddProductsRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Vec<ProductResponse>>>)> {
    trace!("Entering add_products function");
    owned_business(&state.db, id, &auth).await?;

    let now = Utc::now();
    let txn = state.db.begin().await?;
    let mut created = Vec::with_capacity(request.products.len());
    for item in request.products {
        let model = new_product(id, item, now).insert(&txn).await?;
        created.push(ProductResponse::from(model));
    }
    txn.commit().await?;

    info!("Added {} product(s) to business {}", created.len(), id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(created, "Products added successfully")),
    ))
}

/// Update a product of a business owned by the caller
#[utoipa::path(
    put,
    path = "/business/{id}/products/{product_id}",
    tag = "products",
    params(
        ("id" = i32, Path, description = "Business ID"),
        ("product_id" = i32, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Business or product not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, request))]
pub async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, product_id)): Path<(i32, i32)>,
    Valid(Json(request)): Valid<Json<UpdateProductRequest>>,
) -> ApiResult<Json<ApiResponse<ProductResponse>>> {
    owned_business(&state.db, id, &auth).await?;
    let existing = find_product(&state.db, id, product_id).await?;

    let mut active: product::ActiveModel = existing.clone().into();
    let mut updated_fields = Vec::new();

    if let Some(name) = request.name {
        updated_fields.push(format!("name: {}", name));
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = request.description {
        updated_fields.push("description".to_string());
        active.description = Set(Some(description));
    }
    if let Some(category) = request.category {
        updated_fields.push(format!("category: {}", category));
        active.category = Set(Some(category));
    }
    if let Some(unit) = request.unit {
        updated_fields.push(format!("unit: {}", unit));
        active.unit = Set(Some(unit));
    }
    if let Some(hpp) = request.hpp {
        updated_fields.push(format!("hpp: {}", hpp));
        active.hpp = Set(Some(hpp));
    }
    if let Some(revenue) = request.revenue {
        updated_fields.push(format!("revenue: {}", revenue));
        active.revenue = Set(Some(revenue));
    }
    if let Some(profit) = request.profit {
        updated_fields.push(format!("profit: {}", profit));
        active.profit = Set(Some(profit));
    }

    if updated_fields.is_empty() {
        debug!("No fields to update for product {}", product_id);
        return Ok(Json(ApiResponse::new(ProductResponse::from(existing), "No changes")));
    }
    debug!("Updating fields: {}", updated_fields.join(", "));
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!("Product {} of business {} updated", product_id, id);
    Ok(Json(ApiResponse::new(ProductResponse::from(updated), "Product updated successfully")))
}

/// Soft-delete a product of a business owned by the caller
#[utoipa::path(
    delete,
    path = "/business/{id}/products/{product_id}",
    tag = "products",
    params(
        ("id" = i32, Path, description = "Business ID"),
        ("product_id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<String>),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Business or product not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, product_id)): Path<(i32, i32)>,
) -> ApiResult<Json<ApiResponse<String>>> {
    owned_business(&state.db, id, &auth).await?;
    let existing = find_product(&state.db, id, product_id).await?;

    let now = Utc::now();
    let mut active: product::ActiveModel = existing.into();
    active.deleted_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(&state.db).await?;

    info!("Product {} of business {} soft-deleted", product_id, id);
    Ok(Json(ApiResponse::new(
        format!("Product {} deleted", product_id),
        "Product deleted successfully",
    )))
}
