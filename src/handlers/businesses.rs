use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, NaiveDate, Utc};
use compute::{financial::current_financials, Valuation};
use model::entities::{business, business_additional_info, product};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::financials::FinancialResponse;
use crate::handlers::products::{new_product, CreateProductRequest, ProductResponse};
use crate::helpers::access::{find_business, owned_business};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Free-form fact about a business, e.g. number of employees
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct AdditionalInfoRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdditionalInfoResponse {
    pub id: i32,
    pub name: String,
    pub value: String,
}

impl From<business_additional_info::Model> for AdditionalInfoResponse {
    fn from(model: business_additional_info::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            value: model.value,
        }
    }
}

/// Request body for registering a business with its initial products
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateBusinessRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Legal form, e.g. "CV", "PT", "UMKM"
    pub business_type: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    /// Founding date (YYYY-MM-DD)
    pub founded_at: Option<NaiveDate>,
    #[serde(default)]
    #[validate(nested)]
    pub products: Vec<CreateProductRequest>,
    #[serde(default)]
    #[validate(nested)]
    pub additional_info: Vec<AdditionalInfoRequest>,
}

/// Request body for updating a business. Only provided fields change.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateBusinessRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub business_type: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub founded_at: Option<NaiveDate>,
}

/// Business with its products, current financial position and valuation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BusinessResponse {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub business_type: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub founded_at: Option<NaiveDate>,
    /// When legal requirements were last analysed
    pub legal_analyzed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub products: Vec<ProductResponse>,
    pub additional_info: Vec<AdditionalInfoResponse>,
    /// Most recent financial statement, if any
    pub financial: Option<FinancialResponse>,
    /// Multiplier chosen by revenue band (1 to 5)
    pub ebitda_multiplier: Decimal,
    /// EBITDA times multiplier; zero without positive EBITDA
    pub market_cap: Decimal,
}

/// Assemble responses for several businesses with one query per related table.
pub async fn build_business_responses(
    db: &DatabaseConnection,
    businesses: Vec<business::Model>,
) -> ApiResult<Vec<BusinessResponse>> {
    if businesses.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = businesses.iter().map(|b| b.id).collect();

    let mut products: HashMap<i32, Vec<ProductResponse>> = HashMap::new();
    for p in product::Entity::find()
        .filter(product::Column::BusinessId.is_in(ids.clone()))
        .filter(product::Column::DeletedAt.is_null())
        .order_by_asc(product::Column::Id)
        .all(db)
        .await?
    {
        products.entry(p.business_id).or_default().push(ProductResponse::from(p));
    }

    let mut infos: HashMap<i32, Vec<AdditionalInfoResponse>> = HashMap::new();
    for info in business_additional_info::Entity::find()
        .filter(business_additional_info::Column::BusinessId.is_in(ids.clone()))
        .order_by_asc(business_additional_info::Column::Id)
        .all(db)
        .await?
    {
        infos
            .entry(info.business_id)
            .or_default()
            .push(AdditionalInfoResponse::from(info));
    }

    let mut financials = current_financials(db, &ids).await?;
    trace!(
        "Loaded relations for {} businesses ({} with financials)",
        ids.len(),
        financials.len()
    );

    Ok(businesses
        .into_iter()
        .map(|b| {
            let current = financials.remove(&b.id);
            let valuation = Valuation::for_current(current.as_ref());
            BusinessResponse {
                products: products.remove(&b.id).unwrap_or_default(),
                additional_info: infos.remove(&b.id).unwrap_or_default(),
                financial: current.map(FinancialResponse::from),
                ebitda_multiplier: valuation.ebitda_multiplier,
                market_cap: valuation.market_cap,
                id: b.id,
                user_id: b.user_id,
                name: b.name,
                business_type: b.business_type,
                description: b.description,
                industry: b.industry,
                founded_at: b.founded_at,
                legal_analyzed_at: b.legal_analyzed_at,
                created_at: b.created_at,
                updated_at: b.updated_at,
            }
        })
        .collect())
}

pub async fn build_business_response(
    db: &DatabaseConnection,
    business: business::Model,
) -> ApiResult<BusinessResponse> {
    build_business_responses(db, vec![business])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::internal("Failed to assemble business"))
}

/// Register a business owned by the caller
#[utoipa::path(
    post,
    path = "/business",
    tag = "businesses",
    request_body = CreateBusinessRequest,
    responses(
        (status = 201, description = "Business created", body = ApiResponse<BusinessResponse>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, request), fields(name = %request.name))]
pub async fn create_business(
    State(state): State<AppState>,
    auth: AuthUser,
    Valid(Json(request)): Valid<Json<CreateBusinessRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<BusinessResponse>>)> {
    trace!("Entering create_business function");
    debug!(
        "Creating business for user {} with {} product(s) and {} info field(s)",
        auth.user_id,
        request.products.len(),
        request.additional_info.len()
    );

    let now = Utc::now();
    let txn = state.db.begin().await?;

    let created = business::ActiveModel {
        user_id: Set(auth.user_id),
        name: Set(request.name.trim().to_string()),
        business_type: Set(request.business_type),
        description: Set(request.description),
        industry: Set(request.industry),
        founded_at: Set(request.founded_at),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for item in request.products {
        new_product(created.id, item, now).insert(&txn).await?;
    }
    for info in request.additional_info {
        business_additional_info::ActiveModel {
            business_id: Set(created.id),
            name: Set(info.name),
            value: Set(info.value),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    info!("Business {} created by user {}", created.id, auth.user_id);
    let response = build_business_response(&state.db, created).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(response, "Business created successfully")),
    ))
}

/// Businesses owned by the caller
#[utoipa::path(
    get,
    path = "/business/user",
    tag = "businesses",
    responses(
        (status = 200, description = "Caller's businesses", body = ApiResponse<Vec<BusinessResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_businesses(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<BusinessResponse>>>> {
    let owned = business::Entity::find()
        .filter(business::Column::UserId.eq(auth.user_id))
        .filter(business::Column::DeletedAt.is_null())
        .order_by_desc(business::Column::CreatedAt)
        .order_by_desc(business::Column::Id)
        .all(&state.db)
        .await?;
    debug!("User {} owns {} businesses", auth.user_id, owned.len());

    let responses = build_business_responses(&state.db, owned).await?;
    Ok(Json(ApiResponse::new(responses, "Businesses retrieved successfully")))
}

/// Business detail with valuation
#[utoipa::path(
    get,
    path = "/business/{id}",
    tag = "businesses",
    params(("id" = i32, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Business found", body = ApiResponse<BusinessResponse>),
        (status = 404, description = "Business not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_business(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<BusinessResponse>>> {
    let found = find_business(&state.db, id).await?;
    let response = build_business_response(&state.db, found).await?;
    Ok(Json(ApiResponse::new(response, "Business retrieved successfully")))
}

/// Update a business owned by the caller
#[utoipa::path(
    put,
    path = "/business/{id}",
    tag = "businesses",
    params(("id" = i32, Path, description = "Business ID")),
    request_body = UpdateBusinessRequest,
    responses(
        (status = 200, description = "Business updated", body = ApiResponse<BusinessResponse>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Business not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, request))]
pub async fn update_business(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Valid(Json(request)): Valid<Json<UpdateBusinessRequest>>,
) -> ApiResult<Json<ApiResponse<BusinessResponse>>> {
    trace!("Entering update_business function");
    let existing = owned_business(&state.db, id, &auth).await?;

    let mut active: business::ActiveModel = existing.clone().into();
    let mut updated_fields = Vec::new();

    if let Some(name) = request.name {
        updated_fields.push(format!("name: {}", name));
        active.name = Set(name.trim().to_string());
    }
    if let Some(business_type) = request.business_type {
        updated_fields.push(format!("business_type: {}", business_type));
        active.business_type = Set(Some(business_type));
    }
    if let Some(description) = request.description {
        updated_fields.push("description".to_string());
        active.description = Set(Some(description));
    }
    if let Some(industry) = request.industry {
        updated_fields.push(format!("industry: {}", industry));
        active.industry = Set(Some(industry));
    }
    if let Some(founded_at) = request.founded_at {
        updated_fields.push(format!("founded_at: {}", founded_at));
        active.founded_at = Set(Some(founded_at));
    }

    let model = if updated_fields.is_empty() {
        debug!("No fields to update for business {}", id);
        existing
    } else {
        debug!("Updating fields: {}", updated_fields.join(", "));
        active.updated_at = Set(Utc::now());
        active.update(&state.db).await?
    };

    info!("Business {} updated", id);
    let response = build_business_response(&state.db, model).await?;
    Ok(Json(ApiResponse::new(response, "Business updated successfully")))
}

/// Soft-delete a business owned by the caller
#[utoipa::path(
    delete,
    path = "/business/{id}",
    tag = "businesses",
    params(("id" = i32, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Business deleted", body = ApiResponse<String>),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Business not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_business(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<String>>> {
    let existing = owned_business(&state.db, id, &auth).await?;

    let now = Utc::now();
    let mut active: business::ActiveModel = existing.into();
    active.deleted_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(&state.db).await?;

    info!("Business {} soft-deleted by user {}", id, auth.user_id);
    Ok(Json(ApiResponse::new(
        format!("Business {} deleted", id),
        "Business deleted successfully",
    )))
}
