use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use compute::investment::transition;
use compute::market::{list_businesses, MarketFilter};
use compute::pagination::PageRequest;
use model::entities::investment::{self, InvestmentStatus};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::businesses::{build_business_response, build_business_responses, BusinessResponse};
use crate::helpers::access::{find_business, find_investment, owned_investment};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Query parameters of the marketplace listing. Bad `page`/`limit` values fall back to defaults.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MarketplaceQuery {
    /// 1-based page (default 1)
    pub page: Option<String>,
    /// Page size between 1 and 100 (default 10)
    pub limit: Option<String>,
    /// Exact industry
    pub industry: Option<String>,
    /// Case-insensitive match on name or description
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedBusinesses {
    pub businesses: Vec<BusinessResponse>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateInvestmentRequest {
    pub business_id: i32,
    /// Must be positive
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateInvestmentRequest {
    /// Must be positive
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateInvestmentStatusRequest {
    /// pending, approved, funded, active, exited, rejected or cancelled
    #[validate(length(min = 1))]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvestmentResponse {
    pub id: i32,
    pub investor_id: i32,
    pub business_id: i32,
    pub amount: Decimal,
    pub status: String,
    /// Set when the investment becomes active
    pub time_bought: Option<DateTime<Utc>>,
    /// Set when the investment is exited
    pub time_sold: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<investment::Model> for InvestmentResponse {
    fn from(model: investment::Model) -> Self {
        Self {
            id: model.id,
            investor_id: model.investor_id,
            business_id: model.business_id,
            amount: model.amount,
            status: model.status.to_string(),
            time_bought: model.time_bought,
            time_sold: model.time_sold,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("positive").with_message("Amount must be greater than zero".into()));
    }
    Ok(())
}

async fn live_investments(
    db: &DatabaseConnection,
    investor_id: Option<i32>,
    business_id: Option<i32>,
) -> ApiResult<Vec<InvestmentResponse>> {
    let mut query = investment::Entity::find().filter(investment::Column::DeletedAt.is_null());
    if let Some(investor_id) = investor_id {
        query = query.filter(investment::Column::InvestorId.eq(investor_id));
    }
    if let Some(business_id) = business_id {
        query = query.filter(investment::Column::BusinessId.eq(business_id));
    }
    let rows = query
        .order_by_desc(investment::Column::CreatedAt)
        .order_by_desc(investment::Column::Id)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(InvestmentResponse::from).collect())
}

/// Paginated marketplace listing
#[utoipa::path(
    get,
    path = "/investment/businesses",
    tag = "investments",
    params(MarketplaceQuery),
    responses(
        (status = 200, description = "One page of listed businesses", body = ApiResponse<PaginatedBusinesses>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_marketplace_businesses(
    State(state): State<AppState>,
    Query(query): Query<MarketplaceQuery>,
) -> ApiResult<Json<ApiResponse<PaginatedBusinesses>>> {
    trace!("Entering list_marketplace_businesses function");
    let page = PageRequest::from_raw(query.page.as_deref(), query.limit.as_deref());
    let filter = MarketFilter {
        industry: query.industry,
        search: query.search,
    };
    debug!("Listing marketplace page {} (limit {})", page.page, page.limit);

    let result = list_businesses(&state.db, &filter, page).await?;
    let total_pages = result.total_pages();
    let businesses = build_business_responses(&state.db, result.businesses).await?;

    Ok(Json(ApiResponse::new(
        PaginatedBusinesses {
            businesses,
            total: result.total,
            page: page.page,
            limit: page.limit,
            total_pages,
        },
        "Businesses retrieved successfully",
    )))
}

/// Marketplace view of one business
#[utoipa::path(
    get,
    path = "/investment/businesses/{id}",
    tag = "investments",
    params(("id" = i32, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Business found", body = ApiResponse<BusinessResponse>),
        (status = 404, description = "Business not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_marketplace_business(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<BusinessResponse>>> {
    let found = find_business(&state.db, id).await?;
    let response = build_business_response(&state.db, found).await?;
    Ok(Json(ApiResponse::new(response, "Business retrieved successfully")))
}

/// Invest in a business. The caller becomes the investor.
#[utoipa::path(
    post,
    path = "/investment",
    tag = "investments",
    request_body = CreateInvestmentRequest,
    responses(
        (status = 201, description = "Investment created as pending", body = ApiResponse<InvestmentResponse>),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 404, description = "Business not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_investment(
    State(state): State<AppState>,
    auth: AuthUser,
    Valid(Json(request)): Valid<Json<CreateInvestmentRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<InvestmentResponse>>)> {
    find_business(&state.db, request.business_id).await?;

    let now = Utc::now();
    let created = investment::ActiveModel {
        investor_id: Set(auth.user_id),
        business_id: Set(request.business_id),
        amount: Set(request.amount),
        status: Set(InvestmentStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(
        "User {} invested {} in business {} (investment {})",
        auth.user_id, created.amount, created.business_id, created.id
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(InvestmentResponse::from(created), "Investment created successfully")),
    ))
}

/// Investments of the caller
#[utoipa::path(
    get,
    path = "/investment",
    tag = "investments",
    responses(
        (status = 200, description = "Caller's investments", body = ApiResponse<Vec<InvestmentResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_investments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<InvestmentResponse>>>> {
    let rows = live_investments(&state.db, Some(auth.user_id), None).await?;
    Ok(Json(ApiResponse::new(rows, "Investments retrieved successfully")))
}

/// Fetch one investment. Visible to its investor and to the owner of the business.
#[utoipa::path(
    get,
    path = "/investment/{id}",
    tag = "investments",
    params(("id" = i32, Path, description = "Investment ID")),
    responses(
        (status = 200, description = "Investment found", body = ApiResponse<InvestmentResponse>),
        (status = 403, description = "Neither investor nor business owner", body = ErrorResponse),
        (status = 404, description = "Investment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_investment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<InvestmentResponse>>> {
    let found = find_investment(&state.db, id).await?;
    if found.investor_id != auth.user_id {
        let owner = find_business(&state.db, found.business_id)
            .await
            .map(|b| b.user_id)
            .ok();
        if owner != Some(auth.user_id) {
            warn!("User {} denied access to investment {}", auth.user_id, id);
            return Err(ApiError::forbidden("You cannot view this investment"));
        }
    }
    Ok(Json(ApiResponse::new(InvestmentResponse::from(found), "Investment retrieved successfully")))
}

/// Change the amount of an investment
#[utoipa::path(
    put,
    path = "/investment/{id}",
    tag = "investments",
    params(("id" = i32, Path, description = "Investment ID")),
    request_body = UpdateInvestmentRequest,
    responses(
        (status = 200, description = "Investment updated", body = ApiResponse<InvestmentResponse>),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 403, description = "Not the investor", body = ErrorResponse),
        (status = 404, description = "Investment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_investment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Valid(Json(request)): Valid<Json<UpdateInvestmentRequest>>,
) -> ApiResult<Json<ApiResponse<InvestmentResponse>>> {
    let existing = owned_investment(&state.db, id, &auth).await?;
    debug!("Changing amount of investment {} from {} to {}", id, existing.amount, request.amount);

    let mut active: investment::ActiveModel = existing.into();
    active.amount = Set(request.amount);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!("Investment {} updated", id);
    Ok(Json(ApiResponse::new(InvestmentResponse::from(updated), "Investment updated successfully")))
}

/// Move an investment to another status. `active` stamps time_bought, `exited` stamps time_sold.
#[utoipa::path(
    put,
    path = "/investment/{id}/status",
    tag = "investments",
    params(("id" = i32, Path, description = "Investment ID")),
    request_body = UpdateInvestmentStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<InvestmentResponse>),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 403, description = "Not the investor", body = ErrorResponse),
        (status = 404, description = "Investment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_investment_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Valid(Json(request)): Valid<Json<UpdateInvestmentStatusRequest>>,
) -> ApiResult<Json<ApiResponse<InvestmentResponse>>> {
    let status: InvestmentStatus = request
        .status
        .parse()
        .map_err(|e| ApiError::bad_request(format!("{}", e)))?;
    let existing = owned_investment(&state.db, id, &auth).await?;
    let previous = existing.status;

    let updated = transition(existing, status, Utc::now()).update(&state.db).await?;

    info!("Investment {} moved from {} to {}", id, previous, status);
    Ok(Json(ApiResponse::new(
        InvestmentResponse::from(updated),
        "Investment status updated successfully",
    )))
}

/// Soft-delete an investment
#[utoipa::path(
    delete,
    path = "/investment/{id}",
    tag = "investments",
    params(("id" = i32, Path, description = "Investment ID")),
    responses(
        (status = 200, description = "Investment deleted", body = ApiResponse<String>),
        (status = 403, description = "Not the investor", body = ErrorResponse),
        (status = 404, description = "Investment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_investment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<String>>> {
    let existing = owned_investment(&state.db, id, &auth).await?;

    let now = Utc::now();
    let mut active: investment::ActiveModel = existing.into();
    active.deleted_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(&state.db).await?;

    info!("Investment {} soft-deleted", id);
    Ok(Json(ApiResponse::new(
        format!("Investment {} deleted", id),
        "Investment deleted successfully",
    )))
}

/// Investments made by one investor
#[utoipa::path(
    get,
    path = "/investment/investor/{investor_id}",
    tag = "investments",
    params(("investor_id" = i32, Path, description = "Investor user ID")),
    responses(
        (status = 200, description = "Investments of the investor", body = ApiResponse<Vec<InvestmentResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_investments_by_investor(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(investor_id): Path<i32>,
) -> ApiResult<Json<ApiResponse<Vec<InvestmentResponse>>>> {
    let rows = live_investments(&state.db, Some(investor_id), None).await?;
    Ok(Json(ApiResponse::new(rows, "Investments retrieved successfully")))
}

/// Investments into one business
#[utoipa::path(
    get,
    path = "/investment/business/{business_id}",
    tag = "investments",
    params(("business_id" = i32, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Investments into the business", body = ApiResponse<Vec<InvestmentResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Business not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_investments_by_business(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(business_id): Path<i32>,
) -> ApiResult<Json<ApiResponse<Vec<InvestmentResponse>>>> {
    find_business(&state.db, business_id).await?;
    let rows = live_investments(&state.db, None, Some(business_id)).await?;
    Ok(Json(ApiResponse::new(rows, "Investments retrieved successfully")))
}

/// The caller's investments into one business
#[utoipa::path(
    get,
    path = "/investment/user/business/{business_id}",
    tag = "investments",
    params(("business_id" = i32, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Caller's investments into the business", body = ApiResponse<Vec<InvestmentResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_investments_in_business(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(business_id): Path<i32>,
) -> ApiResult<Json<ApiResponse<Vec<InvestmentResponse>>>> {
    let rows = live_investments(&state.db, Some(auth.user_id), Some(business_id)).await?;
    Ok(Json(ApiResponse::new(rows, "Investments retrieved successfully")))
}
