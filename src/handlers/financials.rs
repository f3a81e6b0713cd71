use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use compute::financial::{
    append_financial, append_revision, current_financial, financial_history, FinancialPatch,
};
use compute::Valuation;
use model::entities::financial;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::helpers::access::{find_business, owned_business};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Financial figures for a new statement. On create, absent figures are
/// stored as zero; on update, they are carried over from the current statement.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct FinancialRequest {
    pub revenue: Option<Decimal>,
    pub ebitda: Option<Decimal>,
    pub assets: Option<Decimal>,
    pub liabilities: Option<Decimal>,
    pub equity: Option<Decimal>,
    #[validate(length(max = 500))]
    pub report_file_url: Option<String>,
    pub notes: Option<String>,
}

impl From<FinancialRequest> for FinancialPatch {
    fn from(request: FinancialRequest) -> Self {
        FinancialPatch {
            revenue: request.revenue,
            ebitda: request.ebitda,
            assets: request.assets,
            liabilities: request.liabilities,
            equity: request.equity,
            report_file_url: request.report_file_url,
            notes: request.notes,
        }
    }
}

/// One financial statement with the valuation it implies
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FinancialResponse {
    pub id: i32,
    pub business_id: i32,
    pub revenue: Decimal,
    pub ebitda: Decimal,
    pub assets: Decimal,
    pub liabilities: Decimal,
    pub equity: Decimal,
    pub report_file_url: Option<String>,
    pub notes: Option<String>,
    pub ebitda_multiplier: Decimal,
    pub market_cap: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<financial::Model> for FinancialResponse {
    fn from(model: financial::Model) -> Self {
        let valuation = Valuation::of(model.revenue, model.ebitda);
        Self {
            id: model.id,
            business_id: model.business_id,
            revenue: model.revenue,
            ebitda: model.ebitda,
            assets: model.assets,
            liabilities: model.liabilities,
            equity: model.equity,
            report_file_url: model.report_file_url,
            notes: model.notes,
            ebitda_multiplier: valuation.ebitda_multiplier,
            market_cap: valuation.market_cap,
            created_at: model.created_at,
        }
    }
}

/// Current financial statement of a business
#[utoipa::path(
    get,
    path = "/business/{id}/financial",
    tag = "financials",
    params(("id" = i32, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Most recent statement", body = ApiResponse<FinancialResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Business not found or no statements yet", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_current_financial(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<FinancialResponse>>> {
    find_business(&state.db, id).await?;
    let current = current_financial(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Business with ID {} has no financial records", id)))?;
    Ok(Json(ApiResponse::new(
        FinancialResponse::from(current),
        "Financial retrieved successfully",
    )))
}

/// Every financial statement of a business, newest first
#[utoipa::path(
    get,
    path = "/business/{id}/financial/history",
    tag = "financials",
    params(("id" = i32, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Statement history", body = ApiResponse<Vec<FinancialResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Business not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_financial_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<Vec<FinancialResponse>>>> {
    find_business(&state.db, id).await?;
    let history: Vec<FinancialResponse> = financial_history(&state.db, id)
        .await?
        .into_iter()
        .map(FinancialResponse::from)
        .collect();
    debug!("Business {} has {} financial statements", id, history.len());
    Ok(Json(ApiResponse::new(history, "Financial history retrieved successfully")))
}

/// Record a new financial statement
#[utoipa::path(
    post,
    path = "/business/{id}/financial",
    tag = "financials",
    params(("id" = i32, Path, description = "Business ID")),
    request_body = FinancialRequest,
    responses(
        (status = 201, description = "Statement recorded", body = ApiResponse<FinancialResponse>),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Business not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, request))]
pub async fn create_financial(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Valid(Json(request)): Valid<Json<FinancialRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<FinancialResponse>>)> {
    owned_business(&state.db, id, &auth).await?;
    let row = append_financial(&state.db, id, request.into()).await?;
    info!("Financial {} recorded for business {}", row.id, id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FinancialResponse::from(row), "Financial created successfully")),
    ))
}

/// Record a revision of the current statement
#[utoipa::path(
    put,
    path = "/business/{id}/financial",
    tag = "financials",
    params(("id" = i32, Path, description = "Business ID")),
    request_body = FinancialRequest,
    responses(
        (status = 200, description = "Revision recorded", body = ApiResponse<FinancialResponse>),
        (status = 400, description = "No fields provided", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Business not found or no statement to revise", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, request))]
pub async fn update_financial(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Valid(Json(request)): Valid<Json<FinancialRequest>>,
) -> ApiResult<Json<ApiResponse<FinancialResponse>>> {
    owned_business(&state.db, id, &auth).await?;

    let patch = FinancialPatch::from(request);
    if patch.is_empty() {
        return Err(ApiError::bad_request("No financial fields provided"));
    }
    let row = append_revision(&state.db, id, patch).await?;
    info!("Financial revision {} recorded for business {}", row.id, id);
    Ok(Json(ApiResponse::new(
        FinancialResponse::from(row),
        "Financial updated successfully",
    )))
}
