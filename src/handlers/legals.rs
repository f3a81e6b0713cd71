use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use common::LegalComparison;
use model::entities::{legal, product, product_legal};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::helpers::access::{find_business, find_product, owned_business};
use crate::helpers::uploads::{parse_date_lenient, read_multipart, store_upload, UploadScope};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Multipart form accepted by the document upload endpoints
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct LegalUploadForm {
    /// Document type, e.g. "NIB", "Halal", "BPOM"
    pub legal_type: String,
    pub issued_by: Option<String>,
    /// YYYY-MM-DD; ignored when unparsable
    pub issued_at: Option<String>,
    /// YYYY-MM-DD; ignored when unparsable
    pub valid_until: Option<String>,
    pub notes: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LegalResponse {
    pub id: i32,
    pub business_id: i32,
    pub legal_type: String,
    pub issued_by: Option<String>,
    pub issued_at: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<legal::Model> for LegalResponse {
    fn from(model: legal::Model) -> Self {
        Self {
            id: model.id,
            business_id: model.business_id,
            legal_type: model.legal_type,
            issued_by: model.issued_by,
            issued_at: model.issued_at,
            valid_until: model.valid_until,
            file_name: model.file_name,
            file_url: model.file_url,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductLegalResponse {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub legal_type: String,
    pub issued_by: Option<String>,
    pub issued_at: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProductLegalResponse {
    fn new(model: product_legal::Model, product_name: String) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            product_name,
            legal_type: model.legal_type,
            issued_by: model.issued_by,
            issued_at: model.issued_at,
            valid_until: model.valid_until,
            file_name: model.file_name,
            file_url: model.file_url,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}

/// Legal documents filed for a business
#[utoipa::path(
    get,
    path = "/business/{id}/legal",
    tag = "legals",
    params(("id" = i32, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Business documents", body = ApiResponse<Vec<LegalResponse>>),
        (status = 404, description = "Business not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_business_legals(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<Vec<LegalResponse>>>> {
    find_business(&state.db, id).await?;
    let documents: Vec<LegalResponse> = legal::Entity::find()
        .filter(legal::Column::BusinessId.eq(id))
        .order_by_asc(legal::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(LegalResponse::from)
        .collect();
    Ok(Json(ApiResponse::new(documents, "Legal documents retrieved successfully")))
}

/// Upload a legal document for a business owned by the caller
#[utoipa::path(
    post,
    path = "/business/{id}/legal",
    tag = "legals",
    params(("id" = i32, Path, description = "Business ID")),
    request_body(content = LegalUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored", body = ApiResponse<LegalResponse>),
        (status = 400, description = "Missing legal_type or file", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Business not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn upload_business_legal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<LegalResponse>>)> {
    trace!("Entering upload_business_legal function");
    owned_business(&state.db, id, &auth).await?;

    let form = read_multipart(multipart).await?;
    let legal_type = form.require_text("legal_type")?.to_string();
    let file = form.require_file()?;

    let stored = store_upload(
        &state.uploads_dir,
        UploadScope::Business,
        id,
        None,
        &file.file_name,
        &file.bytes,
    )
    .await?;

    let now = Utc::now();
    let created = legal::ActiveModel {
        business_id: Set(id),
        legal_type: Set(legal_type),
        issued_by: Set(form.text("issued_by").map(str::to_string)),
        issued_at: Set(parse_date_lenient(form.text("issued_at"), "issued_at")),
        valid_until: Set(parse_date_lenient(form.text("valid_until"), "valid_until")),
        file_name: Set(Some(file.file_name.clone())),
        file_url: Set(Some(stored.url)),
        notes: Set(form.text("notes").map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!("Stored {} document {} for business {}", created.legal_type, created.id, id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(LegalResponse::from(created), "Legal document uploaded successfully")),
    ))
}

/// Legal documents filed for the products of a business
#[utoipa::path(
    get,
    path = "/business/{id}/products/legal",
    tag = "legals",
    params(("id" = i32, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Product documents", body = ApiResponse<Vec<ProductLegalResponse>>),
        (status = 404, description = "Business not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_product_legals(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<Vec<ProductLegalResponse>>>> {
    find_business(&state.db, id).await?;

    let names: HashMap<i32, String> = product::Entity::find()
        .filter(product::Column::BusinessId.eq(id))
        .filter(product::Column::DeletedAt.is_null())
        .all(&state.db)
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    let documents: Vec<ProductLegalResponse> = product_legal::Entity::find()
        .filter(product_legal::Column::ProductId.is_in(names.keys().copied().collect::<Vec<_>>()))
        .order_by_asc(product_legal::Column::ProductId)
        .order_by_asc(product_legal::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|doc| {
            let name = names.get(&doc.product_id).cloned().unwrap_or_default();
            ProductLegalResponse::new(doc, name)
        })
        .collect();
    debug!("Business {} has {} product documents", id, documents.len());

    Ok(Json(ApiResponse::new(documents, "Product legal documents retrieved successfully")))
}

/// Upload a legal document for a product of a business owned by the caller
#[utoipa::path(
    post,
    path = "/business/{id}/products/{product_id}/legal",
    tag = "legals",
    params(
        ("id" = i32, Path, description = "Business ID"),
        ("product_id" = i32, Path, description = "Product ID")
    ),
    request_body(content = LegalUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored", body = ApiResponse<ProductLegalResponse>),
        (status = 400, description = "Missing legal_type or file", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Business or product not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn upload_product_legal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, product_id)): Path<(i32, i32)>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<ProductLegalResponse>>)> {
    trace!("Entering upload_product_legal function");
    owned_business(&state.db, id, &auth).await?;
    let target = find_product(&state.db, id, product_id).await?;

    let form = read_multipart(multipart).await?;
    let legal_type = form.require_text("legal_type")?.to_string();
    let file = form.require_file()?;

    let stored = store_upload(
        &state.uploads_dir,
        UploadScope::Products,
        id,
        Some(product_id),
        &file.file_name,
        &file.bytes,
    )
    .await?;

    let now = Utc::now();
    let created = product_legal::ActiveModel {
        product_id: Set(product_id),
        legal_type: Set(legal_type),
        issued_by: Set(form.text("issued_by").map(str::to_string)),
        issued_at: Set(parse_date_lenient(form.text("issued_at"), "issued_at")),
        valid_until: Set(parse_date_lenient(form.text("valid_until"), "valid_until")),
        file_name: Set(Some(file.file_name.clone())),
        file_url: Set(Some(stored.url)),
        notes: Set(form.text("notes").map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(
        "Stored {} document {} for product {} of business {}",
        created.legal_type, created.id, product_id, id
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ProductLegalResponse::new(created, target.name),
            "Product legal document uploaded successfully",
        )),
    ))
}

/// Stored legal comparison of a business. Never calls the AI provider.
#[utoipa::path(
    get,
    path = "/business/{id}/legal/comparison",
    tag = "legals",
    params(("id" = i32, Path, description = "Business ID")),
    responses(
        (status = 200, description = "Required versus filed documents", body = ApiResponse<LegalComparison>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Business not found or never analysed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_legal_comparison(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i32>,
) -> ApiResult<Json<ApiResponse<LegalComparison>>> {
    let comparison = compute::legal::load(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Business {} has no legal analysis yet", id)))?;
    Ok(Json(ApiResponse::new(comparison, "Legal comparison retrieved successfully")))
}
