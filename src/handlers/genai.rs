use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, Query, State},
    response::Json,
};
use axum_valid::Valid;
use chrono::{Datelike, Utc};
use common::{
    BusinessProjections, BusinessSuggestions, InferredProducts, InvestmentAdvice, LegalComparison,
};
use compute::financial::current_financial;
use compute::insights::{
    latest_projection, latest_suggestions, store_projection, store_suggestions, StoredProjection,
};
use compute::market::{advice_candidates, market_statistics};
use compute::projection::summarize;
use model::entities::{business, legal, product, product_legal};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::genai::prompts::{
    business_profile, extract_keywords, financial_summary, investment_advice_prompt,
    legal_analysis_prompt, parse_product_list, projections_prompt, suggestions_prompt,
    INFER_PRODUCTS_PROMPT,
};
use crate::genai::schemas::{
    chat_schema, legal_comparison_schema, product_list_schema, projections_schema,
    suggestions_schema, ChatSection, GeneratedProjections, GeneratedSuggestions,
};
use crate::genai::{parse_json, GenerateRequest};
use crate::helpers::access::owned_business;
use crate::helpers::uploads::read_multipart;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

const DEFAULT_ATTACHMENT_MIME: &str = "application/pdf";

#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ChatQuery {
    /// Free-form question
    #[validate(length(min = 1, max = 4000))]
    pub input: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub sections: Vec<ChatSection>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct LegalAnalysisRequest {
    pub business_id: i32,
    /// Ask the provider again instead of returning the stored analysis
    #[serde(default)]
    pub is_refresh: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RefreshQuery {
    /// Regenerate instead of returning the latest stored result
    #[serde(default, rename = "isRefresh")]
    pub is_refresh: bool,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct InvestmentAdviceRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
    /// Only consider businesses of this industry
    pub industry: Option<String>,
}

/// Profile text of a business with its documents and each live product's documents.
async fn load_profile(db: &DatabaseConnection, business: &business::Model) -> ApiResult<String> {
    let legals = legal::Entity::find()
        .filter(legal::Column::BusinessId.eq(business.id))
        .order_by_asc(legal::Column::Id)
        .all(db)
        .await?;

    let products = product::Entity::find()
        .filter(product::Column::BusinessId.eq(business.id))
        .filter(product::Column::DeletedAt.is_null())
        .order_by_asc(product::Column::Id)
        .all(db)
        .await?;

    let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
    let mut docs: HashMap<i32, Vec<product_legal::Model>> = HashMap::new();
    for doc in product_legal::Entity::find()
        .filter(product_legal::Column::ProductId.is_in(ids))
        .order_by_asc(product_legal::Column::Id)
        .all(db)
        .await?
    {
        docs.entry(doc.product_id).or_default().push(doc);
    }

    let with_docs: Vec<(product::Model, Vec<product_legal::Model>)> = products
        .into_iter()
        .map(|p| {
            let own = docs.remove(&p.id).unwrap_or_default();
            (p, own)
        })
        .collect();

    Ok(business_profile(business, &legals, &with_docs))
}

/// Free-form answer from the provider
#[utoipa::path(
    get,
    path = "/genai/response",
    tag = "genai",
    params(ChatQuery),
    responses(
        (status = 200, description = "Answer split into sections", body = ApiResponse<ChatResponse>),
        (status = 400, description = "Missing input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Provider failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, query))]
pub async fn generate_response(
    State(state): State<AppState>,
    auth: AuthUser,
    Valid(Query(query)): Valid<Query<ChatQuery>>,
) -> ApiResult<Json<ApiResponse<ChatResponse>>> {
    debug!("User {} asked a {}-char question", auth.user_id, query.input.len());
    let raw = state
        .genai
        .generate(GenerateRequest::json(query.input, chat_schema()))
        .await?;
    let sections: Vec<ChatSection> = parse_json(&raw)?;
    Ok(Json(ApiResponse::new(ChatResponse { sections }, "Response generated successfully")))
}

/// Read product names out of an uploaded document
#[utoipa::path(
    post,
    path = "/genai/infer-products",
    tag = "genai",
    request_body(content = String, content_type = "multipart/form-data", description = "Form with a `file` part"),
    responses(
        (status = 200, description = "Product names found in the document", body = ApiResponse<InferredProducts>),
        (status = 400, description = "Missing file", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Provider failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn infer_products(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<ApiResponse<InferredProducts>>> {
    let form = read_multipart(multipart).await?;
    let file = form.require_file()?;
    let mime_type = file
        .content_type
        .clone()
        .filter(|m| m != "application/octet-stream")
        .unwrap_or_else(|| DEFAULT_ATTACHMENT_MIME.to_string());
    debug!(
        "User {} inferring products from '{}' ({}, {} bytes)",
        auth.user_id,
        file.file_name,
        mime_type,
        file.bytes.len()
    );

    let request = GenerateRequest::json(INFER_PRODUCTS_PROMPT, product_list_schema())
        .with_attachment(mime_type, file.bytes.clone());
    let raw = state.genai.generate(request).await?;
    let products = parse_product_list(&raw);

    info!("Inferred {} product(s) from '{}'", products.len(), file.file_name);
    Ok(Json(ApiResponse::new(InferredProducts { products }, "Products inferred successfully")))
}

/// Compare required legal documents with those on file
#[utoipa::path(
    post,
    path = "/genai/legal-analysis",
    tag = "genai",
    request_body = LegalAnalysisRequest,
    responses(
        (status = 200, description = "Stored or fresh comparison", body = ApiResponse<LegalComparison>),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Business not found", body = ErrorResponse),
        (status = 500, description = "Provider failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn analyze_legals(
    State(state): State<AppState>,
    auth: AuthUser,
    Valid(Json(request)): Valid<Json<LegalAnalysisRequest>>,
) -> ApiResult<Json<ApiResponse<LegalComparison>>> {
    let target = owned_business(&state.db, request.business_id, &auth).await?;

    if !request.is_refresh {
        if let Some(stored) = compute::legal::load(&state.db, target.id).await? {
            debug!("Returning stored legal analysis of business {}", target.id);
            return Ok(Json(ApiResponse::new(stored, "Legal analysis retrieved successfully")));
        }
    }

    let profile = load_profile(&state.db, &target).await?;
    trace!("Legal analysis profile:\n{}", profile);
    let raw = state
        .genai
        .generate(GenerateRequest::json(
            legal_analysis_prompt(&profile),
            legal_comparison_schema(),
        ))
        .await?;
    let required: LegalComparison = parse_json(&raw)?;

    let reconciled = compute::legal::reconcile(&state.db, target.id, &required).await?;
    compute::legal::persist(&state.db, target.id, &reconciled).await?;
    let stored = compute::legal::load(&state.db, target.id)
        .await?
        .ok_or_else(|| ApiError::internal("Legal analysis was not stored"))?;

    info!(
        "Legal analysis of business {} stored with {} missing requirement(s)",
        target.id,
        stored.missing_count()
    );
    Ok(Json(ApiResponse::new(stored, "Legal analysis completed successfully")))
}

/// Improvement suggestions for a business, cached per business
#[utoipa::path(
    get,
    path = "/genai/business/{id}/suggestions",
    tag = "genai",
    params(("id" = i32, Path, description = "Business ID"), RefreshQuery),
    responses(
        (status = 200, description = "Latest or regenerated suggestions", body = ApiResponse<BusinessSuggestions>),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Business not found", body = ErrorResponse),
        (status = 500, description = "Provider failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_suggestions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Query(query): Query<RefreshQuery>,
) -> ApiResult<Json<ApiResponse<BusinessSuggestions>>> {
    let target = owned_business(&state.db, id, &auth).await?;

    if !query.is_refresh {
        if let Some(cached) = latest_suggestions(&state.db, id).await? {
            debug!("Returning stored suggestions of business {}", id);
            return Ok(Json(ApiResponse::new(cached, "Suggestions retrieved successfully")));
        }
    }

    let profile = load_profile(&state.db, &target).await?;
    let current = current_financial(&state.db, id).await?;
    let raw = state
        .genai
        .generate(GenerateRequest::json(
            suggestions_prompt(&profile, &financial_summary(current.as_ref())),
            suggestions_schema(),
        ))
        .await?;
    let generated: GeneratedSuggestions = parse_json(&raw)?;

    let snapshot = BusinessSuggestions {
        business_name: if generated.business_name.trim().is_empty() {
            target.name.clone()
        } else {
            generated.business_name
        },
        suggestions: generated.suggestions,
        generated_at: Utc::now(),
    };
    store_suggestions(&state.db, id, &snapshot).await?;

    info!("Generated {} suggestion(s) for business {}", snapshot.suggestions.len(), id);
    Ok(Json(ApiResponse::new(snapshot, "Suggestions generated successfully")))
}

fn with_summary(stored: StoredProjection) -> BusinessProjections {
    let summary = summarize(&stored.projections);
    BusinessProjections {
        business_name: stored.business_name,
        projections: stored.projections,
        generated_at: stored.generated_at,
        total_projected_revenue: summary.total_projected_revenue,
        average_growth_rate: summary.growth_rate_label(),
        break_even_year: summary.break_even_label(),
    }
}

/// Five-year financial projection, cached per business
#[utoipa::path(
    get,
    path = "/genai/business/{id}/projections",
    tag = "genai",
    params(("id" = i32, Path, description = "Business ID"), RefreshQuery),
    responses(
        (status = 200, description = "Latest or regenerated projection", body = ApiResponse<BusinessProjections>),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Business not found", body = ErrorResponse),
        (status = 500, description = "Provider failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_projections(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Query(query): Query<RefreshQuery>,
) -> ApiResult<Json<ApiResponse<BusinessProjections>>> {
    let target = owned_business(&state.db, id, &auth).await?;

    if !query.is_refresh {
        if let Some(cached) = latest_projection(&state.db, id).await? {
            debug!("Returning stored projection of business {}", id);
            return Ok(Json(ApiResponse::new(with_summary(cached), "Projections retrieved successfully")));
        }
    }

    let profile = load_profile(&state.db, &target).await?;
    let current = current_financial(&state.db, id).await?;
    let first_year = Utc::now().year() + 1;
    let raw = state
        .genai
        .generate(GenerateRequest::json(
            projections_prompt(&profile, &financial_summary(current.as_ref()), first_year),
            projections_schema(),
        ))
        .await?;
    let generated: GeneratedProjections = parse_json(&raw)?;

    let mut projections = generated.projections;
    projections.sort_by_key(|p| p.year);
    let snapshot = StoredProjection {
        business_name: target.name.clone(),
        projections,
        generated_at: Utc::now(),
    };
    store_projection(&state.db, id, &snapshot).await?;

    info!("Generated {}-year projection for business {}", snapshot.projections.len(), id);
    Ok(Json(ApiResponse::new(with_summary(snapshot), "Projections generated successfully")))
}

/// Investment advice grounded on marketplace data
#[utoipa::path(
    post,
    path = "/genai/investment-advice",
    tag = "genai",
    request_body = InvestmentAdviceRequest,
    responses(
        (status = 200, description = "Advice with the businesses it considered", body = ApiResponse<InvestmentAdvice>),
        (status = 400, description = "Missing question", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Provider failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, request))]
pub async fn investment_advice(
    State(state): State<AppState>,
    auth: AuthUser,
    Valid(Json(request)): Valid<Json<InvestmentAdviceRequest>>,
) -> ApiResult<Json<ApiResponse<InvestmentAdvice>>> {
    let keywords = extract_keywords(&request.question);
    debug!("User {} asked for advice, keywords: {:?}", auth.user_id, keywords);

    let candidates = advice_candidates(&state.db, &keywords, request.industry.as_deref()).await?;
    let stats = market_statistics(&state.db).await?;
    let prompt = investment_advice_prompt(&request.question, &candidates, &stats);

    let mut generate = GenerateRequest::text(prompt);
    generate.response_mime_type = Some("text/plain".to_string());
    let answer = state.genai.generate(generate).await?;

    let advice = InvestmentAdvice {
        answer: answer.trim().to_string(),
        keywords,
        referenced_business_ids: candidates.iter().map(|c| c.business.id).collect(),
    };
    info!(
        "Advised user {} using {} candidate business(es)",
        auth.user_id,
        advice.referenced_business_ids.len()
    );
    Ok(Json(ApiResponse::new(advice, "Investment advice generated successfully")))
}
