use std::path::PathBuf;
use std::sync::Arc;

use common::{
    BusinessProjections, BusinessSuggestion, BusinessSuggestions, InferredProducts,
    InvestmentAdvice, LegalComparison, LegalRequirement, LegalStep, ProductLegalRequirements,
    ProjectionYear,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::auth::JwtKeys;
use crate::genai::schemas::ChatSection;
use crate::genai::GenAiClient;
use crate::handlers::{
    auth::{LoginRequest, RegisterRequest, TokenResponse},
    businesses::{
        AdditionalInfoRequest, AdditionalInfoResponse, BusinessResponse, CreateBusinessRequest,
        UpdateBusinessRequest,
    },
    financials::{FinancialRequest, FinancialResponse},
    genai::{ChatResponse, InvestmentAdviceRequest, LegalAnalysisRequest},
    investments::{
        CreateInvestmentRequest, InvestmentResponse, PaginatedBusinesses,
        UpdateInvestmentRequest, UpdateInvestmentStatusRequest,
    },
    legals::{LegalResponse, LegalUploadForm, ProductLegalResponse},
    products::{AddProductsRequest, CreateProductRequest, ProductResponse, UpdateProductRequest},
    users::{UpdateUserRequest, UserResponse},
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Generative-AI provider used by the analysis endpoints
    pub genai: Arc<dyn GenAiClient>,
    /// Token signing and verification keys
    pub jwt: JwtKeys,
    /// Root directory for uploaded documents, served under `/uploads`
    pub uploads_dir: PathBuf,
    /// Origins allowed by the CORS layer
    pub allowed_origins: Vec<String>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::users::get_current_user,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::businesses::create_business,
        crate::handlers::businesses::get_my_businesses,
        crate::handlers::businesses::get_business,
        crate::handlers::businesses::update_business,
        crate::handlers::businesses::delete_business,
        crate::handlers::products::get_products,
        crate::handlers::products::add_products,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::legals::get_business_legals,
        crate::handlers::legals::upload_business_legal,
        crate::handlers::legals::get_product_legals,
        crate::handlers::legals::upload_product_legal,
        crate::handlers::legals::get_legal_comparison,
        crate::handlers::financials::get_current_financial,
        crate::handlers::financials::get_financial_history,
        crate::handlers::financials::create_financial,
        crate::handlers::financials::update_financial,
        crate::handlers::investments::list_marketplace_businesses,
        crate::handlers::investments::get_marketplace_business,
        crate::handlers::investments::create_investment,
        crate::handlers::investments::get_my_investments,
        crate::handlers::investments::get_investment,
        crate::handlers::investments::update_investment,
        crate::handlers::investments::update_investment_status,
        crate::handlers::investments::delete_investment,
        crate::handlers::investments::get_investments_by_investor,
        crate::handlers::investments::get_investments_by_business,
        crate::handlers::investments::get_my_investments_in_business,
        crate::handlers::genai::generate_response,
        crate::handlers::genai::infer_products,
        crate::handlers::genai::analyze_legals,
        crate::handlers::genai::get_suggestions,
        crate::handlers::genai::get_projections,
        crate::handlers::genai::investment_advice,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            TokenResponse,
            UserResponse,
            UpdateUserRequest,
            CreateBusinessRequest,
            UpdateBusinessRequest,
            AdditionalInfoRequest,
            AdditionalInfoResponse,
            BusinessResponse,
            CreateProductRequest,
            AddProductsRequest,
            UpdateProductRequest,
            ProductResponse,
            LegalResponse,
            ProductLegalResponse,
            LegalUploadForm,
            FinancialRequest,
            FinancialResponse,
            CreateInvestmentRequest,
            UpdateInvestmentRequest,
            UpdateInvestmentStatusRequest,
            InvestmentResponse,
            PaginatedBusinesses,
            LegalAnalysisRequest,
            InvestmentAdviceRequest,
            ChatResponse,
            ChatSection,
            LegalComparison,
            LegalRequirement,
            LegalStep,
            ProductLegalRequirements,
            BusinessSuggestions,
            BusinessSuggestion,
            BusinessProjections,
            ProjectionYear,
            InferredProducts,
            InvestmentAdvice,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "User profile endpoints"),
        (name = "businesses", description = "Business management for owners"),
        (name = "products", description = "Products of a business"),
        (name = "legals", description = "Legal documents and compliance comparison"),
        (name = "financials", description = "Append-only financial statements"),
        (name = "investments", description = "Marketplace listing and investments"),
        (name = "genai", description = "AI-backed analysis endpoints"),
    ),
    info(
        title = "Bizfund API",
        description = "Small-business investment marketplace - owners list businesses, investors fund them",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

/// Registers the bearer token scheme referenced by protected paths.
pub struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
