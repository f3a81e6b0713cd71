use crate::handlers::{
    auth::{login, register},
    businesses::{create_business, delete_business, get_business, get_my_businesses, update_business},
    financials::{create_financial, get_current_financial, get_financial_history, update_financial},
    genai::{
        analyze_legals, generate_response, get_projections, get_suggestions, infer_products,
        investment_advice,
    },
    health::health_check,
    investments::{
        create_investment, delete_investment, get_investment, get_investments_by_business,
        get_investments_by_investor, get_marketplace_business, get_my_investments,
        get_my_investments_in_business, list_marketplace_businesses, update_investment,
        update_investment_status,
    },
    legals::{
        get_business_legals, get_legal_comparison, get_product_legals, upload_business_legal,
        upload_product_legal,
    },
    products::{add_products, delete_product, get_products, update_product},
    users::{get_current_user, get_user, update_user},
};
use crate::helpers::uploads::UPLOADS_ROUTE;
use crate::schemas::{ApiDoc, AppState};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{debug, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Largest accepted request body, sized for scanned legal documents
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// AI calls dominate request latency
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// CORS layer for the configured origins. No origins, or `*`, allows any.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o.trim() == "*") {
        debug!("CORS allows any origin");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();
    debug!("CORS restricted to {} origin(s)", origins.len());

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.allowed_origins);
    let uploads = ServeDir::new(&state.uploads_dir);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Registration and login
        .route("/register", post(register))
        .route("/login", post(login))
        // Users
        .route("/users/me", get(get_current_user))
        .route("/users/:id", get(get_user).put(update_user))
        // Businesses
        .route("/business", post(create_business))
        .route("/business/user", get(get_my_businesses))
        .route(
            "/business/:id",
            get(get_business).put(update_business).delete(delete_business),
        )
        // Products
        .route("/business/:id/products", get(get_products).post(add_products))
        .route(
            "/business/:id/products/:product_id",
            put(update_product).delete(delete_product),
        )
        // Legal documents
        .route(
            "/business/:id/legal",
            get(get_business_legals).post(upload_business_legal),
        )
        .route("/business/:id/legal/comparison", get(get_legal_comparison))
        .route("/business/:id/products/legal", get(get_product_legals))
        .route(
            "/business/:id/products/:product_id/legal",
            post(upload_product_legal),
        )
        // Financials
        .route(
            "/business/:id/financial",
            get(get_current_financial)
                .post(create_financial)
                .put(update_financial),
        )
        .route("/business/:id/financial/history", get(get_financial_history))
        // Marketplace and investments
        .route("/investment/businesses", get(list_marketplace_businesses))
        .route("/investment/businesses/:id", get(get_marketplace_business))
        .route("/investment", post(create_investment).get(get_my_investments))
        .route(
            "/investment/:id",
            get(get_investment)
                .put(update_investment)
                .delete(delete_investment),
        )
        .route("/investment/:id/status", put(update_investment_status))
        .route(
            "/investment/investor/:investor_id",
            get(get_investments_by_investor),
        )
        .route(
            "/investment/business/:business_id",
            get(get_investments_by_business),
        )
        .route(
            "/investment/user/business/:business_id",
            get(get_my_investments_in_business),
        )
        // AI analysis
        .route("/genai/response", get(generate_response))
        .route("/genai/infer-products", post(infer_products))
        .route("/genai/legal-analysis", post(analyze_legals))
        .route("/genai/business/:id/suggestions", get(get_suggestions))
        .route("/genai/business/:id/projections", get(get_projections))
        .route("/genai/investment-advice", post(investment_advice))
        // Uploaded documents
        .nest_service(UPLOADS_ROUTE, uploads)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                .layer(cors),
        )
        .with_state(state)
}
