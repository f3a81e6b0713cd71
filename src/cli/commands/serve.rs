use anyhow::Result;
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use migration::{Migrator, MigratorTrait};
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace};

use crate::config::{initialize_app_state, AppConfig};
use crate::router::create_router;

/// Migrate the configured database, then serve the API with a `/metrics` endpoint.
pub async fn serve(config: AppConfig) -> Result<()> {
    trace!("Entering serve function");
    info!("Bizfund application starting up");
    debug!("Database URL: {}", config.database_url);
    debug!("Bind address: {}", config.bind_address);

    let state = match initialize_app_state(&config).await {
        Ok(state) => {
            debug!("Application state initialized successfully");
            state
        }
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    info!("Running database migrations");
    if let Err(e) = Migrator::up(&state.db, None).await {
        error!("Failed to run database migrations: {}", e);
        return Err(e.into());
    }
    debug!("All pending migrations have been applied");

    trace!("Creating application router");
    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
    let app = create_router(state)
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(prometheus_layer);
    debug!("Router created successfully");

    info!("Starting server on {}", config.bind_address);
    let listener = match TcpListener::bind(&config.bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", config.bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", config.bind_address, e);
            return Err(e.into());
        }
    };

    info!("Bizfund API server running on http://{}", config.bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", config.bind_address);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}
