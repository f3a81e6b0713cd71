use anyhow::{bail, Context, Result};
use config::{Config, Environment};
use sea_orm::Database;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::JwtKeys;
use crate::genai::GeminiClient;
use crate::schemas::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://bizfund.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_GENAI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Runtime settings, read from the environment (and `.env`) over built-in defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: String,
    pub uploads_dir: PathBuf,
    /// Comma-separated list, `*` for any origin
    pub allowed_origins: String,
    pub genai_api_key: Option<String>,
    pub genai_model: String,
    pub genai_base_url: String,
}

impl AppConfig {
    /// Layer `DATABASE_URL`, `JWT_SECRET`, `GENAI_API_KEY`, ... over the defaults.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("jwt_secret", "")?
            .set_default("uploads_dir", "uploads")?
            .set_default("allowed_origins", "*")?
            .set_default("genai_model", DEFAULT_GENAI_MODEL)?
            .set_default("genai_base_url", DEFAULT_GENAI_BASE_URL)?
            .add_source(Environment::default())
            .build()
            .context("Failed to read configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        debug!(
            "Configuration loaded: bind={}, uploads={}, model={}",
            config.bind_address,
            config.uploads_dir.display(),
            config.genai_model
        );
        Ok(config)
    }

    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Connect to the database and build the shared handler state.
pub async fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    if config.jwt_secret.trim().is_empty() {
        bail!("JWT_SECRET must be set");
    }

    info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url).await?;

    tokio::fs::create_dir_all(&config.uploads_dir)
        .await
        .with_context(|| format!("Cannot create uploads directory {}", config.uploads_dir.display()))?;

    if config.genai_api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        warn!("GENAI_API_KEY is not set, AI endpoints will fail");
    }
    let genai = GeminiClient::new(
        &config.genai_base_url,
        &config.genai_model,
        config.genai_api_key.clone(),
    )?;

    Ok(AppState {
        db,
        genai: Arc::new(genai),
        jwt: JwtKeys::new(&config.jwt_secret),
        uploads_dir: config.uploads_dir.clone(),
        allowed_origins: config.origins(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(origins: &str) -> AppConfig {
        AppConfig {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            jwt_secret: "secret".to_string(),
            uploads_dir: PathBuf::from("uploads"),
            allowed_origins: origins.to_string(),
            genai_api_key: None,
            genai_model: DEFAULT_GENAI_MODEL.to_string(),
            genai_base_url: DEFAULT_GENAI_BASE_URL.to_string(),
        }
    }

    #[test]
    fn test_origins_are_split_and_trimmed() {
        let config = sample("http://a.test, http://b.test ,,");
        assert_eq!(config.origins(), vec!["http://a.test", "http://b.test"]);
    }

    #[tokio::test]
    async fn test_missing_jwt_secret_is_rejected() {
        let mut config = sample("*");
        config.jwt_secret = "  ".to_string();
        let err = initialize_app_state(&config).await.unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }
}
