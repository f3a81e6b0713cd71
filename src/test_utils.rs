#[cfg(test)]
pub mod test_utils {
    use crate::auth::JwtKeys;
    use crate::genai::mock::MockGenAi;
    use crate::router::create_router;
    use crate::schemas::{ApiResponse, AppState};
    use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    pub const TEST_JWT_SECRET: &str = "test-secret";
    pub const TEST_PASSWORD: &str = "password123";

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Running test server together with the pieces tests inspect.
    pub struct TestApp {
        pub server: TestServer,
        pub state: AppState,
        pub genai: Arc<MockGenAi>,
        /// Keeps the uploads directory alive for the test's duration
        pub uploads: TempDir,
    }

    /// Create AppState for testing backed by a scripted AI client
    pub async fn setup_test_app_state(genai: Arc<MockGenAi>, uploads: &TempDir) -> AppState {
        AppState {
            db: setup_test_db().await,
            genai,
            jwt: JwtKeys::new(TEST_JWT_SECRET),
            uploads_dir: uploads.path().to_path_buf(),
            allowed_origins: vec!["*".to_string()],
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is taken from RUST_LOG and defaults to WARN.
    pub fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create a test server over a fresh database
    pub async fn setup_test_app() -> TestApp {
        let _ = init_test_tracing();

        let genai = Arc::new(MockGenAi::new());
        let uploads = TempDir::new().expect("Failed to create uploads dir");
        let state = setup_test_app_state(genai.clone(), &uploads).await;
        let server = TestServer::new(create_router(state.clone())).expect("Failed to start test server");

        TestApp {
            server,
            state,
            genai,
            uploads,
        }
    }

    /// `Authorization` header pair for a token
    pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
        (
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).expect("valid header"),
        )
    }

    /// Register `username` and log in, returning `(user_id, token)`
    pub async fn register_and_login(server: &TestServer, username: &str) -> (i32, String) {
        let response = server
            .post("/register")
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": TEST_PASSWORD,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .post("/login")
            .json(&json!({ "username": username, "password": TEST_PASSWORD }))
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        let user_id = body.data["user"]["id"].as_i64().expect("user id") as i32;
        let token = body.data["token"].as_str().expect("token").to_string();
        (user_id, token)
    }

    /// Create a business owned by the token's user, returning its ID
    pub async fn create_test_business(server: &TestServer, token: &str, body: Value) -> i32 {
        let (name, value) = bearer(token);
        let response = server.post("/business").add_header(name, value).json(&body).await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        body.data["id"].as_i64().expect("business id") as i32
    }
}
