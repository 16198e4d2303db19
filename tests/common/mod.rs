//! Common test utilities for E2E tests

use std::sync::Once;

use tokio::net::TcpListener;
use vestibule::{AppState, config};

pub const TEST_USERNAME: &str = "visitor";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

static INIT_METRICS: Once = Once::new();

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with an adjusted configuration
    pub async fn with_config(adjust: impl FnOnce(&mut config::AppConfig)) -> Self {
        INIT_METRICS.call_once(vestibule::metrics::init_metrics);

        let mut config = test_config();
        adjust(&mut config);

        // Initialize app state
        let state = AppState::new(config).unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = vestibule::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            client,
        }
    }

    /// Get base URL for requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}

/// Create test configuration with one known account
pub fn test_config() -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
            domain: "localhost".to_string(),
            protocol: "http".to_string(),
            index_uri: "/".to_string(),
        },
        auth: config::AuthConfig {
            session_secret: "test-secret-key-32-bytes-long!!!".to_string(),
            session_max_age: 604800,
            accounts: vec![config::AccountConfig {
                username: TEST_USERNAME.to_string(),
                password_hash: password_hash(TEST_PASSWORD),
                display_name: Some("Test Visitor".to_string()),
            }],
        },
        translation: config::TranslationConfig {
            package_key: "vestibule".to_string(),
            source_name: "Main".to_string(),
            catalog: None,
        },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// Hash a password the way the config-backed provider expects it
pub fn password_hash(password: &str) -> String {
    use argon2::password_hash::{PasswordHasher, SaltString};

    let salt = SaltString::encode_b64(b"vestibule-e2e-tests").unwrap();
    argon2::Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

/// Extract a cookie value from a response's Set-Cookie headers
pub fn cookie_value(response: &reqwest::Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find_map(|pair| pair.strip_prefix(&prefix).map(ToString::to_string))
}
