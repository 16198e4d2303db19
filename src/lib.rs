//! Vestibule - a minimal frontend login flow service
//!
//! Renders a login form, authenticates a visitor against a pluggable
//! credential-checking backend, and performs logout. The interesting part
//! is what happens around an authentication attempt: where the visitor is
//! sent after success or logout, and what they are told on failure.
//!
//! # Modules
//!
//! - `api`: HTTP handlers for login/logout and metrics
//! - `auth`: login flow, authentication engine, providers, sessions
//! - `i18n`: translation lookup for user-facing labels
//! - `notify`: one-shot flash notifications
//! - `config`: configuration management
//! - `error`: error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod i18n;
pub mod metrics;
pub mod notify;

use std::sync::Arc;

use crate::auth::{AuthenticationEngine, ConfigAccountProvider, CredentialProvider, LoginFlow};
use crate::i18n::{MessageCatalog, Translator};

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains the configuration
/// and the long-lived collaborators of the login flow.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Credential verification and security context management
    pub engine: Arc<AuthenticationEngine>,

    /// Authentication outcome handling and navigation
    pub flow: Arc<LoginFlow>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Build the label catalog (built-in labels, optional catalog file)
    /// 2. Wire the login flow with its translator
    /// 3. Assemble the credential provider chain
    ///
    /// # Errors
    /// Returns error if the catalog file cannot be loaded
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        // 1. Label catalog
        let mut catalog = MessageCatalog::builtin();
        if let Some(path) = &config.translation.catalog {
            catalog = catalog.merge_file(path)?;
            tracing::info!(catalog = %path.display(), "Translation catalog loaded");
        }
        let translator: Arc<dyn Translator> = Arc::new(catalog);

        // 2. Login flow
        let flow = LoginFlow::new(
            translator,
            config.translation.package_key.clone(),
            config.translation.source_name.clone(),
        );

        // 3. Credential provider chain
        let providers: Vec<Box<dyn CredentialProvider>> = vec![Box::new(
            ConfigAccountProvider::new(config.auth.accounts.clone()),
        )];
        let engine = AuthenticationEngine::new(providers);

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            flow: Arc::new(flow),
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    let cors_layer = build_cors_layer(&state.config.server);

    Router::new()
        .route("/healthz", axum::routing::get(health_check))
        .merge(api::login_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
        .merge(api::metrics_router())
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    if !server.protocol.eq_ignore_ascii_case("https") {
        return CorsLayer::permissive();
    }

    let allowed_origin = server.base_url();
    match HeaderValue::from_str(&allowed_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods(Any)
            .allow_headers(Any),
        Err(error) => {
            tracing::error!(
                %error,
                origin = %allowed_origin,
                "Failed to parse CORS origin from server base URL; denying cross-origin requests"
            );
            CorsLayer::new().allow_methods(Any).allow_headers(Any)
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
