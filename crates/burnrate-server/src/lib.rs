//! Burn Rate Web Server
//!
//! Axum-based REST API for the Burn Rate personal finance application.
//!
//! Security features:
//! - Password login issuing short-lived HS256 tokens (secure by default, use --no-auth for local dev)
//! - Static API keys for scripts, compared in constant time
//! - Restrictive CORS policy
//! - Input validation (pagination limits, file size limits)
//! - Audit logging for every mutation
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use burnrate_core::{BurnRateConfig, Database};

mod auth;
mod handlers;

pub use auth::{create_token, hash_password, verify_password, verify_token, TOKEN_SUBJECT};

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Environment variable holding the argon2 PHC hash of the login password
pub const PASSWORD_HASH_ENV: &str = "BURNRATE_PASSWORD_HASH";

/// Environment variable holding the token signing secret
pub const JWT_SECRET_ENV: &str = "BURNRATE_JWT_SECRET";

/// Environment variable holding comma-separated API keys
pub const API_KEYS_ENV: &str = "BURNRATE_API_KEYS";

/// Environment variable holding comma-separated allowed CORS origins
pub const CORS_ORIGINS_ENV: &str = "BURNRATE_CORS_ORIGINS";

/// Authorization header for token and API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only in production)
    pub allowed_origins: Vec<String>,
    /// API keys for scripted access
    /// Format: "Bearer <key>" in Authorization header
    pub api_keys: Vec<String>,
    /// HS256 secret for session tokens; login is disabled without it
    pub jwt_secret: Option<String>,
    /// Argon2 PHC hash of the login password; login is disabled without it
    pub password_hash: Option<String>,
    /// Burn rate engine parameters
    pub engine: BurnRateConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
            jwt_secret: None,
            password_hash: None,
            engine: BurnRateConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Build a config from `BURNRATE_*` environment variables
    pub fn from_env(require_auth: bool, engine: BurnRateConfig) -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|s| !s.trim().is_empty());

        Self {
            require_auth,
            allowed_origins: parse_list(&std::env::var(CORS_ORIGINS_ENV).unwrap_or_default()),
            api_keys: parse_list(&std::env::var(API_KEYS_ENV).unwrap_or_default()),
            jwt_secret: non_empty(JWT_SECRET_ENV),
            password_hash: non_empty(PASSWORD_HASH_ENV),
            engine,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

/// Parse a comma-separated list, dropping blank entries
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Authentication middleware for protected routes
///
/// Accepts a `Bearer` session token signed with the server secret, or a
/// configured API key.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    if is_authenticated(request.headers(), &state.config) {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Whether the request carries a valid session token or API key
pub fn is_authenticated(headers: &HeaderMap, config: &ServerConfig) -> bool {
    let Some(token) = bearer_token(headers) else {
        return false;
    };

    if let Some(secret) = &config.jwt_secret {
        if verify_token(token, secret).is_some() {
            debug!("Authenticated via session token");
            return true;
        }
    }

    if validate_api_key(token, &config.api_keys) {
        debug!("Authenticated via API key");
        return true;
    }

    false
}

/// Extract the credential from an `Authorization: Bearer <value>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION_HEADER)?.to_str().ok()?;
    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;

    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}

/// Validate an API key against the configured keys using constant-time comparison
/// to prevent timing attacks.
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    valid_keys.iter().any(|key| {
        let key_bytes = key.as_bytes();
        // Only compare if lengths match (constant-time for same-length keys)
        provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes))
    })
}

/// Identify the caller for audit logging
///
/// Returns the token subject, "api-key" for API key auth, or "local-dev"
/// for unauthenticated requests.
pub fn get_actor(headers: &HeaderMap, config: &ServerConfig) -> String {
    let Some(token) = bearer_token(headers) else {
        return "local-dev".to_string();
    };

    if let Some(secret) = &config.jwt_secret {
        if verify_token(token, secret).is_some() {
            return TOKEN_SUBJECT.to_string();
        }
    }

    if validate_api_key(token, &config.api_keys) {
        return "api-key".to_string();
    }

    "local-dev".to_string()
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
    });

    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/login", post(handlers::login))
        .route("/auth/verify", get(handlers::verify));

    let protected_routes = Router::new()
        // Burn rate
        .route("/burn-rate", get(handlers::get_burn_rate))
        .route("/burn-rate/feedback", post(handlers::submit_feedback))
        .route(
            "/settings/intensity",
            get(handlers::get_intensity).put(handlers::set_intensity),
        )
        .route("/targets", get(handlers::list_targets))
        .route("/feedback", get(handlers::list_feedback))
        // Accounts
        .route(
            "/accounts",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        // Categories
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/categories/:id",
            patch(handlers::update_category).delete(handlers::delete_category),
        )
        // Budgets
        .route(
            "/budgets",
            get(handlers::list_budgets).post(handlers::upsert_budget),
        )
        .route("/budgets/:id", delete(handlers::delete_budget))
        // Reports
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/export", get(handlers::export_transactions))
        // Rules
        .route("/rules", get(handlers::list_rules).post(handlers::create_rule))
        .route("/rules/test", post(handlers::test_rule))
        .route("/rules/suggest", get(handlers::suggest_rule))
        .route(
            "/rules/:id",
            patch(handlers::update_rule).delete(handlers::delete_rule),
        )
        // Transactions
        .route("/transactions", get(handlers::list_transactions))
        .route(
            "/transactions/upload",
            post(handlers::upload_transactions)
                // Leave room for multipart framing around the file
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 64 * 1024)),
        )
        .route("/transactions/review", get(handlers::review_queue))
        .route(
            "/transactions/categorize",
            post(handlers::categorize_transactions),
        )
        .route(
            "/transactions/:id",
            get(handlers::get_transaction).patch(handlers::update_transaction),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = public_routes.merge(protected_routes);

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        // Allow specified origins
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    // CSP: restrict scripts to same-origin, allow inline styles
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if config.jwt_secret.is_none() || config.password_hash.is_none() {
        warn!(
            "Password login disabled: set {} and {}",
            PASSWORD_HASH_ENV, JWT_SECRET_ENV
        );
    }

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a core error onto a client-facing status.
    ///
    /// Input problems become 400, missing rows 404; everything else is an
    /// internal error with the detail kept out of the response.
    pub fn from_core(err: burnrate_core::Error) -> Self {
        use burnrate_core::Error;

        match err {
            Error::Validation(msg) | Error::InvalidData(msg) | Error::Import(msg) => {
                Self::bad_request(&msg)
            }
            Error::Regex(e) => Self::bad_request(&format!("Invalid regex: {}", e)),
            Error::Csv(e) => Self::bad_request(&format!("Invalid CSV: {}", e)),
            Error::NotFound(what) => Self::not_found(&format!("{} not found", what)),
            other => Self::from(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
