/// Application state and router builder
///
/// Defines the shared application state and assembles the Axum router:
/// public routes (`/health`, `/api/auth/*`), the authenticated resource
/// routes under `/api`, and the middleware stack (tracing, CORS, security
/// headers, the authentication gate).

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    Router,
};
use crewdesk_shared::auth::{
    jwt,
    middleware::{bearer_token, AuthContext, AuthError},
};
use crewdesk_shared::models::user::User;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                  # Health check (public)
/// └── /api/
///     ├── /auth/               # Authentication (public)
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── /clients/            # Client CRUD (authenticated)
///     ├── /projects/           # Project CRUD (authenticated)
///     ├── /tasks/              # Task CRUD (authenticated)
///     └── /users/              # User CRUD (authenticated)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (resource routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", axum::routing::get(routes::health::health_check));

    // Public: login and token refresh
    let auth_routes = Router::new()
        .route("/login", axum::routing::post(routes::auth::login))
        .route("/refresh", axum::routing::post(routes::auth::refresh));

    // Everything else sits behind the authentication gate
    let resource_routes = Router::new()
        .nest("/clients", routes::clients::router())
        .nest("/projects", routes::projects::router())
        .nest("/tasks", routes::tasks::router())
        .nest("/users", routes::users::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(resource_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Authentication gate
///
/// Validates the bearer token from the Authorization header and inserts an
/// [`AuthContext`] into request extensions. Token validation alone touches
/// no storage; with `AUTH_VERIFY_USER` set, the gate additionally checks
/// that the token's user still exists, so deleted accounts lose access
/// before their tokens expire.
///
/// Failures are reported as [`ApiError`] so gate rejections carry the same
/// JSON body shape as every other error.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = bearer_token(header)?;

    let claims = jwt::validate_access_token(token, state.jwt_secret()).map_err(|e| match e {
        jwt::JwtError::Expired => {
            tracing::debug!("Rejected expired access token");
            AuthError::TokenExpired
        }
        other => {
            tracing::warn!("Rejected invalid access token: {}", other);
            AuthError::TokenInvalid("Invalid token".to_string())
        }
    })?;

    if state.config.auth.verify_user {
        let user = User::find_by_id(&state.db, claims.user_id)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        if user.is_none() {
            tracing::warn!(user_id = %claims.user_id, "Token for deleted user rejected");
            return Err(AuthError::UserNotFound.into());
        }
    }

    req.extensions_mut().insert(AuthContext::from_claims(claims));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, AuthConfig, DatabaseConfig, JwtConfig};

    fn test_state() -> AppState {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/unused".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            auth: AuthConfig { verify_user: false },
        };

        // connect_lazy never touches the network until a query runs
        let pool = PgPool::connect_lazy(&config.database.url).unwrap();
        AppState::new(pool, config)
    }

    // connect_lazy spawns pool maintenance onto the runtime, so even these
    // storage-free tests need a Tokio context

    #[tokio::test]
    async fn test_router_builds() {
        let _router = build_router(test_state());
    }

    #[tokio::test]
    async fn test_jwt_secret_accessor() {
        let state = test_state();
        assert_eq!(state.jwt_secret(), "test-secret-key-at-least-32-bytes-long");
    }
}
