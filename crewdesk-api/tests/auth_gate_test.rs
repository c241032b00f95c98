/// Authentication gate integration tests
///
/// Exercises the full router without a database: a lazily-connected pool is
/// never touched on the rejection paths, so every 401 here is produced by
/// the gate alone. The one storage-reaching case asserts only that a valid
/// token makes it past the gate.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use crewdesk_api::{
    app::{build_router, AppState},
    config::{ApiConfig, AuthConfig, Config, DatabaseConfig, JwtConfig},
};
use crewdesk_shared::auth::jwt::{create_token, Claims, TokenType};
use crewdesk_shared::models::user::Role;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "integration-test-secret-32-bytes!!";

fn test_app() -> axum::Router {
    let config = Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            // Nothing listens here; the pool is lazy and only the
            // storage-reaching test ever tries to use it
            url: "postgresql://nobody@127.0.0.1:1/unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: SECRET.to_string(),
        },
        auth: AuthConfig { verify_user: false },
    };

    let pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(1))
        .connect_lazy(&config.database.url)
        .expect("lazy pool");

    build_router(AppState::new(pool, config))
}

fn access_token(secret: &str) -> String {
    let claims = Claims::new(
        Uuid::new_v4(),
        "pat@example.com".to_string(),
        Role::Admin,
        Uuid::new_v4(),
        TokenType::Access,
    );
    create_token(&claims, secret).expect("token")
}

fn get_clients(auth_header: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/clients");
    if let Some(value) = auth_header {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn missing_header_is_401() {
    let response = test_app().oneshot(get_clients(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_bearer_header_is_401() {
    let response = test_app()
        .oneshot(get_clients(Some("Basic dXNlcjpwYXNz")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_401() {
    let response = test_app()
        .oneshot(get_clients(Some("Bearer not.a.jwt")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_wrong_secret_is_401() {
    let token = access_token("some-other-secret-entirely-32-byte");
    let response = test_app()
        .oneshot(get_clients(Some(&format!("Bearer {}", token))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_401() {
    let claims = Claims::with_expiration(
        Uuid::new_v4(),
        "pat@example.com".to_string(),
        Role::User,
        Uuid::new_v4(),
        TokenType::Access,
        chrono::Duration::seconds(-3600),
    );
    let token = create_token(&claims, SECRET).unwrap();

    let response = test_app()
        .oneshot(get_clients(Some(&format!("Bearer {}", token))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_as_bearer_is_401() {
    let claims = Claims::new(
        Uuid::new_v4(),
        "pat@example.com".to_string(),
        Role::User,
        Uuid::new_v4(),
        TokenType::Refresh,
    );
    let token = create_token(&claims, SECRET).unwrap();

    let response = test_app()
        .oneshot(get_clients(Some(&format!("Bearer {}", token))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_passes_the_gate() {
    // With no database behind the pool the handler fails with 500, which
    // proves the request got past the gate
    let token = access_token(SECRET);
    let response = test_app()
        .oneshot(get_clients(Some(&format!("Bearer {}", token))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn auth_endpoints_are_public() {
    // Malformed login body never reaches storage; a 400 with field errors
    // shows the endpoint is reachable without credentials
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"email": "not-an-email", "password": ""}"#))
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "validation_failed");
    assert!(json["errors"]["email"].is_array());
    assert!(json["errors"]["password"].is_array());
}

#[tokio::test]
async fn unknown_body_field_is_a_json_validation_error() {
    // Strict input: unknown fields fail deserialization, and the failure
    // must use the same 400 body shape as field validation
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"email": "pat@example.com", "password": "pw", "admin": true}"#,
        ))
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "validation_failed");
    assert!(json["errors"]["body"].is_array());
}

#[tokio::test]
async fn malformed_json_body_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"email": "#))
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "bad_request");
}

#[tokio::test]
async fn gate_rejections_carry_the_json_error_shape() {
    let response = test_app().oneshot(get_clients(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "unauthorized");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn invalid_refresh_token_is_401() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"refreshToken": "not.a.jwt"}"#))
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn security_headers_are_present() {
    let response = test_app().oneshot(get_clients(None)).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    // Dev config: no HSTS
    assert!(headers.get("Strict-Transport-Security").is_none());
}
