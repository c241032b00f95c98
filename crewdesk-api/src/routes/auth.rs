/// Authentication endpoints
///
/// Login issues an access/refresh token pair; refresh exchanges a valid
/// refresh token for a fresh access token. Both endpoints are public.
///
/// Failed logins always answer with the same message whether the email is
/// unknown or the password is wrong, so the endpoint cannot be used to
/// probe which emails have accounts.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::Json,
    validation::validate,
};
use axum::{extract::State, http::StatusCode};
use crewdesk_shared::auth::{
    jwt::{self, Claims, TokenType},
    password::verify_password,
};
use crewdesk_shared::models::user::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The one message every failed login gets
const LOGIN_FAILED: &str = "Invalid email or password.";

/// Login request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response: token pair plus the authenticated user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token, sent as the bearer credential
    pub token: String,

    /// Refresh token for obtaining new access tokens
    pub refresh_token: String,

    /// The authenticated user (password hash omitted)
    pub user: User,
}

/// Refresh request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Refresh response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// New access token
    pub token: String,
}

/// POST /api/auth/login
///
/// # Errors
///
/// 400 for malformed input, 401 for unknown email or wrong password.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    validate(&body)?;

    let user = User::find_by_email(&state.db, &body.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(LOGIN_FAILED.to_string()))?;

    let password_ok = verify_password(&body.password, &user.password_hash)?;
    if !password_ok {
        tracing::info!(user_id = %user.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized(LOGIN_FAILED.to_string()));
    }

    User::update_last_login(&state.db, user.id).await?;

    let access_claims = Claims::new(
        user.id,
        user.email.clone(),
        user.role,
        user.company_id,
        TokenType::Access,
    );
    let refresh_claims = Claims::new(
        user.id,
        user.email.clone(),
        user.role,
        user.company_id,
        TokenType::Refresh,
    );

    let token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, company_id = %user.company_id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        refresh_token,
        user,
    }))
}

/// POST /api/auth/refresh
///
/// # Errors
///
/// 401 if the refresh token is expired, invalid, or an access token.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<(StatusCode, Json<RefreshResponse>)> {
    validate(&body)?;

    let token = jwt::refresh_access_token(&body.refresh_token, state.jwt_secret())?;

    Ok((StatusCode::OK, Json(RefreshResponse { token })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_rejects_unknown_fields() {
        let raw = r#"{"email": "pat@example.com", "password": "pw", "admin": true}"#;
        let parsed: Result<LoginRequest, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_login_response_hides_password_hash() {
        use crewdesk_shared::models::user::Role;
        use chrono::Utc;
        use uuid::Uuid;

        let response = LoginResponse {
            token: "t".to_string(),
            refresh_token: "r".to_string(),
            user: User {
                id: Uuid::new_v4(),
                email: "pat@example.com".to_string(),
                password_hash: "$argon2id$secret".to_string(),
                name: None,
                role: Role::User,
                company_id: Uuid::new_v4(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
                last_login_at: None,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["user"].get("passwordHash").is_none());
        assert!(json["user"].get("password_hash").is_none());
        assert!(json.get("refreshToken").is_some());
    }
}
