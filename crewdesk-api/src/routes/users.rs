/// User resource endpoints
///
/// Users are company-scoped like everything else. Two extra rules apply:
/// only admins may grant the ADMIN role, and nobody may delete their own
/// account, admins included.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::Json,
    validation::{field_error, validate},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Router,
};
use crewdesk_shared::auth::middleware::AuthContext;
use crewdesk_shared::auth::password::{hash_password, validate_password_strength};
use crewdesk_shared::auth::policy::{
    ensure_company_access, ensure_not_self_deletion, ensure_role_assignment,
};
use crewdesk_shared::models::user::{CreateUser, Role, UpdateUser, User};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

/// Create user request body
///
/// Carries a plaintext password; it is strength-checked and hashed before
/// anything touches storage.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,

    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,

    /// Role for the new account, defaults to USER
    pub role: Option<Role>,
}

/// Update user request body (partial merge)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub password: Option<String>,

    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,

    pub role: Option<Role>,
}

impl UpdateUserRequest {
    fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.name.is_none()
            && self.role.is_none()
    }
}

/// Checks password strength, reporting failures as field errors
fn check_password_strength(password: &str) -> ApiResult<()> {
    validate_password_strength(password).map_err(|msg| field_error("password", &msg))
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<User>>> {
    let users = User::list_by_company(&state.db, auth.company_id).await?;
    Ok(Json(users))
}

/// POST /api/users
///
/// # Errors
///
/// 403 when a non-admin requests the ADMIN role, 409 when the email is
/// already taken.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    validate(&body)?;
    check_password_strength(&body.password)?;

    let role = body.role.unwrap_or(Role::User);
    ensure_role_assignment(role, &auth)?;

    let password_hash = hash_password(&body.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: body.email,
            password_hash,
            name: body.name,
            role,
            company_id: auth.company_id,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, company_id = %auth.company_id, "User created");

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, id).await?;
    ensure_company_access(user.as_ref().map(|u| u.company_id), &auth)?;

    Ok(Json(user.ok_or_else(|| {
        ApiError::NotFound("Resource not found".to_string())
    })?))
}

/// PUT /api/users/:id
///
/// A password change re-runs the strength check and stores a fresh hash.
/// Granting ADMIN is restricted to admins.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    validate(&body)?;

    if body.is_empty() {
        return Err(ApiError::BadRequest("No update data provided".to_string()));
    }

    let existing = User::find_by_id(&state.db, id).await?;
    ensure_company_access(existing.map(|u| u.company_id), &auth)?;

    if let Some(role) = body.role {
        ensure_role_assignment(role, &auth)?;
    }

    let password_hash = match body.password.as_deref() {
        Some(password) => {
            check_password_strength(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let updated = User::update(
        &state.db,
        id,
        UpdateUser {
            email: body.email,
            password_hash,
            name: body.name,
            role: body.role,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    Ok(Json(updated))
}

/// DELETE /api/users/:id
///
/// # Errors
///
/// 400 when the caller targets their own account, 409 when the user still
/// authors projects.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let existing = User::find_by_id(&state.db, id).await?;
    ensure_company_access(existing.map(|u| u.company_id), &auth)?;
    ensure_not_self_deletion(id, &auth)?;

    User::delete(&state.db, id).await?;

    tracing::info!(deleted_user_id = %id, by = %auth.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_is_empty() {
        let empty: UpdateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());

        let partial: UpdateUserRequest = serde_json::from_str(r#"{"role": "ADMIN"}"#).unwrap();
        assert!(!partial.is_empty());
    }

    #[test]
    fn test_create_request_rejects_company_field() {
        // Users are always created in the caller's company
        let raw = r#"{
            "email": "new@example.com",
            "password": "abcdefg1",
            "companyId": "11111111-1111-1111-1111-111111111111"
        }"#;
        let parsed: Result<CreateUserRequest, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_role_parses_wire_values() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"email": "new@example.com", "password": "abcdefg1", "role": "ADMIN"}"#,
        )
        .unwrap();
        assert_eq!(req.role, Some(Role::Admin));
    }

    #[test]
    fn test_password_strength_is_a_field_error() {
        let err = check_password_strength("short").unwrap_err();
        match err {
            crate::error::ApiError::Validation(fields) => {
                assert!(fields.contains_key("password"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
