/// Error handling for the API server
///
/// A single closed error type covering the whole taxonomy, with one
/// exhaustive mapping from kind to HTTP status in `IntoResponse`. Handlers
/// return `ApiResult<T>`; conversions from the shared crate's error types
/// route storage, token, and policy failures into the right variant, so no
/// handler ever matches on error message strings.
///
/// # Taxonomy
///
/// | Variant                | Status | Meaning                                        |
/// |------------------------|--------|------------------------------------------------|
/// | `Validation`           | 400    | Field-level input errors                       |
/// | `BadRequest`           | 400    | Malformed request outside field validation     |
/// | `InvalidReference`     | 400    | Referenced entity missing or cross-tenant      |
/// | `SelfDeletionForbidden`| 400    | Caller tried to delete their own account       |
/// | `Unauthorized`         | 401    | Missing/expired/invalid token, bad credentials |
/// | `Forbidden`            | 403    | Authenticated but not allowed this mutation    |
/// | `NotFound`             | 404    | Absent or cross-tenant (indistinguishable)     |
/// | `Conflict`             | 409    | Duplicate email, still-referenced on delete    |
/// | `Internal`             | 500    | Storage/unexpected, details logged not leaked  |

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crewdesk_shared::auth::{
    jwt::JwtError, middleware::AuthError, password::PasswordError, policy::PolicyError,
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Map of field name to the messages that field failed with
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Field-level validation failure (400)
    Validation(FieldErrors),

    /// Malformed request outside of field validation (400)
    BadRequest(String),

    /// A referenced foreign entity does not exist or is cross-tenant (400)
    InvalidReference(String),

    /// Caller attempted to delete their own account (400)
    SelfDeletionForbidden,

    /// Unauthenticated (401)
    Unauthorized(String),

    /// Authenticated but not authorized for this mutation (403)
    Forbidden(String),

    /// Resource absent or cross-tenant (404)
    NotFound(String),

    /// Unique-constraint or still-referenced conflict (409)
    Conflict(String),

    /// Internal server error (500)
    Internal(String),
}

/// Error response format
///
/// `errors` is only present for validation failures and maps each field to
/// its messages, e.g. `{"startDate": ["Invalid date"]}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "validation_failed")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Per-field validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} fields", errors.len())
            }
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::InvalidReference(msg) => write!(f, "Invalid reference: {}", msg),
            ApiError::SelfDeletionForbidden => write!(f, "Cannot delete own account"),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, errors) = match self {
            ApiError::Validation(field_errors) => (
                StatusCode::BAD_REQUEST,
                "validation_failed",
                "Request validation failed".to_string(),
                Some(field_errors),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::InvalidReference(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_reference", msg, None)
            }
            ApiError::SelfDeletionForbidden => (
                StatusCode::BAD_REQUEST,
                "self_deletion_forbidden",
                "You cannot delete your own account".to_string(),
                None,
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Internal(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            errors,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Known constraint violations get translated into the taxonomy; everything
/// else is logged and surfaced as a generic internal error.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    if constraint.ends_with("_fkey") {
                        return ApiError::Conflict(
                            "Cannot delete: resource is still referenced".to_string(),
                        );
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert JSON body rejections to API errors
///
/// Deserialization failures (unknown fields under strict mode, bad enum
/// values, type mismatches) become field-keyed validation errors under
/// `body`; everything else is a plain bad request.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                let mut fields = FieldErrors::new();
                fields.insert("body".to_string(), vec![err.body_text()]);
                ApiError::Validation(fields)
            }
            JsonRejection::JsonSyntaxError(_) => {
                ApiError::BadRequest("Invalid JSON in request body".to_string())
            }
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::BadRequest("Expected application/json content type".to_string())
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// Convert authentication gate errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::Unauthorized(msg),
            AuthError::TokenExpired => ApiError::Unauthorized("Token expired".to_string()),
            AuthError::TokenInvalid(msg) => ApiError::Unauthorized(msg),
            AuthError::UserNotFound => ApiError::Unauthorized("Unknown user".to_string()),
            AuthError::DatabaseError(msg) => ApiError::Internal(msg),
        }
    }
}

/// Convert authorization policy errors to API errors
impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            PolicyError::Forbidden => {
                ApiError::Forbidden("Not authorized to modify this resource".to_string())
            }
            PolicyError::InvalidReference(field) => ApiError::InvalidReference(format!(
                "Referenced {} does not exist in your company",
                field
            )),
            PolicyError::SelfDeletion => ApiError::SelfDeletionForbidden,
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::Invalid(msg) => ApiError::Unauthorized(msg),
            JwtError::CreateError(msg) => {
                ApiError::Internal(format!("Token creation failed: {}", msg))
            }
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("Client not found".to_string());
        assert_eq!(err.to_string(), "Not found: Client not found");

        let err = ApiError::SelfDeletionForbidden;
        assert_eq!(err.to_string(), "Cannot delete own account");
    }

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                ApiError::Validation(FieldErrors::new()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::InvalidReference("assigneeId".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::SelfDeletionForbidden, StatusCode::BAD_REQUEST),
            (
                ApiError::Unauthorized("nope".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::Forbidden("nope".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::NotFound("gone".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Conflict("dup".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_policy_error_mapping() {
        let err: ApiError = PolicyError::NotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = PolicyError::Forbidden.into();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err: ApiError = PolicyError::InvalidReference("clientId").into();
        assert!(matches!(err, ApiError::InvalidReference(_)));

        let err: ApiError = PolicyError::SelfDeletion.into();
        assert!(matches!(err, ApiError::SelfDeletionForbidden));
    }

    #[test]
    fn test_validation_body_shape() {
        let mut fields = FieldErrors::new();
        fields.insert("startDate".to_string(), vec!["Invalid date".to_string()]);

        let response = ErrorResponse {
            error: "validation_failed".to_string(),
            message: "Request validation failed".to_string(),
            errors: Some(fields),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["errors"]["startDate"][0], "Invalid date");
    }
}
