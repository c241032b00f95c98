/// Request identity for the authentication gate
///
/// The API server's auth layer validates the bearer token and inserts an
/// [`AuthContext`] into request extensions; handlers extract it with Axum's
/// `Extension` extractor. The context carries everything the authorization
/// policy needs, so the default request path does no storage lookup.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use crewdesk_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}, Company: {}", auth.user_id, auth.company_id)
/// }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;
use crate::models::user::Role;

/// Authenticated identity attached to each request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// User's email address
    pub email: String,

    /// User's role, drives the authorization policy
    pub role: Role,

    /// Company the user belongs to; every query is scoped by this
    pub company_id: Uuid,
}

impl AuthContext {
    /// Creates the request identity from verified token claims
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
            company_id: claims.company_id,
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value
///
/// # Errors
///
/// `MissingCredentials` when the header is absent, `InvalidFormat` when it
/// does not carry a bearer token.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingCredentials)?;

    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Error type for the authentication gate
///
/// Expired and otherwise-invalid tokens both surface as 401 but are kept
/// distinct so the gate can log them differently. The API server maps
/// these into its error taxonomy; this crate never renders HTTP bodies.
#[derive(Debug)]
pub enum AuthError {
    /// Authorization header is absent
    MissingCredentials,

    /// Authorization header is present but not a bearer token
    InvalidFormat(String),

    /// Token signature/expiry verified and found expired
    TokenExpired,

    /// Token is malformed or carries a bad signature
    TokenInvalid(String),

    /// Strict mode: token verified but the user no longer exists
    UserNotFound,

    /// Strict mode lookup failed
    DatabaseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenType;

    #[test]
    fn test_auth_context_from_claims() {
        let claims = Claims::new(
            Uuid::new_v4(),
            "pat@example.com".to_string(),
            Role::Admin,
            Uuid::new_v4(),
            TokenType::Access,
        );

        let context = AuthContext::from_claims(claims.clone());

        assert_eq!(context.user_id, claims.user_id);
        assert_eq!(context.email, "pat@example.com");
        assert_eq!(context.role, Role::Admin);
        assert_eq!(context.company_id, claims.company_id);
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");

        assert!(matches!(
            bearer_token(None),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            bearer_token(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidFormat(_))
        ));
    }
}
