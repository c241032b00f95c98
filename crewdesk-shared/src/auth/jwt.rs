/// JWT token service
///
/// Issues and verifies signed, time-limited session tokens using HS256
/// (HMAC-SHA256). Claims carry everything downstream authorization needs
/// (`userId`, `email`, `role`, `companyId`), so verification requires no
/// storage lookup. Claim names are the contract with the frontend, which
/// decodes the token client-side to render role-based UI; renaming any of
/// them is a breaking change.
///
/// # Token Types
///
/// - **Access**: short-lived (24h default), sent as the bearer credential
/// - **Refresh**: long-lived (30d default), exchanged for new access tokens
///
/// # Example
///
/// ```
/// use crewdesk_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use crewdesk_shared::models::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(
///     Uuid::new_v4(),
///     "pat@example.com".to_string(),
///     Role::User,
///     Uuid::new_v4(),
///     TokenType::Access,
/// );
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_token(&token, "your-secret-key")?;
/// assert_eq!(validated.user_id, claims.user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Role;

/// Token issuer claim value
const ISSUER: &str = "crewdesk";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is malformed, carries a bad signature, or fails a claim check
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token (short-lived)
    Access,

    /// Refresh token (long-lived)
    Refresh,
}

impl TokenType {
    /// Default expiration duration for this token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }
}

/// JWT claims structure
///
/// Identity claims (`userId`, `email`, `role`, `companyId`) plus the
/// standard registered claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user ID
    #[serde(rename = "userId")]
    pub user_id: Uuid,

    /// User's email address
    pub email: String,

    /// User's role (ADMIN or USER)
    pub role: Role,

    /// Company the user belongs to
    #[serde(rename = "companyId")]
    pub company_id: Uuid,

    /// Issuer, always "crewdesk"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Access or refresh
    #[serde(rename = "tokenType")]
    pub token_type: TokenType,
}

impl Claims {
    /// Creates claims with the default expiration for the token type
    pub fn new(
        user_id: Uuid,
        email: String,
        role: Role,
        company_id: Uuid,
        token_type: TokenType,
    ) -> Self {
        Self::with_expiration(
            user_id,
            email,
            role,
            company_id,
            token_type,
            token_type.default_expiration(),
        )
    }

    /// Creates claims with a custom time-to-live
    pub fn with_expiration(
        user_id: Uuid,
        email: String,
        role: Role,
        company_id: Uuid,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            user_id,
            email,
            role,
            company_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            token_type,
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed JWT from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT and extracts its claims
///
/// Verifies the signature, expiry, not-before time, and issuer. The two
/// failure kinds the authentication gate cares about are kept distinct:
/// `Expired` vs everything else (`Invalid`).
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Validates a token and requires it to be an access token
///
/// A refresh token presented as a bearer credential is rejected.
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Access {
        return Err(JwtError::Invalid(
            "Expected access token, got refresh token".to_string(),
        ));
    }

    Ok(claims)
}

/// Validates a token and requires it to be a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Refresh {
        return Err(JwtError::Invalid(
            "Expected refresh token, got access token".to_string(),
        ));
    }

    Ok(claims)
}

/// Exchanges a valid refresh token for a new access token
///
/// The new access token carries the same identity claims.
pub fn refresh_access_token(refresh_token: &str, secret: &str) -> Result<String, JwtError> {
    let refresh_claims = validate_refresh_token(refresh_token, secret)?;

    let access_claims = Claims::new(
        refresh_claims.user_id,
        refresh_claims.email,
        refresh_claims.role,
        refresh_claims.company_id,
        TokenType::Access,
    );

    create_token(&access_claims, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims(token_type: TokenType) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            "pat@example.com".to_string(),
            Role::User,
            Uuid::new_v4(),
            token_type,
        )
    }

    #[test]
    fn test_token_type_expiration() {
        assert_eq!(TokenType::Access.default_expiration(), Duration::hours(24));
        assert_eq!(TokenType::Refresh.default_expiration(), Duration::days(30));
    }

    #[test]
    fn test_create_and_validate_token() {
        let secret = "test-secret-key-at-least-32-bytes-long";
        let claims = sample_claims(TokenType::Access);

        let token = create_token(&claims, secret).expect("Should create token");
        let validated = validate_token(&token, secret).expect("Should validate token");

        assert_eq!(validated.user_id, claims.user_id);
        assert_eq!(validated.email, claims.email);
        assert_eq!(validated.role, Role::User);
        assert_eq!(validated.company_id, claims.company_id);
        assert_eq!(validated.iss, "crewdesk");
    }

    #[test]
    fn test_claim_names_are_stable() {
        // The frontend decodes these names; a rename is a breaking change.
        let claims = sample_claims(TokenType::Access);
        let json = serde_json::to_value(&claims).unwrap();

        assert!(json.get("userId").is_some());
        assert!(json.get("companyId").is_some());
        assert!(json.get("role").is_some());
        assert!(json.get("email").is_some());
        assert_eq!(json["role"], "USER");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = sample_claims(TokenType::Access);
        let token = create_token(&claims, "secret1").expect("Should create token");

        let result = validate_token(&token, "wrong-secret");
        assert!(matches!(result, Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        let secret = "test-secret";

        // Expired an hour ago, well past any validation leeway
        let claims = Claims::with_expiration(
            Uuid::new_v4(),
            "pat@example.com".to_string(),
            Role::Admin,
            Uuid::new_v4(),
            TokenType::Access,
            Duration::seconds(-3600),
        );

        assert!(claims.is_expired());

        let token = create_token(&claims, secret).expect("Should create token");
        let result = validate_token(&token, secret);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_garbage_token() {
        let result = validate_token("not-a-jwt", "secret");
        assert!(matches!(result, Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_access_and_refresh_are_distinct() {
        let secret = "secret";

        let access_token = create_token(&sample_claims(TokenType::Access), secret).unwrap();
        let refresh_token = create_token(&sample_claims(TokenType::Refresh), secret).unwrap();

        assert!(validate_access_token(&access_token, secret).is_ok());
        assert!(validate_access_token(&refresh_token, secret).is_err());
        assert!(validate_refresh_token(&refresh_token, secret).is_ok());
        assert!(validate_refresh_token(&access_token, secret).is_err());
    }

    #[test]
    fn test_refresh_access_token() {
        let secret = "secret";
        let refresh_claims = sample_claims(TokenType::Refresh);
        let refresh_token = create_token(&refresh_claims, secret).unwrap();

        let new_access = refresh_access_token(&refresh_token, secret).unwrap();
        let validated = validate_access_token(&new_access, secret).unwrap();

        assert_eq!(validated.user_id, refresh_claims.user_id);
        assert_eq!(validated.company_id, refresh_claims.company_id);
        assert_eq!(validated.token_type, TokenType::Access);
    }

    #[test]
    fn test_refresh_with_access_token_fails() {
        let secret = "secret";
        let access_token = create_token(&sample_claims(TokenType::Access), secret).unwrap();

        assert!(refresh_access_token(&access_token, secret).is_err());
    }
}
