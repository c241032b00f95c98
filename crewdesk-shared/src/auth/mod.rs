/// Authentication and authorization for CrewDesk
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength validation
/// - [`jwt`]: Token service, HS256 token issuance and verification
/// - [`middleware`]: Request identity (`AuthContext`) and gate errors
/// - [`policy`]: The multi-tenant authorization decision procedures
///
/// Tokens are stateless: all claims needed for authorization (`userId`,
/// `role`, `companyId`, `email`) are embedded in the token so the default
/// request path needs no storage lookup. There is no revocation list;
/// logout is client-side token discard.

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;
