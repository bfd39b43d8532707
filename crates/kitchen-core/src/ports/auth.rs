//! Credential verification ports.

use uuid::Uuid;

/// Claims carried by a verified bearer token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub exp: i64,
}

/// Token service trait for JWT operations.
///
/// Issuance belongs to the account service; `issue_token` exists so operators
/// and tests can mint credentials signed with the shared secret.
pub trait TokenService: Send + Sync {
    fn issue_token(&self, user_id: Uuid, email: &str) -> Result<String, AuthError>;

    /// Verify the signature and expiry of a token and decode its claims.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Not authorized to access this route")]
    MissingAuth,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("No user found with this token")]
    UnknownPrincipal,

    #[error("Auth backend error: {0}")]
    Backend(String),
}
