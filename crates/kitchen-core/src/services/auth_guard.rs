//! Bearer credential guard for mutating routes.

use std::sync::Arc;

use crate::domain::Principal;
use crate::ports::{AuthError, TokenService, UserRepository};

/// Resolves the acting principal from an `Authorization` header value.
#[derive(Clone)]
pub struct AuthGuard {
    tokens: Arc<dyn TokenService>,
    users: Arc<dyn UserRepository>,
}

impl AuthGuard {
    pub fn new(tokens: Arc<dyn TokenService>, users: Arc<dyn UserRepository>) -> Self {
        Self { tokens, users }
    }

    /// Extract the token from `Bearer <token>`.
    pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
        authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingAuth)
    }

    /// Verify the credential and resolve its subject to an existing user.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, AuthError> {
        let token = Self::bearer_token(authorization)?;
        let claims = self.tokens.validate_token(token)?;

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?
            .ok_or(AuthError::UnknownPrincipal)?;

        tracing::debug!(user_id = %user.id, "Request authenticated");
        Ok(Principal::from(user))
    }
}
