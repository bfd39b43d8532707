#![cfg(feature = "auth")]

use std::sync::Arc;

use kitchen_core::AuthGuard;
use kitchen_core::domain::User;
use kitchen_core::ports::{AuthError, TokenService};
use kitchen_infra::{InMemoryUserRepository, JwtConfig, JwtTokenService};

async fn guard() -> (AuthGuard, Arc<JwtTokenService>, User) {
    let tokens = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "guard-test-secret".to_string(),
        ..JwtConfig::default()
    }));
    let users = Arc::new(InMemoryUserRepository::new());
    let cook = users.insert(User::new("Priya", "priya@kitchen.test")).await;

    (AuthGuard::new(tokens.clone(), users), tokens, cook)
}

#[tokio::test]
async fn test_valid_bearer_resolves_principal() {
    let (guard, tokens, cook) = guard().await;
    let token = tokens.issue_token(cook.id, &cook.email).unwrap();

    let principal = guard
        .authenticate(Some(&format!("Bearer {}", token)))
        .await
        .unwrap();

    assert_eq!(principal.id, cook.id);
    assert_eq!(principal.name, "Priya");
}

#[tokio::test]
async fn test_missing_or_malformed_header() {
    let (guard, _, _) = guard().await;

    assert!(matches!(
        guard.authenticate(None).await.unwrap_err(),
        AuthError::MissingAuth
    ));
    assert!(matches!(
        guard.authenticate(Some("Token abc")).await.unwrap_err(),
        AuthError::MissingAuth
    ));
    assert!(matches!(
        guard.authenticate(Some("Bearer garbage")).await.unwrap_err(),
        AuthError::InvalidToken(_)
    ));
}

#[tokio::test]
async fn test_token_for_unknown_user() {
    let (guard, tokens, _) = guard().await;
    let token = tokens
        .issue_token(uuid::Uuid::new_v4(), "ghost@kitchen.test")
        .unwrap();

    assert!(matches!(
        guard
            .authenticate(Some(&format!("Bearer {}", token)))
            .await
            .unwrap_err(),
        AuthError::UnknownPrincipal
    ));
}
