//! Application state - shared across all handlers.

use std::sync::Arc;

use kitchen_core::ports::{ImageStorage, RateLimiter, RecipeRepository, TokenService, UserRepository};
use kitchen_core::{AuthGuard, RecipeService};
use kitchen_infra::{InMemoryRecipeRepository, InMemoryUserRepository, JwtTokenService, LocalImageStorage};

#[cfg(feature = "postgres")]
use kitchen_infra::{PostgresRecipeRepository, PostgresUserRepository};
#[cfg(feature = "rate-limit")]
use kitchen_infra::KeyedRateLimiter;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub recipes: Arc<RecipeService>,
    pub auth: AuthGuard,
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
}

impl AppState {
    /// Assemble the service from already-built adapters.
    pub fn from_parts(
        recipes: Arc<dyn RecipeRepository>,
        users: Arc<dyn UserRepository>,
        images: Arc<dyn ImageStorage>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            recipes: Arc::new(RecipeService::new(recipes, users.clone(), images)),
            auth: AuthGuard::new(tokens, users),
            rate_limiter: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let (recipes, users) = Self::stores(config).await;
        let images = Arc::new(LocalImageStorage::new(&config.upload_dir).await?);
        let tokens = Arc::new(JwtTokenService::new(config.jwt.clone()));

        let state = Self::from_parts(recipes, users, images, tokens);

        #[cfg(feature = "rate-limit")]
        let state = state.with_rate_limiter(Arc::new(KeyedRateLimiter::new(
            config.rate_limit.clone(),
        )));

        tracing::info!("Application state initialized");
        Ok(state)
    }

    #[cfg(feature = "postgres")]
    async fn stores(config: &AppConfig) -> (Arc<dyn RecipeRepository>, Arc<dyn UserRepository>) {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory_stores();
        };

        match kitchen_infra::connect(db_config).await {
            Ok(conn) => (
                Arc::new(PostgresRecipeRepository::new(conn.clone())),
                Arc::new(PostgresUserRepository::new(conn)),
            ),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::in_memory_stores()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn stores(_config: &AppConfig) -> (Arc<dyn RecipeRepository>, Arc<dyn UserRepository>) {
        tracing::info!("Running without postgres feature - using in-memory stores");
        Self::in_memory_stores()
    }

    fn in_memory_stores() -> (Arc<dyn RecipeRepository>, Arc<dyn UserRepository>) {
        (
            Arc::new(InMemoryRecipeRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }
}
