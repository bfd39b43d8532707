//! # Kitchen Infrastructure
//!
//! Concrete implementations of the ports defined in `kitchen-core`:
//! recipe and user stores, image storage, token verification and rate limiting.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory stores only
//! - `postgres` - PostgreSQL persistence via SeaORM
//! - `auth` - JWT verification
//! - `rate-limit` - Per-client rate limiting via governor

pub mod memory;
pub mod storage;

#[cfg(feature = "postgres")]
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

pub use memory::{InMemoryRecipeRepository, InMemoryUserRepository};
pub use storage::LocalImageStorage;

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConfig, PostgresRecipeRepository, PostgresUserRepository, connect,
};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{KeyedRateLimiter, RateLimitConfig};
