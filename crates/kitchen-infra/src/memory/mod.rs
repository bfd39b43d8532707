//! In-memory adapters - used when no database is configured, and in tests.
//! Note: Data is lost on process restart.

mod recipes;
mod users;

pub use recipes::InMemoryRecipeRepository;
pub use users::InMemoryUserRepository;
