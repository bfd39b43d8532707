//! Application services composed from the ports.

mod auth_guard;
mod recipe;

pub use auth_guard::AuthGuard;
pub use recipe::{RecipeListing, RecipeService};
