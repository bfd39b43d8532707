//! Domain entities - the core business objects.

mod recipe;
mod user;

pub use recipe::{
    Comment, CommentDetails, CommenterSummary, CuisineType, Difficulty, LikeOutcome, Recipe,
    RecipeDetails, RecipeFields, RecipePage, RecipeType, UnknownVariant,
};
pub use user::{Principal, User, UserSummary};
