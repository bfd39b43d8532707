//! SeaORM entities for the recipe schema.

pub mod recipe;
pub mod recipe_comment;
pub mod recipe_like;
pub mod user;
