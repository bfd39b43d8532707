use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, LikeOutcome, Recipe, RecipePage, User};
use crate::error::RepoError;
use crate::query::{PageWindow, RecipeFilter};

/// Read access to the user directory maintained by the account service.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Fetch every user among `ids` that exists. Order is unspecified.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;
}

/// Persistence boundary for recipes and their likes and comments.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Load a recipe with its like set and comments in insertion order.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, RepoError>;

    /// Recipes matching `filter`, newest first, restricted to `window`.
    async fn search(
        &self,
        filter: &RecipeFilter,
        window: &PageWindow,
    ) -> Result<RecipePage, RepoError>;

    /// All recipes by `author`, newest first.
    async fn find_by_author(&self, author: Uuid) -> Result<Vec<Recipe>, RepoError>;

    async fn insert(&self, recipe: Recipe) -> Result<Recipe, RepoError>;

    /// Persist the editable fields, image and `updated_at` of an existing recipe.
    ///
    /// Likes, comments, `author` and `created_at` are not written.
    async fn update(&self, recipe: &Recipe) -> Result<(), RepoError>;

    /// Hard delete, taking likes and comments with it.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Atomically flip `user_id`'s like and recompute `likes_count`.
    ///
    /// Implementations must serialize concurrent toggles on the same recipe so
    /// that no membership change is lost. Returns `RepoError::NotFound` when
    /// the recipe does not exist.
    async fn toggle_like(&self, recipe_id: Uuid, user_id: Uuid)
    -> Result<LikeOutcome, RepoError>;

    /// Append a comment at the end of the recipe's comment sequence.
    async fn append_comment(&self, recipe_id: Uuid, comment: Comment)
    -> Result<Comment, RepoError>;
}
