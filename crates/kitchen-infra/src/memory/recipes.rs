use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use kitchen_core::domain::{Comment, LikeOutcome, Recipe, RecipePage};
use kitchen_core::error::RepoError;
use kitchen_core::ports::RecipeRepository;
use kitchen_core::query::{PageWindow, RecipeFilter};

struct StoredRecipe {
    /// Insertion sequence; breaks `created_at` ties so newest-first is stable.
    seq: u64,
    recipe: Recipe,
}

#[derive(Default)]
struct Inner {
    next_seq: u64,
    recipes: HashMap<Uuid, StoredRecipe>,
}

impl Inner {
    /// Matching recipes, newest first.
    fn sorted<'a>(&'a self, keep: impl Fn(&Recipe) -> bool) -> Vec<&'a Recipe> {
        let mut matches: Vec<&StoredRecipe> =
            self.recipes.values().filter(|s| keep(&s.recipe)).collect();
        matches.sort_by_key(|s| Reverse((s.recipe.created_at, s.seq)));
        matches.into_iter().map(|s| &s.recipe).collect()
    }
}

/// Recipe store held in process memory.
///
/// Every mutation happens under a single write lock, so like toggles and
/// comment appends are atomic with respect to each other.
#[derive(Default)]
pub struct InMemoryRecipeRepository {
    inner: RwLock<Inner>,
}

impl InMemoryRecipeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner.recipes.get(&id).map(|s| s.recipe.clone()))
    }

    async fn search(
        &self,
        filter: &RecipeFilter,
        window: &PageWindow,
    ) -> Result<RecipePage, RepoError> {
        let inner = self.inner.read().await;
        let matches = inner.sorted(|r| filter.matches(r));

        Ok(RecipePage {
            total: matches.len() as u64,
            items: matches
                .into_iter()
                .skip(usize::try_from(window.skip).unwrap_or(usize::MAX))
                .take(usize::try_from(window.limit).unwrap_or(usize::MAX))
                .cloned()
                .collect(),
        })
    }

    async fn find_by_author(&self, author: Uuid) -> Result<Vec<Recipe>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner
            .sorted(|r| r.author == author)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn insert(&self, recipe: Recipe) -> Result<Recipe, RepoError> {
        let mut inner = self.inner.write().await;
        if inner.recipes.contains_key(&recipe.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.recipes.insert(
            recipe.id,
            StoredRecipe {
                seq,
                recipe: recipe.clone(),
            },
        );
        Ok(recipe)
    }

    async fn update(&self, recipe: &Recipe) -> Result<(), RepoError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .recipes
            .get_mut(&recipe.id)
            .ok_or(RepoError::NotFound)?;

        stored.recipe.apply(recipe.fields());
        stored.recipe.image = recipe.image.clone();
        stored.recipe.updated_at = recipe.updated_at;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut inner = self.inner.write().await;
        inner
            .recipes
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn toggle_like(
        &self,
        recipe_id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeOutcome, RepoError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .recipes
            .get_mut(&recipe_id)
            .ok_or(RepoError::NotFound)?;

        let outcome = stored.recipe.toggle_like(user_id);
        stored.recipe.touch();
        Ok(outcome)
    }

    async fn append_comment(
        &self,
        recipe_id: Uuid,
        comment: Comment,
    ) -> Result<Comment, RepoError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .recipes
            .get_mut(&recipe_id)
            .ok_or(RepoError::NotFound)?;

        let mut comment = comment;
        // Keep created_at non-decreasing along the sequence.
        if let Some(last) = stored.recipe.comments.last() {
            comment.created_at = comment.created_at.max(last.created_at);
        }
        stored.recipe.comments.push(comment.clone());
        stored.recipe.updated_at = Utc::now().max(stored.recipe.updated_at);
        Ok(comment)
    }
}
