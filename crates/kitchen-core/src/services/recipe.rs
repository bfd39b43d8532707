//! Recipe lifecycle orchestration: validation, ownership and response assembly.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    Comment, CommentDetails, CommenterSummary, LikeOutcome, Principal, Recipe, RecipeDetails,
    UserSummary,
};
use crate::error::{DomainError, RepoError};
use crate::ports::{ImageStorage, RecipeRepository, UserRepository};
use crate::query::{ListParams, Pagination, QueryBuilder};
use crate::upload::{ImageUpload, UploadValidator};
use crate::validation::{RecipeInput, validate_comment, validate_recipe};

/// A page of resolved recipes with its pagination envelope.
#[derive(Debug, Clone)]
pub struct RecipeListing {
    pub items: Vec<RecipeDetails>,
    pub pagination: Pagination,
}

pub struct RecipeService {
    recipes: Arc<dyn RecipeRepository>,
    users: Arc<dyn UserRepository>,
    images: Arc<dyn ImageStorage>,
    uploads: UploadValidator,
    queries: QueryBuilder,
}

impl RecipeService {
    pub fn new(
        recipes: Arc<dyn RecipeRepository>,
        users: Arc<dyn UserRepository>,
        images: Arc<dyn ImageStorage>,
    ) -> Self {
        Self {
            recipes,
            users,
            images,
            uploads: UploadValidator::default(),
            queries: QueryBuilder::default(),
        }
    }

    pub fn with_upload_validator(mut self, uploads: UploadValidator) -> Self {
        self.uploads = uploads;
        self
    }

    pub fn with_query_builder(mut self, queries: QueryBuilder) -> Self {
        self.queries = queries;
        self
    }

    pub fn upload_validator(&self) -> &UploadValidator {
        &self.uploads
    }

    pub async fn create(
        &self,
        principal: &Principal,
        input: RecipeInput,
        image: Option<ImageUpload>,
    ) -> Result<RecipeDetails, DomainError> {
        let fields = validate_recipe(&input)?;
        let image = self.store_image(image).await?;

        let recipe = Recipe::new(principal.id, fields, image.clone());
        let saved = match self.recipes.insert(recipe).await {
            Ok(saved) => saved,
            Err(e) => {
                self.discard_image(image.as_deref()).await;
                return Err(e.into());
            }
        };

        tracing::info!(recipe_id = %saved.id, user_id = %principal.id, "Recipe created");
        self.resolve(saved).await
    }

    pub async fn get(&self, raw_id: &str) -> Result<RecipeDetails, DomainError> {
        let recipe = self.load(raw_id).await?;
        self.resolve(recipe).await
    }

    /// Filtered, paginated listing, newest first.
    pub async fn list(&self, params: &ListParams) -> Result<RecipeListing, DomainError> {
        let query = self.queries.build(params);
        tracing::debug!(?query, "Listing recipes");

        let page = self.recipes.search(&query.filter, &query.window).await?;
        Ok(RecipeListing {
            items: self.resolve_many(page.items).await?,
            pagination: query.window.pagination(page.total),
        })
    }

    pub async fn list_mine(&self, principal: &Principal) -> Result<Vec<RecipeDetails>, DomainError> {
        let recipes = self.recipes.find_by_author(principal.id).await?;
        self.resolve_many(recipes).await
    }

    /// Merge `patch` into the owner's recipe, re-validating the merged result.
    pub async fn update(
        &self,
        principal: &Principal,
        raw_id: &str,
        patch: RecipeInput,
        image: Option<ImageUpload>,
    ) -> Result<RecipeDetails, DomainError> {
        let mut recipe = self.load(raw_id).await?;
        ensure_owner(&recipe, principal, "update")?;

        let fields = validate_recipe(&RecipeInput::from(&recipe).merge(patch))?;
        let image = self.store_image(image).await?;

        recipe.apply(fields);
        if let Some(reference) = &image {
            recipe.image = Some(reference.clone());
        }
        recipe.touch();

        if let Err(e) = self.recipes.update(&recipe).await {
            self.discard_image(image.as_deref()).await;
            return Err(not_found_as_recipe(e));
        }

        tracing::info!(recipe_id = %recipe.id, user_id = %principal.id, "Recipe updated");
        self.resolve(recipe).await
    }

    pub async fn delete(&self, principal: &Principal, raw_id: &str) -> Result<(), DomainError> {
        let recipe = self.load(raw_id).await?;
        ensure_owner(&recipe, principal, "delete")?;

        self.recipes
            .delete(recipe.id)
            .await
            .map_err(not_found_as_recipe)?;

        tracing::info!(recipe_id = %recipe.id, user_id = %principal.id, "Recipe deleted");
        Ok(())
    }

    /// Like if not yet liked by the principal, unlike otherwise.
    pub async fn toggle_like(
        &self,
        principal: &Principal,
        raw_id: &str,
    ) -> Result<LikeOutcome, DomainError> {
        let id = parse_id(raw_id)?;
        let outcome = self
            .recipes
            .toggle_like(id, principal.id)
            .await
            .map_err(not_found_as_recipe)?;

        tracing::debug!(
            recipe_id = %id,
            user_id = %principal.id,
            liked = outcome.liked,
            likes_count = outcome.likes_count,
            "Like toggled"
        );
        Ok(outcome)
    }

    pub async fn add_comment(
        &self,
        principal: &Principal,
        raw_id: &str,
        text: &str,
    ) -> Result<CommentDetails, DomainError> {
        let text = validate_comment(text)?;
        let id = parse_id(raw_id)?;

        let comment = self
            .recipes
            .append_comment(id, Comment::new(principal.id, text))
            .await
            .map_err(not_found_as_recipe)?;

        Ok(CommentDetails {
            comment,
            user: Some(CommenterSummary {
                id: principal.id,
                name: principal.name.clone(),
            }),
        })
    }

    async fn load(&self, raw_id: &str) -> Result<Recipe, DomainError> {
        let id = parse_id(raw_id)?;
        self.recipes
            .find_by_id(id)
            .await?
            .ok_or_else(DomainError::recipe_not_found)
    }

    async fn store_image(&self, upload: Option<ImageUpload>) -> Result<Option<String>, DomainError> {
        let Some(upload) = upload else {
            return Ok(None);
        };

        let reference = self.uploads.accept(&upload).inspect_err(|e| {
            tracing::warn!(error = %e, "Image upload rejected");
        })?;
        self.images
            .store(&reference, &upload.bytes)
            .await
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        Ok(Some(reference))
    }

    async fn discard_image(&self, reference: Option<&str>) {
        if let Some(reference) = reference {
            if let Err(e) = self.images.remove(reference).await {
                tracing::warn!(%reference, error = %e, "Failed to remove orphaned image");
            }
        }
    }

    async fn resolve(&self, recipe: Recipe) -> Result<RecipeDetails, DomainError> {
        let mut resolved = self.resolve_many(vec![recipe]).await?;
        resolved
            .pop()
            .ok_or_else(|| DomainError::Internal("recipe vanished during resolution".to_string()))
    }

    /// Resolve authors and commenters with a single directory lookup.
    async fn resolve_many(&self, recipes: Vec<Recipe>) -> Result<Vec<RecipeDetails>, DomainError> {
        let ids: BTreeSet<Uuid> = recipes
            .iter()
            .flat_map(|r| std::iter::once(r.author).chain(r.comments.iter().map(|c| c.user)))
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = ids.into_iter().collect();
        let users: HashMap<Uuid, UserSummary> = self
            .users
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.summary()))
            .collect();

        Ok(recipes
            .into_iter()
            .map(|recipe| RecipeDetails {
                author: users.get(&recipe.author).cloned(),
                comments: recipe
                    .comments
                    .iter()
                    .map(|comment| CommentDetails {
                        user: users.get(&comment.user).cloned().map(Into::into),
                        comment: comment.clone(),
                    })
                    .collect(),
                recipe,
            })
            .collect())
    }
}

/// Malformed identifiers are indistinguishable from unknown ones.
fn parse_id(raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw.trim()).map_err(|_| DomainError::recipe_not_found())
}

fn ensure_owner(recipe: &Recipe, principal: &Principal, action: &str) -> Result<(), DomainError> {
    if recipe.is_owned_by(principal.id) {
        Ok(())
    } else {
        tracing::warn!(recipe_id = %recipe.id, user_id = %principal.id, action, "Ownership check failed");
        Err(DomainError::Forbidden(format!(
            "Not authorized to {} this recipe",
            action
        )))
    }
}

fn not_found_as_recipe(err: RepoError) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::recipe_not_found(),
        other => other.into(),
    }
}
