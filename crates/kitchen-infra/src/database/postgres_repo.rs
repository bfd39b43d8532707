//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SubsecRound, TimeDelta, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, DbConn, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use kitchen_core::domain::{Comment, LikeOutcome, Recipe, RecipePage, User};
use kitchen_core::error::RepoError;
use kitchen_core::ports::{RecipeRepository, UserRepository};
use kitchen_core::query::{PageWindow, RecipeFilter};

use super::entity::recipe::{self, Entity as RecipeEntity};
use super::entity::recipe_comment::{self, Entity as CommentEntity};
use super::entity::recipe_like::{self, Entity as LikeEntity};
use super::entity::user::{self, Entity as UserEntity};

fn db_err(e: DbErr) -> RepoError {
    let err_str = e.to_string();
    match e {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(err_str),
        _ if err_str.contains("duplicate") || err_str.contains("unique") => {
            RepoError::Constraint(err_str)
        }
        _ if err_str.contains("foreign key") => RepoError::Constraint(err_str),
        _ => RepoError::Query(err_str),
    }
}

/// PostgreSQL user directory.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id).one(&self.db).await.map_err(db_err)?;
        Ok(result.map(Into::into))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL recipe store.
pub struct PostgresRecipeRepository {
    db: DbConn,
}

impl PostgresRecipeRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> DbConn {
        self.db
    }
}

/// Escape LIKE wildcards so the term is matched literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn filter_condition(filter: &RecipeFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        condition = condition.add(
            Condition::any()
                .add(Expr::cust_with_values(
                    r#""recipes"."name" ILIKE ?"#,
                    [pattern.clone()],
                ))
                .add(Expr::cust_with_values(
                    r#"EXISTS (SELECT 1 FROM jsonb_array_elements_text("recipes"."ingredients") AS ingredient WHERE ingredient ILIKE ?)"#,
                    [pattern],
                )),
        );
    }
    if let Some(cuisine) = &filter.cuisine {
        condition = condition.add(recipe::Column::CuisineType.eq(cuisine.as_str()));
    }
    if let Some(recipe_type) = &filter.recipe_type {
        condition = condition.add(recipe::Column::RecipeType.eq(recipe_type.as_str()));
    }
    if let Some(difficulty) = &filter.difficulty {
        condition = condition.add(recipe::Column::Difficulty.eq(difficulty.as_str()));
    }

    condition
}

/// Load likes and comments for `models` with one query each and assemble domain recipes.
async fn hydrate<C: ConnectionTrait>(
    db: &C,
    models: Vec<recipe::Model>,
) -> Result<Vec<Recipe>, RepoError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();

    let mut likes: HashMap<Uuid, Vec<recipe_like::Model>> = HashMap::new();
    for like in LikeEntity::find()
        .filter(recipe_like::Column::RecipeId.is_in(ids.clone()))
        .all(db)
        .await
        .map_err(db_err)?
    {
        likes.entry(like.recipe_id).or_default().push(like);
    }

    let mut comments: HashMap<Uuid, Vec<recipe_comment::Model>> = HashMap::new();
    for comment in CommentEntity::find()
        .filter(recipe_comment::Column::RecipeId.is_in(ids))
        .order_by_asc(recipe_comment::Column::CreatedAt)
        .order_by_asc(recipe_comment::Column::Id)
        .all(db)
        .await
        .map_err(db_err)?
    {
        comments.entry(comment.recipe_id).or_default().push(comment);
    }

    models
        .into_iter()
        .map(|model| {
            let id = model.id;
            model.into_domain(
                likes.remove(&id).unwrap_or_default(),
                comments.remove(&id).unwrap_or_default(),
            )
        })
        .collect()
}

/// Column precision is microseconds; stamp strictly after the previous comment.
fn next_comment_time(
    now: chrono::DateTime<Utc>,
    last: Option<chrono::DateTime<Utc>>,
) -> chrono::DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    match last {
        Some(last) if now <= last => last + TimeDelta::microseconds(1),
        _ => now,
    }
}

#[async_trait]
impl RecipeRepository for PostgresRecipeRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, RepoError> {
        let Some(model) = RecipeEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        Ok(hydrate(&self.db, vec![model]).await?.pop())
    }

    async fn search(
        &self,
        filter: &RecipeFilter,
        window: &PageWindow,
    ) -> Result<RecipePage, RepoError> {
        let condition = filter_condition(filter);
        tracing::debug!(?filter, skip = window.skip, limit = window.limit, "Searching recipes");

        let total = RecipeEntity::find()
            .filter(condition.clone())
            .count(&self.db)
            .await
            .map_err(db_err)?;

        let models = RecipeEntity::find()
            .filter(condition)
            .order_by_desc(recipe::Column::CreatedAt)
            .offset(window.skip)
            .limit(window.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(RecipePage {
            items: hydrate(&self.db, models).await?,
            total,
        })
    }

    async fn find_by_author(&self, author: Uuid) -> Result<Vec<Recipe>, RepoError> {
        let models = RecipeEntity::find()
            .filter(recipe::Column::AuthorId.eq(author))
            .order_by_desc(recipe::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        hydrate(&self.db, models).await
    }

    async fn insert(&self, recipe: Recipe) -> Result<Recipe, RepoError> {
        RecipeEntity::insert(recipe::ActiveModel::try_from(&recipe)?)
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        Ok(recipe)
    }

    async fn update(&self, recipe: &Recipe) -> Result<(), RepoError> {
        let mut changes = recipe::ActiveModel::try_from(recipe)?;
        changes.id = NotSet;
        changes.author_id = NotSet;
        changes.likes_count = NotSet;
        changes.created_at = NotSet;

        let result = RecipeEntity::update_many()
            .set(changes)
            .filter(recipe::Column::Id.eq(recipe.id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = RecipeEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn toggle_like(
        &self,
        recipe_id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeOutcome, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        // Row lock serializes toggles on the same recipe until commit.
        let locked = RecipeEntity::find_by_id(recipe_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?;
        if locked.is_none() {
            return Err(RepoError::NotFound);
        }

        let existing = LikeEntity::find_by_id((recipe_id, user_id))
            .one(&txn)
            .await
            .map_err(db_err)?;

        let now = Utc::now();
        let liked = match existing {
            Some(_) => {
                LikeEntity::delete_by_id((recipe_id, user_id))
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;
                false
            }
            None => {
                LikeEntity::insert(recipe_like::ActiveModel {
                    recipe_id: Set(recipe_id),
                    user_id: Set(user_id),
                    created_at: Set(now.into()),
                })
                .exec_without_returning(&txn)
                .await
                .map_err(db_err)?;
                true
            }
        };

        let likes_count = LikeEntity::find()
            .filter(recipe_like::Column::RecipeId.eq(recipe_id))
            .count(&txn)
            .await
            .map_err(db_err)?;

        RecipeEntity::update_many()
            .col_expr(recipe::Column::LikesCount, Expr::value(likes_count as i32))
            .col_expr(
                recipe::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(now)),
            )
            .filter(recipe::Column::Id.eq(recipe_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        Ok(LikeOutcome {
            liked,
            likes_count: likes_count as u32,
        })
    }

    async fn append_comment(
        &self,
        recipe_id: Uuid,
        comment: Comment,
    ) -> Result<Comment, RepoError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        // Exclusive lock serializes appends so created_at orders them strictly.
        let parent = RecipeEntity::find_by_id(recipe_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?;
        if parent.is_none() {
            return Err(RepoError::NotFound);
        }

        let last = CommentEntity::find()
            .filter(recipe_comment::Column::RecipeId.eq(recipe_id))
            .order_by_desc(recipe_comment::Column::CreatedAt)
            .one(&txn)
            .await
            .map_err(db_err)?;

        let mut comment = comment;
        comment.created_at = next_comment_time(
            comment.created_at,
            last.map(|c| chrono::DateTime::<Utc>::from(c.created_at)),
        );

        CommentEntity::insert(recipe_comment::ActiveModel::for_recipe(recipe_id, &comment))
            .exec_without_returning(&txn)
            .await
            .map_err(db_err)?;

        RecipeEntity::update_many()
            .col_expr(
                recipe::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(
                    comment.created_at,
                )),
            )
            .filter(recipe::Column::Id.eq(recipe_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("egg"), "%egg%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_comment_time_is_strictly_after_the_last() {
        let now = Utc::now().trunc_subsecs(6);
        assert_eq!(next_comment_time(now, None), now);
        assert_eq!(
            next_comment_time(now, Some(now)),
            now + TimeDelta::microseconds(1)
        );
        assert_eq!(
            next_comment_time(now - TimeDelta::seconds(1), Some(now)),
            now + TimeDelta::microseconds(1)
        );
        assert_eq!(
            next_comment_time(now, Some(now - TimeDelta::seconds(1))),
            now
        );
    }

    #[test]
    fn test_empty_filter_has_no_conditions() {
        assert!(filter_condition(&RecipeFilter::default()).is_empty());
    }
}
