//! Recipe entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use kitchen_core::domain::{Comment, Recipe, UnknownVariant};
use kitchen_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub ingredients: Json,
    #[sea_orm(column_type = "Text")]
    pub steps: String,
    pub image: Option<String>,
    pub servings: i32,
    pub cooking_time: i32,
    pub cuisine_type: String,
    pub recipe_type: String,
    pub difficulty: String,
    pub likes_count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::recipe_like::Entity")]
    Like,
    #[sea_orm(has_many = "super::recipe_comment::Entity")]
    Comment,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::recipe_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Like.def()
    }
}

impl Related<super::recipe_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Assemble the domain recipe from its row, like rows and ordered comment rows.
    pub fn into_domain(
        self,
        likes: Vec<super::recipe_like::Model>,
        comments: Vec<super::recipe_comment::Model>,
    ) -> Result<Recipe, RepoError> {
        let id = self.id;
        let corrupt = move |field: &str, detail: String| {
            RepoError::Query(format!("recipe {} has invalid {}: {}", id, field, detail))
        };

        let ingredients: Vec<String> = serde_json::from_value(self.ingredients.clone())
            .map_err(|e| corrupt("ingredients", e.to_string()))?;
        let cuisine_type = self
            .cuisine_type
            .parse()
            .map_err(|e: UnknownVariant| corrupt("cuisine_type", e.to_string()))?;
        let recipe_type = self
            .recipe_type
            .parse()
            .map_err(|e: UnknownVariant| corrupt("recipe_type", e.to_string()))?;
        let difficulty = self
            .difficulty
            .parse()
            .map_err(|e: UnknownVariant| corrupt("difficulty", e.to_string()))?;

        Ok(Recipe {
            id: self.id,
            name: self.name,
            description: self.description,
            ingredients,
            steps: self.steps,
            image: self.image,
            servings: u32::try_from(self.servings)
                .map_err(|e| corrupt("servings", e.to_string()))?,
            cooking_time: u32::try_from(self.cooking_time)
                .map_err(|e| corrupt("cooking_time", e.to_string()))?,
            cuisine_type,
            recipe_type,
            difficulty,
            author: self.author_id,
            likes: likes.into_iter().map(|l| l.user_id).collect(),
            likes_count: self.likes_count.max(0) as u32,
            comments: comments.into_iter().map(Comment::from).collect(),
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        })
    }
}

fn column_int(field: &str, value: u32) -> Result<i32, RepoError> {
    i32::try_from(value)
        .map_err(|_| RepoError::Constraint(format!("{} {} does not fit the column", field, value)))
}

/// Conversion from Domain Recipe to SeaORM ActiveModel.
impl TryFrom<&Recipe> for ActiveModel {
    type Error = RepoError;

    fn try_from(recipe: &Recipe) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Set(recipe.id),
            author_id: Set(recipe.author),
            name: Set(recipe.name.clone()),
            description: Set(recipe.description.clone()),
            ingredients: Set(serde_json::json!(recipe.ingredients)),
            steps: Set(recipe.steps.clone()),
            image: Set(recipe.image.clone()),
            servings: Set(column_int("servings", recipe.servings)?),
            cooking_time: Set(column_int("cooking_time", recipe.cooking_time)?),
            cuisine_type: Set(recipe.cuisine_type.to_string()),
            recipe_type: Set(recipe.recipe_type.to_string()),
            difficulty: Set(recipe.difficulty.to_string()),
            likes_count: Set(column_int("likes_count", recipe.likes_count)?),
            created_at: Set(recipe.created_at.into()),
            updated_at: Set(recipe.updated_at.into()),
        })
    }
}
