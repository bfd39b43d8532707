//! Comment rows, ordered by `created_at` then `id`.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use kitchen_core::domain::Comment;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "recipe_comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recipe::Entity",
        from = "Column::RecipeId",
        to = "super::recipe::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Recipe,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Comment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user: model.user_id,
            text: model.text,
            created_at: model.created_at.into(),
        }
    }
}

impl ActiveModel {
    pub fn for_recipe(recipe_id: Uuid, comment: &Comment) -> Self {
        Self {
            id: Set(comment.id),
            recipe_id: Set(recipe_id),
            user_id: Set(comment.user),
            text: Set(comment.text.clone()),
            created_at: Set(comment.created_at.into()),
        }
    }
}
