use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Recipes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Recipes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Recipes::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Recipes::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Recipes::Description).text().not_null())
                    .col(ColumnDef::new(Recipes::Ingredients).json_binary().not_null())
                    .col(ColumnDef::new(Recipes::Steps).text().not_null())
                    .col(ColumnDef::new(Recipes::Image).string())
                    .col(ColumnDef::new(Recipes::Servings).integer().not_null())
                    .col(ColumnDef::new(Recipes::CookingTime).integer().not_null())
                    .col(ColumnDef::new(Recipes::CuisineType).string_len(32).not_null())
                    .col(ColumnDef::new(Recipes::RecipeType).string_len(32).not_null())
                    .col(ColumnDef::new(Recipes::Difficulty).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Recipes::LikesCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Recipes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Recipes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipes_author")
                            .from(Recipes::Table, Recipes::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recipes_created_at")
                    .table(Recipes::Table)
                    .col(Recipes::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recipes_author")
                    .table(Recipes::Table)
                    .col(Recipes::AuthorId)
                    .to_owned(),
            )
            .await?;

        // Like membership: the composite key makes a like a set element.
        manager
            .create_table(
                Table::create()
                    .table(RecipeLikes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RecipeLikes::RecipeId).uuid().not_null())
                    .col(ColumnDef::new(RecipeLikes::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(RecipeLikes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(RecipeLikes::RecipeId)
                            .col(RecipeLikes::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_likes_recipe")
                            .from(RecipeLikes::Table, RecipeLikes::RecipeId)
                            .to(Recipes::Table, Recipes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecipeComments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecipeComments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RecipeComments::RecipeId).uuid().not_null())
                    .col(ColumnDef::new(RecipeComments::UserId).uuid().not_null())
                    .col(ColumnDef::new(RecipeComments::Text).text().not_null())
                    .col(
                        ColumnDef::new(RecipeComments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_comments_recipe")
                            .from(RecipeComments::Table, RecipeComments::RecipeId)
                            .to(Recipes::Table, Recipes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_comments_order")
                    .table(RecipeComments::Table)
                    .col(RecipeComments::RecipeId)
                    .col(RecipeComments::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecipeComments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecipeLikes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Recipes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Recipes {
    Table,
    Id,
    AuthorId,
    Name,
    Description,
    Ingredients,
    Steps,
    Image,
    Servings,
    CookingTime,
    CuisineType,
    RecipeType,
    Difficulty,
    LikesCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RecipeLikes {
    Table,
    RecipeId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RecipeComments {
    Table,
    Id,
    RecipeId,
    UserId,
    Text,
    CreatedAt,
}
