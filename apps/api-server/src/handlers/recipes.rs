//! Recipe handlers.

use actix_web::{HttpRequest, HttpResponse, web};

use kitchen_core::domain::{CommentDetails, RecipeDetails};
use kitchen_core::query::{ListParams, Pagination};
use kitchen_shared::dto::{
    AuthorDto, CommentCreatedResponse, CommentRequest, CommentResponse, CommenterDto,
    LikeResponse, PaginationDto, RecipeResponse,
};
use kitchen_shared::{ApiResponse, MessageResponse, PaginatedResponse};

use crate::form::RecipeForm;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn recipe_response(details: RecipeDetails) -> RecipeResponse {
    let RecipeDetails {
        recipe,
        author,
        comments,
    } = details;

    RecipeResponse {
        id: recipe.id,
        name: recipe.name,
        description: recipe.description,
        ingredients: recipe.ingredients,
        steps: recipe.steps,
        image: recipe.image,
        servings: recipe.servings,
        cooking_time: recipe.cooking_time,
        cuisine_type: recipe.cuisine_type.to_string(),
        recipe_type: recipe.recipe_type.to_string(),
        difficulty: recipe.difficulty.to_string(),
        author: author.map(|a| AuthorDto {
            id: a.id,
            name: a.name,
            email: a.email,
        }),
        likes: recipe.likes.into_iter().collect(),
        likes_count: recipe.likes_count,
        comments: comments.into_iter().map(comment_response).collect(),
        created_at: recipe.created_at,
        updated_at: recipe.updated_at,
    }
}

fn comment_response(details: CommentDetails) -> CommentResponse {
    CommentResponse {
        id: details.comment.id,
        user: details.user.map(|u| CommenterDto {
            id: u.id,
            name: u.name,
        }),
        text: details.comment.text,
        created_at: details.comment.created_at,
    }
}

fn pagination_dto(p: Pagination) -> PaginationDto {
    PaginationDto {
        page: p.page,
        limit: p.limit,
        total: p.total,
        total_pages: p.total_pages,
        has_next_page: p.has_next_page,
        has_prev_page: p.has_prev_page,
    }
}

/// GET /api/recipes
///
/// Unparseable query strings fall back to the unfiltered first page.
pub async fn list_recipes(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    let params = web::Query::<ListParams>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .unwrap_or_default();

    let listing = state.recipes.list(&params).await?;

    Ok(HttpResponse::Ok().json(PaginatedResponse::new(
        listing.items.into_iter().map(recipe_response).collect(),
        pagination_dto(listing.pagination),
    )))
}

/// GET /api/recipes/{id}
pub async fn get_recipe(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let details = state.recipes.get(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(recipe_response(details))))
}

/// POST /api/recipes
pub async fn create_recipe(
    Identity(principal): Identity,
    state: web::Data<AppState>,
    form: RecipeForm,
) -> AppResult<HttpResponse> {
    let details = state
        .recipes
        .create(&principal, form.input, form.image)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        recipe_response(details),
        "Recipe created successfully",
    )))
}

/// PUT /api/recipes/{id}
pub async fn update_recipe(
    Identity(principal): Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
    form: RecipeForm,
) -> AppResult<HttpResponse> {
    let details = state
        .recipes
        .update(&principal, &path, form.input, form.image)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        recipe_response(details),
        "Recipe updated successfully",
    )))
}

/// DELETE /api/recipes/{id}
pub async fn delete_recipe(
    Identity(principal): Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.recipes.delete(&principal, &path).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Recipe deleted successfully")))
}

/// PUT /api/recipes/{id}/like
pub async fn toggle_like(
    Identity(principal): Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let outcome = state.recipes.toggle_like(&principal, &path).await?;

    Ok(HttpResponse::Ok().json(LikeResponse {
        success: true,
        message: if outcome.liked { "Recipe liked" } else { "Like removed" }.to_string(),
        liked: outcome.liked,
        likes_count: outcome.likes_count,
    }))
}

/// POST /api/recipes/{id}/comment
pub async fn add_comment(
    Identity(principal): Identity,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .recipes
        .add_comment(&principal, &path, &body.text)
        .await?;

    Ok(HttpResponse::Created().json(CommentCreatedResponse {
        success: true,
        message: "Comment added successfully".to_string(),
        comment: comment_response(comment),
    }))
}

/// GET /api/recipes/user/my-recipes
pub async fn my_recipes(
    Identity(principal): Identity,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let recipes = state.recipes.list_mine(&principal).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        recipes.into_iter().map(recipe_response).collect::<Vec<_>>(),
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    use kitchen_core::domain::User;
    use kitchen_core::ports::TokenService;
    use kitchen_infra::{
        InMemoryRecipeRepository, InMemoryUserRepository, JwtConfig, JwtTokenService,
        LocalImageStorage,
    };

    use crate::handlers::configure_routes;
    use crate::state::AppState;

    struct Fixture {
        state: AppState,
        alice: String,
        bob: String,
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let tokens = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "handler-test-secret".to_string(),
            ..JwtConfig::default()
        }));
        let upload_dir =
            std::env::temp_dir().join(format!("kitchen-handlers-{}", uuid::Uuid::new_v4()));

        let alice = users.insert(User::new("Alice", "alice@kitchen.test")).await;
        let bob = users.insert(User::new("Bob", "bob@kitchen.test")).await;

        Fixture {
            alice: format!("Bearer {}", tokens.issue_token(alice.id, &alice.email).unwrap()),
            bob: format!("Bearer {}", tokens.issue_token(bob.id, &bob.email).unwrap()),
            state: AppState::from_parts(
                Arc::new(InMemoryRecipeRepository::new()),
                users,
                Arc::new(LocalImageStorage::new(upload_dir).await.unwrap()),
                tokens,
            ),
        }
    }

    fn risotto() -> Value {
        json!({
            "name": "Mushroom Risotto",
            "description": "Creamy arborio rice with porcini",
            "ingredients": "arborio rice, porcini, parmesan",
            "steps": "Toast the rice, then add stock ladle by ladle.",
            "servings": 4,
            "cookingTime": 30,
            "cuisineType": "Italian",
            "recipeType": "Main Course",
            "difficulty": "Medium"
        })
    }

    async fn body(res: ServiceResponse) -> Value {
        test::read_body_json(res).await
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(actix_web::web::Data::new($state.clone()))
                    .configure(|cfg| configure_routes(cfg, None)),
            )
            .await
        };
    }

    macro_rules! create {
        ($app:expr, $token:expr, $recipe:expr) => {{
            let res = test::call_service(
                &$app,
                test::TestRequest::post()
                    .uri("/api/recipes")
                    .insert_header(("Authorization", $token.as_str()))
                    .set_json($recipe)
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::CREATED);
            body(res).await
        }};
    }

    #[actix_web::test]
    async fn test_recipe_lifecycle() {
        let fx = fixture().await;
        let app = app!(fx.state);

        let created = create!(app, fx.alice, risotto());
        assert_eq!(created["success"], true);
        assert_eq!(created["message"], "Recipe created successfully");
        let recipe = &created["data"];
        assert_eq!(recipe["servings"], 4);
        assert_eq!(recipe["cookingTime"], 30);
        assert_eq!(recipe["cuisineType"], "Italian");
        assert_eq!(recipe["recipeType"], "Main Course");
        assert_eq!(recipe["difficulty"], "Medium");
        assert_eq!(recipe["likesCount"], 0);
        assert_eq!(recipe["author"]["name"], "Alice");
        assert!(recipe["author"].get("password").is_none());
        let uri = format!("/api/recipes/{}", recipe["id"].as_str().unwrap());

        let fetched = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(fetched.status(), StatusCode::OK);
        assert_eq!(body(fetched).await["data"], *recipe);

        let denied = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&uri)
                .insert_header(("Authorization", fx.bob.as_str()))
                .to_request(),
        )
        .await;
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        assert_eq!(body(denied).await["message"], "Not authorized to delete this recipe");

        let deleted = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&uri)
                .insert_header(("Authorization", fx.alice.as_str()))
                .to_request(),
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::OK);
        assert_eq!(body(deleted).await["message"], "Recipe deleted successfully");

        let gone = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
        let gone = body(gone).await;
        assert_eq!(gone["success"], false);
        assert_eq!(gone["message"], "Recipe not found");
    }

    #[actix_web::test]
    async fn test_mutations_require_a_bearer_token() {
        let fx = fixture().await;
        let app = app!(fx.state);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/recipes")
                .set_json(risotto())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body(res).await["message"], "Not authorized to access this route");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/recipes/user/my-recipes")
                .insert_header(("Authorization", "Bearer not-a-jwt"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_invalid_recipe_lists_every_field() {
        let fx = fixture().await;
        let app = app!(fx.state);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/recipes")
                .insert_header(("Authorization", fx.alice.as_str()))
                .set_json(json!({"name": "X", "servings": "lots"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = body(res).await;
        assert_eq!(body["message"], "Validation failed");
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(
            fields,
            vec![
                "name",
                "description",
                "ingredients",
                "steps",
                "servings",
                "cookingTime",
                "cuisineType",
                "recipeType",
                "difficulty"
            ]
        );
    }

    #[actix_web::test]
    async fn test_like_toggle_and_comment() {
        let fx = fixture().await;
        let app = app!(fx.state);
        let created = create!(app, fx.alice, risotto());
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let like = |token: String| {
            test::TestRequest::put()
                .uri(&format!("/api/recipes/{}/like", id))
                .insert_header(("Authorization", token))
                .to_request()
        };

        let liked = body(test::call_service(&app, like(fx.bob.clone())).await).await;
        assert_eq!(liked["liked"], true);
        assert_eq!(liked["likesCount"], 1);
        assert_eq!(liked["message"], "Recipe liked");

        let unliked = body(test::call_service(&app, like(fx.bob.clone())).await).await;
        assert_eq!(unliked["liked"], false);
        assert_eq!(unliked["likesCount"], 0);
        assert_eq!(unliked["message"], "Like removed");

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/recipes/{}/comment", id))
                .insert_header(("Authorization", fx.bob.as_str()))
                .set_json(json!({"text": "Perfectly creamy"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let comment = body(res).await;
        assert_eq!(comment["message"], "Comment added successfully");
        assert_eq!(comment["comment"]["text"], "Perfectly creamy");
        assert_eq!(comment["comment"]["user"]["name"], "Bob");

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/recipes/{}/comment", id))
                .insert_header(("Authorization", fx.bob.as_str()))
                .set_json(json!({"text": ""}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(&format!("/api/recipes/{}", id)).to_request(),
        )
        .await;
        let recipe = body(res).await;
        assert_eq!(recipe["data"]["comments"].as_array().unwrap().len(), 1);
        assert_eq!(recipe["data"]["likesCount"], 0);
    }

    #[actix_web::test]
    async fn test_listing_pages_and_my_recipes() {
        let fx = fixture().await;
        let app = app!(fx.state);
        for i in 0..13 {
            let mut recipe = risotto();
            recipe["name"] = json!(format!("Risotto {}", i));
            create!(app, fx.alice, recipe);
        }
        let mut eggs = risotto();
        eggs["name"] = json!("Shakshuka");
        eggs["ingredients"] = json!(["4 Eggs", "tomatoes"]);
        create!(app, fx.bob, eggs);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/recipes?page=2&limit=12").to_request(),
        )
        .await;
        let page = body(res).await;
        assert_eq!(page["data"].as_array().unwrap().len(), 2);
        assert_eq!(page["pagination"]["total"], 14);
        assert_eq!(page["pagination"]["totalPages"], 2);
        assert_eq!(page["pagination"]["hasNextPage"], false);
        assert_eq!(page["pagination"]["hasPrevPage"], true);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/recipes?search=egg&page=abc").to_request(),
        )
        .await;
        let found = body(res).await;
        assert_eq!(found["data"].as_array().unwrap().len(), 1);
        assert_eq!(found["data"][0]["name"], "Shakshuka");
        assert_eq!(found["pagination"]["page"], 1);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/recipes/user/my-recipes")
                .insert_header(("Authorization", fx.bob.as_str()))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let mine = body(res).await;
        assert_eq!(mine["data"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_malformed_id_is_not_found() {
        let fx = fixture().await;
        let app = app!(fx.state);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/recipes/64b7f0c2a1e4").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/recipes/not-an-id/like")
                .insert_header(("Authorization", fx.alice.as_str()))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_health() {
        let fx = fixture().await;
        let app = app!(fx.state);

        let res = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body(res).await["status"], "ok");
    }
}
