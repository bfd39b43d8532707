//! HTTP handlers and route configuration.

mod health;
mod recipes;

use std::sync::Arc;

use actix_web::web;
use kitchen_core::ports::RateLimiter;

use crate::middleware::error::AppError;
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
///
/// The recipe scope is rate limited when a limiter is supplied.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: Option<Arc<dyn RateLimiter>>) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()),
    )
    .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/recipes")
                    .wrap(RateLimitMiddleware::new(limiter))
                    .route("", web::get().to(recipes::list_recipes))
                    .route("", web::post().to(recipes::create_recipe))
                    // Registered before `/{id}` so it is not captured as an id.
                    .route("/user/my-recipes", web::get().to(recipes::my_recipes))
                    .route("/{id}", web::get().to(recipes::get_recipe))
                    .route("/{id}", web::put().to(recipes::update_recipe))
                    .route("/{id}", web::delete().to(recipes::delete_recipe))
                    .route("/{id}/like", web::put().to(recipes::toggle_like))
                    .route("/{id}/comment", web::post().to(recipes::add_comment)),
            ),
    );
}
