//! Authentication extractor.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;

use kitchen_core::domain::Principal;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Authenticated principal extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(Identity(principal): Identity) -> impl Responder {
///     format!("Hello, {}!", principal.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity(pub Principal);

impl FromRequest for Identity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
            tracing::error!("AppState not found in app data");
            return Box::pin(async {
                Err(AppError::Internal("application state missing".to_string()))
            });
        };

        // A non-ASCII header is treated as absent.
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Box::pin(async move {
            let principal = state.auth.authenticate(authorization.as_deref()).await?;
            Ok(Identity(principal))
        })
    }
}
