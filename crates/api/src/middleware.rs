//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use renthub_core::{FavoriteService, HouseService, LandlordService, UserService, ViewingService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub landlord_service: LandlordService,
    pub house_service: HouseService,
    pub viewing_service: ViewingService,
    pub favorite_service: FavoriteService,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to its user and stashes the user in request
/// extensions; endpoints that require authentication pull it back out with
/// the `AuthUser` extractor. Requests without a valid token simply proceed
/// unauthenticated.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        if let Ok(user) = state.user_service.authenticate(token).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}
