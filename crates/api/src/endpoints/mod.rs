//! API endpoints.

mod favorites;
mod houses;
mod landlords;
mod users;
mod viewings;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/landlords", landlords::router())
        .nest("/houses", houses::router())
        .nest("/viewings", viewings::router())
        .nest("/favorites", favorites::router())
}
