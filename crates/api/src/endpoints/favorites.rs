//! Favorite endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use renthub_common::AppResult;
use renthub_db::entities::favorite;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Toggle / add request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub house_id: String,
    #[serde(default)]
    pub notes: String,
}

/// Toggle / status response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteStateResponse {
    pub favorited: bool,
}

/// Favorite response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub id: String,
    pub house_id: String,
    pub notes: String,
    pub created_at: String,
}

impl From<favorite::Model> for FavoriteResponse {
    fn from(favorite: favorite::Model) -> Self {
        Self {
            id: favorite.id,
            house_id: favorite.house_id,
            notes: favorite.notes,
            created_at: favorite.created_at.to_rfc3339(),
        }
    }
}

/// Flip the favorited state of a house.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FavoriteRequest>,
) -> AppResult<ApiResponse<FavoriteStateResponse>> {
    let favorited = state
        .favorite_service
        .toggle(&user.id, &req.house_id, &req.notes)
        .await?;
    Ok(ApiResponse::ok(FavoriteStateResponse { favorited }))
}

/// Add a favorite.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FavoriteRequest>,
) -> AppResult<ApiResponse<FavoriteResponse>> {
    let favorite = state
        .favorite_service
        .add(&user.id, &req.house_id, &req.notes)
        .await?;
    Ok(ApiResponse::ok(favorite.into()))
}

/// Remove a favorite (owner only).
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.favorite_service.remove(&user.id, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// The acting user's favorites.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FavoriteResponse>>> {
    let favorites = state.favorite_service.list_by_user(&user.id).await?;
    Ok(ApiResponse::ok(
        favorites.into_iter().map(Into::into).collect(),
    ))
}

/// Whether a house is favorited by the acting user.
async fn status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(house_id): Path<String>,
) -> AppResult<ApiResponse<FavoriteStateResponse>> {
    let favorited = state
        .favorite_service
        .is_favorite(&user.id, &house_id)
        .await?;
    Ok(ApiResponse::ok(FavoriteStateResponse { favorited }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/", post(create).get(list))
        .route("/{id}", delete(remove))
        .route("/status/{house_id}", get(status))
}
