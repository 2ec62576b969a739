//! User endpoints.

use axum::{Json, Router, extract::State, routing::{get, post}};
use renthub_common::AppResult;
use renthub_core::{LoginInput, RegisterInput};
use renthub_db::entities::user;
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// User response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub phone: String,
    pub avatar: Option<String>,
    pub last_login: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            phone: user.phone,
            avatar: user.avatar,
            last_login: user.last_login.map(|t| t.to_rfc3339()),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Login response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Register a new account.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.register(input).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Log in and receive an access token.
async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let output = state.user_service.login(input).await?;
    Ok(ApiResponse::ok(LoginResponse {
        token: output.token,
        user: output.user.into(),
    }))
}

/// The acting user's profile.
async fn me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserResponse>> {
    let profile = state.user_service.get_profile(&user.id).await?;
    Ok(ApiResponse::ok(profile.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}
