//! Landlord profile endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use renthub_common::AppResult;
use renthub_core::ApplyLandlordInput;
use renthub_db::entities::landlord;
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Landlord profile response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandlordResponse {
    pub id: String,
    pub user_id: String,
    pub real_name: String,
    pub phone_number: String,
    pub address: String,
    pub verified: bool,
    pub introduction: String,
    pub rating: f64,
    pub created_at: String,
}

impl From<landlord::Model> for LandlordResponse {
    fn from(landlord: landlord::Model) -> Self {
        Self {
            id: landlord.id,
            user_id: landlord.user_id,
            real_name: landlord.real_name,
            phone_number: landlord.phone_number,
            address: landlord.address,
            verified: landlord.verified,
            introduction: landlord.introduction,
            rating: landlord.rating,
            created_at: landlord.created_at.to_rfc3339(),
        }
    }
}

/// Apply for a landlord profile.
async fn apply(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ApplyLandlordInput>,
) -> AppResult<ApiResponse<LandlordResponse>> {
    let landlord = state.landlord_service.apply(&user.id, input).await?;
    Ok(ApiResponse::ok(landlord.into()))
}

/// The acting user's landlord profile.
async fn me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<LandlordResponse>> {
    let landlord = state.landlord_service.get_by_user(&user.id).await?;
    Ok(ApiResponse::ok(landlord.into()))
}

/// The acting user's own listings.
async fn my_houses(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<super::houses::HouseResponse>>> {
    let houses = state.house_service.list_by_landlord(&user.id).await?;
    Ok(ApiResponse::ok(
        houses.into_iter().map(Into::into).collect(),
    ))
}

/// Mark a landlord profile verified.
async fn verify(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.landlord_service.verify(&id).await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/apply", post(apply))
        .route("/me", get(me))
        .route("/me/houses", get(my_houses))
        .route("/{id}/verify", post(verify))
}
