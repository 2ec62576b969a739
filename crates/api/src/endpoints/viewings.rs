//! Viewing appointment endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use renthub_common::AppResult;
use renthub_core::CreateViewingInput;
use renthub_db::entities::viewing::{self, ViewingStatus};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Viewing response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewingResponse {
    pub id: String,
    pub house_id: String,
    pub user_id: String,
    pub viewing_time: String,
    pub status: ViewingStatus,
    pub remark: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub confirm_time: Option<String>,
    pub cancel_time: Option<String>,
    pub cancel_reason: Option<String>,
    pub created_at: String,
}

impl From<viewing::Model> for ViewingResponse {
    fn from(viewing: viewing::Model) -> Self {
        Self {
            id: viewing.id,
            house_id: viewing.house_id,
            user_id: viewing.user_id,
            viewing_time: viewing.viewing_time.to_rfc3339(),
            status: viewing.status,
            remark: viewing.remark,
            contact_name: viewing.contact_name,
            contact_phone: viewing.contact_phone,
            confirm_time: viewing.confirm_time.map(|t| t.to_rfc3339()),
            cancel_time: viewing.cancel_time.map(|t| t.to_rfc3339()),
            cancel_reason: viewing.cancel_reason,
            created_at: viewing.created_at.to_rfc3339(),
        }
    }
}

/// Cancel request.
#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

/// Book a viewing.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateViewingInput>,
) -> AppResult<ApiResponse<ViewingResponse>> {
    let viewing = state.viewing_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(viewing.into()))
}

/// The acting user's appointments.
async fn list_mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ViewingResponse>>> {
    let viewings = state.viewing_service.list_by_user(&user.id).await?;
    Ok(ApiResponse::ok(
        viewings.into_iter().map(Into::into).collect(),
    ))
}

/// One appointment; visible to its requester and the landlord.
async fn get_one(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ViewingResponse>> {
    let viewing = state.viewing_service.get(&user.id, &id).await?;
    Ok(ApiResponse::ok(viewing.into()))
}

/// Confirm (owning landlord only).
async fn confirm(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.viewing_service.confirm(&user.id, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// Complete (owning landlord only, from Confirmed).
async fn complete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.viewing_service.complete(&user.id, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// Cancel (requester or owning landlord). Body is optional; a missing reason
/// gets the default.
async fn cancel(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<CancelRequest>>,
) -> AppResult<ApiResponse<()>> {
    let reason = body.and_then(|Json(req)| req.reason);
    state.viewing_service.cancel(&user.id, &id, reason).await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list_mine))
        .route("/{id}", get(get_one))
        .route("/{id}/confirm", post(confirm))
        .route("/{id}/complete", post(complete))
        .route("/{id}/cancel", post(cancel))
}
