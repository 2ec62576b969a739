//! House listing endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use renthub_common::AppResult;
use renthub_core::{CreateHouseInput, UpdateHouseInput};
use renthub_db::entities::house;
use renthub_db::repositories::HouseQuery;
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// House response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub address: String,
    pub area: f64,
    pub floor: i32,
    pub total_floor: i32,
    pub rooms: i32,
    pub halls: i32,
    pub bathrooms: i32,
    pub rent_price: f64,
    pub deposit: f64,
    pub payment_type: house::PaymentType,
    pub house_type: house::HouseType,
    pub orientation: String,
    pub decoration: house::Decoration,
    pub facilities: serde_json::Value,
    pub images: serde_json::Value,
    pub latitude: f64,
    pub longitude: f64,
    pub is_elevator: bool,
    pub status: house::HouseStatus,
    pub view_count: i32,
    pub landlord_id: String,
    pub created_at: String,
}

impl From<house::Model> for HouseResponse {
    fn from(house: house::Model) -> Self {
        Self {
            id: house.id,
            title: house.title,
            description: house.description,
            address: house.address,
            area: house.area,
            floor: house.floor,
            total_floor: house.total_floor,
            rooms: house.rooms,
            halls: house.halls,
            bathrooms: house.bathrooms,
            rent_price: house.rent_price,
            deposit: house.deposit,
            payment_type: house.payment_type,
            house_type: house.house_type,
            orientation: house.orientation,
            decoration: house.decoration,
            facilities: house.facilities,
            images: house.images,
            latitude: house.latitude,
            longitude: house.longitude,
            is_elevator: house.is_elevator,
            status: house.status,
            view_count: house.view_count,
            landlord_id: house.landlord_id,
            created_at: house.created_at.to_rfc3339(),
        }
    }
}

/// Publish a listing.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateHouseInput>,
) -> AppResult<ApiResponse<HouseResponse>> {
    let house = state.house_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(house.into()))
}

/// Fetch one listing. Each fetch bumps the view counter before the
/// read-through lookup.
async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<HouseResponse>> {
    state.house_service.increment_view_count(&id).await?;
    let house = state.house_service.get_by_id(&id).await?;
    Ok(ApiResponse::ok(house.into()))
}

/// Browse listings by filter set.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<HouseQuery>,
) -> AppResult<ApiResponse<Vec<HouseResponse>>> {
    let houses = state.house_service.list(&query).await?;
    Ok(ApiResponse::ok(
        houses.into_iter().map(HouseResponse::from).collect(),
    ))
}

/// Edit a listing (owning landlord only).
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateHouseInput>,
) -> AppResult<ApiResponse<HouseResponse>> {
    let house = state.house_service.update(&user.id, &id, input).await?;
    Ok(ApiResponse::ok(house.into()))
}

/// Delete a listing (owning landlord only).
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.house_service.delete(&user.id, &id).await?;
    Ok(ApiResponse::ok(()))
}

/// Appointments booked against a listing (owning landlord only).
async fn house_viewings(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<super::viewings::ViewingResponse>>> {
    let viewings = state.viewing_service.list_by_house(&user.id, &id).await?;
    Ok(ApiResponse::ok(
        viewings.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/{id}", get(get_one).put(update).delete(remove))
        .route("/{id}/viewings", get(house_viewings))
}
