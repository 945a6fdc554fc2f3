use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::Session,
    error::AppResult,
    models::{CheckInPhoto, MovePhotoRequest, NewPhotoRequest, UpdatePhotoRequest},
    routes::AppState,
};

/// Photos in guest-facing order
pub async fn list(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(listing_id): Path<Uuid>,
) -> AppResult<Json<Vec<CheckInPhoto>>> {
    let photos = state.listings.list_photos(&session, listing_id).await?;
    Ok(Json(photos))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(listing_id): Path<Uuid>,
    Json(request): Json<NewPhotoRequest>,
) -> AppResult<(StatusCode, Json<CheckInPhoto>)> {
    let photo = state.listings.add_photo(&session, listing_id, request).await?;
    Ok((StatusCode::CREATED, Json(photo)))
}

pub async fn update_caption(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path((listing_id, photo_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdatePhotoRequest>,
) -> AppResult<Json<CheckInPhoto>> {
    let photo = state
        .listings
        .update_photo(&session, listing_id, photo_id, request)
        .await?;
    Ok(Json(photo))
}

/// Moves one photo and returns the whole reordered sequence
pub async fn move_photo(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(listing_id): Path<Uuid>,
    Json(request): Json<MovePhotoRequest>,
) -> AppResult<Json<Vec<CheckInPhoto>>> {
    let photos = state.listings.move_photo(&session, listing_id, request).await?;
    Ok(Json(photos))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path((listing_id, photo_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    state
        .listings
        .delete_photo(&session, listing_id, photo_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
