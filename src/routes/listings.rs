use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::Session,
    error::AppResult,
    middleware::request_id::RequestId,
    models::{Listing, ListingInput},
    routes::AppState,
};

/// Lists the caller's listings, newest first
pub async fn list_mine(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> AppResult<Json<Vec<Listing>>> {
    let listings = state.listings.list_my_listings(&session).await?;
    Ok(Json(listings))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Json(input): Json<ListingInput>,
) -> AppResult<(StatusCode, Json<Listing>)> {
    tracing::info!(request_id = %request_id, user_id = %session.user_id, "Creating listing");

    let listing = state.listings.create_listing(&session, input).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Listing>> {
    let listing = state.listings.get_listing(&session, id).await?;
    Ok(Json(listing))
}

/// Replaces every editable field of the listing
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(input): Json<ListingInput>,
) -> AppResult<Json<Listing>> {
    tracing::info!(request_id = %request_id, listing_id = %id, "Updating listing");

    let listing = state.listings.update_listing(&session, id, input).await?;
    Ok(Json(listing))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    tracing::info!(request_id = %request_id, listing_id = %id, "Deleting listing");

    state.listings.delete_listing(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
