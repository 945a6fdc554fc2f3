use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{error::AppResult, routes::AppState, services::GuestPage};

/// Public welcome page; no session required
pub async fn page(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<Uuid>,
) -> AppResult<Json<GuestPage>> {
    let page = state.guest_pages.load(listing_id).await?;
    Ok(Json(page))
}
