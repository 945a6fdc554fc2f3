use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::Session,
    error::AppResult,
    middleware::request_id::RequestId,
    models::{GenerateRequest, GenerateResponse, ManualRecommendationRequest, Recommendation},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CategoryFilter {
    category: Option<String>,
}

/// Handler for the generation endpoint
///
/// Runs the whole pipeline for one category of a listing the caller owns.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    session: Session,
    Json(request): Json<GenerateRequest>,
) -> AppResult<Json<GenerateResponse>> {
    tracing::info!(
        request_id = %request_id,
        listing_id = %request.listing_id,
        category = %request.category,
        "Processing recommendation generation request"
    );

    state
        .listings
        .ensure_owner(&session, request.listing_id)
        .await?;

    let recommendations = state
        .pipeline
        .generate(request.listing_id, &request.address, &request.category)
        .await?;

    state
        .listings
        .invalidate_guest_page(request.listing_id)
        .await;

    tracing::info!(
        request_id = %request_id,
        count = recommendations.len(),
        "Recommendation generation completed"
    );

    Ok(Json(GenerateResponse {
        success: true,
        count: recommendations.len(),
        recommendations,
    }))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(listing_id): Path<Uuid>,
    Query(filter): Query<CategoryFilter>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let category = filter.category.filter(|c| !c.trim().is_empty());
    let recommendations = state
        .listings
        .list_recommendations(&session, listing_id, category)
        .await?;
    Ok(Json(recommendations))
}

pub async fn add_manual(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(listing_id): Path<Uuid>,
    Json(request): Json<ManualRecommendationRequest>,
) -> AppResult<(StatusCode, Json<Recommendation>)> {
    let recommendation = state
        .listings
        .add_recommendation(&session, listing_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(recommendation)))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path((listing_id, recommendation_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    state
        .listings
        .delete_recommendation(&session, listing_id, recommendation_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
