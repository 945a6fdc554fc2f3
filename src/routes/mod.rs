use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    auth::AuthVerifier,
    db::{Cache, ListingStore, PhotoStore, RecommendationStore},
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{providers::PlaceSearch, GuestPageService, ListingService, RecommendationPipeline},
};

pub mod guest;
pub mod listings;
pub mod photos;
pub mod places;
pub mod recommendations;

/// Shared application state
pub struct AppState {
    pub listings: ListingService,
    pub guest_pages: GuestPageService,
    pub pipeline: RecommendationPipeline,
    pub place_search: Arc<dyn PlaceSearch>,
    pub auth: Arc<dyn AuthVerifier>,
}

impl AppState {
    /// Wires the services around one set of stores and one cache
    ///
    /// The pipeline is built by the caller because it owns the provider choice
    /// and the regeneration policy.
    pub fn new(
        listing_store: Arc<dyn ListingStore>,
        photo_store: Arc<dyn PhotoStore>,
        recommendation_store: Arc<dyn RecommendationStore>,
        cache: Cache,
        pipeline: RecommendationPipeline,
        place_search: Arc<dyn PlaceSearch>,
        auth: Arc<dyn AuthVerifier>,
    ) -> Self {
        Self {
            listings: ListingService::new(
                listing_store.clone(),
                photo_store.clone(),
                recommendation_store.clone(),
                cache.clone(),
            ),
            guest_pages: GuestPageService::new(
                listing_store,
                photo_store,
                recommendation_store,
                cache,
            ),
            pipeline,
            place_search,
            auth,
        }
    }
}

/// Creates the application router with all routes
///
/// The request id is assigned before the trace span opens so every log line of
/// a request carries it.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommendations/generate", post(recommendations::generate))
        .route(
            "/listings",
            get(listings::list_mine).post(listings::create),
        )
        .route(
            "/listings/:id",
            get(listings::get_one)
                .put(listings::update)
                .delete(listings::remove),
        )
        .route("/listings/:id/photos", get(photos::list).post(photos::add))
        .route("/listings/:id/photos/move", post(photos::move_photo))
        .route(
            "/listings/:id/photos/:photo_id",
            patch(photos::update_caption).delete(photos::remove),
        )
        .route(
            "/listings/:id/recommendations",
            get(recommendations::list).post(recommendations::add_manual),
        )
        .route(
            "/listings/:id/recommendations/:rec_id",
            delete(recommendations::remove),
        )
        .route("/guest/:id", get(guest::page))
        .route("/places/autocomplete", get(places::autocomplete))
        .route("/places/:place_id", get(places::select))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
