use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    auth::Session,
    error::AppResult,
    models::{AutocompleteSuggestion, SelectedPlace},
    routes::AppState,
    services::place_search,
};

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    q: String,
}

/// Handler for address autocomplete
pub async fn autocomplete(
    State(state): State<Arc<AppState>>,
    _session: Session,
    Query(params): Query<AutocompleteQuery>,
) -> AppResult<Json<Vec<AutocompleteSuggestion>>> {
    let suggestions = place_search::autocomplete(state.place_search.clone(), &params.q).await?;
    Ok(Json(suggestions))
}

pub async fn select(
    State(state): State<Arc<AppState>>,
    _session: Session,
    Path(place_id): Path<String>,
) -> AppResult<Json<SelectedPlace>> {
    let place = place_search::select_place(state.place_search.clone(), &place_id).await?;
    Ok(Json(place))
}
