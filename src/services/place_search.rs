use crate::{
    error::{AppError, AppResult},
    models::{AutocompleteSuggestion, SelectedPlace},
    services::providers::PlaceSearch,
};
use std::sync::Arc;

/// Autocomplete suggestions for a partially typed address
///
/// Delegates to the configured PlaceSearch provider after rejecting blank input,
/// so providers never see an empty query.
pub async fn autocomplete(
    provider: Arc<dyn PlaceSearch>,
    text: &str,
) -> AppResult<Vec<AutocompleteSuggestion>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::InvalidInput("Search text cannot be empty".to_string()));
    }

    provider.search(text).await
}

/// Resolves a chosen suggestion to its address and coordinates
pub async fn select_place(provider: Arc<dyn PlaceSearch>, place_id: &str) -> AppResult<SelectedPlace> {
    let place_id = place_id.trim();
    if place_id.is_empty() {
        return Err(AppError::InvalidInput("Place id cannot be empty".to_string()));
    }

    provider.select(place_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockPlaceSearch;

    #[tokio::test]
    async fn test_autocomplete_trims_and_delegates() {
        let mut provider = MockPlaceSearch::new();
        provider
            .expect_search()
            .withf(|text| text.to_string() == "1 Infinite")
            .times(1)
            .returning(|_| {
                Ok(vec![AutocompleteSuggestion {
                    place_id: "abc".to_string(),
                    description: "1 Infinite Loop, Cupertino, CA".to_string(),
                }])
            });

        let results = autocomplete(Arc::new(provider), "  1 Infinite ").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].place_id, "abc");
    }

    #[tokio::test]
    async fn test_autocomplete_empty_query_never_reaches_provider() {
        let mut provider = MockPlaceSearch::new();
        provider.expect_search().times(0);

        let err = autocomplete(Arc::new(provider), "   ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_select_place_returns_coordinates() {
        let mut provider = MockPlaceSearch::new();
        provider.expect_select().returning(|id| {
            Ok(SelectedPlace {
                formatted_address: "1 Infinite Loop, Cupertino, CA 95014".to_string(),
                lat: 37.3318,
                lng: -122.0312,
                place_id: id.to_string(),
            })
        });

        let place = select_place(Arc::new(provider), "abc").await.unwrap();
        assert_eq!(place.place_id, "abc");
        assert!((place.lat - 37.3318).abs() < f64::EPSILON);
    }
}
