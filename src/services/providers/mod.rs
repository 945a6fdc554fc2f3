//! Third-party map, places and text-generation providers
//!
//! The pipeline and the autocomplete endpoints only see these traits, so any
//! mapping vendor can stand in for Google and any chat-completions compatible
//! service for OpenAI.

use crate::{
    error::AppResult,
    models::{
        AutocompleteSuggestion, Location, NearbyQuery, PlaceCandidate, PlaceDetails,
        SelectedPlace,
    },
};

pub mod google_maps;
pub mod openai;

pub use google_maps::GoogleMapsProvider;
pub use openai::OpenAiGenerator;

/// Resolves a postal address to coordinates
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns `None` when the provider has no result for the address
    async fn geocode(&self, address: &str) -> AppResult<Option<Location>>;
}

/// Nearby search and per-place details
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Candidates around `query.location`, in provider order
    async fn nearby(&self, query: &NearbyQuery) -> AppResult<Vec<PlaceCandidate>>;

    async fn details(&self, place_id: &str) -> AppResult<PlaceDetails>;
}

/// Address autocomplete used by the listing form
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(&self, text: &str) -> AppResult<Vec<AutocompleteSuggestion>>;

    async fn select(&self, place_id: &str) -> AppResult<SelectedPlace>;
}

/// Free-form text generation
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
