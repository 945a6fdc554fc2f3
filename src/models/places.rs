use serde::{Deserialize, Serialize};

use super::Location;

/// Query sent to a places provider's nearby search
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub location: Location,
    pub radius_meters: u32,
    pub place_type: String,
    pub min_rating: f64,
}

/// A nearby-search hit, before detail enrichment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceCandidate {
    pub place_id: String,
    pub name: String,
    pub rating: Option<f64>,
}

/// Extended details for one place
///
/// Every field the provider may omit is optional here; callers decide which
/// ones they require.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlaceDetails {
    pub place_id: String,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub rating: Option<f64>,
    /// Fetchable URL of the first photo, if any
    pub photo_url: Option<String>,
    pub location: Option<Location>,
}

/// An autocomplete suggestion shown while the host types an address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutocompleteSuggestion {
    pub place_id: String,
    pub description: String,
}

/// The resolved place once the host picks a suggestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectedPlace {
    pub formatted_address: String,
    pub lat: f64,
    pub lng: f64,
    pub place_id: String,
}

// ============================================================================
// Google Maps Platform API Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleLatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<GoogleLatLng> for Location {
    fn from(latlng: GoogleLatLng) -> Self {
        Location {
            lat: latlng.lat,
            lng: latlng.lng,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleGeometry {
    pub location: GoogleLatLng,
}

/// Response from /maps/api/geocode/json
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleGeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GoogleGeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleGeocodeResult {
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub geometry: GoogleGeometry,
}

/// Response from /maps/api/place/nearbysearch/json
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleNearbyResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GooglePlace>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GooglePlace {
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl From<GooglePlace> for PlaceCandidate {
    fn from(place: GooglePlace) -> Self {
        PlaceCandidate {
            place_id: place.place_id,
            name: place.name,
            rating: place.rating,
        }
    }
}

/// Response from /maps/api/place/details/json
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleDetailsResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<GooglePlaceDetails>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GooglePlaceDetails {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub photos: Vec<GooglePhoto>,
    #[serde(default)]
    pub geometry: Option<GoogleGeometry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GooglePhoto {
    pub photo_reference: String,
}

/// Response from /maps/api/place/autocomplete/json
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleAutocompleteResponse {
    pub status: String,
    #[serde(default)]
    pub predictions: Vec<GooglePrediction>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GooglePrediction {
    pub place_id: String,
    pub description: String,
}

impl From<GooglePrediction> for AutocompleteSuggestion {
    fn from(prediction: GooglePrediction) -> Self {
        AutocompleteSuggestion {
            place_id: prediction.place_id,
            description: prediction.description,
        }
    }
}

// ============================================================================
// Chat Completions API Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}
