/// Google Maps Platform provider
///
/// Implements geocoding, nearby search, place details and address autocomplete
/// against the classic JSON web services.
///
/// API Flow:
/// 1. Geocode: /maps/api/geocode/json → coordinates for the listing address
/// 2. Nearby: /maps/api/place/nearbysearch/json → candidate place ids
/// 3. Details: /maps/api/place/details/json → name, address, rating, photos, geometry
///
/// Every response carries a `status`; `ZERO_RESULTS` is an empty answer, any
/// other non-`OK` status is an error.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        AutocompleteSuggestion, GoogleAutocompleteResponse, GoogleDetailsResponse,
        GoogleGeocodeResponse, GoogleNearbyResponse, GooglePlaceDetails, Location, NearbyQuery,
        PlaceCandidate, PlaceDetails, SelectedPlace,
    },
    services::providers::{Geocoder, PlaceSearch, PlacesProvider},
};
use reqwest::{Client as HttpClient, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

const GEOCODE_CACHE_TTL: u64 = 86400; // 1 day
const DETAILS_CACHE_TTL: u64 = 86400; // 1 day
const PHOTO_MAX_WIDTH: &str = "800";
const DETAIL_FIELDS: &str = "place_id,name,formatted_address,rating,photos,geometry";

#[derive(Clone)]
pub struct GoogleMapsProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl GoogleMapsProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    /// Issues a GET against a Maps web service and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "Google Maps request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Google Maps API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Maps a Google `status` field to an error unless it is a usable answer
    fn check_status(endpoint: &str, status: &str, error_message: Option<&str>) -> AppResult<()> {
        match status {
            "OK" | "ZERO_RESULTS" => Ok(()),
            other => Err(AppError::ExternalApi(format!(
                "Google {} returned {}: {}",
                endpoint,
                other,
                error_message.unwrap_or("no details")
            ))),
        }
    }

    /// Public URL of a place photo
    fn photo_url(&self, photo_reference: &str) -> AppResult<String> {
        let url = Url::parse_with_params(
            &format!("{}/maps/api/place/photo", self.api_url),
            &[
                ("maxwidth", PHOTO_MAX_WIDTH),
                ("photo_reference", photo_reference),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| AppError::Internal(format!("Invalid photo URL: {}", e)))?;

        Ok(url.to_string())
    }

    fn convert_details(&self, place_id: &str, details: GooglePlaceDetails) -> AppResult<PlaceDetails> {
        let photo_url = details
            .photos
            .first()
            .map(|photo| self.photo_url(&photo.photo_reference))
            .transpose()?;

        Ok(PlaceDetails {
            place_id: details.place_id.unwrap_or_else(|| place_id.to_string()),
            name: details.name,
            formatted_address: details.formatted_address,
            rating: details.rating,
            photo_url,
            location: details.geometry.map(|g| g.location.into()),
        })
    }

    async fn fetch_geocode(&self, address: &str) -> AppResult<Option<Location>> {
        let response: GoogleGeocodeResponse = self
            .get_json("/maps/api/geocode/json", &[("address", address)])
            .await?;

        Self::check_status("geocode", &response.status, response.error_message.as_deref())?;

        let location = response
            .results
            .into_iter()
            .next()
            .map(|result| Location::from(result.geometry.location));

        tracing::info!(
            address = %address,
            found = location.is_some(),
            provider = "google",
            "Geocode completed"
        );

        Ok(location)
    }

    async fn fetch_details(&self, place_id: &str) -> AppResult<PlaceDetails> {
        let response: GoogleDetailsResponse = self
            .get_json(
                "/maps/api/place/details/json",
                &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
            )
            .await?;

        Self::check_status("place details", &response.status, response.error_message.as_deref())?;

        let details = response.result.ok_or_else(|| {
            AppError::ExternalApi(format!("Google returned no details for place {}", place_id))
        })?;

        self.convert_details(place_id, details)
    }
}

#[async_trait::async_trait]
impl Geocoder for GoogleMapsProvider {
    async fn geocode(&self, address: &str) -> AppResult<Option<Location>> {
        let key = CacheKey::Geocode(address.to_string());

        match self.cache.get_from_cache::<Location>(&key).await {
            Ok(Some(location)) => return Ok(Some(location)),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, key = %key, "Cache lookup failed, treating as miss"),
        }

        let location = self.fetch_geocode(address).await?;

        // Only hits are cached; an unresolved address is asked again next time
        if let Some(location) = &location {
            self.cache.set_in_background(&key, location, GEOCODE_CACHE_TTL);
        }

        Ok(location)
    }
}

#[async_trait::async_trait]
impl PlacesProvider for GoogleMapsProvider {
    async fn nearby(&self, query: &NearbyQuery) -> AppResult<Vec<PlaceCandidate>> {
        let location = format!("{},{}", query.location.lat, query.location.lng);
        let radius = query.radius_meters.to_string();

        // Nearby Search has no rating filter; callers filter on min_rating
        let response: GoogleNearbyResponse = self
            .get_json(
                "/maps/api/place/nearbysearch/json",
                &[
                    ("location", location.as_str()),
                    ("radius", radius.as_str()),
                    ("type", query.place_type.as_str()),
                ],
            )
            .await?;

        Self::check_status("nearby search", &response.status, response.error_message.as_deref())?;

        let candidates: Vec<PlaceCandidate> = response
            .results
            .into_iter()
            .map(PlaceCandidate::from)
            .collect();

        tracing::info!(
            place_type = %query.place_type,
            radius = query.radius_meters,
            results = candidates.len(),
            provider = "google",
            "Nearby search completed"
        );

        Ok(candidates)
    }

    async fn details(&self, place_id: &str) -> AppResult<PlaceDetails> {
        cached!(
            self.cache,
            CacheKey::PlaceDetails(place_id.to_string()),
            DETAILS_CACHE_TTL,
            self.fetch_details(place_id)
        )
    }
}

#[async_trait::async_trait]
impl PlaceSearch for GoogleMapsProvider {
    async fn search(&self, text: &str) -> AppResult<Vec<AutocompleteSuggestion>> {
        if text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search text cannot be empty".to_string(),
            ));
        }

        let response: GoogleAutocompleteResponse = self
            .get_json(
                "/maps/api/place/autocomplete/json",
                &[("input", text), ("types", "address")],
            )
            .await?;

        Self::check_status("autocomplete", &response.status, response.error_message.as_deref())?;

        Ok(response
            .predictions
            .into_iter()
            .map(AutocompleteSuggestion::from)
            .collect())
    }

    async fn select(&self, place_id: &str) -> AppResult<SelectedPlace> {
        let details = self.details(place_id).await?;

        match (details.formatted_address, details.location) {
            (Some(formatted_address), Some(location)) => Ok(SelectedPlace {
                formatted_address,
                lat: location.lat,
                lng: location.lng,
                place_id: details.place_id,
            }),
            _ => Err(AppError::NotFound(format!(
                "Place {} has no address or location",
                place_id
            ))),
        }
    }
}
