use std::sync::Arc;

use uuid::Uuid;

use crate::{
    config::RegenerationPolicy,
    db::RecommendationStore,
    error::{AppError, AppResult},
    models::{Location, NearbyQuery, NewRecommendation, PlaceCandidate, PlaceDetails, Recommendation},
    services::providers::{Geocoder, PlacesProvider, TextGenerator},
};

/// Upper bound on recommendations produced per category
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Search parameters for one recommendation category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryConfig {
    /// Place type tag understood by the places provider
    pub place_type: &'static str,
    pub radius_meters: u32,
    pub min_rating: f64,
    /// Human-readable description used in the generation prompt
    pub description: &'static str,
}

const FALLBACK_CONFIG: CategoryConfig = CategoryConfig {
    place_type: "point_of_interest",
    radius_meters: 3200,
    min_rating: 4.0,
    description: "local point of interest",
};

/// Maps a category name to its search parameters
///
/// Names outside the fixed category set get a generic point-of-interest search.
pub fn category_config(category: &str) -> CategoryConfig {
    match category.trim() {
        "Places to Eat" => CategoryConfig {
            place_type: "restaurant",
            radius_meters: 3200,
            min_rating: 4.0,
            description: "restaurant",
        },
        "Coffee Shops" => CategoryConfig {
            place_type: "cafe",
            radius_meters: 3200,
            min_rating: 4.0,
            description: "coffee shop",
        },
        "Bars & Wineries" => CategoryConfig {
            place_type: "bar",
            radius_meters: 4800,
            min_rating: 4.0,
            description: "bar or winery",
        },
        "Places to See" => CategoryConfig {
            place_type: "tourist_attraction",
            radius_meters: 8000,
            min_rating: 4.0,
            description: "sight worth seeing",
        },
        "Nearest Shopping" => CategoryConfig {
            place_type: "shopping_mall",
            radius_meters: 8000,
            min_rating: 3.5,
            description: "shopping destination",
        },
        "Things to Do" => CategoryConfig {
            place_type: "park",
            radius_meters: 8000,
            min_rating: 4.0,
            description: "place to spend an afternoon",
        },
        _ => FALLBACK_CONFIG,
    }
}

/// Keeps candidates rated at least `min_rating`, best first, at most five
///
/// Unrated candidates are dropped. The sort is stable, so equal ratings keep
/// the provider's order.
pub fn rank_candidates(candidates: Vec<PlaceCandidate>, min_rating: f64) -> Vec<PlaceCandidate> {
    let mut ranked: Vec<PlaceCandidate> = candidates
        .into_iter()
        .filter(|c| c.rating.is_some_and(|rating| rating >= min_rating))
        .collect();

    ranked.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(MAX_RECOMMENDATIONS);
    ranked
}

/// Builds the description prompt for one place
///
/// Depends only on its arguments, so the same place always yields the same prompt.
pub fn build_prompt(name: &str, category_description: &str, address: &str, rating: Option<f64>) -> String {
    let rating_sentence = rating
        .map(|r| format!(" It has a rating of {:.1} out of 5.", r))
        .unwrap_or_default();

    format!(
        "Write a brief, engaging description (2-3 sentences) of {}, a {} located at {}.{} \
         Focus on what makes it worth a visit for guests staying nearby. \
         Do not repeat the address.",
        name, category_description, address, rating_sentence
    )
}

/// A candidate with every field a recommendation row requires
#[derive(Debug, Clone, PartialEq)]
struct EnrichedPlace {
    place_id: String,
    name: String,
    address: String,
    rating: Option<f64>,
    photo_url: Option<String>,
    location: Location,
}

impl EnrichedPlace {
    fn from_details(candidate: &PlaceCandidate, details: PlaceDetails) -> AppResult<Self> {
        let missing = |field: &str| {
            AppError::Enrichment(format!(
                "Place {} is missing its {}",
                candidate.place_id, field
            ))
        };

        Ok(Self {
            name: details.name.ok_or_else(|| missing("name"))?,
            address: details
                .formatted_address
                .ok_or_else(|| missing("formatted address"))?,
            location: details.location.ok_or_else(|| missing("geometry"))?,
            // Keep the rating that passed the category filter; cached details may lag
            rating: candidate.rating,
            photo_url: details.photo_url,
            place_id: details.place_id,
        })
    }
}

/// Address → geocode → nearby search → details → descriptions → batch insert
///
/// Stateless apart from its collaborators; one instance serves every request.
#[derive(Clone)]
pub struct RecommendationPipeline {
    geocoder: Arc<dyn Geocoder>,
    places: Arc<dyn PlacesProvider>,
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn RecommendationStore>,
    policy: RegenerationPolicy,
}

impl RecommendationPipeline {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        places: Arc<dyn PlacesProvider>,
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn RecommendationStore>,
        policy: RegenerationPolicy,
    ) -> Self {
        Self {
            geocoder,
            places,
            generator,
            store,
            policy,
        }
    }

    /// Generates and persists up to five recommendations for one category
    ///
    /// Either every produced row is saved or none is. Failures before
    /// enrichment leave the store untouched.
    pub async fn generate(
        &self,
        listing_id: Uuid,
        address: &str,
        category: &str,
    ) -> AppResult<Vec<Recommendation>> {
        let address = address.trim();
        if address.is_empty() {
            return Err(AppError::InvalidInput("Address cannot be empty".to_string()));
        }

        let category = category.trim();
        if category.is_empty() {
            return Err(AppError::InvalidInput("Category cannot be empty".to_string()));
        }

        let config = category_config(category);

        tracing::info!(
            listing_id = %listing_id,
            category = %category,
            place_type = config.place_type,
            radius = config.radius_meters,
            "Starting recommendation generation"
        );

        let location = self
            .geocoder
            .geocode(address)
            .await?
            .ok_or_else(|| AppError::Geocode(address.to_string()))?;

        let candidates = self
            .places
            .nearby(&NearbyQuery {
                location,
                radius_meters: config.radius_meters,
                place_type: config.place_type.to_string(),
                min_rating: config.min_rating,
            })
            .await?;

        if candidates.is_empty() {
            return Err(AppError::NoResults(category.to_string()));
        }

        let found = candidates.len();
        let ranked = rank_candidates(candidates, config.min_rating);

        tracing::info!(
            found = found,
            kept = ranked.len(),
            min_rating = config.min_rating,
            "Candidates ranked"
        );

        if ranked.is_empty() {
            return Err(AppError::NoResults(category.to_string()));
        }

        let places = self.enrich(&ranked).await?;
        let descriptions = self.describe(&places, &config).await?;

        let rows: Vec<NewRecommendation> = places
            .into_iter()
            .zip(descriptions)
            .map(|(place, description)| NewRecommendation {
                listing_id,
                category: category.to_string(),
                name: place.name,
                description,
                address: place.address,
                photo: place.photo_url,
                location: place.location,
                rating: place.rating,
                place_id: Some(place.place_id),
                is_generated: true,
            })
            .collect();

        let saved = match self.policy {
            RegenerationPolicy::Append => self.store.insert_recommendations(rows).await,
            RegenerationPolicy::Replace => {
                self.store
                    .replace_generated_recommendations(listing_id, category.to_string(), rows)
                    .await
            }
        }
        .map_err(|e| {
            tracing::error!(error = %e, listing_id = %listing_id, "Failed to save recommendations");
            AppError::Persistence(e.to_string())
        })?;

        tracing::info!(
            listing_id = %listing_id,
            category = %category,
            saved = saved.len(),
            policy = ?self.policy,
            "Recommendations generated"
        );

        Ok(saved)
    }

    /// Fetches details for every candidate concurrently
    ///
    /// Results come back in candidate order. One failure fails the batch.
    async fn enrich(&self, candidates: &[PlaceCandidate]) -> AppResult<Vec<EnrichedPlace>> {
        let mut tasks = Vec::new();

        for candidate in candidates {
            let places = self.places.clone();
            let place_id = candidate.place_id.clone();
            let task = tokio::spawn(async move { places.details(&place_id).await });
            tasks.push(task);
        }

        let mut enriched = Vec::with_capacity(candidates.len());

        for (candidate, task) in candidates.iter().zip(tasks) {
            let details = match task.await {
                Ok(Ok(details)) => details,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, place_id = %candidate.place_id, "Detail fetch failed");
                    return Err(AppError::Enrichment(format!(
                        "Could not load details for {}: {}",
                        candidate.name, e
                    )));
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task join error");
                    return Err(AppError::Enrichment(e.to_string()));
                }
            };

            enriched.push(EnrichedPlace::from_details(candidate, details)?);
        }

        Ok(enriched)
    }

    /// Generates one description per place concurrently, in place order
    async fn describe(
        &self,
        places: &[EnrichedPlace],
        config: &CategoryConfig,
    ) -> AppResult<Vec<String>> {
        let mut tasks = Vec::new();

        for place in places {
            let generator = self.generator.clone();
            let prompt = build_prompt(&place.name, config.description, &place.address, place.rating);
            let task = tokio::spawn(async move { generator.generate(&prompt).await });
            tasks.push(task);
        }

        let mut descriptions = Vec::with_capacity(places.len());

        for (place, task) in places.iter().zip(tasks) {
            match task.await {
                Ok(Ok(text)) => {
                    let text = text.trim();
                    if text.is_empty() {
                        tracing::error!(
                            place = %place.name,
                            provider = self.generator.name(),
                            "Description generation returned no text"
                        );
                        return Err(AppError::Enrichment(format!(
                            "Empty description for {}",
                            place.name
                        )));
                    }
                    descriptions.push(text.to_string());
                }
                Ok(Err(e)) => {
                    tracing::error!(
                        error = %e,
                        place = %place.name,
                        provider = self.generator.name(),
                        "Description generation failed"
                    );
                    return Err(AppError::Enrichment(format!(
                        "Could not describe {}: {}",
                        place.name, e
                    )));
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task join error");
                    return Err(AppError::Enrichment(e.to_string()));
                }
            }
        }

        Ok(descriptions)
    }
}
