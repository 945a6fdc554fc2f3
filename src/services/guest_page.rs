//! Public guest page assembly
//!
//! Guests read far more often than hosts write, so the assembled page is kept
//! in the cache under `guest:{listing_id}`. Host mutations delete that key
//! after their write commits and the next guest read rebuilds it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    cached,
    db::{Cache, CacheKey, ListingStore, PhotoStore, RecommendationStore},
    error::{AppError, AppResult},
    models::{Category, CheckInPhoto, GuestListing, Recommendation},
};

/// Upper bound on staleness if an invalidation is lost
const GUEST_PAGE_TTL: u64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationGroup {
    pub category: String,
    pub recommendations: Vec<Recommendation>,
}

/// Everything the public welcome page renders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuestPage {
    pub listing: GuestListing,
    pub photos: Vec<CheckInPhoto>,
    pub recommendation_groups: Vec<RecommendationGroup>,
}

#[derive(Clone)]
pub struct GuestPageService {
    listings: Arc<dyn ListingStore>,
    photos: Arc<dyn PhotoStore>,
    recommendations: Arc<dyn RecommendationStore>,
    cache: Cache,
}

impl GuestPageService {
    pub fn new(
        listings: Arc<dyn ListingStore>,
        photos: Arc<dyn PhotoStore>,
        recommendations: Arc<dyn RecommendationStore>,
        cache: Cache,
    ) -> Self {
        Self {
            listings,
            photos,
            recommendations,
            cache,
        }
    }

    pub async fn load(&self, listing_id: Uuid) -> AppResult<GuestPage> {
        cached!(
            self.cache,
            CacheKey::GuestPage(listing_id),
            GUEST_PAGE_TTL,
            self.assemble(listing_id)
        )
    }

    async fn assemble(&self, listing_id: Uuid) -> AppResult<GuestPage> {
        let listing = self
            .listings
            .get_listing(listing_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", listing_id)))?;

        let (photos, recommendations) = tokio::try_join!(
            self.photos.list_photos(listing_id),
            self.recommendations.list_recommendations(listing_id, None),
        )?;

        tracing::debug!(
            listing_id = %listing_id,
            photos = photos.len(),
            recommendations = recommendations.len(),
            "Guest page assembled"
        );

        Ok(GuestPage {
            listing: listing.into(),
            photos,
            recommendation_groups: group_by_category(recommendations),
        })
    }
}

/// Groups recommendations in the fixed category order
///
/// Categories outside [`Category::ALL`] follow the known ones, sorted by
/// name. Empty categories are omitted and rows keep their stored order.
pub fn group_by_category(recommendations: Vec<Recommendation>) -> Vec<RecommendationGroup> {
    let mut by_category: BTreeMap<String, Vec<Recommendation>> = BTreeMap::new();
    for recommendation in recommendations {
        by_category
            .entry(recommendation.category.clone())
            .or_default()
            .push(recommendation);
    }

    let mut groups = Vec::with_capacity(by_category.len());
    for category in Category::ALL {
        if let Some(recommendations) = by_category.remove(category.as_str()) {
            groups.push(RecommendationGroup {
                category: category.as_str().to_string(),
                recommendations,
            });
        }
    }

    groups.extend(
        by_category
            .into_iter()
            .map(|(category, recommendations)| RecommendationGroup {
                category,
                recommendations,
            }),
    );

    groups
}
