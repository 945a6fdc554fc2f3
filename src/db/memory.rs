use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::store::{ListingStore, PhotoStore, RecommendationStore},
    error::{AppError, AppResult},
    models::{
        reorder_positions, CheckInPhoto, Listing, NewRecommendation, Recommendation,
        MAX_CHECK_IN_PHOTOS,
    },
};

/// In-process store with the same guarantees as the PostgreSQL one
///
/// Used by tests and for running the API without a database.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    listings: HashMap<Uuid, Listing>,
    photos: HashMap<Uuid, CheckInPhoto>,
    /// Insertion order is the listing order
    recommendations: Vec<Recommendation>,
}

impl MemoryStoreInner {
    fn photos_of(&self, listing_id: Uuid) -> Vec<CheckInPhoto> {
        let mut photos: Vec<CheckInPhoto> = self
            .photos
            .values()
            .filter(|p| p.listing_id == listing_id)
            .cloned()
            .collect();
        photos.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then(a.created_at.cmp(&b.created_at))
        });
        photos
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ListingStore for MemoryStore {
    async fn insert_listing(&self, listing: Listing) -> AppResult<Listing> {
        let mut inner = self.inner.write().await;
        inner.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn get_listing(&self, id: Uuid) -> AppResult<Option<Listing>> {
        let inner = self.inner.read().await;
        Ok(inner.listings.get(&id).cloned())
    }

    async fn list_listings_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Listing>> {
        let inner = self.inner.read().await;
        let mut listings: Vec<Listing> = inner
            .listings
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listings)
    }

    async fn update_listing(&self, listing: Listing) -> AppResult<Listing> {
        let mut inner = self.inner.write().await;
        match inner.listings.get_mut(&listing.id) {
            Some(existing) if existing.owner_id == listing.owner_id => {
                *existing = listing.clone();
                Ok(listing)
            }
            _ => Err(AppError::NotFound(format!("Listing {} not found", listing.id))),
        }
    }

    async fn delete_listing(&self, id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.listings.remove(&id).is_none() {
            return Ok(false);
        }
        inner.photos.retain(|_, p| p.listing_id != id);
        inner.recommendations.retain(|r| r.listing_id != id);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl PhotoStore for MemoryStore {
    async fn list_photos(&self, listing_id: Uuid) -> AppResult<Vec<CheckInPhoto>> {
        let inner = self.inner.read().await;
        Ok(inner.photos_of(listing_id))
    }

    async fn insert_photo(
        &self,
        listing_id: Uuid,
        photo_url: String,
        caption: Option<String>,
    ) -> AppResult<CheckInPhoto> {
        let mut inner = self.inner.write().await;
        if !inner.listings.contains_key(&listing_id) {
            return Err(AppError::NotFound(format!("Listing {} not found", listing_id)));
        }

        let count = inner.photos_of(listing_id).len();
        if count >= MAX_CHECK_IN_PHOTOS {
            return Err(AppError::PhotoLimitReached(MAX_CHECK_IN_PHOTOS));
        }

        let photo = CheckInPhoto {
            id: Uuid::new_v4(),
            listing_id,
            photo_url,
            caption,
            display_order: count as i32,
            created_at: chrono::Utc::now(),
        };
        inner.photos.insert(photo.id, photo.clone());
        Ok(photo)
    }

    async fn update_photo_caption(
        &self,
        listing_id: Uuid,
        photo_id: Uuid,
        caption: Option<String>,
    ) -> AppResult<Option<CheckInPhoto>> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .photos
            .get_mut(&photo_id)
            .filter(|p| p.listing_id == listing_id)
            .map(|photo| {
                photo.caption = caption;
                photo.clone()
            }))
    }

    async fn move_photo(&self, listing_id: Uuid, from: usize, to: usize) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let current: Vec<Uuid> = inner.photos_of(listing_id).iter().map(|p| p.id).collect();

        for (photo_id, display_order) in reorder_positions(&current, from, to)? {
            if let Some(photo) = inner.photos.get_mut(&photo_id) {
                photo.display_order = display_order;
            }
        }
        Ok(())
    }

    async fn delete_photo(&self, listing_id: Uuid, photo_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let belongs = inner
            .photos
            .get(&photo_id)
            .is_some_and(|p| p.listing_id == listing_id);
        if !belongs {
            return Ok(false);
        }

        inner.photos.remove(&photo_id);
        let remaining: Vec<Uuid> = inner.photos_of(listing_id).iter().map(|p| p.id).collect();
        for (position, id) in remaining.into_iter().enumerate() {
            if let Some(photo) = inner.photos.get_mut(&id) {
                photo.display_order = position as i32;
            }
        }
        Ok(true)
    }
}

#[async_trait::async_trait]
impl RecommendationStore for MemoryStore {
    async fn list_recommendations(
        &self,
        listing_id: Uuid,
        category: Option<String>,
    ) -> AppResult<Vec<Recommendation>> {
        let inner = self.inner.read().await;
        Ok(inner
            .recommendations
            .iter()
            .filter(|r| r.listing_id == listing_id)
            .filter(|r| category.as_ref().map_or(true, |c| &r.category == c))
            .cloned()
            .collect())
    }

    async fn insert_recommendations(
        &self,
        rows: Vec<NewRecommendation>,
    ) -> AppResult<Vec<Recommendation>> {
        let mut inner = self.inner.write().await;

        // Validate the whole batch before touching anything
        if let Some(orphan) = rows
            .iter()
            .find(|r| !inner.listings.contains_key(&r.listing_id))
        {
            return Err(AppError::NotFound(format!(
                "Listing {} not found",
                orphan.listing_id
            )));
        }

        let inserted: Vec<Recommendation> = rows
            .into_iter()
            .map(NewRecommendation::into_recommendation)
            .collect();
        inner.recommendations.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn replace_generated_recommendations(
        &self,
        listing_id: Uuid,
        category: String,
        rows: Vec<NewRecommendation>,
    ) -> AppResult<Vec<Recommendation>> {
        let mut inner = self.inner.write().await;
        if !inner.listings.contains_key(&listing_id)
            || rows.iter().any(|r| r.listing_id != listing_id)
        {
            return Err(AppError::NotFound(format!("Listing {} not found", listing_id)));
        }

        inner
            .recommendations
            .retain(|r| !(r.listing_id == listing_id && r.category == category && r.is_generated));

        let inserted: Vec<Recommendation> = rows
            .into_iter()
            .map(NewRecommendation::into_recommendation)
            .collect();
        inner.recommendations.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn delete_recommendation(&self, listing_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.recommendations.len();
        inner
            .recommendations
            .retain(|r| !(r.id == id && r.listing_id == listing_id));
        Ok(inner.recommendations.len() < before)
    }
}
