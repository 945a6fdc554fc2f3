//! Storage abstractions for listings and their children
//!
//! Ownership is checked by the callers in `services::listings`; the stores
//! only guarantee the structural invariants: cascade on listing delete, at most
//! [`MAX_CHECK_IN_PHOTOS`](crate::models::MAX_CHECK_IN_PHOTOS) photos with a
//! dense `display_order`, and all-or-nothing batch inserts.

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CheckInPhoto, Listing, NewRecommendation, Recommendation},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ListingStore: Send + Sync {
    async fn insert_listing(&self, listing: Listing) -> AppResult<Listing>;

    async fn get_listing(&self, id: Uuid) -> AppResult<Option<Listing>>;

    /// Listings owned by `owner_id`, newest first
    async fn list_listings_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Listing>>;

    /// Persists every editable field of `listing`
    async fn update_listing(&self, listing: Listing) -> AppResult<Listing>;

    /// Deletes the listing with its photos and recommendations
    ///
    /// Returns false when no listing had that id.
    async fn delete_listing(&self, id: Uuid) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PhotoStore: Send + Sync {
    /// Photos of a listing sorted by `display_order`
    async fn list_photos(&self, listing_id: Uuid) -> AppResult<Vec<CheckInPhoto>>;

    /// Appends a photo at the end of the sequence
    ///
    /// Fails with `PhotoLimitReached` once the listing holds the maximum.
    async fn insert_photo(
        &self,
        listing_id: Uuid,
        photo_url: String,
        caption: Option<String>,
    ) -> AppResult<CheckInPhoto>;

    async fn update_photo_caption(
        &self,
        listing_id: Uuid,
        photo_id: Uuid,
        caption: Option<String>,
    ) -> AppResult<Option<CheckInPhoto>>;

    /// Moves the photo at position `from` to position `to` and rewrites the
    /// order to `0..n`. Reading and writing the order happen atomically.
    async fn move_photo(&self, listing_id: Uuid, from: usize, to: usize) -> AppResult<()>;

    /// Deletes a photo and re-packs the remaining order to `0..n`
    async fn delete_photo(&self, listing_id: Uuid, photo_id: Uuid) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Recommendations of a listing, optionally restricted to one category
    async fn list_recommendations(
        &self,
        listing_id: Uuid,
        category: Option<String>,
    ) -> AppResult<Vec<Recommendation>>;

    /// Inserts every row or none of them
    async fn insert_recommendations(
        &self,
        rows: Vec<NewRecommendation>,
    ) -> AppResult<Vec<Recommendation>>;

    /// Deletes earlier generated rows for the listing and category, then
    /// inserts `rows`, all in one transaction. Manual rows are kept.
    async fn replace_generated_recommendations(
        &self,
        listing_id: Uuid,
        category: String,
        rows: Vec<NewRecommendation>,
    ) -> AppResult<Vec<Recommendation>>;

    async fn delete_recommendation(&self, listing_id: Uuid, id: Uuid) -> AppResult<bool>;
}
