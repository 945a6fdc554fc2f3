use std::sync::Arc;

use uuid::Uuid;

use crate::{
    auth::Session,
    db::{Cache, CacheKey, ListingStore, PhotoStore, RecommendationStore},
    error::{AppError, AppResult},
    models::{
        CheckInPhoto, Listing, ListingInput, ManualRecommendationRequest,
        MovePhotoRequest, NewPhotoRequest, NewRecommendation, Recommendation, UpdatePhotoRequest,
    },
};

/// Owner-scoped CRUD over listings, check-in photos and recommendations
///
/// Every write follows the same protocol: check ownership, mutate the store,
/// then invalidate the listing's guest page so the next guest read refetches.
#[derive(Clone)]
pub struct ListingService {
    listings: Arc<dyn ListingStore>,
    photos: Arc<dyn PhotoStore>,
    recommendations: Arc<dyn RecommendationStore>,
    cache: Cache,
}

impl ListingService {
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

    /// Loads a listing and checks that the caller owns it
    pub async fn ensure_owner(&self, session: &Session, listing_id: Uuid) -> AppResult<Listing> {
        let listing = self
            .listings
            .get_listing(listing_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", listing_id)))?;

        if listing.owner_id != session.user_id {
            tracing::warn!(
                listing_id = %listing_id,
                user_id = %session.user_id,
                "Rejected access to listing owned by another user"
            );
            return Err(AppError::Forbidden(
                "You do not own this listing".to_string(),
            ));
        }

        Ok(listing)
    }

    /// Drops the cached guest page of a listing
    pub async fn invalidate_guest_page(&self, listing_id: Uuid) {
        self.cache.invalidate(&CacheKey::GuestPage(listing_id)).await;
    }

    // Listings

    pub async fn create_listing(&self, session: &Session, input: ListingInput) -> AppResult<Listing> {
        let listing = Listing::new(session.user_id, input.normalize()?);
        let saved = self.listings.insert_listing(listing).await?;

        tracing::info!(listing_id = %saved.id, user_id = %session.user_id, "Listing created");
        Ok(saved)
    }

    pub async fn get_listing(&self, session: &Session, listing_id: Uuid) -> AppResult<Listing> {
        self.ensure_owner(session, listing_id).await
    }

    pub async fn list_my_listings(&self, session: &Session) -> AppResult<Vec<Listing>> {
        self.listings.list_listings_by_owner(session.user_id).await
    }

    pub async fn update_listing(
        &self,
        session: &Session,
        listing_id: Uuid,
        input: ListingInput,
    ) -> AppResult<Listing> {
        let input = input.normalize()?;
        let mut listing = self.ensure_owner(session, listing_id).await?;
        listing.apply(input);

        let saved = self.listings.update_listing(listing).await?;
        self.invalidate_guest_page(listing_id).await;

        tracing::info!(listing_id = %listing_id, "Listing updated");
        Ok(saved)
    }

    pub async fn delete_listing(&self, session: &Session, listing_id: Uuid) -> AppResult<()> {
        self.ensure_owner(session, listing_id).await?;

        if !self.listings.delete_listing(listing_id).await? {
            return Err(AppError::NotFound(format!("Listing {} not found", listing_id)));
        }
        self.invalidate_guest_page(listing_id).await;

        tracing::info!(listing_id = %listing_id, "Listing deleted with its photos and recommendations");
        Ok(())
    }

    // Check-in photos

    pub async fn list_photos(&self, session: &Session, listing_id: Uuid) -> AppResult<Vec<CheckInPhoto>> {
        self.ensure_owner(session, listing_id).await?;
        self.photos.list_photos(listing_id).await
    }

    pub async fn add_photo(
        &self,
        session: &Session,
        listing_id: Uuid,
        request: NewPhotoRequest,
    ) -> AppResult<CheckInPhoto> {
        let photo_url = request.photo_url.trim().to_string();
        if photo_url.is_empty() {
            return Err(AppError::InvalidInput("Photo URL cannot be empty".to_string()));
        }

        self.ensure_owner(session, listing_id).await?;
        let photo = self
            .photos
            .insert_photo(listing_id, photo_url, clean_caption(request.caption))
            .await?;
        self.invalidate_guest_page(listing_id).await;

        tracing::info!(
            listing_id = %listing_id,
            photo_id = %photo.id,
            display_order = photo.display_order,
            "Check-in photo added"
        );
        Ok(photo)
    }

    pub async fn update_photo(
        &self,
        session: &Session,
        listing_id: Uuid,
        photo_id: Uuid,
        request: UpdatePhotoRequest,
    ) -> AppResult<CheckInPhoto> {
        self.ensure_owner(session, listing_id).await?;
        let photo = self
            .photos
            .update_photo_caption(listing_id, photo_id, clean_caption(request.caption))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Photo {} not found", photo_id)))?;
        self.invalidate_guest_page(listing_id).await;
        Ok(photo)
    }

    /// Moves one photo and rewrites every photo's order to `0..n`
    pub async fn move_photo(
        &self,
        session: &Session,
        listing_id: Uuid,
        request: MovePhotoRequest,
    ) -> AppResult<Vec<CheckInPhoto>> {
        self.ensure_owner(session, listing_id).await?;

        self.photos
            .move_photo(listing_id, request.from, request.to)
            .await?;
        self.invalidate_guest_page(listing_id).await;

        tracing::debug!(
            listing_id = %listing_id,
            from = request.from,
            to = request.to,
            "Check-in photos reordered"
        );

        self.photos.list_photos(listing_id).await
    }

    pub async fn delete_photo(&self, session: &Session, listing_id: Uuid, photo_id: Uuid) -> AppResult<()> {
        self.ensure_owner(session, listing_id).await?;

        if !self.photos.delete_photo(listing_id, photo_id).await? {
            return Err(AppError::NotFound(format!("Photo {} not found", photo_id)));
        }
        self.invalidate_guest_page(listing_id).await;
        Ok(())
    }

    // Recommendations

    pub async fn list_recommendations(
        &self,
        session: &Session,
        listing_id: Uuid,
        category: Option<String>,
    ) -> AppResult<Vec<Recommendation>> {
        self.ensure_owner(session, listing_id).await?;
        self.recommendations
            .list_recommendations(listing_id, category)
            .await
    }

    /// Saves a place the host picked by hand
    pub async fn add_recommendation(
        &self,
        session: &Session,
        listing_id: Uuid,
        request: ManualRecommendationRequest,
    ) -> AppResult<Recommendation> {
        let name = request.name.trim().to_string();
        let address = request.address.trim().to_string();
        if name.is_empty() || address.is_empty() {
            return Err(AppError::InvalidInput(
                "Recommendation name and address are required".to_string(),
            ));
        }

        self.ensure_owner(session, listing_id).await?;

        let row = NewRecommendation {
            listing_id,
            category: request.category.as_str().to_string(),
            name,
            description: request.description.trim().to_string(),
            address,
            photo: request.photo,
            location: request.location,
            rating: request.rating,
            place_id: request.place_id,
            is_generated: false,
        };

        let saved = self
            .recommendations
            .insert_recommendations(vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Insert returned no rows".to_string()))?;
        self.invalidate_guest_page(listing_id).await;

        Ok(saved)
    }

    pub async fn delete_recommendation(
        &self,
        session: &Session,
        listing_id: Uuid,
        recommendation_id: Uuid,
    ) -> AppResult<()> {
        self.ensure_owner(session, listing_id).await?;

        if !self
            .recommendations
            .delete_recommendation(listing_id, recommendation_id)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "Recommendation {} not found",
                recommendation_id
            )));
        }
        self.invalidate_guest_page(listing_id).await;
        Ok(())
    }
}

fn clean_caption(caption: Option<String>) -> Option<String> {
    caption
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}
