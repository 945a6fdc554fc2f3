mod listing;
mod photo;
mod places;
mod recommendation;

pub use listing::{GuestListing, Listing, ListingInput};
pub use photo::{
    reorder_positions, CheckInPhoto, MovePhotoRequest, NewPhotoRequest, UpdatePhotoRequest,
    MAX_CHECK_IN_PHOTOS,
};
pub use places::*;
pub use recommendation::{
    Category, GenerateRequest, GenerateResponse, Location, ManualRecommendationRequest,
    NewRecommendation, Recommendation, RecommendationRow,
};
