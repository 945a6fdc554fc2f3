pub mod guest_page;
pub mod listings;
pub mod place_search;
pub mod providers;
pub mod recommendations;

pub use guest_page::{GuestPage, GuestPageService};
pub use listings::ListingService;
pub use recommendations::RecommendationPipeline;
