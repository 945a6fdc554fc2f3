use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Recommendation categories offered on the guest page, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Places to Eat")]
    PlacesToEat,
    #[serde(rename = "Coffee Shops")]
    CoffeeShops,
    #[serde(rename = "Bars & Wineries")]
    BarsAndWineries,
    #[serde(rename = "Places to See")]
    PlacesToSee,
    #[serde(rename = "Nearest Shopping")]
    NearestShopping,
    #[serde(rename = "Things to Do")]
    ThingsToDo,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::PlacesToEat,
        Category::CoffeeShops,
        Category::BarsAndWineries,
        Category::PlacesToSee,
        Category::NearestShopping,
        Category::ThingsToDo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::PlacesToEat => "Places to Eat",
            Category::CoffeeShops => "Coffee Shops",
            Category::BarsAndWineries => "Bars & Wineries",
            Category::PlacesToSee => "Places to See",
            Category::NearestShopping => "Nearest Shopping",
            Category::ThingsToDo => "Things to Do",
        }
    }

    /// Looks up a category by its display name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name.trim())
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// A nearby place recommended to guests
///
/// `category` is kept as the string the caller asked for: generation accepts
/// names outside [`Category`] and searches with a generic config for them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub category: String,
    pub name: String,
    pub description: String,
    pub address: String,
    pub photo: Option<String>,
    pub location: Location,
    pub rating: Option<f64>,
    pub place_id: Option<String>,
    pub is_generated: bool,
    pub created_at: DateTime<Utc>,
}

/// Database row shape of a recommendation
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecommendationRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub category: String,
    pub name: String,
    pub description: String,
    pub address: String,
    pub photo: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub rating: Option<f64>,
    pub place_id: Option<String>,
    pub is_generated: bool,
    pub created_at: DateTime<Utc>,
}

impl From<RecommendationRow> for Recommendation {
    fn from(row: RecommendationRow) -> Self {
        Self {
            id: row.id,
            listing_id: row.listing_id,
            category: row.category,
            name: row.name,
            description: row.description,
            address: row.address,
            photo: row.photo,
            location: Location {
                lat: row.lat,
                lng: row.lng,
            },
            rating: row.rating,
            place_id: row.place_id,
            is_generated: row.is_generated,
            created_at: row.created_at,
        }
    }
}

/// A recommendation ready to be inserted; the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecommendation {
    pub listing_id: Uuid,
    pub category: String,
    pub name: String,
    pub description: String,
    pub address: String,
    pub photo: Option<String>,
    pub location: Location,
    pub rating: Option<f64>,
    pub place_id: Option<String>,
    pub is_generated: bool,
}

impl NewRecommendation {
    pub fn into_recommendation(self) -> Recommendation {
        Recommendation {
            id: Uuid::new_v4(),
            listing_id: self.listing_id,
            category: self.category,
            name: self.name,
            description: self.description,
            address: self.address,
            photo: self.photo,
            location: self.location,
            rating: self.rating,
            place_id: self.place_id,
            is_generated: self.is_generated,
            created_at: Utc::now(),
        }
    }
}

/// A place the host picked by hand
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ManualRecommendationRequest {
    pub category: Category,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub address: String,
    #[serde(default)]
    pub photo: Option<String>,
    pub location: Location,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub place_id: Option<String>,
}

/// Body of a generation request
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub listing_id: Uuid,
    pub address: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub count: usize,
    pub recommendations: Vec<Recommendation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_name(category.as_str()), Some(category));
        }
        assert_eq!(Category::from_name("Museums"), None);
    }

    #[test]
    fn test_category_serializes_as_display_name() {
        let json = serde_json::to_string(&Category::BarsAndWineries).unwrap();
        assert_eq!(json, r#""Bars & Wineries""#);

        let parsed: Category = serde_json::from_str(r#""Coffee Shops""#).unwrap();
        assert_eq!(parsed, Category::CoffeeShops);
    }

    #[test]
    fn test_generate_request_uses_camel_case() {
        let listing_id = Uuid::new_v4();
        let json = format!(
            r#"{{"listingId":"{}","address":"1 Infinite Loop, Cupertino, CA","category":"Coffee Shops"}}"#,
            listing_id
        );
        let request: GenerateRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.listing_id, listing_id);
        assert_eq!(request.category, "Coffee Shops");
    }

    #[test]
    fn test_row_conversion_nests_location() {
        let row = RecommendationRow {
            id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            category: "Coffee Shops".to_string(),
            name: "Blue Bottle".to_string(),
            description: "Good pour-over.".to_string(),
            address: "1 Main St".to_string(),
            photo: None,
            lat: 37.33,
            lng: -122.03,
            rating: Some(4.6),
            place_id: Some("abc".to_string()),
            is_generated: true,
            created_at: Utc::now(),
        };

        let recommendation = Recommendation::from(row);
        assert_eq!(recommendation.location, Location { lat: 37.33, lng: -122.03 });

        let json = serde_json::to_value(&recommendation).unwrap();
        assert_eq!(json["location"]["lat"], 37.33);
        assert_eq!(json["is_generated"], true);
    }
}
