use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use serde_json::{json, Value};
use uuid::Uuid;

use welcome_api::{
    auth::{AuthVerifier, Session},
    config::RegenerationPolicy,
    db::{Cache, MemoryStore},
    error::{AppError, AppResult},
    models::{
        AutocompleteSuggestion, Location, NearbyQuery, PlaceCandidate, PlaceDetails,
        SelectedPlace,
    },
    routes::{create_router, AppState},
    services::{
        providers::{Geocoder, PlaceSearch, PlacesProvider, TextGenerator},
        RecommendationPipeline,
    },
};

const ALICE: &str = "alice-token";
const BOB: &str = "bob-token";

/// Accepts two fixed tokens
struct StaticAuth;

#[async_trait::async_trait]
impl AuthVerifier for StaticAuth {
    async fn verify(&self, token: &str) -> AppResult<Session> {
        let user_id = match token {
            ALICE => Uuid::from_u128(1),
            BOB => Uuid::from_u128(2),
            _ => return Err(AppError::Unauthorized("Invalid or expired session".to_string())),
        };
        Ok(Session {
            user_id,
            email: None,
        })
    }
}

/// Resolves every address except ones mentioning "nowhere"
struct StubMaps;

const RATINGS: [f64; 8] = [4.2, 3.9, 4.8, 4.5, 4.0, 4.6, 4.1, 3.0];

#[async_trait::async_trait]
impl Geocoder for StubMaps {
    async fn geocode(&self, address: &str) -> AppResult<Option<Location>> {
        if address.contains("nowhere") {
            return Ok(None);
        }
        Ok(Some(Location {
            lat: 37.3318,
            lng: -122.0312,
        }))
    }
}

#[async_trait::async_trait]
impl PlacesProvider for StubMaps {
    async fn nearby(&self, query: &NearbyQuery) -> AppResult<Vec<PlaceCandidate>> {
        Ok(RATINGS
            .iter()
            .enumerate()
            .map(|(n, rating)| PlaceCandidate {
                place_id: format!("{}-{}", query.place_type, n),
                name: format!("Place {}", n),
                rating: Some(*rating),
            })
            .collect())
    }

    async fn details(&self, place_id: &str) -> AppResult<PlaceDetails> {
        Ok(PlaceDetails {
            place_id: place_id.to_string(),
            name: Some(format!("Details of {}", place_id)),
            formatted_address: Some("10 Market St".to_string()),
            rating: Some(4.5),
            photo_url: None,
            location: Some(Location {
                lat: 37.33,
                lng: -122.03,
            }),
        })
    }
}

#[async_trait::async_trait]
impl PlaceSearch for StubMaps {
    async fn search(&self, text: &str) -> AppResult<Vec<AutocompleteSuggestion>> {
        Ok(vec![AutocompleteSuggestion {
            place_id: "addr-1".to_string(),
            description: format!("{}, Cupertino, CA", text),
        }])
    }

    async fn select(&self, place_id: &str) -> AppResult<SelectedPlace> {
        Ok(SelectedPlace {
            formatted_address: "1 Infinite Loop, Cupertino, CA 95014".to_string(),
            lat: 37.3318,
            lng: -122.0312,
            place_id: place_id.to_string(),
        })
    }
}

struct EchoGenerator;

#[async_trait::async_trait]
impl TextGenerator for EchoGenerator {
    async fn generate(&self, _prompt: &str) -> AppResult<String> {
        Ok("A local favorite worth the walk.".to_string())
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

fn create_test_server() -> TestServer {
    create_test_server_with(RegenerationPolicy::Append)
}

fn create_test_server_with(policy: RegenerationPolicy) -> TestServer {
    let store = Arc::new(MemoryStore::new());
    let maps = Arc::new(StubMaps);

    let pipeline = RecommendationPipeline::new(
        maps.clone(),
        maps.clone(),
        Arc::new(EchoGenerator),
        store.clone(),
        policy,
    );

    let state = AppState::new(
        store.clone(),
        store.clone(),
        store,
        Cache::disabled(),
        pipeline,
        maps,
        Arc::new(StaticAuth),
    );

    TestServer::new(create_router(Arc::new(state))).unwrap()
}

fn authed(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

async fn create_listing(server: &TestServer, token: &str, title: &str) -> Value {
    let response = authed(server.post("/api/v1/listings"), token)
        .json(&json!({
            "title": title,
            "address": "1 Infinite Loop, Cupertino, CA",
            "check_in": "15:00",
            "house_rules": ["No smoking", "  ", "Quiet after 10pm"]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn add_photo(server: &TestServer, listing_id: &str, name: &str) -> PhotoResponse {
    let response = authed(
        server.post(&format!("/api/v1/listings/{}/photos", listing_id)),
        ALICE,
    )
    .json(&json!({ "photo_url": format!("https://cdn.test/{}.jpg", name), "caption": name }))
    .await;
    PhotoResponse {
        status: response.status_code(),
        body: response.json(),
    }
}

struct PhotoResponse {
    status: StatusCode,
    body: Value,
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let response = server
        .get("/health")
        .add_header(
            header::HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("edge-123"),
        )
        .await;
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "edge-123"
    );
}

#[tokio::test]
async fn test_listings_require_session() {
    let server = create_test_server();

    let response = server.get("/api/v1/listings").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Sign in required"));

    let response = authed(server.get("/api/v1/listings"), "forged").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_listing_crud() {
    let server = create_test_server();

    let created = create_listing(&server, ALICE, "Beach Cottage").await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["title"], "Beach Cottage");
    assert_eq!(created["house_rules"], json!(["No smoking", "Quiet after 10pm"]));

    let response = authed(server.get(&format!("/api/v1/listings/{}", id)), ALICE).await;
    response.assert_status_ok();

    let response = authed(server.put(&format!("/api/v1/listings/{}", id)), ALICE)
        .json(&json!({ "title": "Beach Cottage II", "address": "2 Shore Rd" }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["title"], "Beach Cottage II");
    assert_eq!(updated["check_in"], Value::Null);

    let response = authed(server.get("/api/v1/listings"), ALICE).await;
    let mine: Vec<Value> = response.json();
    assert_eq!(mine.len(), 1);

    let response = authed(server.delete(&format!("/api/v1/listings/{}", id)), ALICE).await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = authed(server.get(&format!("/api/v1/listings/{}", id)), ALICE).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_check_in_time_is_rejected() {
    let server = create_test_server();
    let response = authed(server.post("/api/v1/listings"), ALICE)
        .json(&json!({ "title": "Loft", "address": "5 Main St", "check_in": "3pm" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_owner_is_forbidden() {
    let server = create_test_server();
    let created = create_listing(&server, ALICE, "Cabin").await;
    let id = created["id"].as_str().unwrap();

    let response = authed(server.put(&format!("/api/v1/listings/{}", id)), BOB)
        .json(&json!({ "title": "Mine now", "address": "2 Shore Rd" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = authed(server.delete(&format!("/api/v1/listings/{}", id)), BOB).await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = authed(server.get("/api/v1/listings"), BOB).await;
    let bobs: Vec<Value> = response.json();
    assert!(bobs.is_empty());
}

#[tokio::test]
async fn test_photo_ordering_and_limit() {
    let server = create_test_server();
    let created = create_listing(&server, ALICE, "Photo House").await;
    let id = created["id"].as_str().unwrap().to_string();

    let mut photo_ids = Vec::new();
    for name in ["gate", "door", "lockbox", "hall", "room"] {
        let added = add_photo(&server, &id, name).await;
        assert_eq!(added.status, StatusCode::CREATED);
        photo_ids.push(added.body["id"].as_str().unwrap().to_string());
    }

    let sixth = add_photo(&server, &id, "extra").await;
    assert_eq!(sixth.status, StatusCode::CONFLICT);

    let response = authed(
        server.post(&format!("/api/v1/listings/{}/photos/move", id)),
        ALICE,
    )
    .json(&json!({ "from": 0, "to": 4 }))
    .await;
    response.assert_status_ok();
    let moved: Vec<Value> = response.json();
    let captions: Vec<&str> = moved.iter().map(|p| p["caption"].as_str().unwrap()).collect();
    assert_eq!(captions, vec!["door", "lockbox", "hall", "room", "gate"]);

    let response = authed(
        server.delete(&format!("/api/v1/listings/{}/photos/{}", id, photo_ids[2])),
        ALICE,
    )
    .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = authed(server.get(&format!("/api/v1/listings/{}/photos", id)), ALICE).await;
    let remaining: Vec<Value> = response.json();
    let orders: Vec<i64> = remaining
        .iter()
        .map(|p| p["display_order"].as_i64().unwrap())
        .collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);

    let response = authed(
        server.post(&format!("/api/v1/listings/{}/photos/move", id)),
        ALICE,
    )
    .json(&json!({ "from": 0, "to": 9 }))
    .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_coffee_shops() {
    let server = create_test_server();
    let created = create_listing(&server, ALICE, "Near Cafes").await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = authed(server.post("/api/v1/recommendations/generate"), ALICE)
        .json(&json!({
            "listingId": id,
            "address": "1 Infinite Loop, Cupertino, CA",
            "category": "Coffee Shops"
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 5);
    assert!(recommendations.iter().all(|r| r["is_generated"] == true));
    assert!(recommendations.iter().all(|r| r["category"] == "Coffee Shops"));

    let place_ids: Vec<&str> = recommendations
        .iter()
        .map(|r| r["place_id"].as_str().unwrap())
        .collect();
    assert_eq!(place_ids, vec!["cafe-2", "cafe-5", "cafe-3", "cafe-0", "cafe-6"]);

    let response = authed(
        server.get(&format!("/api/v1/listings/{}/recommendations", id)),
        ALICE,
    )
    .add_query_param("category", "Coffee Shops")
    .await;
    let stored: Vec<Value> = response.json();
    assert_eq!(stored.len(), 5);
}

#[tokio::test]
async fn test_generate_unresolvable_address_persists_nothing() {
    let server = create_test_server();
    let created = create_listing(&server, ALICE, "Lost").await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = authed(server.post("/api/v1/recommendations/generate"), ALICE)
        .json(&json!({
            "listingId": id,
            "address": "middle of nowhere",
            "category": "Places to Eat"
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Could not find this location"));

    let response = authed(
        server.get(&format!("/api/v1/listings/{}/recommendations", id)),
        ALICE,
    )
    .await;
    let stored: Vec<Value> = response.json();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_generate_for_someone_elses_listing_is_forbidden() {
    let server = create_test_server();
    let created = create_listing(&server, ALICE, "Private").await;

    let response = authed(server.post("/api/v1/recommendations/generate"), BOB)
        .json(&json!({
            "listingId": created["id"],
            "address": "1 Infinite Loop, Cupertino, CA",
            "category": "Coffee Shops"
        }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

async fn generate_twice(server: &TestServer) -> (String, Vec<Value>) {
    let created = create_listing(server, ALICE, "Regen").await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = authed(
        server.post(&format!("/api/v1/listings/{}/recommendations", id)),
        ALICE,
    )
    .json(&json!({
        "category": "Coffee Shops",
        "name": "Corner Roaster",
        "address": "4 Elm St",
        "location": { "lat": 37.3, "lng": -122.0 }
    }))
    .await;
    response.assert_status(StatusCode::CREATED);

    for _ in 0..2 {
        authed(server.post("/api/v1/recommendations/generate"), ALICE)
            .json(&json!({
                "listingId": id,
                "address": "1 Infinite Loop, Cupertino, CA",
                "category": "Coffee Shops"
            }))
            .await
            .assert_status_ok();
    }

    let response = authed(
        server.get(&format!("/api/v1/listings/{}/recommendations", id)),
        ALICE,
    )
    .await;
    (id, response.json())
}

#[tokio::test]
async fn test_regenerate_appends_by_default() {
    let server = create_test_server();
    let (_, stored) = generate_twice(&server).await;

    let generated = stored.iter().filter(|r| r["is_generated"] == true).count();
    assert_eq!(generated, 10);
    assert_eq!(stored.len(), 11);
}

#[tokio::test]
async fn test_regenerate_replace_keeps_manual_rows() {
    let server = create_test_server_with(RegenerationPolicy::Replace);
    let (_, stored) = generate_twice(&server).await;

    let generated = stored.iter().filter(|r| r["is_generated"] == true).count();
    assert_eq!(generated, 5);
    assert!(stored
        .iter()
        .any(|r| r["is_generated"] == false && r["name"] == "Corner Roaster"));
}

#[tokio::test]
async fn test_guest_page_is_public_and_grouped() {
    let server = create_test_server();
    let created = create_listing(&server, ALICE, "Guest View").await;
    let id = created["id"].as_str().unwrap().to_string();

    authed(server.post("/api/v1/recommendations/generate"), ALICE)
        .json(&json!({
            "listingId": id,
            "address": "1 Infinite Loop, Cupertino, CA",
            "category": "Things to Do"
        }))
        .await
        .assert_status_ok();
    authed(server.post("/api/v1/recommendations/generate"), ALICE)
        .json(&json!({
            "listingId": id,
            "address": "1 Infinite Loop, Cupertino, CA",
            "category": "Places to Eat"
        }))
        .await
        .assert_status_ok();

    let response = server.get(&format!("/api/v1/guest/{}", id)).await;
    response.assert_status_ok();
    let page: Value = response.json();

    assert_eq!(page["listing"]["title"], "Guest View");
    assert!(page["listing"].get("owner_id").is_none());
    let groups: Vec<&str> = page["recommendation_groups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["category"].as_str().unwrap())
        .collect();
    assert_eq!(groups, vec!["Places to Eat", "Things to Do"]);

    let response = server.get(&format!("/api/v1/guest/{}", Uuid::new_v4())).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_listing_cascades() {
    let server = create_test_server();
    let created = create_listing(&server, ALICE, "Short Lived").await;
    let id = created["id"].as_str().unwrap().to_string();

    add_photo(&server, &id, "gate").await;
    authed(server.post("/api/v1/recommendations/generate"), ALICE)
        .json(&json!({
            "listingId": id,
            "address": "1 Infinite Loop, Cupertino, CA",
            "category": "Bars & Wineries"
        }))
        .await
        .assert_status_ok();

    authed(server.delete(&format!("/api/v1/listings/{}", id)), ALICE)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = authed(
        server.get(&format!("/api/v1/listings/{}/recommendations", id)),
        ALICE,
    )
    .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_places_autocomplete() {
    let server = create_test_server();

    let response = authed(server.get("/api/v1/places/autocomplete"), ALICE)
        .add_query_param("q", "1 Infinite")
        .await;
    response.assert_status_ok();
    let suggestions: Vec<Value> = response.json();
    assert_eq!(suggestions[0]["place_id"], "addr-1");

    let response = authed(server.get("/api/v1/places/autocomplete"), ALICE)
        .add_query_param("q", " ")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = authed(server.get("/api/v1/places/addr-1"), ALICE).await;
    response.assert_status_ok();
    let place: Value = response.json();
    assert_eq!(place["formattedAddress"], "1 Infinite Loop, Cupertino, CA 95014");
}
