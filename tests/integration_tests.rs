// Integration tests for Provider Coverage

use actix_web::{http::StatusCode, test, web, App};
use provider_coverage::config::SearchSettings;
use provider_coverage::core::{Catalog, RadiusSearch};
use provider_coverage::routes::{configure_extractors, configure_routes, AppState};
use provider_coverage::services::SessionStore;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const CATALOG: &str = "\
nom,latitude,longitude
Paris,48.8566,2.3522
Vincennes,48.8474,2.4396
Montreuil,48.8638,2.4485
Versailles,48.8049,2.1204
Lyon,45.7640,4.8357
Marseille,43.2965,5.3698
Nowhere,N/A,N/A
";

fn create_state(max_limit: usize) -> AppState {
    AppState {
        catalog: Arc::new(Catalog::from_reader(CATALOG.as_bytes()).unwrap()),
        resolver: RadiusSearch::default(),
        sessions: SessionStore::new(100, Duration::from_secs(60)),
        search: SearchSettings {
            max_limit,
            default_limit: max_limit,
            ..SearchSettings::default()
        },
    }
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(configure_extractors)
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_reports_catalog_size() {
    let app = app!(create_state(100));

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["catalogSize"], 6);
}

#[actix_web::test]
async fn test_catalog_stats_expose_dropped_rows() {
    let app = app!(create_state(100));

    let req = test::TestRequest::get().uri("/api/v1/catalog/stats").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["cities"], 6);
    assert_eq!(body["dropped"], 1);
    assert_eq!(body["report"]["rawRows"], 7);
    assert_eq!(body["report"]["invalidCoordinate"], 1);
}

#[actix_web::test]
async fn test_list_cities_sorted_with_prefix() {
    let app = app!(create_state(100));

    let req = test::TestRequest::get().uri("/api/v1/cities").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 6);
    assert_eq!(body["cities"][0], "Lyon");

    let req = test::TestRequest::get().uri("/api/v1/cities?prefix=m").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["cities"], json!(["Marseille", "Montreuil"]));
}

#[actix_web::test]
async fn test_stateless_search() {
    let app = app!(create_state(100));

    let req = test::TestRequest::post()
        .uri("/api/v1/search")
        .set_json(json!({"origin": "Paris", "radiusKm": 200}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let names: Vec<&str> = body["matches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Paris", "Vincennes", "Montreuil", "Versailles"]);
    assert_eq!(body["count"], 4);
    assert_eq!(body["matches"][0]["distanceKm"], 0.0);
    assert!(body.get("sessionId").is_none());
}

#[actix_web::test]
async fn test_search_unknown_origin_is_404() {
    let app = app!(create_state(100));

    let req = test::TestRequest::post()
        .uri("/api/v1/search")
        .set_json(json!({"origin": "Atlantis", "radiusKm": 20}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "origin_not_found");
}

#[actix_web::test]
async fn test_isolated_origin_returns_itself() {
    let app = app!(create_state(100));

    // Marseille has no neighbours in this catalog within 1 km
    let req = test::TestRequest::post()
        .uri("/api/v1/search")
        .set_json(json!({"origin": "Marseille", "radiusKm": 1}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["count"], 1);
    assert_eq!(body["matches"][0]["name"], "Marseille");
}

#[actix_web::test]
async fn test_search_validation() {
    let app = app!(create_state(100));

    for payload in [
        json!({"origin": "", "radiusKm": 20}),
        json!({"origin": "Paris", "radiusKm": -1}),
        json!({"origin": "Paris", "radiusKm": 201}),
        json!({"origin": "Paris", "radiusKm": 20, "limit": 0}),
        json!({"origin": "Paris", "radiusKm": 20, "limit": 101}),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/search")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload: {}", payload);
    }
}

#[actix_web::test]
async fn test_search_without_radius_uses_configured_default() {
    let app = app!(create_state(100));

    let req = test::TestRequest::post()
        .uri("/api/v1/search")
        .set_json(json!({"origin": "Paris"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["radiusKm"], 20.0);
    assert_eq!(body["count"], 4);

    let mut state = create_state(100);
    state.search.default_radius_km = 7.0;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/search")
        .set_json(json!({"origin": "Paris"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["radiusKm"], 7.0);
    assert_eq!(body["matches"][1]["name"], "Vincennes");
    assert_eq!(body["count"], 2);
}

#[actix_web::test]
async fn test_malformed_json_is_400() {
    let app = app!(create_state(100));

    let req = test::TestRequest::post()
        .uri("/api/v1/search")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");
    assert_eq!(body["statusCode"], 400);
}

#[actix_web::test]
async fn test_malformed_session_id_is_400() {
    let app = app!(create_state(100));

    let req = test::TestRequest::get()
        .uri("/api/v1/sessions/not-a-uuid")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_path");
}

#[actix_web::test]
async fn test_configured_limit_caps_results() {
    let app = app!(create_state(2));

    let req = test::TestRequest::post()
        .uri("/api/v1/search")
        .set_json(json!({"origin": "Paris", "radiusKm": 200}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["count"], 2);
}

#[actix_web::test]
async fn test_session_flow() {
    let app = app!(create_state(100));

    // Open a session
    let req = test::TestRequest::post().uri("/api/v1/sessions").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let id = body["sessionId"].as_str().unwrap().to_string();
    assert!(body["selected"].is_null());

    // Selection before any search is a conflict
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/sessions/{}/selection", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Search within 30 km of Paris
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/search", id))
        .set_json(json!({"origin": "Paris", "radiusKm": 30}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["sessionId"], id.as_str());
    assert_eq!(body["count"], 4);

    // Everything is selected by default
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/sessions/{}/selection", id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["selected"], json!(["Paris", "Vincennes", "Montreuil", "Versailles"]));

    // Deselect one city
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/exclusions/Vincennes", id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["selected"], json!(["Paris", "Montreuil", "Versailles"]));
    assert_eq!(body["excluded"], json!(["Vincennes"]));

    // Replace the exclusion set, unknown names are ignored
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/sessions/{}/exclusions", id))
        .set_json(json!({"excluded": ["Versailles", "Lille"]}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["selected"], json!(["Paris", "Vincennes", "Montreuil"]));
    assert_eq!(body["count"], 3);

    // Re-include
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/sessions/{}/exclusions/Versailles", id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 4);

    // A new search replaces the result and resets exclusions
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/exclusions/Paris", id))
        .to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/search", id))
        .set_json(json!({"origin": "Paris", "radiusKm": 10}))
        .to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/sessions/{}", id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["selected"], json!(["Paris", "Vincennes", "Montreuil"]));
    assert_eq!(body["excluded"], json!([]));

    // Discard the session
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/sessions/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/sessions/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_exclusion_before_search_is_conflict() {
    let app = app!(create_state(100));

    let req = test::TestRequest::post().uri("/api/v1/sessions").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let id = body["sessionId"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/exclusions/Paris", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_unknown_session_is_404() {
    let app = app!(create_state(100));

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/sessions/{}/search", uuid::Uuid::new_v4()))
        .set_json(json!({"origin": "Paris", "radiusKm": 10}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "session_not_found");
}

#[actix_web::test]
async fn test_sessions_do_not_share_state() {
    let app = app!(create_state(100));

    let mut ids = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post().uri("/api/v1/sessions").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        ids.push(body["sessionId"].as_str().unwrap().to_string());
    }

    for (id, radius) in ids.iter().zip([6.8, 200.0]) {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{}/search", id))
            .set_json(json!({"origin": "Paris", "radiusKm": radius}))
            .to_request();
        test::call_service(&app, req).await;
    }

    let mut counts = Vec::new();
    for id in &ids {
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/sessions/{}/selection", id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        counts.push(body["count"].as_u64().unwrap());
    }

    assert_eq!(counts, vec![2, 4]);
}
