use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde_json::Value;
use std::io::Write;

use anime_catalog::auth::AUTH_COOKIE_NAME;
use anime_catalog::config::Config;
use anime_catalog::db::Database;
use anime_catalog::error::SERVER_ERROR_MESSAGE;
use anime_catalog::models::{TokenResponse, User};
use anime_catalog::routes::{configure_routes, AppState};
use anime_catalog::seed::run_seeds;

const SECRET: &str = "integration-test-secret";

const CATALOG_CSV: &str = "\
anime_id,name,genre,type,episodes,rating,members
32281,Kimi no Na wa.,\"Drama, Romance, School, Supernatural\",Movie,1,9.37,200630
5114,Fullmetal Alchemist: Brotherhood,\"Action, Adventure, Drama\",TV,64,9.26,793665
28977,Gintama Season 4,\"Action, Comedy, Historical\",TV,51,9.25,114262
";

/// In-memory database with the sample catalog and default users seeded
async fn seeded_state() -> web::Data<AppState> {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("anime.csv");
    std::fs::File::create(&csv_path)
        .unwrap()
        .write_all(CATALOG_CSV.as_bytes())
        .unwrap();

    let db = Database::new("sqlite::memory:").await.unwrap();
    db.run_migrations().await.unwrap();
    run_seeds(db.pool(), &csv_path).await.unwrap();

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 8080,
        jwt_secret: SECRET.to_string(),
        anime_csv_path: csv_path,
        cookie_secure: false,
    };

    web::Data::new(AppState { db, config })
}

fn body_text(body: &[u8]) -> String {
    String::from_utf8(body.to_vec()).unwrap()
}

#[actix_rt::test]
async fn test_seeded_users_are_listed() {
    let state = seeded_state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api/users").to_request();
    let users: Vec<User> = test::call_and_read_body_json(&app, req).await;

    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["admin", "joshua"]);
}

#[actix_rt::test]
async fn test_users_list_is_paginated() {
    let state = seeded_state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::get()
        .uri("/api/users?offset=2&limit=1")
        .to_request();
    let users: Vec<User> = test::call_and_read_body_json(&app, req).await;

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "joshua");
}

#[actix_rt::test]
async fn test_user_lookup_ignores_case() {
    let state = seeded_state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api/users/ADMIN").to_request();
    let user: User = test::call_and_read_body_json(&app, req).await;
    assert_eq!(user.username, "admin");

    let req = test::TestRequest::get().uri("/api/users/nobody").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = test::read_body(resp).await;
    assert_eq!(body.as_ref(), b"null");
}

#[actix_rt::test]
async fn test_register_json_then_duplicate_fails() {
    let state = seeded_state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(serde_json::json!({"username": "Mika", "password": "Hunter2"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: User = test::read_body_json(resp).await;
    assert_eq!(user.username, "Mika");

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(serde_json::json!({"username": "mika", "password": "other"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["error"], SERVER_ERROR_MESSAGE);
}

#[actix_rt::test]
async fn test_register_form_encoded() {
    let state = seeded_state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_form([("username", "rin"), ("password", "Tohsaka")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // The new account can authenticate right away.
    let req = test::TestRequest::post()
        .uri("/auth")
        .set_json(serde_json::json!({"username": "RIN", "password": "Tohsaka"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_register_missing_field_is_bad_request() {
    let state = seeded_state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(serde_json::json!({"username": "nopass"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["error"], "Invalid information received.");
}

#[actix_rt::test]
async fn test_anime_listing_respects_limit() {
    let state = seeded_state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::get()
        .uri("/api/anime?offset=1&limit=1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("Fullmetal Alchemist: Brotherhood"));
    assert!(!html.contains("Gintama Season 4"));
    assert!(!html.contains("Kimi no Na wa."));

    let req = test::TestRequest::post()
        .uri("/api/anime?offset=2&limit=1")
        .to_request();
    let html = body_text(&test::call_and_read_body(&app, req).await);
    assert!(html.contains("Gintama Season 4"));
    assert!(!html.contains("Fullmetal Alchemist: Brotherhood"));
    assert!(html.contains("rel=\"next\""));

    // The third page is exactly full and is the last one.
    let req = test::TestRequest::get()
        .uri("/api/anime?offset=3&limit=1")
        .to_request();
    let html = body_text(&test::call_and_read_body(&app, req).await);
    assert!(html.contains("Kimi no Na wa."));
    assert!(html.contains("rel=\"prev\""));
    assert!(!html.contains("rel=\"next\""));
}

#[actix_rt::test]
async fn test_home_falls_back_to_default_page() {
    let state = seeded_state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::get()
        .uri("/?offset=abc&limit=-3")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(&test::read_body(resp).await);
    for name in ["Kimi no Na wa.", "Fullmetal Alchemist: Brotherhood", "Gintama Season 4"] {
        assert!(html.contains(name), "missing {name}");
    }
    assert!(html.contains("href=\"/api/login\""));
}

#[actix_rt::test]
async fn test_anime_detail_and_missing_ids() {
    let state = seeded_state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/anime/32281").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("Kimi no Na wa."));
    assert!(html.contains("Drama, Romance, School, Supernatural"));

    for uri in ["/anime/99999", "/anime/not-a-number"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        let body = test::read_body(resp).await;
        assert_eq!(body.as_ref(), b"null");
    }
}

#[actix_rt::test]
async fn test_add_by_form() {
    let state = seeded_state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/add_by_form")
        .set_form([
            ("anime_id", "1"),
            ("name", "Cowboy Bebop"),
            ("genre", "Action, Sci-Fi"),
            ("anime_type", "TV"),
            ("episodes", "26"),
            ("rating", "8.82"),
            ("members", "486824"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/form");

    let req = test::TestRequest::get().uri("/anime/1").to_request();
    let html = body_text(&test::call_and_read_body(&app, req).await);
    assert!(html.contains("Cowboy Bebop"));

    let req = test::TestRequest::post()
        .uri("/add_by_form")
        .set_form([("anime_id", "one"), ("name", "Broken")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_html_login_sets_cookie_and_logout_clears_it() {
    let state = seeded_state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_form([("username", "Joshua"), ("password", "SliceBread")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

    let token = resp
        .response()
        .cookies()
        .find(|c| c.name() == AUTH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .expect("auth cookie");
    assert!(!token.is_empty());

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(Cookie::new(AUTH_COOKIE_NAME, token))
        .to_request();
    let html = body_text(&test::call_and_read_body(&app, req).await);
    assert!(html.contains("href=\"/logout\""));

    let req = test::TestRequest::get().uri("/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == AUTH_COOKIE_NAME)
        .expect("logout cookie");
    assert_eq!(cleared.value(), "");
    drop(cleared);
    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("href=\"/api/login\""));
}

#[actix_rt::test]
async fn test_html_login_failure_rerenders_form() {
    let state = seeded_state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_form([("username", "admin"), ("password", "wrong")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .response()
        .cookies()
        .all(|c| c.name() != AUTH_COOKIE_NAME));
    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("Invalid username or password."));

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_form([("username", "admin")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_token_grants_access_to_protected_route() {
    let state = seeded_state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/auth")
        .set_json(serde_json::json!({"username": "admin", "password": "Password123"}))
        .to_request();
    let token: TokenResponse = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token.access_token)))
        .to_request();
    let user: User = test::call_and_read_body_json(&app, req).await;
    assert_eq!(user.username, "admin");

    let req = test::TestRequest::get().uri("/protected").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header((header::AUTHORIZATION, "Bearer not.a.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_token_rejects_bad_credentials() {
    let state = seeded_state().await;
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/auth")
        .set_json(serde_json::json!({"username": "admin", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/auth")
        .set_json(serde_json::json!({"password": "Password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_health_endpoints_report_database_state() {
    let state = seeded_state().await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["status"], "healthy");

    let req = test::TestRequest::get().uri("/health/db").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    state.db.close().await;

    let req = test::TestRequest::get().uri("/health/db").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["database"], "disconnected");

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
