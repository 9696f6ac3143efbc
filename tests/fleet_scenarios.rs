//! Postgres-backed scenario tests.
//!
//! These tests need a dedicated, disposable database: they truncate the
//! fleet tables before each scenario. Point `DATABASE_URL` at one and run
//! `cargo test -- --ignored --test-threads=1`.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware,
    routing::get,
    Router,
};
use secrecy::Secret;
use sqlx::PgPool;
use tower::ServiceExt;

use taxifleet::api;
use taxifleet::api::middleware::auth::require_auth;
use taxifleet::api::middleware::session::{create_session_layer, AppState};
use taxifleet::config::Config;
use taxifleet::db;
use taxifleet::models::car::{Car, CreateCarData};
use taxifleet::models::driver::{CreateDriverData, Driver};
use taxifleet::models::manufacturer::{CreateManufacturerData, Manufacturer};
use taxifleet::services::pagination::Pager;
use taxifleet::services::password;
use taxifleet::services::validation::validate_license_number;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for scenario tests");
    let pool = db::create_pool(&url).await.expect("connect to test database");
    db::run_migrations(&pool).await.expect("run migrations");

    sqlx::query("TRUNCATE cars, manufacturers, drivers RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .expect("truncate fleet tables");

    pool
}

fn test_config() -> Config {
    Config {
        database_url: String::new(),
        base_url: "http://127.0.0.1:8080".to_string(),
        host: "127.0.0.1".to_string(),
        port: 8080,
        bootstrap_username: None,
        bootstrap_password: None,
        bootstrap_license_number: None,
        session_secret: Secret::new("test-secret".to_string()),
    }
}

async fn test_app(pool: PgPool) -> Router {
    let config = test_config();
    let session_layer = create_session_layer(pool.clone(), b"test-secret", &config.base_url)
        .await
        .expect("create session layer");

    let state = AppState { pool, config };

    let protected = Router::new()
        .merge(api::manufacturers::router())
        .merge(api::cars::router())
        .merge(api::drivers::router())
        .route_layer(middleware::from_fn(require_auth));

    Router::new()
        .route("/health", get(api::health::health_check))
        .merge(api::auth::router())
        .merge(protected)
        .layer(session_layer)
        .with_state(state)
}

async fn create_manufacturers(pool: &PgPool, names: &[&str]) {
    for name in names {
        Manufacturer::create(
            pool,
            CreateManufacturerData {
                name: name.to_string(),
                country: "test".to_string(),
            },
        )
        .await
        .expect("create manufacturer");
    }
}

/// Creates a driver directly and logs in over HTTP, returning the session
/// cookie to attach to subsequent requests.
async fn login(app: &Router, pool: &PgPool) -> String {
    let password_hash = password::hash_password("test123").expect("hash password");
    Driver::create(
        pool,
        CreateDriverData {
            username: "test".to_string(),
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            license_number: "CCC12345".to_string(),
        },
    )
    .await
    .expect("create login driver");

    let response = app
        .clone()
        .oneshot(
            Request::post("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=test&password=test123"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER, "login should redirect");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets a session cookie")
        .to_str()
        .unwrap();

    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
#[ignore = "requires a dedicated postgres database"]
async fn manufacturer_search_filters_case_insensitively() {
    let pool = test_pool().await;
    create_manufacturers(
        &pool,
        &["Toyota", "Honda", "Ford1", "Ford2", "Ford3", "Ford4"],
    )
    .await;

    let matches = Manufacturer::search(&pool, Some("ford"), 100, 0).await.unwrap();
    assert_eq!(matches.len(), 4);
    assert_eq!(matches[0].name, "Ford1");
    assert_eq!(
        Manufacturer::count_matching(&pool, Some("ford")).await.unwrap(),
        4
    );

    // Absent and empty filters both return everything in insertion order
    let all = Manufacturer::search(&pool, None, 100, 0).await.unwrap();
    assert_eq!(all.len(), 6);
    assert_eq!(all[0].name, "Toyota");

    let all = Manufacturer::search(&pool, Some(""), 100, 0).await.unwrap();
    assert_eq!(all.len(), 6);

    let none = Manufacturer::search(&pool, Some("NonExistent"), 100, 0)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
#[ignore = "requires a dedicated postgres database"]
async fn car_search_filters_by_model() {
    let pool = test_pool().await;
    let manufacturer = Manufacturer::create(
        &pool,
        CreateManufacturerData {
            name: "testname".to_string(),
            country: "test".to_string(),
        },
    )
    .await
    .unwrap();

    for model in ["test1", "test2", "test3", "test4", "test5", "test6", "sss223"] {
        Car::create(
            &pool,
            CreateCarData {
                model: model.to_string(),
                manufacturer_id: manufacturer.id,
            },
        )
        .await
        .unwrap();
    }

    let matches = Car::search(&pool, Some("test"), 100, 0).await.unwrap();
    assert_eq!(matches.len(), 6);
    assert_eq!(matches[0].model, "test1");
    assert_eq!(matches[0].manufacturer_name, "testname");

    let all = Car::search(&pool, None, 100, 0).await.unwrap();
    assert_eq!(all.len(), 7);

    let none = Car::search(&pool, Some("NonExistent"), 100, 0).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
#[ignore = "requires a dedicated postgres database"]
async fn like_metacharacters_match_literally() {
    let pool = test_pool().await;
    create_manufacturers(&pool, &["100% Motors", "Plain Motors"]).await;

    let matches = Manufacturer::search(&pool, Some("100%"), 100, 0).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name, "100% Motors");

    // An unescaped "%" would match every row; "0%P" must match none
    let none = Manufacturer::search(&pool, Some("0%P"), 100, 0).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
#[ignore = "requires a dedicated postgres database"]
async fn manufacturer_listing_paginates_by_five() {
    let pool = test_pool().await;
    let names: Vec<String> = (0..11).map(|i| format!("testname{}", i)).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    create_manufacturers(&pool, &name_refs).await;

    let total = Manufacturer::count_matching(&pool, None).await.unwrap();
    assert_eq!(total, 11);

    let page1 = Pager::new(Some(1), total);
    let first = Manufacturer::search(&pool, None, page1.limit(), page1.offset())
        .await
        .unwrap();
    assert_eq!(
        first.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
        ["testname0", "testname1", "testname2", "testname3", "testname4"]
    );

    let page2 = Pager::new(Some(2), total);
    assert!(page2.is_paginated());
    let second = Manufacturer::search(&pool, None, page2.limit(), page2.offset())
        .await
        .unwrap();
    assert_eq!(
        second.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
        ["testname5", "testname6", "testname7", "testname8", "testname9"]
    );
}

#[tokio::test]
#[ignore = "requires a dedicated postgres database"]
async fn unauthenticated_requests_are_redirected() {
    let pool = test_pool().await;
    let app = test_app(pool).await;

    for path in ["/cars", "/drivers", "/manufacturers"] {
        let response = app
            .clone()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::OK, "{} must not be public", path);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login"
        );
    }
}

#[tokio::test]
#[ignore = "requires a dedicated postgres database"]
async fn driver_creation_validates_license_number() {
    let pool = test_pool().await;
    let app = test_app(pool.clone()).await;
    let cookie = login(&app, &pool).await;

    // 7-character license is rejected and the form is re-rendered
    let response = app
        .clone()
        .oneshot(
            Request::post("/drivers")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(header::COOKIE, &cookie)
                .body(Body::from(
                    "username=testuser&password1=password123&password2=password123\
                     &first_name=testt&last_name=testtt&license_number=invalid",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("License number should consist of 8 characters"));
    assert!(Driver::find_by_username(&pool, "testuser").await.unwrap().is_none());

    // 8-character license succeeds and the record matches the submission
    let response = app
        .clone()
        .oneshot(
            Request::post("/drivers")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(header::COOKIE, &cookie)
                .body(Body::from(
                    "username=test_username&password1=user12test&password2=user12test\
                     &first_name=Test+first&last_name=Test+last&license_number=AAA12345",
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let driver = Driver::find_by_username(&pool, "test_username")
        .await
        .unwrap()
        .expect("driver was created");
    assert_eq!(driver.first_name, "Test first");
    assert_eq!(driver.last_name, "Test last");
    assert_eq!(driver.license_number, "AAA12345");
    assert!(password::verify_password("user12test", &driver.password_hash));

    // The length rule itself, without the HTTP layer
    assert!(validate_license_number("AAA12345").is_ok());
    assert!(validate_license_number("invalid").is_err());
}

#[tokio::test]
#[ignore = "requires a dedicated postgres database"]
async fn manufacturer_update_persists_and_redirects() {
    let pool = test_pool().await;
    let app = test_app(pool.clone()).await;
    let cookie = login(&app, &pool).await;

    let manufacturer = Manufacturer::create(
        &pool,
        CreateManufacturerData {
            name: "before".to_string(),
            country: "test".to_string(),
        },
    )
    .await
    .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/manufacturers/{}", manufacturer.id))
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header(header::COOKIE, &cookie)
                .body(Body::from("name=unique_name_test&country=test_USA"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let updated = Manufacturer::find_by_id(&pool, manufacturer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "unique_name_test");
    assert_eq!(updated.country, "test_USA");
}
