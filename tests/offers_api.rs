//! End-to-end coverage for the `/offers` routes: creation, lookup,
//! deletion, listing with limit/sort, and the read-time aggregation of
//! comment-derived fields.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use lodgely::app::{build_app, App};
use lodgely::config::AppConfig;
use lodgely::domain::comment::Comment;
use lodgely::domain::offer::{City, Convenience, Coordinates, Offer, PlaceType};
use lodgely::domain::user::{RegisterUser, User, UserKind};
use lodgely::store::{CommentRepository, OfferRepository, UserRepository};

fn test_app() -> (App, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        upload_dir: dir.path().to_string_lossy().into_owned(),
        ..AppConfig::default()
    };
    (build_app(&config).unwrap(), dir)
}

async fn send(
    router: &Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn seed_author(app: &App) -> User {
    app.store
        .users
        .create(User::new(
            RegisterUser {
                name: "Keks".to_string(),
                email: "keks@example.com".to_string(),
                avatar_url: None,
                kind: UserKind::Pro,
                password: "secret".to_string(),
            },
            "$argon2id$stub".to_string(),
        ))
        .await
        .unwrap()
}

fn sample_offer(author_id: Uuid, name: &str, age: Duration) -> Offer {
    Offer {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: "Quiet two-room apartment overlooking the canal".to_string(),
        city: City::Amsterdam,
        preview_image: "preview.png".to_string(),
        place_images: vec!["room.png".to_string(); 6],
        is_premium: false,
        place_type: PlaceType::Apartment,
        rooms: 2,
        guests: 3,
        price: 420,
        conveniences: vec![Convenience::Breakfast],
        author_id,
        location: Coordinates {
            latitude: 52.37,
            longitude: 4.89,
        },
        created_at: Utc::now() - age,
    }
}

fn comment_on(offer_id: Uuid, author_id: Uuid, rating: u8, age: Duration) -> Comment {
    Comment {
        id: Uuid::new_v4(),
        text: "A fine place to stay".to_string(),
        rating,
        offer_id,
        author_id,
        created_at: Utc::now() - age,
    }
}

fn valid_create_body(author_id: Uuid) -> Value {
    json!({
        "name": "Canal-side apartment",
        "description": "Quiet two-room apartment overlooking the canal",
        "city": "Amsterdam",
        "previewImage": "preview.png",
        "placeImages": ["1.png", "2.png", "3.png", "4.png", "5.png", "6.png"],
        "isPremium": false,
        "type": "apartment",
        "roomsAmount": 2,
        "guestsAmount": 3,
        "price": 420,
        "conveniences": ["Breakfast", "Washer"],
        "authorId": author_id.to_string(),
        "location": { "latitude": 52.37, "longitude": 4.89 }
    })
}

#[tokio::test]
async fn test_create_offer_returns_created_projection() {
    let (app, _upload) = test_app();
    let author = seed_author(&app).await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/offers",
        Some(valid_create_body(author.id)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Canal-side apartment");
    assert_eq!(body["rating"], 0.0);
    assert_eq!(body["commentsCount"], 0);
    assert_eq!(body["author"]["email"], "keks@example.com");
}

#[tokio::test]
async fn test_create_offer_reports_every_violation_at_once() {
    let (app, _upload) = test_app();
    let author = seed_author(&app).await;

    let mut body = valid_create_body(author.id);
    body["name"] = json!("tiny");
    body["price"] = json!(5);

    let (status, body) = send(&app.router, Method::POST, "/offers", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["component"], "ValidateBody");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("name"));
    assert!(message.contains("price"));
}

#[tokio::test]
async fn test_dangling_author_reference_is_bad_request() {
    let (app, _upload) = test_app();

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/offers",
        Some(valid_create_body(Uuid::new_v4())),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["component"], "OfferService");
}

#[tokio::test]
async fn test_malformed_offer_id_is_bad_request_not_server_error() {
    let (app, _upload) = test_app();

    let (status, body) = send(&app.router, Method::GET, "/offers/not-an-id", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["component"], "ValidateId");
}

#[tokio::test]
async fn test_unknown_offer_id_is_not_found() {
    let (app, _upload) = test_app();

    let path = format!("/offers/{}", Uuid::new_v4());
    let (status, body) = send(&app.router, Method::GET, &path, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["component"], "EnsureExists");
}

#[tokio::test]
async fn test_delete_then_delete_again_is_not_found() {
    let (app, _upload) = test_app();
    let author = seed_author(&app).await;
    let offer = app
        .store
        .offers
        .create(sample_offer(author.id, "Doomed loft", Duration::zero()))
        .await
        .unwrap();

    let path = format!("/offers/{}", offer.id);
    let (first, _) = send(&app.router, Method::DELETE, &path, None).await;
    let (second, body) = send(&app.router, Method::DELETE, &path, None).await;

    assert_eq!(first, StatusCode::NO_CONTENT);
    assert_eq!(second, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_patch_validates_body_before_id() {
    let (app, _upload) = test_app();

    let (status, body) = send(
        &app.router,
        Method::PATCH,
        "/offers/not-an-id",
        Some(json!({ "name": "tiny" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["component"], "ValidateBody");
}

#[tokio::test]
async fn test_patch_keeps_untouched_fields() {
    let (app, _upload) = test_app();
    let author = seed_author(&app).await;
    let offer = app
        .store
        .offers
        .create(sample_offer(author.id, "Original name here", Duration::zero()))
        .await
        .unwrap();

    let path = format!("/offers/{}", offer.id);
    let (status, body) = send(
        &app.router,
        Method::PATCH,
        &path,
        Some(json!({ "price": 999 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 999);
    assert_eq!(body["name"], "Original name here");
}

#[tokio::test]
async fn test_invalid_limit_is_bad_request() {
    let (app, _upload) = test_app();

    let (status, body) = send(&app.router, Method::GET, "/offers?limit=abc", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["component"], "OfferController");
}

#[tokio::test]
async fn test_list_sorts_newest_first_by_default() {
    let (app, _upload) = test_app();
    let author = seed_author(&app).await;
    for (name, age) in [("Old place", 3), ("Middle place", 2), ("New place", 1)] {
        app.store
            .offers
            .create(sample_offer(author.id, name, Duration::days(age)))
            .await
            .unwrap();
    }

    let (status, body) = send(&app.router, Method::GET, "/offers", None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|offer| offer["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["New place", "Middle place", "Old place"]);
}

#[tokio::test]
async fn test_popular_sort_aggregates_before_truncating() {
    let (app, _upload) = test_app();
    let author = seed_author(&app).await;

    // The most-commented offer is also the oldest; truncating by creation
    // time before aggregation would drop it from the popular listing.
    for (name, age, comments) in [
        ("Busy place", 3, 3),
        ("Quieter place", 2, 2),
        ("Silent place", 1, 0),
    ] {
        let offer = app
            .store
            .offers
            .create(sample_offer(author.id, name, Duration::days(age)))
            .await
            .unwrap();
        for n in 0..comments {
            app.store
                .comments
                .create(comment_on(offer.id, author.id, 4, Duration::hours(n)))
                .await
                .unwrap();
        }
    }

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/offers?limit=2&sort=popular",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["name"], "Busy place");
    assert_eq!(listed[0]["commentsCount"], 3);
    assert_eq!(listed[0]["rating"], 4.0);
    assert_eq!(listed[1]["name"], "Quieter place");
}

#[tokio::test]
async fn test_rating_and_count_recomputed_on_every_read() {
    let (app, _upload) = test_app();
    let author = seed_author(&app).await;
    let offer = app
        .store
        .offers
        .create(sample_offer(author.id, "Watched listing", Duration::zero()))
        .await
        .unwrap();
    app.store
        .comments
        .create(comment_on(offer.id, author.id, 4, Duration::hours(2)))
        .await
        .unwrap();

    let path = format!("/offers/{}", offer.id);
    let (_, before) = send(&app.router, Method::GET, &path, None).await;
    assert_eq!(before["rating"], 4.0);
    assert_eq!(before["commentsCount"], 1);

    app.store
        .comments
        .create(comment_on(offer.id, author.id, 2, Duration::hours(1)))
        .await
        .unwrap();

    let (_, after) = send(&app.router, Method::GET, &path, None).await;
    assert_eq!(after["rating"], 3.0);
    assert_eq!(after["commentsCount"], 2);
}
