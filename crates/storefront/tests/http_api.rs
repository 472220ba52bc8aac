//! HTTP surface tests: routing, session auth, and status mapping.

#![allow(clippy::unwrap_used)]

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use shoplane_storefront::config::StorefrontConfig;
use shoplane_storefront::middleware::{create_session_layer, create_session_store};
use shoplane_storefront::state::AppState;

use common::{seed_product, test_pool};

async fn test_app() -> Router {
    let pool = test_pool().await;

    let config = StorefrontConfig {
        database_url: secrecy::SecretString::from("sqlite::memory:"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        session_ttl_hours: 24,
    };

    let store = create_session_store(&pool);
    store.migrate().await.unwrap();
    let session_layer = create_session_layer(store, &config);

    seed_product(&pool, "Desk Lamp", "Home", "25.00", 5).await;

    shoplane_storefront::app(AppState::new(config, pool), session_layer)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_cookie(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned()
}

/// Register through the API and return the session cookie.
async fn register(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/register",
            json!({
                "name": "Asha Rao",
                "email": "asha@example.com",
                "phone": "9876543210",
                "password": "pass1234"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn products_are_public() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::get("/products").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body[0]["name"], "Desk Lamp");
    assert_eq!(body[0]["price"], "25.00");

    let response = app
        .oneshot(Request::get("/products/999").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cart_requires_login() {
    let app = test_app().await;

    let response = app
        .oneshot(Request::get("/cart").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_cart_roundtrip() {
    let app = test_app().await;
    let cookie = register(&app).await;

    // Session cookie grants access to the cart.
    let mut request = post_json("/cart/items", json!({ "product_id": 1, "quantity": 2 }));
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["total"], "50.00");

    // Login with the phone number works too.
    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/login",
            json!({ "identifier": "9876543210", "password": "pass1234" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Wrong password is a uniform 401.
    let response = app
        .oneshot(post_json(
            "/auth/login",
            json!({ "identifier": "asha@example.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stock_conflicts_map_to_409() {
    let app = test_app().await;
    let cookie = register(&app).await;

    let mut request = post_json("/cart/items", json!({ "product_id": 1, "quantity": 9 }));
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Insufficient stock for Desk Lamp");
}

#[tokio::test]
async fn checkout_and_order_placement_over_http() {
    let app = test_app().await;
    let cookie = register(&app).await;

    let mut request = post_json("/cart/items", json!({ "product_id": 1, "quantity": 2 }));
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    assert_eq!(
        app.clone().oneshot(request).await.unwrap().status(),
        StatusCode::CREATED
    );

    let mut request = Request::get("/checkout").body(Body::empty()).unwrap();
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["payment_modes"].as_array().unwrap().len(), 5);
    assert_eq!(body["total"], "50.00");

    let mut request = post_json(
        "/orders",
        json!({ "shipping_address": "12 Hill Road, Pune", "payment_mode": "Upi" }),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["total_amount"], "50.00");
    assert_eq!(body["payment_mode"], "Upi");

    // The order shows up in history and the cart is empty.
    let mut request = Request::get("/orders").body(Body::empty()).unwrap();
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let mut request = Request::get("/cart").body(Body::empty()).unwrap();
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = app.oneshot(request).await.unwrap();
    let body = body_json(response).await;
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let app = test_app().await;
    let cookie = register(&app).await;

    let mut request = post_json("/auth/logout", json!({}));
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    assert_eq!(
        app.clone().oneshot(request).await.unwrap().status(),
        StatusCode::OK
    );

    let mut request = Request::get("/cart").body(Body::empty()).unwrap();
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
