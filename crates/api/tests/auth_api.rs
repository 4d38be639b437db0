//! Authentication and role checks that are decided before any query runs.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_offline_app, post_json, send, token_for};
use serde_json::json;

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let response = send(build_offline_app(), Method::GET, "/api/v1/bookings/mine", None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_token_is_401() {
    let response = send(
        build_offline_app(),
        Method::GET,
        "/api/v1/bookings/mine",
        None,
        Some("not-a-jwt"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_401() {
    let other = sportsbook_api::auth::jwt::JwtConfig {
        secret: "someone-elses-secret".into(),
        access_token_expiry_mins: 60,
    };
    let token = sportsbook_api::auth::jwt::generate_access_token(1, "admin", &other).unwrap();
    let response = send(
        build_offline_app(),
        Method::GET,
        "/api/v1/admin/bookings",
        None,
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn regular_user_cannot_create_sport() {
    let token = token_for(1, "user");
    let response = post_json(
        build_offline_app(),
        "/api/v1/sports",
        json!({ "name": "Squash" }),
        Some(&token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn owner_cannot_reach_admin_routes() {
    let token = token_for(2, "owner");
    let response = send(
        build_offline_app(),
        Method::GET,
        "/api/v1/admin/users",
        None,
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn regular_user_cannot_create_facility() {
    let token = token_for(1, "user");
    let response = post_json(
        build_offline_app(),
        "/api/v1/facilities",
        json!({ "name": "Arena", "address": "1 Main St" }),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn register_refuses_admin_role() {
    let response = post_json(
        build_offline_app(),
        "/api/v1/auth/register",
        json!({
            "full_name": "Mallory",
            "email": "mallory@example.com",
            "password": "long-enough-pass1",
            "role": "admin"
        }),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn register_rejects_malformed_email_and_short_password() {
    let bad_email = post_json(
        build_offline_app(),
        "/api/v1/auth/register",
        json!({ "full_name": "Eve", "email": "not-an-email", "password": "long-enough-pass1" }),
        None,
    )
    .await;
    assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);
    let json = body_json(bad_email).await;
    assert!(json["error"].as_str().unwrap().contains("email"));

    let short_password = post_json(
        build_offline_app(),
        "/api/v1/auth/register",
        json!({ "full_name": "Eve", "email": "eve@example.com", "password": "short" }),
        None,
    )
    .await;
    assert_eq!(short_password.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_body_is_400_with_json_error() {
    let response = send(
        build_offline_app(),
        Method::POST,
        "/api/v1/auth/login",
        Some(json!({ "email": 42 })),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}
