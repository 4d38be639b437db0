//! HTTP tests for booking admission, availability and status changes.
//!
//! The offline tests cover requests that are rejected before any query runs.
//! The end-to-end flows run against PostgreSQL through `DATABASE_URL`.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Days, Local, NaiveDate};
use common::{
    body_json, build_offline_app, build_test_app, get, get_auth, post_json, put_json, send,
    token_for,
};
use serde_json::{json, Value};
use sportsbook_db::models::sport::CreateSport;
use sportsbook_db::repositories::SportRepo;
use sqlx::PgPool;

fn days_from_today(days: u64) -> NaiveDate {
    Local::now().date_naive() + Days::new(days)
}

fn booking_body(date: NaiveDate, time_slot: &str, duration: u8, resources: u32) -> Value {
    json!({
        "facilityId": 1,
        "sportId": 1,
        "date": date.to_string(),
        "timeSlot": time_slot,
        "duration": duration,
        "numberOfResources": resources,
        "numberOfPeople": 2,
        "paymentMode": "Cash",
    })
}

// ---------------------------------------------------------------------------
// Offline: validation and permission failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn booking_requires_authentication() {
    let body = booking_body(days_from_today(3), "10:00", 1, 1);
    let response = post_json(build_offline_app(), "/api/v1/bookings", body, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn booking_duration_above_five_hours_is_rejected() {
    let token = token_for(1, "user");
    let body = booking_body(days_from_today(3), "10:00", 6, 1);
    let response = post_json(build_offline_app(), "/api/v1/bookings", body, Some(&token)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("duration"));
}

#[tokio::test]
async fn booking_in_the_past_is_rejected() {
    let token = token_for(1, "user");
    let yesterday = Local::now().date_naive() - Days::new(1);
    let body = booking_body(yesterday, "10:00", 1, 1);
    let response = post_json(build_offline_app(), "/api/v1/bookings", body, Some(&token)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("past"));
}

#[tokio::test]
async fn booking_off_the_hour_is_rejected() {
    let token = token_for(1, "user");
    let body = booking_body(days_from_today(3), "10:30", 1, 1);
    let response = post_json(build_offline_app(), "/api/v1/bookings", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn slot_report_requires_its_query_parameters() {
    let response = get(build_offline_app(), "/api/v1/bookings/slots?facilityId=1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn slot_report_rejects_zero_resources() {
    let uri = format!(
        "/api/v1/bookings/slots?facilityId=1&sportId=1&date={}&duration=2&resources=0",
        days_from_today(2)
    );
    let response = get(build_offline_app(), &uri).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn regular_user_cannot_change_booking_status() {
    let token = token_for(1, "user");
    let response = put_json(
        build_offline_app(),
        "/api/v1/bookings/1/status",
        json!({ "status": "Cancelled" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn owner_cannot_set_pending() {
    let token = token_for(2, "owner");
    let response = put_json(
        build_offline_app(),
        "/api/v1/bookings/1/status",
        json!({ "status": "Pending" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_status_value_is_400() {
    let token = token_for(9, "admin");
    let response = put_json(
        build_offline_app(),
        "/api/v1/bookings/1/status",
        json!({ "status": "Done" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn facility_with_inverted_hours_is_rejected() {
    let token = token_for(2, "owner");
    let response = post_json(
        build_offline_app(),
        "/api/v1/facilities",
        json!({
            "name": "Arena",
            "address": "1 Main St",
            "sports": [{
                "sport_id": 1,
                "price": 500,
                "resource_count": 2,
                "max_people_per_unit": 4,
                "opening_time": "9:00 PM",
                "closing_time": "09:00"
            }]
        }),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn facility_offering_needs_party_size_limit() {
    let token = token_for(2, "owner");
    let response = post_json(
        build_offline_app(),
        "/api/v1/facilities",
        json!({
            "name": "Arena",
            "address": "1 Main St",
            "sports": [{
                "sport_id": 1,
                "price": 500,
                "resource_count": 2,
                "opening_time": "09:00",
                "closing_time": "21:00"
            }]
        }),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("max_people_per_unit"));
}

#[tokio::test]
async fn search_with_inverted_price_range_is_rejected() {
    let response = get(
        build_offline_app(),
        "/api/v1/facilities/search?min_price=900&max_price=100",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_user_listing_rejects_unknown_role() {
    let token = token_for(9, "admin");
    let response = get_auth(build_offline_app(), "/api/v1/admin/users?role=superuser", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_cannot_delete_themselves() {
    let token = token_for(9, "admin");
    let response = send(
        build_offline_app(),
        Method::DELETE,
        "/api/v1/admin/users/9",
        None,
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// End to end against PostgreSQL
// ---------------------------------------------------------------------------

async fn register(pool: &PgPool, email: &str, role: &str) -> (i64, String) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        json!({
            "full_name": email,
            "email": email,
            "password": "correct-horse-battery",
            "role": role,
        }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    (
        json["user"]["id"].as_i64().unwrap(),
        json["access_token"].as_str().unwrap().to_string(),
    )
}

/// Facility with one sport, 4 resources, open 09:00-21:00 every day.
async fn facility(pool: &PgPool, owner_token: &str) -> (i64, i64) {
    let sport = SportRepo::create(
        pool,
        &CreateSport {
            name: "Badminton".into(),
            description: None,
            image_url: None,
        },
    )
    .await
    .unwrap();

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/facilities",
        json!({
            "name": "Shuttle Hall",
            "address": "12 Court Road",
            "sports": [{
                "sport_id": sport.id,
                "price": 500,
                "resource_count": 4,
                "max_people_per_unit": 4,
                "opening_time": "09:00",
                "closing_time": "9:00 PM",
                "operating_days": "All Days"
            }]
        }),
        Some(owner_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    (body_json(response).await["id"].as_i64().unwrap(), sport.id)
}

fn book(facility_id: i64, sport_id: i64, date: NaiveDate, slot: &str, hours: u8, units: u32) -> Value {
    json!({
        "facilityId": facility_id,
        "sportId": sport_id,
        "date": date.to_string(),
        "timeSlot": slot,
        "duration": hours,
        "numberOfResources": units,
        "numberOfPeople": units,
        "paymentMode": "Online",
    })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn overlapping_booking_is_refused_with_available_count(pool: PgPool) {
    let (_, owner_token) = register(&pool, "owner@example.com", "owner").await;
    let (_, player_token) = register(&pool, "player@example.com", "user").await;
    let (facility_id, sport_id) = facility(&pool, &owner_token).await;
    let date = days_from_today(5);

    let first = post_json(
        build_test_app(pool.clone()),
        "/api/v1/bookings",
        book(facility_id, sport_id, date, "10:00", 2, 3),
        Some(&player_token),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let booking = body_json(first).await;
    assert_eq!(booking["status"], "Confirmed");
    assert_eq!(booking["totalPrice"], 500 * 3 * 2);
    assert_eq!(booking["date"], date.to_string());

    let too_many = post_json(
        build_test_app(pool.clone()),
        "/api/v1/bookings",
        book(facility_id, sport_id, date, "11:00 AM", 1, 2),
        Some(&player_token),
    )
    .await;
    assert_eq!(too_many.status(), StatusCode::CONFLICT);
    let json = body_json(too_many).await;
    assert_eq!(json["code"], "INSUFFICIENT_CAPACITY");
    assert_eq!(json["available"], 1);
    assert_eq!(
        json["error"],
        "Only 1 resources available for selected time slot(s)"
    );

    let fits = post_json(
        build_test_app(pool.clone()),
        "/api/v1/bookings",
        book(facility_id, sport_id, date, "11:00", 1, 1),
        Some(&player_token),
    )
    .await;
    assert_eq!(fits.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn availability_and_slot_report_reflect_bookings(pool: PgPool) {
    let (_, owner_token) = register(&pool, "owner@example.com", "owner").await;
    let (_, player_token) = register(&pool, "player@example.com", "user").await;
    let (facility_id, sport_id) = facility(&pool, &owner_token).await;
    let date = days_from_today(5);

    let created = post_json(
        build_test_app(pool.clone()),
        "/api/v1/bookings",
        book(facility_id, sport_id, date, "10:00", 2, 3),
        Some(&player_token),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let uri = format!(
        "/api/v1/bookings/availability?facilityId={facility_id}&sportId={sport_id}&date={date}"
    );
    let hours = body_json(get(build_test_app(pool.clone()), &uri).await).await;
    assert_eq!(
        hours,
        json!([
            { "timeSlot": "10:00", "bookedResources": 3 },
            { "timeSlot": "11:00", "bookedResources": 3 },
        ])
    );

    let uri = format!(
        "/api/v1/bookings/slots?facilityId={facility_id}&sportId={sport_id}&date={date}&duration=3&resources=2"
    );
    let report = body_json(get(build_test_app(pool.clone()), &uri).await).await;
    assert_eq!(report["capacity"], 4);
    let slots = report["slots"].as_array().unwrap();
    // 09:00 through 18:00 fit a three-hour window before 21:00.
    assert_eq!(slots.len(), 10);
    assert_eq!(slots[0]["timeSlot"], "09:00");
    assert_eq!(slots[0]["label"], "9:00 AM to 12:00 PM");
    assert_eq!(slots[0]["available"], 1);
    assert_eq!(slots[0]["bookable"], false);
    assert_eq!(slots[9]["startHour"], 18);
    assert_eq!(slots[9]["bookable"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_facility_and_sport_are_404(pool: PgPool) {
    let (_, owner_token) = register(&pool, "owner@example.com", "owner").await;
    let (_, player_token) = register(&pool, "player@example.com", "user").await;
    let (facility_id, sport_id) = facility(&pool, &owner_token).await;
    let date = days_from_today(5);

    let missing_facility = post_json(
        build_test_app(pool.clone()),
        "/api/v1/bookings",
        book(facility_id + 1000, sport_id, date, "10:00", 1, 1),
        Some(&player_token),
    )
    .await;
    assert_eq!(missing_facility.status(), StatusCode::NOT_FOUND);
    assert!(body_json(missing_facility).await["error"]
        .as_str()
        .unwrap()
        .starts_with("Facility "));

    let missing_sport = post_json(
        build_test_app(pool.clone()),
        "/api/v1/bookings",
        book(facility_id, sport_id + 1000, date, "10:00", 1, 1),
        Some(&player_token),
    )
    .await;
    assert_eq!(missing_sport.status(), StatusCode::NOT_FOUND);
    assert!(body_json(missing_sport).await["error"]
        .as_str()
        .unwrap()
        .starts_with("FacilitySport "));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn owner_cancels_and_report_counts_confirmed_revenue(pool: PgPool) {
    let (_, owner_token) = register(&pool, "owner@example.com", "owner").await;
    let (_, rival_token) = register(&pool, "rival@example.com", "owner").await;
    let (_, player_token) = register(&pool, "player@example.com", "user").await;
    let (facility_id, sport_id) = facility(&pool, &owner_token).await;
    let date = days_from_today(5);

    let mut ids = Vec::new();
    for slot in ["10:00", "14:00"] {
        let response = post_json(
            build_test_app(pool.clone()),
            "/api/v1/bookings",
            book(facility_id, sport_id, date, slot, 1, 1),
            Some(&player_token),
        )
        .await;
        ids.push(body_json(response).await["id"].as_i64().unwrap());
    }

    let status_uri = format!("/api/v1/bookings/{}/status", ids[0]);
    let foreign = put_json(
        build_test_app(pool.clone()),
        &status_uri,
        json!({ "status": "Cancelled" }),
        &rival_token,
    )
    .await;
    assert_eq!(foreign.status(), StatusCode::FORBIDDEN);

    let cancelled = put_json(
        build_test_app(pool.clone()),
        &status_uri,
        json!({ "status": "Cancelled" }),
        &owner_token,
    )
    .await;
    assert_eq!(cancelled.status(), StatusCode::OK);
    assert_eq!(body_json(cancelled).await["status"], "Cancelled");

    let report = body_json(
        get_auth(
            build_test_app(pool.clone()),
            "/api/v1/bookings/owner/report",
            &owner_token,
        )
        .await,
    )
    .await;
    assert_eq!(report["total_bookings"], 2);
    assert_eq!(report["total_revenue"], 500);

    let mine = body_json(
        get_auth(build_test_app(pool.clone()), "/api/v1/bookings/mine", &player_token).await,
    )
    .await;
    assert_eq!(mine.as_array().unwrap().len(), 2);
    assert_eq!(mine[0]["facilityName"], "Shuttle Hall");
}
