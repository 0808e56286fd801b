use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

#[macro_use]
mod common;

use common::TestContext;

// Creates a shift over HTTP and yields the `data` of the 201 response.
macro_rules! create_shift {
    ($app:expr, $ctx:expr, $owner:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/shifts")
            .insert_header($ctx.auth_header($owner))
            .set_json($body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body["data"].clone()
    }};
}

#[actix_web::test]
async fn health_reports_ok() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn requests_without_valid_token_are_unauthorized() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);
    let user = Uuid::new_v4();

    let req = test::TestRequest::get()
        .uri(&format!("/api/shifts?userId={}", user))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/shifts?userId={}", user))
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn create_returns_shift_with_derived_state() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);
    let owner = Uuid::new_v4();

    let shift = create_shift!(app, ctx, owner, ctx.shift_body("2025-06-17", "09:00", "17:00"));

    assert_eq!(shift["ownerUserId"], owner.to_string());
    assert_eq!(shift["startTime"], "09:00");
    assert_eq!(shift["finishTime"], "17:00");
    assert_eq!(shift["numOfShiftsPerDay"], 1);
    assert_eq!(shift["isClockedIn"], false);
    assert_eq!(shift["totalHoursWorked"], 0);
    assert_eq!(shift["status"], "scheduled");
    assert_eq!(shift["canClockIn"], false);
    assert_eq!(shift["canClockOut"], false);
    assert_eq!(shift["minutesRemaining"], 600);
}

#[actix_web::test]
async fn shift_responses_embed_the_location() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);
    let owner = Uuid::new_v4();

    let shift = create_shift!(app, ctx, owner, ctx.shift_body("2025-06-17", "09:00", "17:00"));
    assert_eq!(shift["locationId"], ctx.location.id.to_string());
    assert_eq!(shift["location"]["name"], "Harbor Street Store");
    assert_eq!(shift["location"]["postCode"], "02110");

    let req = test::TestRequest::get()
        .uri(&format!("/api/shifts/{}", shift["id"].as_str().unwrap()))
        .insert_header(ctx.auth_header(owner))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["location"]["id"], ctx.location.id.to_string());
    assert_eq!(body["data"]["location"]["address"], "12 Harbor St");
}

#[actix_web::test]
async fn create_lists_every_missing_field() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/shifts")
        .insert_header(ctx.auth_header(Uuid::new_v4()))
        .set_json(json!({ "startTime": "09:00", "finishTime": "17:00", "date": "2025-06-17" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "Validation error: Missing required fields: title, role, locationId"
    );
}

#[actix_web::test]
async fn create_rejects_invalid_schedules() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);
    let owner = Uuid::new_v4();

    let cases = vec![
        (
            ctx.shift_body("2025-06-17", "17:00", "09:00"),
            "Finish time must be after start time",
        ),
        (
            ctx.shift_body("2025-06-17", "09:00", "09:00"),
            "Finish time must be after start time",
        ),
        (
            ctx.shift_body("2025-06-16", "09:00", "17:00"),
            "Date cannot be in the past",
        ),
        (
            ctx.shift_body("2025-06-17", "9am", "17:00"),
            "startTime must be a time in HH:MM format",
        ),
        (
            common::shift_body(Uuid::new_v4(), "2025-06-17", "09:00", "17:00"),
            "Location not found",
        ),
    ];

    for (body, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/api/shifts")
            .insert_header(ctx.auth_header(owner))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], format!("Validation error: {}", expected));
    }
}

#[actix_web::test]
async fn malformed_json_uses_error_envelope() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/shifts")
        .insert_header(ctx.auth_header(Uuid::new_v4()))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn shifts_of_other_users_are_not_found() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);
    let owner = Uuid::new_v4();
    let shift = create_shift!(app, ctx, owner, ctx.shift_body("2025-06-17", "09:00", "17:00"));
    let uri = format!("/api/shifts/{}", shift["id"].as_str().unwrap());

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(ctx.auth_header(Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(ctx.auth_header(Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(ctx.auth_header(owner))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn malformed_shift_id_is_a_bad_request() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/shifts/not-a-uuid")
        .insert_header(ctx.auth_header(Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Validation error: Invalid shift ID");
}

#[actix_web::test]
async fn listing_is_restricted_to_the_caller() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);
    let owner = Uuid::new_v4();

    for (start, finish) in [("13:00", "17:00"), ("08:00", "12:00")] {
        create_shift!(app, ctx, owner, ctx.shift_body("2025-06-17", start, finish));
    }
    create_shift!(app, ctx, Uuid::new_v4(), ctx.shift_body("2025-06-17", "09:00", "10:00"));

    let req = test::TestRequest::get()
        .uri(&format!("/api/shifts?userId={}", owner))
        .insert_header(ctx.auth_header(owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let starts: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["startTime"].as_str().unwrap())
        .collect();
    assert_eq!(starts, vec!["08:00", "13:00"]);
    assert_eq!(body["data"][0]["location"]["name"], "Harbor Street Store");

    let req = test::TestRequest::get()
        .uri(&format!("/api/shifts?userId={}", Uuid::new_v4()))
        .insert_header(ctx.auth_header(owner))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/shifts")
        .insert_header(ctx.auth_header(owner))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/shifts?userId=42")
        .insert_header(ctx.auth_header(owner))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn shifts_can_be_edited_only_while_scheduled() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);
    let owner = Uuid::new_v4();
    let shift = create_shift!(app, ctx, owner, ctx.shift_body("2025-06-17", "09:00", "17:00"));
    let uri = format!("/api/shifts/{}", shift["id"].as_str().unwrap());

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(ctx.auth_header(owner))
        .set_json(json!({ "finishTime": "18:30", "role": "Supervisor" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["finishTime"], "18:30");
    assert_eq!(body["data"]["role"], "Supervisor");
    assert_eq!(body["data"]["title"], shift["title"]);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(ctx.auth_header(owner))
        .set_json(json!({ "startTime": "19:00" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    ctx.set_time(9, 30);
    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(ctx.auth_header(owner))
        .set_json(json!({ "title": "Too late" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("Only scheduled shifts")
    );
}

#[actix_web::test]
async fn deleted_shift_is_gone() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);
    let owner = Uuid::new_v4();
    let shift = create_shift!(app, ctx, owner, ctx.shift_body("2025-06-18", "09:00", "17:00"));
    let uri = format!("/api/shifts/{}", shift["id"].as_str().unwrap());

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(ctx.auth_header(owner))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(ctx.auth_header(owner))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(ctx.shifts.len().await, 0);
}

#[actix_web::test]
async fn batch_create_reports_partial_failures() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);
    let owner = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/api/shifts/batch")
        .insert_header(ctx.auth_header(owner))
        .set_json(json!({
            "shifts": [
                ctx.shift_body("2025-06-17", "09:00", "17:00"),
                ctx.shift_body("2025-06-17", "12:00", "11:00"),
                ctx.shift_body("2025-06-18", "09:00", "17:00"),
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["data"]["summary"],
        json!({ "total": 3, "successful": 2, "failed": 1 })
    );
    let failed = &body["data"]["results"][1];
    assert_eq!(failed["index"], 1);
    assert_eq!(failed["success"], false);
    assert_eq!(
        failed["error"],
        "Validation error: Finish time must be after start time"
    );
    assert_eq!(ctx.shifts.len().await, 2);
}

#[actix_web::test]
async fn batch_requires_a_non_empty_list() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);

    for body in [json!({ "shifts": [] }), json!({})] {
        let req = test::TestRequest::post()
            .uri("/api/shifts/batch")
            .insert_header(ctx.auth_header(Uuid::new_v4()))
            .set_json(body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn batch_update_reports_each_id() {
    let ctx = TestContext::new_york(7, 0);
    let app = init_app!(ctx);
    let owner = Uuid::new_v4();
    let shift = create_shift!(app, ctx, owner, ctx.shift_body("2025-06-17", "09:00", "17:00"));
    let missing = Uuid::new_v4().to_string();

    let req = test::TestRequest::put()
        .uri("/api/shifts/batch")
        .insert_header(ctx.auth_header(owner))
        .set_json(json!({
            "shifts": [
                { "id": shift["id"], "title": "Inventory count" },
                { "id": missing, "title": "Ghost" },
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let results = &body["data"]["results"];
    assert_eq!(results[0]["id"], shift["id"]);
    assert_eq!(results[0]["shift"]["title"], "Inventory count");
    assert_eq!(results[1]["id"], missing.as_str());
    assert_eq!(results[1]["error"], "Not found: Shift not found");
    assert_eq!(
        body["data"]["summary"],
        json!({ "total": 2, "successful": 1, "failed": 1 })
    );
}

#[actix_web::test]
async fn locations_are_listed_by_name() {
    let ctx = TestContext::new_york(7, 0);
    ctx.locations
        .add(shiftclock::database::models::Location::new("Airport Kiosk", None))
        .await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/api/locations")
        .insert_header(ctx.auth_header(Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Airport Kiosk", "Harbor Street Store"]);
}
