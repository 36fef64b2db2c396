//! End-to-end scenarios against the router with an in-memory store, a fake
//! gateway and a recording notifier.

use crate::config::AppConfig;
use crate::routes::create_router;
use crate::state::AppState;
use academy_core::testing::FakeGateway;
use academy_core::{
    CourseCatalog, MemoryStore, RecordingNotifier, SharedGateway, StoreHandle,
};
use academy_razorpay::{expected_signature, RazorpayConfig, RazorpayGateway};
use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADMIN_EMAIL: &str = "admin@academy.test";
const ADMIN_PASSWORD: &str = "correct horse";

struct Harness {
    server: TestServer,
    notifier: Arc<RecordingNotifier>,
}

fn test_config() -> AppConfig {
    AppConfig::from_lookup(|name| match name {
        "JWT_SECRET" => Some("test-secret".to_string()),
        "FRONTEND_URL" => Some("https://academy.test".to_string()),
        _ => None,
    })
}

async fn harness_with(store: StoreHandle, gateway: Option<SharedGateway>) -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::from_parts(
        test_config(),
        CourseCatalog::builtin(),
        store.clone(),
        gateway,
        notifier.clone(),
    );
    if store.get().is_some() {
        state.guard.ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    }

    Harness {
        server: TestServer::new(create_router(state)).unwrap(),
        notifier,
    }
}

async fn harness() -> Harness {
    harness_with(
        StoreHandle::connected(Arc::new(MemoryStore::new())),
        Some(Arc::new(FakeGateway::new())),
    )
    .await
}

async fn admin_token(server: &TestServer) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["data"]["token"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn create_order(server: &TestServer, course: &str) -> Value {
    let response = server
        .post("/api/orders/create")
        .json(&json!({
            "name": "A",
            "email": "A@X.com",
            "phone_number": "9999999999",
            "course": course,
        }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

/// The confirmation email is sent from a detached task
async fn wait_for_emails(notifier: &RecordingNotifier, count: usize) -> usize {
    for _ in 0..100 {
        let sent = notifier.sent().await.len();
        if sent >= count {
            return sent;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    notifier.sent().await.len()
}

#[tokio::test]
async fn test_health_reports_dependencies() {
    let h = harness_with(StoreHandle::unavailable("MONGODB_URI not set"), None).await;

    let body = h.server.get("/api/health").await.json::<Value>();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["dependencyState"]["database"], "unavailable");
    assert_eq!(body["dependencyState"]["gateway"], "demo");
    assert_eq!(body["dependencyState"]["mail"], "configured");
}

#[tokio::test]
async fn test_unknown_route_is_enveloped_404() {
    let h = harness().await;

    let response = h.server.get("/api/nope").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>(),
        json!({ "success": false, "error": "Route not found" })
    );
}

#[tokio::test]
async fn test_courses_listed() {
    let h = harness().await;

    let body = h.server.get("/api/courses").await.json::<Value>();
    let courses = body["data"].as_array().unwrap();
    assert_eq!(courses.len(), 6);
    assert!(courses.iter().any(|c| c["id"] == "premium-combo" && c["price"] == 25000));
}

#[tokio::test]
async fn test_order_verify_and_confirmation_email() {
    let h = harness().await;

    let order = create_order(&h.server, "live-workshops").await;
    assert_eq!(order["success"], true);
    assert!(order.get("message").is_none());
    let data = &order["data"];
    assert_eq!(data["amount"], 29900);
    assert_eq!(data["courseName"], "Sunday Live Workshops");
    assert_eq!(data["gatewayPublicKey"], "rzp_test_fake");

    let order_id = data["orderId"].as_str().unwrap();
    let registration_id = data["registrationId"].as_str().unwrap();

    let response = h
        .server
        .post("/api/payments/verify")
        .json(&json!({
            "order_id": order_id,
            "payment_id": "pay_123",
            "signature": FakeGateway::sign(order_id, "pay_123"),
            "registration_id": registration_id,
            "course_id": "live-workshops",
        }))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["data"]["verified"], true);
    assert_eq!(body["data"]["registration"]["status"], "completed");
    assert_eq!(body["data"]["registration"]["payment_id"], "pay_123");
    assert_eq!(body["data"]["registration"]["email"], "a@x.com");

    assert_eq!(wait_for_emails(&h.notifier, 1).await, 1);
    let sent = h.notifier.sent().await;
    assert_eq!(sent[0].to, "a@x.com");
    assert!(sent[0].html.contains("₹299"));
}

#[tokio::test]
async fn test_razorpay_signed_callback_completes_registration() {
    let razorpay = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(basic_auth("rzp_test_key", "rzp_secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "order_Nx1",
            "entity": "order",
            "amount": 29900,
            "currency": "INR",
            "status": "created"
        })))
        .mount(&razorpay)
        .await;

    let config = RazorpayConfig::new("rzp_test_key", "rzp_secret").with_api_base_url(razorpay.uri());
    let gateway = RazorpayGateway::new(config).unwrap();
    let h = harness_with(
        StoreHandle::connected(Arc::new(MemoryStore::new())),
        Some(Arc::new(gateway)),
    )
    .await;
    let token = admin_token(&h.server).await;

    let order = create_order(&h.server, "live-workshops").await;
    assert_eq!(order["data"]["orderId"], "order_Nx1");
    assert_eq!(order["data"]["gatewayPublicKey"], "rzp_test_key");
    let registration_id = order["data"]["registrationId"].as_str().unwrap();

    // One flipped bit in the hex digest is rejected
    let signature = expected_signature("rzp_secret", "order_Nx1", "pay_Ab1");
    let mut tampered = signature.clone().into_bytes();
    tampered[0] ^= 0x01;
    let tampered = String::from_utf8(tampered).unwrap();

    let callback = |signature: &str| {
        json!({
            "order_id": "order_Nx1",
            "payment_id": "pay_Ab1",
            "signature": signature,
            "registration_id": registration_id,
            "course_id": "live-workshops",
        })
    };

    let rejected = h.server.post("/api/payments/verify").json(&callback(&tampered)).await;
    rejected.assert_status(StatusCode::BAD_REQUEST);
    let stored = h
        .server
        .get(&format!("/api/registrations/{registration_id}"))
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(stored["data"]["status"], "pending");

    let accepted = h.server.post("/api/payments/verify").json(&callback(&signature)).await;
    accepted.assert_status_ok();
    let body = accepted.json::<Value>();
    assert_eq!(body["data"]["registration"]["status"], "completed");
    assert_eq!(body["data"]["registration"]["payment_id"], "pay_Ab1");
    assert_eq!(body["data"]["registration"]["order_id"], "order_Nx1");
}

#[tokio::test]
async fn test_wrong_signature_leaves_registration_pending() {
    let h = harness().await;
    let token = admin_token(&h.server).await;

    let order = create_order(&h.server, "live-workshops").await;
    let order_id = order["data"]["orderId"].as_str().unwrap();
    let registration_id = order["data"]["registrationId"].as_str().unwrap();

    let response = h
        .server
        .post("/api/payments/verify")
        .json(&json!({
            "order_id": order_id,
            "payment_id": "pay_123",
            "signature": "0000",
            "registration_id": registration_id,
            "course_id": "live-workshops",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid signature");

    let stored = h
        .server
        .get(&format!("/api/registrations/{registration_id}"))
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(stored["data"]["status"], "pending");
    assert!(h.notifier.sent().await.is_empty());
}

#[tokio::test]
async fn test_verify_requires_all_fields() {
    let h = harness().await;

    let response = h
        .server
        .post("/api/payments/verify")
        .json(&json!({ "order_id": "order_1" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "All payment verification fields are required"
    );
}

#[tokio::test]
async fn test_demo_mode_without_database() {
    let h = harness_with(
        StoreHandle::unavailable("MONGODB_URI not set"),
        Some(Arc::new(FakeGateway::new())),
    )
    .await;

    let order = create_order(&h.server, "premium-combo").await;
    assert_eq!(order["message"], "Demo mode - database not connected");
    assert_eq!(order["data"]["gatewayPublicKey"], "rzp_test_demo");
    assert_eq!(order["data"]["amount"], 2_500_000);
    assert!(order["data"]["registrationId"]
        .as_str()
        .unwrap()
        .starts_with("demo_"));
}

#[tokio::test]
async fn test_demo_mode_without_gateway() {
    let h = harness_with(StoreHandle::connected(Arc::new(MemoryStore::new())), None).await;

    let order = create_order(&h.server, "live-workshops").await;
    assert_eq!(order["message"], "Demo mode - payment gateway not configured");

    let response = h
        .server
        .post("/api/payments/verify")
        .json(&json!({
            "order_id": order["data"]["orderId"],
            "payment_id": "pay_1",
            "signature": "sig",
            "registration_id": order["data"]["registrationId"],
            "course_id": "live-workshops",
        }))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_malformed_json_is_enveloped_400() {
    let h = harness().await;

    let response = h
        .server
        .post("/api/orders/create")
        .bytes(Bytes::from_static(b"{ not json"))
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["success"], false);
}

#[tokio::test]
async fn test_missing_order_fields() {
    let h = harness().await;

    let response = h
        .server
        .post("/api/orders/create")
        .json(&json!({ "name": "A", "email": "a@x.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "All fields are required");
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let h = harness().await;

    let response = h.server.get("/api/registrations").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["success"], false);

    let response = h
        .server
        .get("/api/auth/me")
        .authorization_bearer("not-a-token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_and_me() {
    let h = harness().await;

    let response = h
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "Invalid credentials");

    let token = admin_token(&h.server).await;
    let me = h
        .server
        .get("/api/auth/me")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(me["data"]["email"], ADMIN_EMAIL);
    assert!(me["data"].get("password_hash").is_none());

    let logout = h.server.post("/api/auth/logout").await.json::<Value>();
    assert_eq!(logout["message"], "Logged out successfully");
}

#[tokio::test]
async fn test_registration_paging() {
    let h = harness().await;
    let token = admin_token(&h.server).await;

    for i in 1..=25 {
        h.server
            .post("/api/registrations")
            .json(&json!({
                "name": format!("r{:02}", i),
                "email": format!("r{i}@x.com"),
                "phone_number": "9999999999",
                "course": "digital-growth",
                "amount": 499_900,
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let body = h
        .server
        .get("/api/registrations")
        .add_query_param("page", 2)
        .add_query_param("limit", 10)
        .authorization_bearer(&token)
        .await
        .json::<Value>();

    let page = &body["data"];
    assert_eq!(page["total"], 25);
    assert_eq!(page["page"], 2);
    assert_eq!(page["limit"], 10);
    assert_eq!(page["totalPages"], 3);

    let names: Vec<&str> = page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 10);
    assert_eq!(names[0], "r15");
    assert_eq!(names[9], "r06");

    let beyond = h
        .server
        .get("/api/registrations")
        .add_query_param("page", "18446744073709551615")
        .add_query_param("limit", 10)
        .authorization_bearer(&token)
        .await;
    beyond.assert_status_ok();
    let beyond = beyond.json::<Value>();
    assert!(beyond["data"]["data"].as_array().unwrap().is_empty());
    assert_eq!(beyond["data"]["totalPages"], 3);

    let count = h
        .server
        .get("/api/registrations/count")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(count["data"]["count"], 25);
}

#[tokio::test]
async fn test_stats_and_revenue() {
    let h = harness().await;
    let token = admin_token(&h.server).await;

    let order = create_order(&h.server, "live-workshops").await;
    let order_id = order["data"]["orderId"].as_str().unwrap();
    h.server
        .post("/api/payments/verify")
        .json(&json!({
            "order_id": order_id,
            "payment_id": "pay_9",
            "signature": FakeGateway::sign(order_id, "pay_9"),
            "registration_id": order["data"]["registrationId"],
            "course_id": "live-workshops",
        }))
        .await
        .assert_status_ok();
    create_order(&h.server, "premium-combo").await;

    let stats = h
        .server
        .get("/api/registrations/stats")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(stats["data"]["totalRegistrations"], 2);
    assert_eq!(stats["data"]["completed"], 1);
    assert_eq!(stats["data"]["pending"], 1);
    assert_eq!(stats["data"]["totalRevenue"], 29900);

    let revenue = h
        .server
        .get("/api/registrations/revenue")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(revenue["data"]["totalRevenue"], 29900);
    assert_eq!(revenue["data"]["courses"][0]["course"], "live-workshops");
}

#[tokio::test]
async fn test_reset_for_unknown_email_is_generic() {
    let h = harness().await;

    let unknown = h
        .server
        .post("/api/auth/reset-password")
        .json(&json!({ "email": "nobody@x.com" }))
        .await;
    unknown.assert_status_ok();

    let known = h
        .server
        .post("/api/auth/reset-password")
        .json(&json!({ "email": ADMIN_EMAIL }))
        .await;
    known.assert_status_ok();

    assert_eq!(
        unknown.json::<Value>()["message"],
        known.json::<Value>()["message"]
    );
    let sent = h.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].html.contains("https://academy.test/admin/reset-password/"));
}

#[tokio::test]
async fn test_reset_with_bad_token() {
    let h = harness().await;

    let response = h
        .server
        .post("/api/auth/reset-password/deadbeef")
        .json(&json!({ "password": "new-password" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Invalid or expired reset token"
    );
}

#[tokio::test]
async fn test_meeting_link_lifecycle() {
    let h = harness().await;
    let token = admin_token(&h.server).await;

    let missing_url = h
        .server
        .post("/api/meeting-links")
        .authorization_bearer(&token)
        .json(&json!({ "course": "live-workshops" }))
        .await;
    missing_url.assert_status(StatusCode::BAD_REQUEST);

    let created = h
        .server
        .post("/api/meeting-links")
        .authorization_bearer(&token)
        .json(&json!({
            "course": "live-workshops",
            "link": "https://meet.example/live",
            "is_active": false,
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let id = created.json::<Value>()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let active = h.server.get("/api/meeting-links/active").await.json::<Value>();
    assert!(active["data"].as_array().unwrap().is_empty());

    let all = h
        .server
        .get("/api/meeting-links")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(all["data"].as_array().unwrap().len(), 1);

    h.server
        .put(&format!("/api/meeting-links/{id}"))
        .authorization_bearer(&token)
        .json(&json!({ "is_active": true }))
        .await
        .assert_status_ok();
    let active = h.server.get("/api/meeting-links/active").await.json::<Value>();
    assert_eq!(active["data"][0]["kind"], "course");

    h.server
        .delete(&format!("/api/meeting-links/{id}"))
        .authorization_bearer(&token)
        .await
        .assert_status_ok();
    h.server
        .delete(&format!("/api/meeting-links/{id}"))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_cannot_regress_completed() {
    let h = harness().await;
    let token = admin_token(&h.server).await;

    let created = h
        .server
        .post("/api/registrations")
        .json(&json!({
            "name": "B",
            "email": "b@x.com",
            "phone_number": "1",
            "course": "live-workshops",
            "amount": 29900,
        }))
        .await
        .json::<Value>();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    h.server
        .put(&format!("/api/registrations/{id}"))
        .authorization_bearer(&token)
        .json(&json!({ "status": "completed" }))
        .await
        .assert_status_ok();

    h.server
        .put(&format!("/api/registrations/{id}"))
        .authorization_bearer(&token)
        .json(&json!({ "status": "pending" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let cleared = h
        .server
        .delete("/api/registrations")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(cleared["data"]["deletedCount"], 1);
}

#[tokio::test]
async fn test_search_registrations_by_email() {
    let h = harness().await;
    let token = admin_token(&h.server).await;

    create_order(&h.server, "live-workshops").await;
    create_order(&h.server, "premium-combo").await;

    let hits = h
        .server
        .get("/api/registrations/search")
        .add_query_param("email", "a@X.COM")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    let hits = hits["data"].as_array().unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0]["course"], "premium-combo");

    h.server
        .get("/api/registrations/search")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    h.server
        .get("/api/registrations/search")
        .add_query_param("email", "a@x.com")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
