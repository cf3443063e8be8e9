//! In-process scenario tests for the StockHub HTTP API.
//!
//! Each test builds the router over a fresh in-memory database and drives it
//! with `tower::ServiceExt::oneshot`; no socket is bound.

use std::sync::Arc;
use std::task::Poll;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use futures_util::poll;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use stockhub_core::cart::SessionState;
use stockhub_db::{Database, DbConfig};
use stockhub_server::broadcast::Advisory;
use stockhub_server::{build_router, AppState, ServerConfig};
use tower::ServiceExt; // oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PASSWORD: &str = "harbor-pass-1";

struct TestApp {
    router: axum::Router,
    state: Arc<AppState>,
}

async fn make_app() -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.expect("in-memory db");
    let mut config = ServerConfig::default();
    config.auth.jwt_secret = "scenario-test-secret-0123456789".to_string();

    let state = Arc::new(AppState::new(db, config));
    TestApp {
        router: build_router(Arc::clone(&state)),
        state,
    }
}

impl TestApp {
    /// Drives one request; an empty body comes back as `Value::Null`.
    async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = self.router.clone().oneshot(req).await.expect("oneshot failed");
        let status = resp.status();
        let bytes = resp
            .into_body()
            .collect()
            .await
            .expect("body collect failed")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body is not valid JSON")
        };
        (status, json)
    }

    async fn login(&self, org: &str, username: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/v1/auth/login",
                None,
                Some(json!({ "organizationId": org, "username": username, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["accessToken"].as_str().unwrap().to_string()
    }
}

/// An organization with two outlets, one stock-tracked and one
/// continuous-supply item, an admin and a cashier pinned to the first outlet.
struct Harbor {
    org: String,
    admin: String,
    cashier: String,
    beach_road: String,
    anna_nagar: String,
    prawn: String,
    parotta: String,
}

async fn setup_harbor(app: &TestApp) -> Harbor {
    let (status, body) = app
        .send(
            "POST",
            "/v1/organizations",
            None,
            Some(json!({
                "name": "Harbor Kitchens",
                "adminFullName": "Harbor Admin",
                "adminUsername": "admin",
                "adminPassword": PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let org = body["organization"]["id"].as_str().unwrap().to_string();
    assert!(body["admin"].get("passwordHash").is_none());

    let admin = app.login(&org, "admin").await;

    let mut outlet_ids = Vec::new();
    for name in ["Beach Road", "Anna Nagar"] {
        let (status, body) = app
            .send("POST", "/v1/outlets", Some(&admin), Some(json!({ "name": name, "tableCount": 12 })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        outlet_ids.push(body["id"].as_str().unwrap().to_string());
    }

    let (_, prawn) = app
        .send(
            "POST",
            "/v1/menu",
            Some(&admin),
            Some(json!({
                "name": "Prawn Fry",
                "category": "Seafood",
                "basePriceCents": 42000,
                "isMarketPriced": true,
                "requiresDailyStock": true,
            })),
        )
        .await;
    let (_, parotta) = app
        .send(
            "POST",
            "/v1/menu",
            Some(&admin),
            Some(json!({
                "name": "Parotta",
                "category": "Breads",
                "unit": "pcs",
                "basePriceCents": 3000,
            })),
        )
        .await;

    let (status, body) = app
        .send(
            "POST",
            "/v1/profiles",
            Some(&admin),
            Some(json!({
                "fullName": "Beach Road Cashier",
                "username": "cashier1",
                "password": PASSWORD,
                "role": "staff",
                "outletId": outlet_ids[0],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let cashier = app.login(&org, "cashier1").await;

    Harbor {
        org,
        admin,
        cashier,
        beach_road: outlet_ids[0].clone(),
        anna_nagar: outlet_ids[1].clone(),
        prawn: prawn["id"].as_str().unwrap().to_string(),
        parotta: parotta["id"].as_str().unwrap().to_string(),
    }
}

async fn set_master(app: &TestApp, h: &Harbor, quantity: i64, price: Option<i64>) -> Value {
    let (status, body) = app
        .send(
            "PUT",
            "/v1/stock/master",
            Some(&h.admin),
            Some(json!({
                "items": [{ "menuItemId": h.prawn, "totalQuantity": quantity, "dailyPriceCents": price }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

async fn distribute(app: &TestApp, h: &Harbor, outlet: &str, item: &str, delta: i64) -> Value {
    let (status, body) = app
        .send(
            "POST",
            "/v1/stock/distribute",
            Some(&h.admin),
            Some(json!({ "outletId": outlet, "adjustments": { item: delta } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

fn cart_uri(outlet: &str) -> String {
    format!("/v1/pos/{}/cart/items", outlet)
}

// ---------------------------------------------------------------------------
// Health & auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200_with_database_up() {
    let app = make_app().await;
    let (status, body) = app.send("GET", "/v1/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["database"], true);
    assert_eq!(body["service"], "stockhub-server");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = make_app().await;

    let (status, body) = app.send("GET", "/v1/outlets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.send("GET", "/v1/auth/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_wrong_password_and_me_reports_session() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;

    let (status, body) = app
        .send(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "organizationId": h.org, "username": "admin", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, me) = app.send("GET", "/v1/auth/me", Some(&h.cashier), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "staff");
    assert_eq!(me["organizationId"], h.org);
    assert_eq!(me["outletId"], h.beach_road);
}

#[tokio::test]
async fn staff_is_pinned_and_cannot_administer() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;

    let (status, body) = app
        .send(
            "POST",
            "/v1/stock/distribute",
            Some(&h.cashier),
            Some(json!({ "outletId": h.beach_road, "adjustments": { h.prawn.as_str(): 5 } })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = app
        .send("GET", &format!("/v1/pos/{}/cart", h.anna_nagar), Some(&h.cashier), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("GET", "/v1/reports/daily", Some(&h.cashier), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("POST", "/v1/admin/reset", Some(&h.cashier), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;

    let (status, body) = app
        .send(
            "POST",
            "/v1/profiles",
            Some(&h.admin),
            Some(json!({
                "fullName": "Someone Else",
                "username": "cashier1",
                "password": PASSWORD,
                "role": "staff",
                "outletId": h.anna_nagar,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn deactivated_profile_loses_its_session() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;

    let (_, me) = app.send("GET", "/v1/auth/me", Some(&h.cashier), None).await;
    let cashier_id = me["userId"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            "PUT",
            &format!("/v1/profiles/{}", cashier_id),
            Some(&h.admin),
            Some(json!({ "role": "inactive" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, _) = app.send("GET", "/v1/auth/me", Some(&h.cashier), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Stock hub
// ---------------------------------------------------------------------------

#[tokio::test]
async fn distribution_beyond_master_is_rejected_with_max_adjustment() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;
    set_master(&app, &h, 100, None).await;

    let first = distribute(&app, &h, &h.beach_road, &h.prawn, 40).await;
    assert_eq!(first["written"], 1);
    distribute(&app, &h, &h.anna_nagar, &h.prawn, 30).await;

    let rejected = distribute(&app, &h, &h.beach_road, &h.prawn, 40).await;
    assert_eq!(rejected["written"], 0);
    assert_eq!(rejected["results"][0]["status"], "rejected");
    assert!(rejected["results"][0]["reason"]
        .as_str()
        .unwrap()
        .contains("max adjustment 30"));

    let (status, hub) = app.send("GET", "/v1/stock/hub", Some(&h.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let prawn = hub["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["menuItemId"] == h.prawn.as_str())
        .unwrap();
    assert_eq!(prawn["distributed"], 70);
    assert_eq!(prawn["remainingInMaster"], 30);
}

#[tokio::test]
async fn signed_adjustments_net_out() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;
    set_master(&app, &h, 100, None).await;

    distribute(&app, &h, &h.beach_road, &h.prawn, 20).await;
    let reduced = distribute(&app, &h, &h.beach_road, &h.prawn, -5).await;
    assert_eq!(reduced["results"][0]["status"], "written");
    assert_eq!(reduced["results"][0]["quantity"], -5);

    let too_far = distribute(&app, &h, &h.beach_road, &h.prawn, -50).await;
    assert_eq!(too_far["results"][0]["status"], "rejected");

    let (_, stock) = app
        .send("GET", &format!("/v1/pos/{}/stock", h.beach_road), Some(&h.cashier), None)
        .await;
    let prawn = stock["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["menuItemId"] == h.prawn.as_str())
        .unwrap();
    assert_eq!(prawn["stock"], json!({ "kind": "limited", "quantity": 15 }));
}

#[tokio::test]
async fn zero_master_stock_removes_item_from_distribution_list() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;

    let item_ids = |body: &Value| -> Vec<String> {
        body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["menuItemId"].as_str().unwrap().to_string())
            .collect()
    };

    let (_, before) = app
        .send("GET", "/v1/stock/distribution/items", Some(&h.admin), None)
        .await;
    assert_eq!(item_ids(&before), vec![h.parotta.clone()]);

    set_master(&app, &h, 50, None).await;
    let (_, with_master) = app
        .send("GET", "/v1/stock/distribution/items", Some(&h.admin), None)
        .await;
    assert!(item_ids(&with_master).contains(&h.prawn));

    let deleted = set_master(&app, &h, 0, None).await;
    assert_eq!(deleted["results"][0]["status"], "deleted");

    let (_, after) = app
        .send("GET", "/v1/stock/distribution/items", Some(&h.admin), None)
        .await;
    assert!(!item_ids(&after).contains(&h.prawn));
}

#[tokio::test]
async fn negative_master_quantity_is_rejected_per_item() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;

    let body = set_master(&app, &h, -3, None).await;
    assert_eq!(body["results"][0]["status"], "rejected");
}

#[tokio::test]
async fn distribution_publishes_stock_available_advisory() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;
    set_master(&app, &h, 100, None).await;

    let mut advisories = app.state.broadcaster.subscribe();
    let mut changes = app.state.db.changes().subscribe();

    distribute(&app, &h, &h.anna_nagar, &h.prawn, 10).await;

    let message = advisories.recv().await.unwrap();
    assert_eq!(message.organization_id, h.org);
    assert_eq!(
        message.advisory,
        Advisory::StockAvailable {
            outlet_id: h.anna_nagar.clone()
        }
    );

    let change = changes.recv().await.unwrap();
    assert_eq!(change.table.as_str(), "daily_stocks");
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn terminal_is_locked_until_first_distribution() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;

    let (_, stock) = app
        .send("GET", &format!("/v1/pos/{}/stock", h.beach_road), Some(&h.cashier), None)
        .await;
    assert_eq!(stock["locked"], true);

    let (status, body) = app
        .send(
            "POST",
            &cart_uri(&h.beach_road),
            Some(&h.cashier),
            Some(json!({ "menuItemId": h.parotta })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "TERMINAL_LOCKED");

    distribute(&app, &h, &h.beach_road, &h.parotta, 1).await;

    let (status, cart) = app
        .send(
            "POST",
            &cart_uri(&h.beach_road),
            Some(&h.cashier),
            Some(json!({ "menuItemId": h.parotta })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["state"], "building");
}

#[tokio::test]
async fn sale_reduces_live_stock_and_cart_respects_on_ground() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;
    set_master(&app, &h, 100, Some(55000)).await;
    distribute(&app, &h, &h.beach_road, &h.prawn, 40).await;

    for _ in 0..15 {
        let (status, _) = app
            .send("POST", &cart_uri(&h.beach_road), Some(&h.cashier), Some(json!({ "menuItemId": h.prawn })))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, settled) = app
        .send(
            "POST",
            &format!("/v1/pos/{}/settle", h.beach_road),
            Some(&h.cashier),
            Some(json!({ "paymentMethod": "upi" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{settled}");
    assert_eq!(settled["transaction"]["totalAmountCents"], 15 * 55000);
    assert_eq!(settled["transaction"]["isPaid"], true);
    assert_eq!(settled["lines"][0]["unitPriceCents"], 55000);
    assert_eq!(settled["cart"]["state"], "idle");
    assert_eq!(settled["cart"]["lastOutcome"]["result"], "success");
    assert!(settled["lowStock"].as_array().unwrap().is_empty());

    let (_, stock) = app
        .send("GET", &format!("/v1/pos/{}/stock", h.beach_road), Some(&h.cashier), None)
        .await;
    let prawn = stock["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["menuItemId"] == h.prawn.as_str())
        .unwrap()
        .clone();
    assert_eq!(prawn["stock"]["quantity"], 25);

    for _ in 0..25 {
        let (status, _) = app
            .send("POST", &cart_uri(&h.beach_road), Some(&h.cashier), Some(json!({ "menuItemId": h.prawn })))
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = app
        .send("POST", &cart_uri(&h.beach_road), Some(&h.cashier), Some(json!({ "menuItemId": h.prawn })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "OUT_OF_STOCK");

    // Continuous-supply items are never limited.
    let (status, cart) = app
        .send("POST", &cart_uri(&h.beach_road), Some(&h.cashier), Some(json!({ "menuItemId": h.parotta })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["itemCount"], 2);
}

#[tokio::test]
async fn settlement_raises_low_stock_advisory() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;
    set_master(&app, &h, 100, None).await;
    distribute(&app, &h, &h.beach_road, &h.prawn, 12).await;

    let mut advisories = app.state.broadcaster.subscribe();

    for _ in 0..3 {
        app.send("POST", &cart_uri(&h.beach_road), Some(&h.cashier), Some(json!({ "menuItemId": h.prawn })))
            .await;
    }
    let (status, settled) = app
        .send(
            "POST",
            &format!("/v1/pos/{}/settle", h.beach_road),
            Some(&h.cashier),
            Some(json!({ "paymentMethod": "cash" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settled["lowStock"][0]["remaining"], 9);

    let message = advisories.recv().await.unwrap();
    match message.advisory {
        Advisory::LowStock {
            outlet_id,
            menu_item_id,
            remaining,
            ..
        } => {
            assert_eq!(outlet_id, h.beach_road);
            assert_eq!(menu_item_id, h.prawn);
            assert_eq!(remaining, 9);
        }
        other => panic!("unexpected advisory: {other:?}"),
    }
}

#[tokio::test]
async fn empty_cart_cannot_settle_and_remove_clears_lines() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;
    distribute(&app, &h, &h.beach_road, &h.parotta, 1).await;

    let settle_uri = format!("/v1/pos/{}/settle", h.beach_road);
    let (status, body) = app
        .send("POST", &settle_uri, Some(&h.cashier), Some(json!({ "paymentMethod": "card" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "CART_ERROR");

    app.send("POST", &cart_uri(&h.beach_road), Some(&h.cashier), Some(json!({ "menuItemId": h.parotta })))
        .await;
    let (status, cart) = app
        .send(
            "DELETE",
            &format!("/v1/pos/{}/cart/items/{}", h.beach_road, h.parotta),
            Some(&h.cashier),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["state"], "idle");
    assert_eq!(cart["itemCount"], 0);

    let (status, body) = app
        .send(
            "DELETE",
            &format!("/v1/pos/{}/cart/items/{}", h.beach_road, h.parotta),
            Some(&h.cashier),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "CART_ERROR");
}

#[tokio::test]
async fn carts_are_separate_per_user() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;
    distribute(&app, &h, &h.beach_road, &h.parotta, 1).await;

    app.send("POST", &cart_uri(&h.beach_road), Some(&h.cashier), Some(json!({ "menuItemId": h.parotta })))
        .await;

    let (_, admin_cart) = app
        .send("GET", &format!("/v1/pos/{}/cart", h.beach_road), Some(&h.admin), None)
        .await;
    assert_eq!(admin_cart["itemCount"], 0);

    let (status, cleared) = app
        .send("DELETE", &format!("/v1/pos/{}/cart", h.beach_road), Some(&h.cashier), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["totalQuantity"], 0);
}

#[tokio::test]
async fn settle_charges_daily_price_set_after_add() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;
    set_master(&app, &h, 100, None).await;
    distribute(&app, &h, &h.beach_road, &h.prawn, 10).await;

    let (status, cart) = app
        .send("POST", &cart_uri(&h.beach_road), Some(&h.cashier), Some(json!({ "menuItemId": h.prawn })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["lines"][0]["unitPriceCents"], 42000);

    set_master(&app, &h, 100, Some(50000)).await;

    let (status, settled) = app
        .send(
            "POST",
            &format!("/v1/pos/{}/settle", h.beach_road),
            Some(&h.cashier),
            Some(json!({ "paymentMethod": "card" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{settled}");
    assert_eq!(settled["lines"][0]["unitPriceCents"], 50000);
    assert_eq!(settled["lines"][0]["subtotalCents"], 50000);
    assert_eq!(settled["transaction"]["totalAmountCents"], 50000);
}

#[tokio::test]
async fn settlement_finishes_when_client_disconnects() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;
    set_master(&app, &h, 100, None).await;
    distribute(&app, &h, &h.beach_road, &h.prawn, 10).await;

    let (_, me) = app.send("GET", "/v1/auth/me", Some(&h.cashier), None).await;
    let cashier_id = me["userId"].as_str().unwrap().to_string();
    let session_state = || {
        app.state
            .terminals
            .with_session(&h.beach_road, &cashier_id, |s| s.state())
    };

    for _ in 0..2 {
        let (status, _) = app
            .send("POST", &cart_uri(&h.beach_road), Some(&h.cashier), Some(json!({ "menuItemId": h.prawn })))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let req = Request::builder()
        .method("POST")
        .uri(format!("/v1/pos/{}/settle", h.beach_road))
        .header(header::AUTHORIZATION, format!("Bearer {}", h.cashier))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "paymentMethod": "cash" }).to_string()))
        .unwrap();

    // Drive the request until the session is mid-settlement, then drop it
    // as hyper does when the client goes away.
    let mut request = Box::pin(app.router.clone().oneshot(req));
    for _ in 0..2_000 {
        if let Poll::Ready(_) = poll!(&mut request) {
            break;
        }
        if session_state() == SessionState::Settling {
            break;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    drop(request);

    let mut state = session_state();
    for _ in 0..1_000 {
        if state != SessionState::Settling {
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
        state = session_state();
    }
    assert_eq!(state, SessionState::Idle);

    let (_, cart) = app
        .send("GET", &format!("/v1/pos/{}/cart", h.beach_road), Some(&h.cashier), None)
        .await;
    assert_eq!(cart["state"], "idle");
    assert_eq!(cart["totalQuantity"], 0);
    assert_eq!(cart["lastOutcome"]["result"], "success");

    let (_, report) = app.send("GET", "/v1/reports/daily", Some(&h.admin), None).await;
    assert_eq!(report["transactionCount"], 1);

    let (status, cart) = app
        .send("POST", &cart_uri(&h.beach_road), Some(&h.cashier), Some(json!({ "menuItemId": h.prawn })))
        .await;
    assert_eq!(status, StatusCode::OK, "{cart}");
    assert_eq!(cart["state"], "building");
}

// ---------------------------------------------------------------------------
// Reports & reset
// ---------------------------------------------------------------------------

#[tokio::test]
async fn daily_report_totals_and_reset() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;
    set_master(&app, &h, 100, None).await;
    distribute(&app, &h, &h.beach_road, &h.prawn, 20).await;

    for item in [&h.prawn, &h.prawn, &h.parotta] {
        app.send("POST", &cart_uri(&h.beach_road), Some(&h.cashier), Some(json!({ "menuItemId": item })))
            .await;
    }
    let (status, _) = app
        .send(
            "POST",
            &format!("/v1/pos/{}/settle", h.beach_road),
            Some(&h.cashier),
            Some(json!({ "paymentMethod": "cash" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, report) = app.send("GET", "/v1/reports/daily", Some(&h.admin), None).await;
    assert_eq!(status, StatusCode::OK, "{report}");
    assert_eq!(report["transactionCount"], 1);
    assert_eq!(report["grandTotalCents"], 2 * 42000 + 3000);
    assert_eq!(report["byOutlet"][0]["outletName"], "Beach Road");
    assert_eq!(report["byItem"][0]["itemName"], "Prawn Fry");
    assert_eq!(report["byItem"][0]["quantity"], 2);

    let (status, _) = app.send("GET", "/v1/reports/daily?date=14-03-2026", Some(&h.admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, summary) = app.send("POST", "/v1/admin/reset", Some(&h.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["masterStocks"], 1);
    assert_eq!(summary["dailyStocks"], 1);
    assert_eq!(summary["transactions"], 1);
    assert_eq!(summary["transactionItems"], 2);

    let (_, report) = app.send("GET", "/v1/reports/daily", Some(&h.admin), None).await;
    assert_eq!(report["transactionCount"], 0);

    let (_, stock) = app
        .send("GET", &format!("/v1/pos/{}/stock", h.beach_road), Some(&h.cashier), None)
        .await;
    assert_eq!(stock["locked"], true);
}

#[tokio::test]
async fn menu_update_and_deactivate() {
    let app = make_app().await;
    let h = setup_harbor(&app).await;

    let (status, updated) = app
        .send(
            "PUT",
            &format!("/v1/menu/{}", h.parotta),
            Some(&h.admin),
            Some(json!({ "name": "Kerala Parotta", "category": "Breads", "unit": "pcs", "basePriceCents": 3500 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Kerala Parotta");
    assert_eq!(updated["isActive"], true);

    let (status, _) = app
        .send("DELETE", &format!("/v1/menu/{}", h.parotta), Some(&h.admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, menu) = app.send("GET", "/v1/menu", Some(&h.cashier), None).await;
    assert_eq!(menu.as_array().unwrap().len(), 1);

    let (_, all) = app
        .send("GET", "/v1/menu?includeInactive=true", Some(&h.admin), None)
        .await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, body) = app
        .send("PUT", "/v1/menu/no-such-item", Some(&h.admin), Some(json!({ "name": "X", "category": "Y", "basePriceCents": 1 })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
