use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{CreateUserCmd, Engine, UserRole};
use migration::MigratorTrait;
use server::{AuthSettings, ServerState, router};

async fn test_state() -> ServerState {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    ServerState {
        engine: Arc::new(engine),
        auth: AuthSettings {
            jwt_secret: "test-secret".to_string(),
            token_ttl_minutes: 60,
        },
    }
}

fn app(state: &ServerState) -> Router {
    router(state.clone(), &["http://localhost:4200".to_string()])
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn sign_up(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/users",
        None,
        Some(json!({
            "name": "Ana Souza",
            "email": email,
            "password": "secret1",
            "password_confirmation": "secret1",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    login(app, email).await
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let state = test_state().await;
    let app = app(&state);

    let (status, _) = send(&app, "GET", "/profiles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/profiles", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let state = test_state().await;
    let app = app(&state);
    sign_up(&app, "ana@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn duplicate_sign_up_conflicts() {
    let state = test_state().await;
    let app = app(&state);
    sign_up(&app, "ana@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({
            "name": "Ana Again",
            "email": "ANA@example.com",
            "password": "secret1",
            "password_confirmation": "secret1",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn me_returns_the_token_owner() {
    let state = test_state().await;
    let app = app(&state);
    let token = sign_up(&app, "ana@example.com").await;

    let (status, body) = send(&app, "GET", "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ana@example.com");
    assert_eq!(body["role"], "common");

    let (_, body) = send(&app, "GET", "/admin/check", Some(&token), None).await;
    assert_eq!(body["is_admin"], false);

    let (status, _) = send(&app, "GET", "/admin/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn booking_flow_updates_balance() {
    let state = test_state().await;
    let app = app(&state);
    let token = sign_up(&app, "ana@example.com").await;

    let (status, profiles) = send(&app, "GET", "/profiles", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let profile_id = profiles[0]["id"].as_str().unwrap().to_string();

    let (status, bank) = send(
        &app,
        "POST",
        "/institutions",
        Some(&token),
        Some(json!({
            "profile_id": profile_id,
            "name": "Bank",
            "kind": "checking",
            "opening_balance_minor": 10000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let bank_id = bank["id"].as_str().unwrap().to_string();

    let (status, category) = send(
        &app,
        "POST",
        "/categories",
        Some(&token),
        Some(json!({ "profile_id": profile_id, "name": "Groceries", "kind": "expense" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_str().unwrap().to_string();

    let (status, tx) = send(
        &app,
        "POST",
        "/transactions",
        Some(&token),
        Some(json!({
            "institution_id": bank_id,
            "category_id": category_id,
            "occurred_on": "2024-03-10",
            "description": "Market",
            "amount_minor": 2550,
            "kind": "expense",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tx["category_name"], "Groceries");
    assert_eq!(tx["profile_id"], profile_id.as_str());

    let (_, bank) = send(
        &app,
        "GET",
        &format!("/institutions/{bank_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(bank["balance_minor"], 7450);

    let (status, summary) = send(
        &app,
        "GET",
        "/summary?from=2024-03-01&to=2024-03-31",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_expense_minor"], 2550);
    assert_eq!(summary["balance_minor"], -2550);

    let tx_id = tx["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/transactions/{tx_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, bank) = send(
        &app,
        "GET",
        &format!("/institutions/{bank_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(bank["balance_minor"], 10000);
}

#[tokio::test]
async fn invalid_transaction_is_unprocessable() {
    let state = test_state().await;
    let app = app(&state);
    let token = sign_up(&app, "ana@example.com").await;
    let (_, profiles) = send(&app, "GET", "/profiles", Some(&token), None).await;
    let profile_id = profiles[0]["id"].as_str().unwrap().to_string();
    let (_, bank) = send(
        &app,
        "POST",
        "/institutions",
        Some(&token),
        Some(json!({ "profile_id": profile_id, "name": "Bank", "kind": "checking" })),
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        "/transactions",
        Some(&token),
        Some(json!({
            "institution_id": bank["id"],
            "occurred_on": "2024-03-10",
            "description": "Market",
            "amount_minor": 0,
            "kind": "expense",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn other_users_rows_are_not_found() {
    let state = test_state().await;
    let app = app(&state);
    let ana = sign_up(&app, "ana@example.com").await;
    let bia = sign_up(&app, "bia@example.com").await;

    let (_, profiles) = send(&app, "GET", "/profiles", Some(&ana), None).await;
    let profile_id = profiles[0]["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "GET",
        &format!("/profiles/{profile_id}"),
        Some(&bia),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn legal_routes_are_for_lawyers() {
    let state = test_state().await;
    state
        .engine
        .provision_user(CreateUserCmd {
            name: "Dra. Lima".to_string(),
            email: "lima@example.com".to_string(),
            password: "secret1".to_string(),
            role: UserRole::Lawyer,
        })
        .await
        .unwrap();
    let app = app(&state);
    let common = sign_up(&app, "ana@example.com").await;
    let lawyer = login(&app, "lima@example.com").await;

    let (status, _) = send(&app, "GET", "/clients", Some(&common), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, client) = send(
        &app,
        "POST",
        "/clients",
        Some(&lawyer),
        Some(json!({ "name": "Carlos Pereira", "tax_id": "123.456.789-00" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let client_id = client["id"].as_str().unwrap().to_string();

    let (status, case) = send(
        &app,
        "POST",
        "/cases",
        Some(&lawyer),
        Some(json!({
            "client_id": client_id,
            "process_number": "0001234-56.2024.8.26.0100",
            "description": "Labor claim over unpaid overtime",
            "start_date": "2024-02-01",
            "fee_minor": 500000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(case["status"], "active");
    assert_eq!(case["remaining_fee_minor"], 500000);

    let case_id = case["id"].as_str().unwrap();
    let (status, case) = send(
        &app,
        "POST",
        &format!("/cases/{case_id}/fee-payments"),
        Some(&lawyer),
        Some(json!({ "amount_minor": 200000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(case["fees_paid_minor"], 200000);

    let (_, totals) = send(&app, "GET", "/cases/fees", Some(&lawyer), None).await;
    assert_eq!(totals["remaining_minor"], 300000);

    let (_, count) = send(&app, "GET", "/clients/count", Some(&lawyer), None).await;
    assert_eq!(count["count"], 1);

    let (_, found) = send(&app, "GET", "/clients/search?q=pereira", Some(&lawyer), None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/clients/{client_id}"),
        Some(&lawyer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let state = test_state().await;
    let app = app(&state);
    let request = Request::builder()
        .uri("/profiles")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}
