use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use std::sync::Arc;

use crate::{
    auth::{self, AuthSettings},
    cases, categories, clients, import_records, institutions, profiles, summary, transactions,
    users,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub auth: AuthSettings,
}

/// Everything the HTTP layer needs besides the engine.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub auth: AuthSettings,
    /// Origins allowed by CORS. Empty disables cross-origin requests.
    pub cors_origins: Vec<String>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {origin}");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

fn security_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

pub fn router(state: ServerState, cors_origins: &[String]) -> Router {
    let protected = Router::new()
        .route("/users/me", get(users::me))
        .route("/users/me/account", axum::routing::put(users::update_account))
        .route("/admin/check", get(users::admin_check))
        .route("/admin/users", get(users::list).post(users::create))
        .route(
            "/admin/users/{id}",
            get(users::get).put(users::update).delete(users::remove),
        )
        .route("/admin/users/{id}/promote", post(users::promote))
        .route("/admin/users/{id}/demote", post(users::demote))
        .route("/admin/users/{id}/lawyer", post(users::make_lawyer))
        .route("/profiles", get(profiles::list).post(profiles::create))
        .route(
            "/profiles/{id}",
            get(profiles::get).put(profiles::update).delete(profiles::remove),
        )
        .route(
            "/institutions",
            get(institutions::list).post(institutions::create),
        )
        .route("/institutions/recompute", post(institutions::recompute))
        .route(
            "/institutions/{id}",
            get(institutions::get)
                .put(institutions::update)
                .delete(institutions::remove),
        )
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::remove),
        )
        .route(
            "/subcategories",
            get(categories::list_subcategories).post(categories::create_subcategory),
        )
        .route(
            "/subcategories/{id}",
            get(categories::get_subcategory)
                .put(categories::update_subcategory)
                .delete(categories::remove_subcategory),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/installments", post(transactions::installments))
        .route(
            "/transactions/installments/{group}",
            delete(transactions::remove_installments),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::remove),
        )
        .route("/summary", get(summary::get))
        .route("/clients", get(clients::list).post(clients::create))
        .route("/clients/search", get(clients::search))
        .route("/clients/count", get(clients::count))
        .route(
            "/clients/{id}",
            get(clients::get).put(clients::update).delete(clients::remove),
        )
        .route("/cases", get(cases::list).post(cases::create))
        .route("/cases/search", get(cases::search))
        .route("/cases/open-fees", get(cases::open_fees))
        .route("/cases/fees", get(cases::fees))
        .route("/cases/stats", get(cases::stats))
        .route("/cases/client/{id}", get(cases::by_client))
        .route(
            "/cases/{id}",
            get(cases::get).put(cases::update).delete(cases::remove),
        )
        .route("/cases/{id}/fee-payments", post(cases::pay_fee))
        .route(
            "/import-records",
            get(import_records::list).post(import_records::create),
        )
        .route(
            "/import-records/{id}",
            get(import_records::get)
                .put(import_records::update)
                .delete(import_records::remove),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ));

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/users", post(users::register))
        .merge(protected)
        .layer(security_header(header::X_FRAME_OPTIONS, "DENY"))
        .layer(security_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .layer(security_header(
            header::REFERRER_POLICY,
            "strict-origin-when-cross-origin",
        ))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        auth: config.auth,
    };

    axum::serve(listener, router(state, &config.cors_origins)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
