//! Ledger HTTP application wiring.
//!
//! # Purpose
//! Builds the axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! The store, mailer, and signature store are constructed once at startup and
//! injected as trait objects, so tests swap in fakes without touching the
//! routes. CORS stays open to any origin: the kiosk page is served from a
//! different host than the API.
use crate::api;
use crate::mail::Mailer;
use crate::signatures::SignatureStore;
use crate::store::VisitorStore;
use axum::routing::{get, post};
use axum::Router;
use chrono_tz::Tz;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Which required configuration was present at startup, echoed by `/health`.
#[derive(Clone, Copy, Debug)]
pub struct EnvDiagnostics {
    pub database_url: bool,
    pub smtp_pass: bool,
    pub cron_secret: bool,
    pub bucket_key: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VisitorStore>,
    pub mailer: Arc<dyn Mailer>,
    pub signatures: Arc<dyn SignatureStore>,
    pub display_tz: Tz,
    pub admin_email: String,
    pub cron_secret: Option<String>,
    pub diagnostics: EnvDiagnostics,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/referees",
            get(api::referees::list_referees)
                .post(api::referees::create_referee)
                .delete(api::referees::delete_referee)
                .fallback(api::method_not_allowed),
        )
        .route(
            "/visit",
            get(api::visits::list_visits)
                .post(api::visits::check_in)
                .put(api::visits::check_out)
                .fallback(api::method_not_allowed),
        )
        .route(
            "/code-login",
            post(api::code_login::code_login).fallback(api::method_not_allowed),
        )
        .route(
            "/cron-alert",
            get(api::cron::presence_alert).fallback(api::method_not_allowed),
        )
        .route(
            "/health",
            get(api::system::health).fallback(api::method_not_allowed),
        )
        .fallback(api::route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
