//! ShiftTrack HTTP server (Axum + SQLite).

pub mod error;
pub mod routes;
pub mod storage;

use axum::{
    Router,
    extract::FromRef,
    routing::{delete, get, post, put},
};
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use shifttrack_config::ServerConfig;
use shifttrack_core::WeekStart;
use storage::Db;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: AppConfig,
}

/// The slice of [`ServerConfig`] handlers need at request time.
#[derive(Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub jwt_secret: String,
    pub registration_open: bool,
    pub week_starts_on: WeekStart,
    pub join_code_length: usize,
}

impl From<&ServerConfig> for AppConfig {
    fn from(cfg: &ServerConfig) -> Self {
        Self {
            base_url: cfg.server.base_url(),
            jwt_secret: cfg.auth.jwt_secret.clone(),
            registration_open: cfg.auth.registration_open,
            week_starts_on: cfg.scheduling.week_starts_on,
            join_code_length: cfg.scheduling.join_code_length,
        }
    }
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

/// Build the axum Router with all API routes and middleware.
/// `web_dir` is served as a SPA fallback when it exists.
pub fn build_router(state: AppState, web_dir: Option<&Path>) -> Router {
    use routes::{auth, availability, health, members, schedules, shifts, stores};

    let api = Router::new()
        // Health
        .route("/health", get(health::health))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me).put(auth::update_me))
        // Stores
        .route("/stores", post(stores::create_store).get(stores::list_my_stores))
        .route("/stores/join", post(stores::join_store))
        .route(
            "/stores/{id}",
            get(stores::get_store).put(stores::update_store),
        )
        .route(
            "/stores/{id}/join-code",
            post(stores::regenerate_join_code),
        )
        // Members & onboarding
        .route("/stores/{id}/members", get(members::list_members))
        .route(
            "/stores/{id}/manager-requests",
            get(members::list_manager_requests),
        )
        .route(
            "/stores/{id}/manager-requests/{user_id}/approve",
            post(members::approve_manager_request),
        )
        .route(
            "/stores/{id}/manager-requests/{user_id}/reject",
            post(members::reject_manager_request),
        )
        .route("/stores/{id}/primary", post(members::transfer_primary))
        .route(
            "/stores/{id}/managers/{user_id}",
            delete(members::remove_manager),
        )
        .route(
            "/stores/{id}/employees/{user_id}",
            delete(members::remove_employee),
        )
        // Schedules
        .route(
            "/stores/{id}/schedules",
            post(schedules::create_schedule).get(schedules::list_schedules),
        )
        .route("/stores/{id}/weeks/{date}", get(schedules::week_view))
        .route(
            "/schedules/{id}",
            get(schedules::get_schedule).delete(schedules::delete_schedule),
        )
        .route("/schedules/{id}/publish", post(schedules::publish_schedule))
        // Shifts
        .route("/schedules/{id}/shifts", post(shifts::create_shift))
        .route(
            "/shifts/{id}",
            put(shifts::update_shift).delete(shifts::delete_shift),
        )
        .route("/me/shifts", get(shifts::my_shifts))
        // Availability
        .route(
            "/availability",
            get(availability::list_availability).put(availability::upsert_availability),
        )
        .route(
            "/availability/{date}",
            delete(availability::delete_availability),
        );

    let mut app = Router::new().nest("/api", api);

    if let Some(web_dir) = web_dir.filter(|d| d.exists()) {
        tracing::info!("serving static files from {}", web_dir.display());
        let index_html = web_dir.join("index.html");
        app = app.fallback_service(ServeDir::new(web_dir).fallback(ServeFile::new(index_html)));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve on a pre-bound listener so callers can bind port 0 and read the
/// actual address before starting.
pub async fn serve_on(listener: tokio::net::TcpListener, app: Router) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
