// Library exports for binary tools and tests
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use services::{email::EmailService, storage::CloudStorage};
use store::RecordStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: Arc<Config>,
    pub email: Option<Arc<EmailService>>,
    pub storage: Option<Arc<CloudStorage>>,
}

impl AppState {
    /// State with the optional collaborators built from configuration.
    pub fn new(store: Arc<dyn RecordStore>, config: Arc<Config>) -> Self {
        let email = EmailService::new(&config).map(Arc::new);
        let storage = CloudStorage::new(&config).map(Arc::new);
        Self {
            store,
            config,
            email,
            storage,
        }
    }
}

/// Allow the configured site origin, plus localhost for development.
fn cors_layer(base_url: &str) -> CorsLayer {
    let base = base_url.trim_end_matches('/').to_string();
    let origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let Ok(o) = origin.to_str() else {
            return false;
        };
        o == base || o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1")
    });

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-admin-key"),
        ]))
        .allow_origin(origin)
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.app_base_url);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // Boys
        .route("/api/boys", get(routes::boys::list_boys).post(routes::boys::create_boy))
        .route(
            "/api/boys/{id}",
            get(routes::boys::get_boy)
                .patch(routes::boys::update_boy)
                .put(routes::boys::update_boy)
                .delete(routes::boys::delete_boy),
        )
        .route("/api/boys/{id}/assessments", post(routes::boys::add_assessment))
        .route("/api/boys/{id}/sessions", post(routes::boys::add_session))
        // Volunteers
        .route(
            "/api/volunteers",
            get(routes::volunteers::list_volunteers).post(routes::volunteers::apply),
        )
        .route(
            "/api/volunteers/{id}",
            get(routes::volunteers::get_volunteer)
                .patch(routes::volunteers::update_volunteer)
                .put(routes::volunteers::update_volunteer)
                .delete(routes::volunteers::delete_volunteer),
        )
        // Donations
        .route(
            "/api/donations",
            get(routes::donations::list_donations).post(routes::donations::create_donation),
        )
        .route(
            "/api/donations/{id}",
            get(routes::donations::get_donation).delete(routes::donations::delete_donation),
        )
        // Sponsorships
        .route(
            "/api/sponsorships",
            get(routes::sponsorships::list_sponsorships).post(routes::sponsorships::create_sponsorship),
        )
        .route(
            "/api/sponsorships/{id}",
            get(routes::sponsorships::get_sponsorship).delete(routes::sponsorships::delete_sponsorship),
        )
        // Media
        .route("/api/media", get(routes::media::list_media).post(routes::media::create_media))
        .route(
            "/api/media/{id}",
            get(routes::media::get_media)
                .patch(routes::media::update_media)
                .delete(routes::media::delete_media),
        )
        // Admin reporting
        .route("/api/admin/stats", get(routes::stats::dashboard))
        .route("/api/admin/donations/export", get(routes::export::export_donations))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Base64 uploads travel inside JSON bodies
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .with_state(state)
}
