use crate::handlers::{about, auth, blog, contact, dashboard, health, messages, projects, public, site, upload};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use folio_core::validation::{CertificationInput, EducationInput, ExperienceInput, SkillInput};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

const METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

fn cors(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(METHODS);
    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer
            .allow_origin(origin)
            .allow_headers([CONTENT_TYPE, AUTHORIZATION])
            .allow_credentials(true),
        Some(Err(_)) => {
            warn!("Ignoring invalid CORS origin; allowing any origin without credentials");
            layer.allow_origin(Any).allow_headers(Any)
        }
        None => layer.allow_origin(Any).allow_headers(Any),
    }
}

pub fn app_router(state: AppState) -> Router {
    let upload_limit = state.config.limits.max_upload_bytes + MULTIPART_OVERHEAD;
    let cors = cors(state.config.server.cors_origin.as_deref());

    Router::new()
        .route("/health", get(health::health))
        // Projects
        .route("/api/projects", get(projects::list).post(projects::create))
        .route("/api/projects/reorder", put(projects::reorder))
        .route(
            "/api/projects/:id",
            get(projects::get).put(projects::update).delete(projects::delete),
        )
        // Blog
        .route("/api/blog", get(blog::list).post(blog::create))
        .route(
            "/api/blog/:id",
            get(blog::get).put(blog::update).delete(blog::delete),
        )
        // About page collections
        .route(
            "/api/skills",
            get(about::list_skills).post(about::create::<SkillInput>),
        )
        .route("/api/skills/reorder", put(about::reorder::<SkillInput>))
        .route(
            "/api/skills/:id",
            get(about::get::<SkillInput>)
                .put(about::update::<SkillInput>)
                .delete(about::delete::<SkillInput>),
        )
        .route(
            "/api/experience",
            get(about::list::<ExperienceInput>).post(about::create::<ExperienceInput>),
        )
        .route(
            "/api/experience/:id",
            get(about::get::<ExperienceInput>)
                .put(about::update::<ExperienceInput>)
                .delete(about::delete::<ExperienceInput>),
        )
        .route(
            "/api/education",
            get(about::list::<EducationInput>).post(about::create::<EducationInput>),
        )
        .route(
            "/api/education/:id",
            get(about::get::<EducationInput>)
                .put(about::update::<EducationInput>)
                .delete(about::delete::<EducationInput>),
        )
        .route(
            "/api/certifications",
            get(about::list::<CertificationInput>).post(about::create::<CertificationInput>),
        )
        .route(
            "/api/certifications/:id",
            get(about::get::<CertificationInput>)
                .put(about::update::<CertificationInput>)
                .delete(about::delete::<CertificationInput>),
        )
        // Singletons
        .route("/api/hero", get(site::get_hero).put(site::put_hero))
        .route(
            "/api/settings",
            get(site::get_settings).put(site::put_settings),
        )
        // Contact form and inbox
        .route("/api/contact", post(contact::submit))
        .route("/api/messages", get(messages::list))
        .route("/api/messages/bulk", put(messages::bulk_update))
        .route(
            "/api/messages/:id",
            get(messages::get)
                .put(messages::update)
                .delete(messages::delete),
        )
        // Uploads
        .route(
            "/api/upload",
            post(upload::upload)
                .delete(upload::delete)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Auth
        .route("/api/auth/login", get(auth::login))
        .route("/api/auth/callback", get(auth::callback))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/signout", post(auth::signout))
        .route("/api/auth/me", get(auth::me))
        // Admin dashboard
        .route("/api/dashboard", get(dashboard::summary))
        // Public read model
        .route("/api/public/home", get(public::home))
        .route("/api/public/projects", get(public::projects))
        .route("/api/public/projects/:slug", get(public::project))
        .route("/api/public/blog", get(public::blog))
        .route("/api/public/blog/:slug", get(public::post))
        .route("/api/public/about", get(public::about))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
