//! HTTP routes for the FixIt Hub API

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, header},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::{error::ApiError, state::AppState, uploads::UPLOADS_ROUTE};

pub mod admins;
pub mod auth;
pub mod contact;
pub mod issues;
pub mod stats;
pub mod upload;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let upload_routes = Router::new()
        .route("/api/upload", post(upload::upload_image))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    // Stored files are user content; never let a browser run them as a page
    let stored_images = Router::new()
        .nest_service(UPLOADS_ROUTE, ServeDir::new(&state.config.upload_dir))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; sandbox"),
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/issues",
            get(issues::list_issues).post(issues::create_issue),
        )
        .route(
            "/api/issues/:id",
            get(issues::get_issue)
                .put(issues::update_issue)
                .delete(issues::delete_issue),
        )
        .route(
            "/api/admins",
            get(admins::list_admins).post(admins::create_admin),
        )
        .route(
            "/api/admins/:id",
            put(admins::update_admin).delete(admins::delete_admin),
        )
        .route(
            "/api/contact",
            get(contact::list_contacts).post(contact::create_contact),
        )
        .route("/api/contact/:id", delete(contact::delete_contact))
        .route("/api/stats", get(stats::get_stats))
        .merge(upload_routes)
        .merge(stored_images)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.db_pool {
        Some(pool) => {
            if common::database::health_check(pool).await {
                "connected"
            } else {
                "unreachable"
            }
        }
        None => "in-memory",
    };

    Json(json!({
        "status": "ok",
        "service": "fixit-api",
        "database": database,
    }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
