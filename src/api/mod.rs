pub mod handlers;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::Settings, service::ServiceContext};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        // Auth routes
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        // API routes
        .nest("/api", api_routes(app_state.clone()))
        // Admin routes
        .nest("/admin", admin_routes(app_state.clone()))
        // Add state to the router
        .with_state(app_state)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/me",
            get(handlers::auth::me).route_layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::auth::require_auth,
            )),
        )
        .nest("/organizations", organization_routes(state.clone()))
        .nest("/hackathons", hackathon_routes(state.clone()))
        .nest("/teams", team_routes(state.clone()))
        .nest("/submissions", submission_routes(state.clone()))
        .nest("/assignments", assignment_routes(state))
}

fn organization_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes (no auth required for viewing)
        .route("/", get(handlers::organizations::list))
        .route("/:id", get(handlers::organizations::get))
        // Protected routes
        .merge(
            Router::new()
                .route("/", post(handlers::organizations::create))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_auth,
                )),
        )
}

fn hackathon_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes
        .route("/", get(handlers::hackathons::list_published))
        .route("/:id", get(handlers::hackathons::get))
        .route("/slug/:slug", get(handlers::hackathons::get_by_slug))
        .route("/:id/categories", get(handlers::hackathons::list_categories))
        .route("/:id/teams", get(handlers::teams::list_for_hackathon))
        // Authenticated routes
        .merge(
            Router::new()
                .route("/:id/teams", post(handlers::teams::create))
                .route("/:id/submissions", get(handlers::submissions::list_for_hackathon))
                .route("/:id/roster", get(handlers::assignments::roster))
                .route("/:id/assignments", get(handlers::assignments::list_mine))
                .route_layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    middleware::auth::require_auth,
                )),
        )
        // Organizer-only routes
        .merge(
            Router::new()
                .route("/", post(handlers::hackathons::create))
                .route("/:id", put(handlers::hackathons::update))
                .route("/:id", delete(handlers::hackathons::delete))
                .route("/:id/status", put(handlers::hackathons::set_status))
                .route("/:id/categories", post(handlers::hackathons::create_category))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_organizer,
                )),
        )
}

fn team_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public route
        .route("/:id", get(handlers::teams::get))
        // Protected routes
        .merge(
            Router::new()
                .route("/:id/join", post(handlers::teams::join))
                .route("/:id/leave", post(handlers::teams::leave))
                .route("/:id/lock", put(handlers::teams::set_locked))
                .route("/:id/leadership", put(handlers::teams::transfer_leadership))
                .route("/:id", delete(handlers::teams::disband))
                .route("/:id/members/:member_id", delete(handlers::teams::kick))
                .route("/:id/submission", post(handlers::submissions::create))
                .route("/:id/submission", put(handlers::submissions::update))
                .route("/:id/assignments", get(handlers::assignments::list_for_team))
                .route("/:id/assignments", post(handlers::assignments::assign))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_auth,
                )),
        )
}

fn submission_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/:id", get(handlers::submissions::get))
        .route("/:id/ratings", post(handlers::ratings::rate))
        .route("/:id/ratings", get(handlers::ratings::list_for_submission))
        .route("/:id/ratings/aggregate", get(handlers::ratings::aggregate))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn assignment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/:id/respond", post(handlers::assignments::respond))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::users::list))
        .route("/users/:id", get(handlers::users::get))
        .route("/users/:id/role", put(handlers::users::set_role))
        .route("/users/:id", delete(handlers::users::delete))
        .route("/hackathons", get(handlers::hackathons::list_all))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
