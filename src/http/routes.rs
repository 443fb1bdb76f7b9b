use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Authentication (mocked)
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        // Workspace view state
        .route("/workspace", get(handlers::workspace_state))
        .route("/workspace/view", post(handlers::navigate))
        // Sessions
        .route("/sessions/transcribe", post(handlers::transcribe))
        .route("/sessions", get(handlers::list_sessions))
        .route("/sessions/grouped", get(handlers::grouped_sessions))
        .route("/sessions/bulk-supervision", post(handlers::bulk_supervision))
        .route("/sessions/:session_id/select", post(handlers::select_session))
        .route("/sessions/:session_id/report", post(handlers::generate_report))
        .route("/sessions/:session_id/critique", post(handlers::generate_critique))
        .route("/sessions/:session_id/transcript", put(handlers::update_transcript))
        .route("/sessions/:session_id/export", get(handlers::export_session))
        // Session assistant chat
        .route("/chat", post(handlers::chat))
        .route("/chat/suggestions", get(handlers::chat_suggestions))
        // Psychometric scales
        .route("/scales", get(handlers::list_scales).post(handlers::add_scale))
        .route("/scales/:scale_id/analyze", post(handlers::analyze_scale))
        // Credits and plans
        .route("/credits", get(handlers::get_credits))
        .route("/plans", get(handlers::list_plans).put(handlers::update_plans))
        .route("/plans/select", post(handlers::select_plan))
        // Admin
        .route("/users", get(handlers::list_users))
        // Payment
        .route("/payment/initiate", post(handlers::initiate_payment))
        .route("/payment/complete", post(handlers::complete_payment))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
