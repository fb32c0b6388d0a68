use super::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/generate_go_to_market_strategy",
            post(handlers::go_to_market_handler),
        )
        .route("/analyze_market", post(handlers::market_handler))
        .route("/analyze_target_market", post(handlers::target_market_handler))
        .route("/analyze_mvp", post(handlers::mvp_handler))
        .route("/analyze_competitors", post(handlers::competitors_handler))
        .route("/analyze_investors", post(handlers::investors_handler))
        .route("/startup_info", post(handlers::startup_info_handler))
        .route("/competitors", post(handlers::directory_handler))
        .route("/graph", post(handlers::graph_handler))
        .route("/generate_report", post(handlers::report_handler))
        .route("/generate_pdf", post(handlers::pdf_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
