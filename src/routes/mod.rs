use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{catalog, health_check, session, transfers, wallet};
use crate::middleware::request_id_middleware;
use crate::state::AppState;

fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/code", post(session::request_code))
        .route("/login", post(session::login))
        .route("/register", post(session::register))
        .route("/me", get(session::me).patch(session::update_me))
        .route("/me/face", get(session::face_status))
        .route("/me/face/enroll", post(session::enroll_face))
}

fn wallet_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(wallet::list_tickets))
        .route("/tickets/:id/qr", get(wallet::ticket_qr))
        .route("/tickets/:id/transfer", post(transfers::request_transfer))
        .route("/transfers/sent", get(wallet::transfers_sent))
        .route("/transfers/accept", post(transfers::accept_transfer))
        .route("/transfers/:id/cancel", post(transfers::cancel_transfer))
        .route("/orders", get(wallet::list_orders))
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", get(catalog::list_events))
        .route("/events/:id", get(catalog::get_event))
        .route("/ticket-types", get(catalog::list_ticket_types))
        .route("/checkout", post(catalog::checkout))
        .nest("/session", session_routes())
        .nest("/wallet", wallet_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(&config.cors_allowed_origins, config.production))
}
