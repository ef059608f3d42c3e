use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::login_page))
        .route("/register", get(handlers::register_page))
        .route("/dashboard", get(handlers::dashboard_page))
        .route("/api/register", post(handlers::register))
        .route("/api/login", post(handlers::login))
        .route("/api/session", get(handlers::session))
        .route(
            "/api/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/api/dashboard", get(handlers::dashboard_data))
        .with_state(state)
}
