use crate::auth;
use crate::errors::AppError;
use crate::ledger::{self, Aggregates};
use crate::models::{
    DashboardResponse, LoginRequest, OkResponse, RegisterRequest, SessionResponse,
    TransactionListResponse, TransactionRecord, TransactionRequest, TransactionResponse,
};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::ui::{render_dashboard, render_login, render_register};
use axum::{extract::State, response::Html, Json};
use chrono::Utc;
use tracing::warn;

pub async fn login_page(State(state): State<AppState>) -> Html<String> {
    let shared = state.shared.lock().await;
    Html(render_login(shared.data.remembered_user.as_deref()))
}

pub async fn register_page() -> Html<String> {
    Html(render_register())
}

pub async fn dashboard_page(State(state): State<AppState>) -> Html<String> {
    let shared = state.shared.lock().await;
    Html(render_dashboard(&shared.aggregates))
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<OkResponse>, AppError> {
    let mut shared = state.shared.lock().await;
    auth::register(&mut shared.data, &payload.username, &payload.password)?;
    if let Err(err) = persist_data(&state.data_path, &shared.data).await {
        // The write failed, so the registration did not happen.
        shared.data.users.pop();
        return Err(err);
    }
    Ok(Json(OkResponse::ok()))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<OkResponse>, AppError> {
    let mut shared = state.shared.lock().await;
    let username = auth::login(&shared.data, &payload.username, &payload.password)?;

    let previous_current = shared.data.current_user.clone();
    let previous_remembered = shared.data.remembered_user.clone();
    shared.data.current_user = Some(username.clone());
    shared.data.remembered_user = payload.remember.then_some(username);
    if let Err(err) = persist_data(&state.data_path, &shared.data).await {
        // The write failed, so the login did not happen.
        shared.data.current_user = previous_current;
        shared.data.remembered_user = previous_remembered;
        return Err(err);
    }

    Ok(Json(OkResponse::ok()))
}

pub async fn session(State(state): State<AppState>) -> Json<SessionResponse> {
    let shared = state.shared.lock().await;
    Json(SessionResponse {
        current_user: shared.data.current_user.clone(),
        remembered_user: shared.data.remembered_user.clone(),
    })
}

pub async fn list_transactions(State(state): State<AppState>) -> Json<TransactionListResponse> {
    let shared = state.shared.lock().await;
    Json(TransactionListResponse {
        ok: true,
        data: shared.data.transactions.clone(),
    })
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Json(payload): Json<TransactionRequest>,
) -> Result<Json<TransactionResponse>, AppError> {
    let mut shared = state.shared.lock().await;
    shared
        .aggregates
        .check(payload.booth, payload.service, payload.amount)?;

    let record = TransactionRecord {
        id: ledger::next_transaction_id(&shared.data.transactions),
        booth: payload.booth,
        service: payload.service,
        amount: payload.amount,
        tax: ledger::tax_for(payload.amount),
        location: payload.booth.location().to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };

    shared.data.transactions.push(record.clone());
    if let Err(err) = persist_data(&state.data_path, &shared.data).await {
        shared.data.transactions.pop();
        return Err(err);
    }

    // Incremental update, then a full replay as a consistency self-check.
    shared.aggregates.apply(&record);
    let replayed = Aggregates::replay(&shared.data.transactions);
    if replayed != shared.aggregates {
        warn!("aggregates diverged from the transaction list; adopting the replay");
        shared.aggregates = replayed;
    }

    Ok(Json(TransactionResponse {
        ok: true,
        id: record.id,
        amount: record.amount,
        tax_percent: ledger::tax_percent(record.tax),
        tax: record.tax,
        remaining: shared.aggregates.remaining(record.service),
    }))
}

pub async fn dashboard_data(State(state): State<AppState>) -> Json<DashboardResponse> {
    let shared = state.shared.lock().await;
    Json(shared.aggregates.project())
}
