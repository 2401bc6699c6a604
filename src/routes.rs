//! HTTP surface
//!
//! Urlencoded form posts in, JSON out. Every route except /login sits
//! behind the session cookie. There is no edit or delete route by design;
//! rows only ever get appended.

use std::sync::Arc;

use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};

use crate::cache::TableRead;
use crate::records::{ContactForm, DealForm, ExpenseForm, HoursForm, InvoiceForm, MileageForm};
use crate::services::{dashboard, tables, ServiceError};
use crate::state::AppState;
use crate::store::RecordSet;

pub const SESSION_COOKIE: &str = "opsdesk_session";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/dashboard", get(get_dashboard))
        .route("/tables/:table", get(get_table))
        .route("/refresh", post(refresh))
        .route("/directory", post(post_contact))
        .route("/hours", post(post_hours))
        .route("/expenses", post(post_expense))
        .route("/mileage", post(post_mileage))
        .route("/pipeline", post(post_deal))
        .route("/invoices", post(post_invoice))
        .with_state(state)
}

// ============================================================================
// Error mapping
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Validation(String),
    NotFound(String),
    Upstream(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => ApiError::Validation(msg),
            ServiceError::UnknownTable(name) => ApiError::NotFound(name),
            ServiceError::Store(e) => ApiError::Upstream(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Not logged in".to_string()),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::NotFound(name) => {
                (StatusCode::NOT_FOUND, format!("Unknown table: {}", name))
            }
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn require_session(state: &AppState, jar: &CookieJar) -> Result<(), ApiError> {
    let token = jar.get(SESSION_COOKIE).map(Cookie::value);
    match token {
        Some(token) if state.sessions.is_valid(token) => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

// ============================================================================
// Auth routes
// ============================================================================

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    if !state.auth.verify(&form.username, &form.password) {
        log::warn!("Failed login for user '{}'", form.username);
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Invalid credentials" })),
        )
            .into_response();
    }

    let token = state.sessions.open();
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true);
    (
        jar.add(cookie),
        Json(serde_json::json!({ "status": "ok" })),
    )
        .into_response()
}

async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.close(cookie.value());
    }
    (
        jar.remove(Cookie::from(SESSION_COOKIE)),
        Json(serde_json::json!({ "status": "ok" })),
    )
        .into_response()
}

// ============================================================================
// Read routes
// ============================================================================

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<dashboard::DashboardData>, ApiError> {
    require_session(&state, &jar)?;
    Ok(Json(dashboard::build_dashboard(&state).await))
}

/// One table's snapshot plus its degradation flag.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TablePayload {
    table: String,
    records: RecordSet,
    degraded: bool,
    warning: Option<String>,
}

impl TablePayload {
    fn new(table: &str, read: TableRead) -> Self {
        Self {
            table: table.to_string(),
            degraded: read.is_degraded() || read.is_failed(),
            warning: read.problem().map(str::to_string),
            records: read.records,
        }
    }
}

async fn get_table(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(table): Path<String>,
) -> Result<Json<TablePayload>, ApiError> {
    require_session(&state, &jar)?;
    let read = tables::list_table(&state, &table).await?;
    Ok(Json(TablePayload::new(&table, read)))
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_session(&state, &jar)?;
    state.cache.invalidate();
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

// ============================================================================
// Submit routes, one appended row each
// ============================================================================

async fn post_contact(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<ContactForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_session(&state, &jar)?;
    tables::submit_contact(&state, form).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

async fn post_hours(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<HoursForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_session(&state, &jar)?;
    tables::submit_hours(&state, form).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

async fn post_expense(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<ExpenseForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_session(&state, &jar)?;
    tables::submit_expense(&state, form).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

async fn post_mileage(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<MileageForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_session(&state, &jar)?;
    let entry = tables::submit_mileage(&state, form).await?;
    // Echo the derived figures so the form can confirm the reimbursement
    Ok(Json(serde_json::json!({
        "status": "ok",
        "totalMiles": entry.total_miles,
        "reimbursement": entry.reimbursement,
    })))
}

async fn post_deal(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<DealForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_session(&state, &jar)?;
    tables::submit_deal(&state, form).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

async fn post_invoice(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<InvoiceForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_session(&state, &jar)?;
    tables::submit_invoice(&state, form).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
