use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::export::{self, Download, ExportData, ExportError, ExportOptions, Record};
use crate::persistence::{PersistenceError, ScopeStore};
use crate::{ExclusionScope, ExclusionScopes, ScopeLevel, Timestamp};

pub type SharedScopeStore = Arc<dyn ScopeStore + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    scopes: Arc<RwLock<ExclusionScopes>>,
    store: Option<SharedScopeStore>,
}

impl AppState {
    pub fn new(scopes: ExclusionScopes) -> Self {
        Self::with_shared(Arc::new(RwLock::new(scopes)))
    }

    pub fn with_shared(scopes: Arc<RwLock<ExclusionScopes>>) -> Self {
        Self {
            scopes,
            store: None,
        }
    }

    /// Writes every scope change through to `store` before it becomes visible.
    pub fn with_store(mut self, store: SharedScopeStore) -> Self {
        self.store = Some(store);
        self
    }

    fn scopes(&self) -> Arc<RwLock<ExclusionScopes>> {
        self.scopes.clone()
    }

    /// Applies `change` to a copy of the scopes, persists it, then publishes it.
    fn update_scopes<T>(
        &self,
        change: impl FnOnce(&mut ExclusionScopes) -> T,
    ) -> Result<T, ApiError> {
        let mut guard = self.scopes.write();
        let mut next = guard.clone();
        let outcome = change(&mut next);
        if let Some(store) = &self.store {
            store.save_scopes(&next)?;
        }
        *guard = next;
        Ok(outcome)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<ExportError> for ApiError {
    fn from(value: ExportError) -> Self {
        match value {
            ExportError::InvalidFilename(_) => ApiError::Invalid(value.to_string()),
            ExportError::Io(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        log::error!("failed to persist exclusion scopes: {value}");
        ApiError::Internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

impl IntoResponse for Download {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);
        (
            [
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.body,
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
struct CheckPayload {
    date: Timestamp,
}

#[derive(Debug, Serialize)]
struct CheckResponse {
    date: String,
    excluded: bool,
}

#[derive(Debug, Deserialize)]
struct FilterPayload {
    #[serde(default)]
    dates: Value,
}

#[derive(Debug, Serialize)]
struct FilterResponse {
    available: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ExportPayload {
    data: ExportData,
    filename: String,
    #[serde(default)]
    options: ExportOptions,
}

#[derive(Debug, Deserialize)]
struct JsonCsvPayload {
    #[serde(default)]
    records: Vec<Record>,
    filename: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/scopes", get(get_scopes))
        .route("/scopes/:level", put(put_scope).delete(delete_scope))
        .route("/exclusions", get(list_exclusions))
        .route("/exclusions/:year/:month", get(month_exclusions))
        .route("/availability/check", post(check_date))
        .route("/availability/filter", post(filter_dates))
        .route("/export", post(export_csv))
        .route("/export/json-csv", post(export_json_csv))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("queue-desk HTTP API listening on http://{addr}");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn parse_level(level: &str) -> Result<ScopeLevel, ApiError> {
    level
        .parse::<ScopeLevel>()
        .map_err(|err| ApiError::invalid(err.to_string()))
}

async fn get_scopes(State(state): State<AppState>) -> Json<ExclusionScopes> {
    let scopes = state.scopes();
    let current = scopes.read().clone();
    Json(current)
}

async fn put_scope(
    State(state): State<AppState>,
    Path(level): Path<String>,
    Json(scope): Json<ExclusionScope>,
) -> Result<Json<ExclusionScope>, ApiError> {
    let level = parse_level(&level)?;
    state.update_scopes(|scopes| scopes.set(level, scope.clone()))?;
    log::info!(
        "{level} scope replaced with {} declared dates",
        scope.declared_dates().len()
    );
    Ok(Json(scope))
}

async fn delete_scope(
    State(state): State<AppState>,
    Path(level): Path<String>,
) -> Result<StatusCode, ApiError> {
    let level = parse_level(&level)?;
    match state.update_scopes(|scopes| scopes.clear(level))? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::not_found(format!("{level} scope not set"))),
    }
}

async fn list_exclusions(State(state): State<AppState>) -> Json<Vec<String>> {
    let scopes = state.scopes();
    let dates = scopes.read().collect_exclusion_dates();
    Json(dates)
}

async fn month_exclusions(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<Vec<String>>, ApiError> {
    if !(1..=12).contains(&month) {
        return Err(ApiError::invalid(format!(
            "month {month} is outside 1-12"
        )));
    }
    let scopes = state.scopes();
    let dates = scopes.read().exclusions_for_month(year, month);
    Ok(Json(dates))
}

async fn check_date(
    State(state): State<AppState>,
    Json(payload): Json<CheckPayload>,
) -> Result<Json<CheckResponse>, ApiError> {
    let date = payload
        .date
        .date_key()
        .ok_or_else(|| ApiError::invalid("date is not a recognizable timestamp"))?;
    let scopes = state.scopes();
    let excluded = scopes.read().is_excluded(&date);
    Ok(Json(CheckResponse { date, excluded }))
}

async fn filter_dates(
    State(state): State<AppState>,
    Json(payload): Json<FilterPayload>,
) -> Json<FilterResponse> {
    let candidates: Option<Vec<String>> = match payload.dates {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(date) => Some(date),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    };
    let scopes = state.scopes();
    let available = scopes.read().filter_available(candidates.as_deref());
    Json(FilterResponse { available })
}

async fn export_csv(Json(payload): Json<ExportPayload>) -> Result<Download, ApiError> {
    let download = export::prepare_download(&payload.data, &payload.filename, &payload.options)?;
    log::info!(
        "serving {} ({} bytes)",
        download.filename,
        download.body.len()
    );
    Ok(download)
}

async fn export_json_csv(Json(payload): Json<JsonCsvPayload>) -> Result<Download, ApiError> {
    let download = export::prepare_json_csv_download(&payload.records, &payload.filename)?;
    Ok(download)
}
