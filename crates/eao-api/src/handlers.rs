use crate::{routes, ApiError, ApiJson, ApiResult, AppState};
use axum::{extract::State, http::header, response::IntoResponse, Json};
use eao_core::{ParameterPath, TimeSeriesPayload};
use eao_engine::NetworkView;
use eao_session::{DeleteOutcome, DocumentDetails, ObjectDetails};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A document sent either as its encoded text in a JSON string or inline.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DocumentBody {
    Encoded(String),
    Inline(Value),
}

impl DocumentBody {
    pub fn into_text(self) -> String {
        match self {
            DocumentBody::Encoded(text) => text,
            DocumentBody::Inline(value) => value.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub solver: String,
    pub default_solver: String,
    pub max_steps: usize,
}

const DONE: &str = "Done";

pub async fn index() -> &'static str {
    "EAO session server is running"
}

pub async fn docs() -> Json<Value> {
    Json(json!({
        "message": "Bodies are JSON. Documents may be sent as encoded strings or inline objects.",
        "routes": routes::ROUTES
            .iter()
            .map(|(method, path)| format!("{} {path}", method.to_uppercase()))
            .collect::<Vec<_>>()
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let optimizer = &state.config.config().optimizer;
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        solver: state.session.solver(),
        default_solver: optimizer.default_solver.clone(),
        max_steps: optimizer.max_steps,
    })
}

pub async fn reset(State(state): State<AppState>) -> Json<&'static str> {
    state.session.reset();
    Json("done reset")
}

pub async fn get_data_keys(State(state): State<AppState>) -> Json<Vec<&'static str>> {
    Json(state.session.list_keys())
}

/// Stored document text as a JSON string; `portf_asset_names` as a plain array.
pub async fn get_data(
    State(state): State<AppState>,
    ApiJson(key): ApiJson<String>,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.session.get_data(&key)?))
}

pub async fn set_portf(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DocumentBody>,
) -> ApiResult<Json<&'static str>> {
    state.session.set_portfolio(&body.into_text())?;
    Ok(Json(DONE))
}

pub async fn add_std_node(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DocumentBody>,
) -> ApiResult<Json<String>> {
    Ok(Json(state.session.add_node(&body.into_text())?))
}

pub async fn del_std_node(
    State(state): State<AppState>,
    ApiJson(name): ApiJson<String>,
) -> ApiResult<Json<DeleteOutcome>> {
    Ok(Json(state.session.delete_node(&name)?))
}

pub async fn set_timegrid(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DocumentBody>,
) -> ApiResult<Json<&'static str>> {
    state.session.set_timegrid(&body.into_text())?;
    Ok(Json(DONE))
}

pub async fn set_time_series_data(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TimeSeriesPayload>,
) -> ApiResult<Json<&'static str>> {
    state.session.set_time_series(payload)?;
    Ok(Json(DONE))
}

pub async fn portf_add_asset(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DocumentBody>,
) -> ApiResult<Json<String>> {
    Ok(Json(state.session.portf_add_asset(&body.into_text())?))
}

pub async fn portf_delete_asset(
    State(state): State<AppState>,
    ApiJson(name): ApiJson<String>,
) -> ApiResult<Json<DeleteOutcome>> {
    Ok(Json(state.session.portf_delete_asset(&name)?))
}

/// Body: `[asset name, replacement asset]`.
pub async fn set_all_asset_parameters(
    State(state): State<AppState>,
    ApiJson((name, body)): ApiJson<(String, DocumentBody)>,
) -> ApiResult<Json<String>> {
    Ok(Json(
        state
            .session
            .set_all_asset_parameters(&name, &body.into_text())?,
    ))
}

/// Body: `[asset name, path, value]`.
pub async fn set_asset_parameter(
    State(state): State<AppState>,
    ApiJson((name, path, value)): ApiJson<(String, ParameterPath, Value)>,
) -> ApiResult<Json<String>> {
    Ok(Json(state.session.set_asset_parameter(&name, &path, value)?))
}

pub async fn get_asset_details(
    State(state): State<AppState>,
    ApiJson(name): ApiJson<String>,
) -> ApiResult<Json<DocumentDetails>> {
    Ok(Json(state.session.asset_details(&name)?))
}

pub async fn get_portf_details(State(state): State<AppState>) -> ApiResult<Json<DocumentDetails>> {
    Ok(Json(state.session.portfolio_details()?))
}

/// Body: a kind name, or `null` for the list of kinds.
pub async fn get_object_details(
    State(state): State<AppState>,
    ApiJson(kind): ApiJson<Option<String>>,
) -> ApiResult<Json<ObjectDetails>> {
    Ok(Json(state.session.object_details(kind.as_deref())?))
}

/// Resolves symbolic node names of the posted asset; the body is the
/// resolved asset's encoded text.
pub async fn set_nodes_from_list(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DocumentBody>,
) -> ApiResult<impl IntoResponse> {
    let text = state.session.resolve_asset_nodes(&body.into_text())?;
    Ok(([(header::CONTENT_TYPE, "application/json")], text))
}

pub async fn get_network(State(state): State<AppState>) -> ApiResult<Json<NetworkView>> {
    Ok(Json(state.session.network()?))
}

pub async fn set_solver(
    State(state): State<AppState>,
    ApiJson(name): ApiJson<String>,
) -> ApiResult<Json<String>> {
    state.session.set_solver(&name)?;
    Ok(Json(format!("Solver set to {name}")))
}

pub async fn optimize(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let session = state.session.clone();
    let summary = tokio::task::spawn_blocking(move || session.optimize())
        .await
        .map_err(|e| ApiError::Internal(format!("optimisation task failed: {e}")))??;
    Ok(Json(summary))
}
