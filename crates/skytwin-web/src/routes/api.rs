//! REST API endpoints for the airspace simulation.

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use skytwin_core::error::SkyTwinError;
use skytwin_core::types::{AgentId, DroneAgent, NegotiationEvent, Tick};
use skytwin_runtime::clock::ClockSnapshot;
use skytwin_runtime::config::AirspaceConfig;
use skytwin_runtime::stats::AirspaceStats;

/// Error returned by API handlers.
#[derive(Debug)]
pub struct ApiError(SkyTwinError);

impl From<SkyTwinError> for ApiError {
    fn from(e: SkyTwinError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SkyTwinError::Config(_) => StatusCode::BAD_REQUEST,
            SkyTwinError::AgentNotFound(_) => StatusCode::NOT_FOUND,
            SkyTwinError::ClockStopped => StatusCode::SERVICE_UNAVAILABLE,
            SkyTwinError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Get the full snapshot.
pub async fn get_snapshot(State(state): State<AppState>) -> Json<ClockSnapshot> {
    Json(state.snapshot())
}

/// Get all agents.
pub async fn get_agents(State(state): State<AppState>) -> Json<Vec<DroneAgent>> {
    Json(state.snapshot().airspace.agents)
}

/// Get one agent by id (`DRONE-004` or `4`).
pub async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DroneAgent> {
    let agent_id: AgentId = id
        .parse()
        .map_err(|_| SkyTwinError::agent_not_found(&id))?;
    state
        .snapshot()
        .airspace
        .agents
        .into_iter()
        .find(|a| a.id == agent_id)
        .map(Json)
        .ok_or_else(|| SkyTwinError::agent_not_found(agent_id).into())
}

/// Get the event log, newest first.
pub async fn get_events(State(state): State<AppState>) -> Json<Vec<NegotiationEvent>> {
    Json(state.snapshot().airspace.events)
}

/// Get aggregate counts.
pub async fn get_stats(State(state): State<AppState>) -> Json<AirspaceStats> {
    Json(AirspaceStats::from_snapshot(&state.snapshot().airspace))
}

/// Resume ticking.
pub async fn start(State(state): State<AppState>) -> ApiResult<ClockSnapshot> {
    state.clock().start().await?;
    Ok(Json(state.snapshot()))
}

/// Halt ticking.
pub async fn pause(State(state): State<AppState>) -> ApiResult<ClockSnapshot> {
    state.clock().pause().await?;
    Ok(Json(state.snapshot()))
}

/// Reset request body. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    /// Full or partial config; missing fields take their defaults.
    #[serde(default)]
    pub config: Option<AirspaceConfig>,
    /// Use the reduced fleet preset when no config is given.
    #[serde(default)]
    pub compact: bool,
}

/// Start a new run. Without a body the current configuration is reused.
pub async fn reset(
    State(state): State<AppState>,
    body: Option<Json<ResetRequest>>,
) -> ApiResult<ClockSnapshot> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let config = match (req.config, req.compact) {
        (Some(config), _) => Some(config),
        (None, true) => Some(AirspaceConfig::compact()),
        (None, false) => None,
    };
    state.clock().reset(config).await?;
    Ok(Json(state.snapshot()))
}

/// Result of a single step.
#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub tick: Tick,
    pub conflicts: usize,
    /// Events created by this tick, oldest first.
    pub events: Vec<NegotiationEvent>,
}

/// Run one tick, even while paused.
pub async fn step(State(state): State<AppState>) -> ApiResult<StepResponse> {
    let report = state.clock().step().await?;
    Ok(Json(StepResponse {
        tick: report.tick,
        conflicts: report.conflicts(),
        events: report.events,
    }))
}
