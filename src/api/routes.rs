use axum::body::Bytes;
use axum::extract::State;

use super::commands::{ApiCommand, Responder};
use super::types::{
    ApiResponse, LightingRequest, QueryRequest, SimulationRequest, SpawnRequest,
};
use super::AppState;

/// Enqueues a command for the mutation loop and waits for its acknowledgment.
async fn dispatch(state: &AppState, build: impl FnOnce(Responder) -> ApiCommand) -> ApiResponse {
    let (tx, rx) = tokio::sync::oneshot::channel();
    if state.sender.send(build(tx)).is_err() {
        return ApiResponse::failure("Command channel closed.");
    }
    match rx.await {
        Ok(response) => response,
        Err(_) => ApiResponse::failure("Command channel closed."),
    }
}

/// Explicit decode at the payload boundary: malformed bodies never reach the
/// queue and report the serde error verbatim.
fn decode<T: serde::de::DeserializeOwned>(endpoint: &str, body: &Bytes) -> Result<T, ApiResponse> {
    serde_json::from_slice(body)
        .map_err(|e| ApiResponse::failure(format!("Malformed {endpoint} payload: {e}")))
}

pub(super) async fn spawn(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let req = match decode::<SpawnRequest>("spawn", &body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    dispatch(&state, |reply| ApiCommand::Spawn(req, reply)).await
}

pub(super) async fn clear_scene(State(state): State<AppState>) -> ApiResponse {
    dispatch(&state, ApiCommand::ClearScene).await
}

pub(super) async fn set_lighting(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let req = match decode::<LightingRequest>("set_lighting", &body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    dispatch(&state, |reply| ApiCommand::SetLighting(req, reply)).await
}

pub(super) async fn capture_vision(State(state): State<AppState>) -> ApiResponse {
    dispatch(&state, ApiCommand::CaptureVision).await
}

pub(super) async fn run_simulation(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let req = match decode::<SimulationRequest>("run_simulation", &body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    dispatch(&state, |reply| ApiCommand::RunSimulation(req, reply)).await
}

pub(super) async fn get_object_position(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResponse {
    let req = match decode::<QueryRequest>("get_object_position", &body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    dispatch(&state, |reply| ApiCommand::GetObjectPosition(req, reply)).await
}

pub(super) async fn list_all_objects(State(state): State<AppState>) -> ApiResponse {
    dispatch(&state, ApiCommand::ListAllObjects).await
}

pub(super) async fn invalid_endpoint() -> ApiResponse {
    ApiResponse::failure("Invalid endpoint.")
}
