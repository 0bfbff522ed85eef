//! Engine listing

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct EngineListResponse {
    /// Registered engine names, in registration order
    pub engines: Vec<String>,
}

/// GET /api/v1/engines
pub async fn list_engines(State(state): State<AppState>) -> Json<EngineListResponse> {
    let engines = state
        .executor
        .list()
        .into_iter()
        .map(str::to_string)
        .collect();

    Json(EngineListResponse { engines })
}
