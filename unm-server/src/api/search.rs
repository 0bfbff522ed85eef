//! Song search
//!
//! Dropping the handler future (client hung up) cancels every engine still
//! running for the request.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;
use unm_common::{Song, SongSearchInformation};

use crate::context::ApiContext;
use crate::error::ApiResult;
use crate::AppState;

/// Request body of `POST /api/v1/search`
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Engines to search, in priority order. Defaults apply when omitted.
    #[serde(default)]
    pub engines: Option<Vec<String>>,
    pub song: Song,
    #[serde(default)]
    pub context: Option<ApiContext>,
}

/// POST /api/v1/search
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<SongSearchInformation>> {
    let Json(request) = payload?;

    let engines = state.engines_for(request.engines);
    let context = state.context_for(request.context);
    debug!(song = %request.song, ?engines, mode = %context.search_mode, "Search request");

    let info = state.executor.search(&engines, &request.song, &context).await?;
    Ok(Json(info))
}
