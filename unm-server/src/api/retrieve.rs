//! Playable URL retrieval

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;
use unm_common::{RetrievedSongInfo, SongSearchInformation};

use crate::context::ApiContext;
use crate::error::ApiResult;
use crate::AppState;

/// Request body of `POST /api/v1/retrieve`
#[derive(Debug, Deserialize)]
pub struct RetrieveRequest {
    /// A result previously returned by `/api/v1/search`
    pub search_info: SongSearchInformation,
    #[serde(default)]
    pub context: Option<ApiContext>,
}

/// POST /api/v1/retrieve
pub async fn retrieve(
    State(state): State<AppState>,
    payload: Result<Json<RetrieveRequest>, JsonRejection>,
) -> ApiResult<Json<RetrievedSongInfo>> {
    let Json(request) = payload?;

    let context = state.context_for(request.context);
    debug!(
        engine = %request.search_info.source,
        identifier = %request.search_info.identifier,
        "Retrieve request"
    );

    let retrieved = state.executor.retrieve(&request.search_info, &context).await?;
    Ok(Json(retrieved))
}
