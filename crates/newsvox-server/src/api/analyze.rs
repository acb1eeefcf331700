use axum::{extract::State, Extension, Json};
use newsvox_pipeline::{
    PipelineError, PipelineOutcome, PipelineResult, RunOptions, MAX_ITEMS_LIMIT,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{prune_audio_dir, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    pub company: String,
    pub max_items: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeData {
    #[serde(flatten)]
    pub result: PipelineResult,
    /// Route serving the narration written for this request.
    pub audio_url: String,
}

pub(super) async fn analyze_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalyzeData>>, ApiError> {
    let company = body.company.trim();
    if company.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "company must not be empty",
        ));
    }

    let max_items = body.max_items.unwrap_or(state.default_max_items);
    if !(1..=MAX_ITEMS_LIMIT).contains(&max_items) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("max_items must be between 1 and {MAX_ITEMS_LIMIT}"),
        ));
    }

    // One file per request so concurrent analyses never overwrite each other.
    let file_name = format!("{}.mp3", Uuid::new_v4());
    let options = RunOptions {
        max_items,
        audio_path: state.audio_dir.join(&file_name),
    };

    match state.pipeline.run(company, &options).await {
        Ok(PipelineOutcome::Found(result)) => {
            let retained = state.audio_retain_files;
            match prune_audio_dir(&state.audio_dir, retained, Some(file_name.as_str())).await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "pruned old narration files"),
                Err(e) => tracing::warn!(error = %e, "failed to prune audio directory"),
            }
            Ok(Json(ApiResponse {
                data: AnalyzeData {
                    result,
                    audio_url: format!("/api/v1/audio/{file_name}"),
                },
                meta: ResponseMeta::new(req_id.0),
            }))
        }
        Ok(PipelineOutcome::NoResults { company, reason }) => {
            tracing::info!(company = %company, ?reason, "no news found");
            Err(ApiError::new(req_id.0, "not_found", "No news found"))
        }
        Err(e) => Err(map_pipeline_error(req_id.0, &e)),
    }
}

fn map_pipeline_error(request_id: String, error: &PipelineError) -> ApiError {
    tracing::error!(error = %error, "news pipeline failed");
    match error {
        PipelineError::Io { .. } => {
            ApiError::new(request_id, "internal_error", "failed to store narration audio")
        }
        _ => ApiError::new(
            request_id,
            "upstream_error",
            format!("news analysis failed: {error}"),
        ),
    }
}
