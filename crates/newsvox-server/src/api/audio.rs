use std::path::Path as FsPath;
use std::time::SystemTime;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

pub(super) async fn get_audio(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    if !is_safe_audio_name(&file) {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "invalid audio file name",
        ));
    }

    let path = state.audio_dir.join(&file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "audio/mpeg")], bytes).into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ApiError::new(req_id.0, "not_found", "audio file not found"))
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to read audio file");
            Err(ApiError::new(
                req_id.0,
                "internal_error",
                "failed to read audio file",
            ))
        }
    }
}

/// Only plain `*.mp3` names inside the audio directory are served.
pub(super) fn is_safe_audio_name(name: &str) -> bool {
    name.len() <= 128
        && name.ends_with(".mp3")
        && !name.starts_with('.')
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Delete all but the newest `keep` narration files in `dir`.
///
/// `current` (the file just written by the caller) always survives and counts
/// toward `keep`. Files that do not look like narration output are ignored.
/// Returns the number of files removed.
pub(crate) async fn prune_audio_dir(
    dir: &FsPath,
    keep: usize,
    current: Option<&str>,
) -> std::io::Result<usize> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut candidates: Vec<(SystemTime, String)> = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !is_safe_audio_name(&name) || current == Some(name.as_str()) {
            continue;
        }
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        candidates.push((modified, name));
    }

    // Newest first; name breaks ties so the order is stable.
    candidates.sort_by(|a, b| b.cmp(a));
    let retained = keep.saturating_sub(usize::from(current.is_some()));

    let mut removed = 0;
    for (_, name) in candidates.into_iter().skip(retained) {
        match tokio::fs::remove_file(dir.join(&name)).await {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(removed)
}
