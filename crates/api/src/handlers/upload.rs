//! Plain photo upload: save to the uploads directory and return the
//! served URL. No pipeline work happens here.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use timebooth_core::error::BoothError;
use timebooth_core::storage::{new_stamp, upload_ext};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response shape expected by the kiosk client.
#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub success: bool,
    pub filename: String,
    pub url: String,
}

/// POST /upload
///
/// Multipart field: `photo`. The stored name is timestamp-derived, so
/// concurrent uploads never collide.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResult>> {
    let mut photo: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("photo") {
            let filename = field.file_name().unwrap_or("photo.jpg").to_string();
            let bytes = field.bytes().await?.to_vec();
            photo = Some((bytes, filename));
        }
    }

    let (bytes, original_name) = photo
        .filter(|(bytes, _)| !bytes.is_empty())
        .ok_or_else(|| BoothError::UploadFailed("no photo received".into()))?;

    let stamp = new_stamp();
    let ext = upload_ext(&original_name);
    let path = state.dirs.original_path(stamp, &ext);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("saving upload failed: {e}")))?;

    let filename = format!("photo_{stamp}.{ext}");
    tracing::info!(path = %path.display(), "Saved file");

    Ok(Json(UploadResult {
        success: true,
        url: format!("/uploads/{filename}"),
        filename,
    }))
}
