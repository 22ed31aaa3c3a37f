//! The submission endpoint: the whole synchronous pipeline plus the
//! background hand-off.
//!
//! Order of operations is load-bearing: the styled edits fan out in
//! parallel, the strip is composed, and only then is the response
//! produced -- the removal chain is scheduled after the response body
//! has been handed to the transport, so the caller never observes its
//! latency or outcome.

use axum::extract::{Multipart, State};
use axum::response::Response;
use serde::Serialize;
use timebooth_core::compose::compose_to_file;
use timebooth_core::error::BoothError;
use timebooth_core::storage::{new_stamp, upload_ext};
use timebooth_core::transition::DurationPolicy;
use timebooth_pipeline::fan_out_edits;

use crate::config::DEFAULT_REMOVE_PROMPT;
use crate::error::{AppError, AppResult};
use crate::print;
use crate::response::respond_then;
use crate::state::AppState;

/// The two styled references plus the submission's identifier.
#[derive(Debug, Serialize)]
pub struct SubmitOutput {
    pub past: String,
    pub future: String,
    pub photo_id: i64,
}

/// Typed response body for `POST /submit`.
#[derive(Debug, Serialize)]
pub struct SubmitResult {
    /// Service reference of the uploaded original.
    pub input: String,
    pub output: SubmitOutput,
}

/// POST /submit
///
/// Multipart fields: `photo` (the captured image, required),
/// `past_prompt` and `future_prompt` (required), `remove_prompt`
/// (optional, defaults to [`DEFAULT_REMOVE_PROMPT`]).
pub async fn submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut photo: Option<(Vec<u8>, String)> = None;
    let mut past_prompt: Option<String> = None;
    let mut future_prompt: Option<String> = None;
    let mut remove_prompt: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name().unwrap_or("") {
            "photo" => {
                let filename = field.file_name().unwrap_or("photo.jpg").to_string();
                let bytes = field.bytes().await?.to_vec();
                photo = Some((bytes, filename));
            }
            "past_prompt" => past_prompt = Some(field.text().await?),
            "future_prompt" => future_prompt = Some(field.text().await?),
            "remove_prompt" => remove_prompt = Some(field.text().await?),
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    let (photo_bytes, filename) = photo
        .filter(|(bytes, _)| !bytes.is_empty())
        .ok_or_else(|| BoothError::UploadFailed("no photo received".into()))?;
    let past_prompt = require_prompt(past_prompt, "past_prompt")?;
    let future_prompt = require_prompt(future_prompt, "future_prompt")?;
    let remove_prompt = remove_prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REMOVE_PROMPT.to_string());

    // One timestamp identifies every artifact of this submission.
    let stamp = new_stamp();
    let ext = upload_ext(&filename);
    let original_path = state.dirs.original_path(stamp, &ext);
    tokio::fs::write(&original_path, &photo_bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("saving original failed: {e}")))?;
    tracing::info!(stamp, path = %original_path.display(), "Saved original photo");

    // Make the original resolvable by the edit service.
    let image_url = state
        .fal
        .upload(photo_bytes.clone(), &format!("photo_{stamp}.{ext}"))
        .await?;

    // Both styles in parallel; either failure aborts the submission.
    let pair = fan_out_edits(state.fal.as_ref(), &image_url, &past_prompt, &future_prompt).await?;

    let (past_bytes, future_bytes) = tokio::try_join!(
        state.fal.fetch(&pair.past.image_url),
        state.fal.fetch(&pair.future.image_url),
    )?;

    let composite_path = state.dirs.composite_path(stamp);
    {
        let template = state.config.template_path.clone();
        let out = composite_path.clone();
        let original_bytes = photo_bytes;
        tokio::task::spawn_blocking(move || {
            compose_to_file(&past_bytes, &original_bytes, &future_bytes, &template, &out)
        })
        .await
        .map_err(|e| AppError::InternalError(format!("compose task panicked: {e}")))??;
    }

    let result = SubmitResult {
        input: image_url,
        output: SubmitOutput {
            past: pair.past.image_url,
            future: pair.future.image_url,
            photo_id: stamp,
        },
    };

    // Respond-then-continue: the background work is scheduled only once
    // the response body has been handed to the transport.
    let editor = state.fal.clone();
    let dirs = state.dirs.clone();
    let passes = state.config.removal_passes;
    let print_url = state.config.print_server_url.clone();
    respond_then(result, move || {
        tokio::spawn(timebooth_pipeline::run_background(
            editor,
            dirs.clone(),
            stamp,
            composite_path.clone(),
            remove_prompt,
            passes,
            DurationPolicy::default(),
        ));
        if let Some(url) = print_url {
            tokio::spawn(print::handoff(url, composite_path, dirs, stamp));
        }
    })
    .map_err(|e| AppError::InternalError(format!("serializing response failed: {e}")))
}

fn require_prompt(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("missing or empty field '{field}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_prompt_rejects_missing_and_blank() {
        assert!(require_prompt(None, "past_prompt").is_err());
        assert!(require_prompt(Some("   ".into()), "past_prompt").is_err());
    }

    #[test]
    fn require_prompt_trims() {
        assert_eq!(
            require_prompt(Some("  sepia  ".into()), "past_prompt").unwrap(),
            "sepia"
        );
    }
}
