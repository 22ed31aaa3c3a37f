//! Orchestration of the post-capture pipeline.
//!
//! The synchronous half (dual-style fan-out) and the detached
//! background half (removal chain, frame normalization, animation
//! render) both live here, driving the domain logic in
//! `timebooth-core` through the [`ImageEditor`] service seam.

use std::path::PathBuf;
use std::sync::Arc;

use timebooth_core::storage::{BoothDirs, Stamp};
use timebooth_core::transition::DurationPolicy;
use timebooth_fal::ImageEditor;

pub mod animate;
pub mod chain;
pub mod styles;

pub use styles::{fan_out_edits, StyledPair};

/// Body of the detached per-submission background task.
///
/// Spawned after the synchronous response has been produced. Its
/// outcome is independent of the request: every failure is logged and
/// swallowed, never surfaced to the original caller.
pub async fn run_background(
    editor: Arc<dyn ImageEditor>,
    dirs: BoothDirs,
    stamp: Stamp,
    composite_path: PathBuf,
    remove_prompt: String,
    passes: u32,
    policy: DurationPolicy,
) {
    tracing::info!(stamp, passes, "Starting background removal pipeline");

    let frames = match chain::run_chain(
        editor.as_ref(),
        &dirs,
        stamp,
        &composite_path,
        &remove_prompt,
        passes,
    )
    .await
    {
        Ok(frames) => frames,
        Err(e) => {
            tracing::error!(stamp, error = %e, "Removal chain failed, no animation produced");
            return;
        }
    };

    match animate::build_animation(&dirs, stamp, &frames, policy).await {
        Ok(path) => {
            tracing::info!(stamp, path = %path.display(), "Animation complete");
        }
        Err(e) => {
            tracing::error!(stamp, error = %e, "Animation render failed");
        }
    }
}
