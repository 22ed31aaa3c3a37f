//! Animation assembly: normalize frames, build the transition graph,
//! render, and clean up.
//!
//! The normalized copies are temporaries scoped to a single render.
//! They are removed whether the render succeeds or fails; leaving them
//! behind is a bug, not untidiness.

use std::path::PathBuf;

use timebooth_core::error::BoothError;
use timebooth_core::frames::{normalize_frames, Frame};
use timebooth_core::storage::{normalized_path, BoothDirs, Stamp};
use timebooth_core::transition::{DurationPolicy, TransitionGraph};

/// Normalize `frames`, render the crossfade animation, and return the
/// artifact path.
///
/// Every normalized temporary is deleted before this returns, on both
/// the success and failure paths.
pub async fn build_animation(
    dirs: &BoothDirs,
    stamp: Stamp,
    frames: &[Frame],
    policy: DurationPolicy,
) -> Result<PathBuf, BoothError> {
    if frames.is_empty() {
        return Err(BoothError::RenderFailed("no frames to render".into()));
    }

    // Temp paths are deterministic, so cleanup can target them without
    // tracking which ones were actually written.
    let norm_paths: Vec<PathBuf> = frames.iter().map(|f| normalized_path(&f.path)).collect();

    let result = normalize_and_render(dirs, stamp, frames, norm_paths.clone(), policy).await;

    cleanup_normalized(&norm_paths).await;

    result
}

async fn normalize_and_render(
    dirs: &BoothDirs,
    stamp: Stamp,
    frames: &[Frame],
    norm_paths: Vec<PathBuf>,
    policy: DurationPolicy,
) -> Result<PathBuf, BoothError> {
    let frame_paths: Vec<PathBuf> = frames.iter().map(|f| f.path.clone()).collect();

    tracing::info!(stamp, frames = frame_paths.len(), "Normalizing frame sizes");
    let write_paths = norm_paths.clone();
    tokio::task::spawn_blocking(move || write_normalized(&frame_paths, &write_paths))
        .await
        .map_err(|e| BoothError::RenderFailed(format!("normalize task panicked: {e}")))??;

    let graph = TransitionGraph::build(norm_paths.len(), policy);
    let output = dirs.animation_path(stamp);

    tracing::info!(
        stamp,
        transitions = graph.transition_count(),
        duration_secs = graph.total_duration_secs(),
        "Rendering blend-transition animation"
    );

    timebooth_core::ffmpeg::render_animation(&norm_paths, &graph, &output)
        .await
        .map_err(|e| BoothError::RenderFailed(e.to_string()))?;

    Ok(output)
}

/// Decode all frames, resize to frame 0's dimensions, write the
/// normalized copies. Runs on the blocking pool.
fn write_normalized(frame_paths: &[PathBuf], norm_paths: &[PathBuf]) -> Result<(), BoothError> {
    let images = frame_paths
        .iter()
        .map(|p| {
            image::open(p)
                .map_err(|e| BoothError::RenderFailed(format!("frame {} unreadable: {e}", p.display())))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let normalized = normalize_frames(&images);

    for (img, path) in normalized.iter().zip(norm_paths) {
        img.to_rgb8().save(path).map_err(|e| {
            BoothError::RenderFailed(format!("writing {} failed: {e}", path.display()))
        })?;
    }
    Ok(())
}

/// Remove the normalized temporaries. Missing files are fine (the
/// failure may have happened before they were written); anything else
/// is logged and skipped.
async fn cleanup_normalized(paths: &[PathBuf]) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove normalized frame");
            }
        }
    }
}
