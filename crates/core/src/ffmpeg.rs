//! FFmpeg command layer for the animation renderer.
//!
//! Runs `ffmpeg` once per animation with the looped frame inputs and
//! the synthesized filter graph. Any non-zero exit, or a zero exit
//! without the output file on disk, is a hard failure with no retry.

use std::path::{Path, PathBuf};

use crate::transition::TransitionGraph;

/// Error type for ffmpeg invocations.
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("frame file not found: {0}")]
    FrameNotFound(String),

    #[error("ffmpeg exited successfully but produced no output: {0}")]
    OutputMissing(String),
}

/// Build the full ffmpeg argument list for one render.
///
/// Split out from [`render_animation`] so the command shape is
/// unit-testable without spawning a process.
pub fn build_render_args(
    frame_paths: &[PathBuf],
    graph: &TransitionGraph,
    output_path: &Path,
) -> Vec<String> {
    let borrowed: Vec<&Path> = frame_paths.iter().map(PathBuf::as_path).collect();

    let mut args: Vec<String> = vec!["-y".into()];
    args.extend(graph.input_args(&borrowed));
    args.push("-filter_complex".into());
    args.push(graph.filter_complex());
    args.push("-map".into());
    args.push("[vout]".into());
    args.push("-t".into());
    args.push(format!("{}", graph.total_duration_secs()));
    args.push(output_path.to_string_lossy().into_owned());
    args
}

/// Render the animation described by `graph` from `frame_paths` into
/// `output_path`.
pub async fn render_animation(
    frame_paths: &[PathBuf],
    graph: &TransitionGraph,
    output_path: &Path,
) -> Result<(), FfmpegError> {
    for path in frame_paths {
        if !path.exists() {
            return Err(FfmpegError::FrameNotFound(
                path.to_string_lossy().to_string(),
            ));
        }
    }

    let args = build_render_args(frame_paths, graph, output_path);
    tracing::debug!(frames = frame_paths.len(), output = %output_path.display(), "Running ffmpeg");

    let output = tokio::process::Command::new("ffmpeg")
        .args(&args)
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    if !output_path.exists() {
        return Err(FfmpegError::OutputMissing(
            output_path.to_string_lossy().to_string(),
        ));
    }

    Ok(())
}
