//! The removal chain: strictly sequential iterated edits.
//!
//! Each pass edits the *output* of the previous pass, freshly
//! re-uploaded, so the passes can never run in parallel. A fixed delay
//! between passes respects the external service's pacing. If any pass
//! fails, the whole chain is abandoned -- no animation is built from a
//! partial frame set.

use std::path::Path;
use std::time::Duration;

use timebooth_core::error::BoothError;
use timebooth_core::frames::Frame;
use timebooth_core::storage::{BoothDirs, Stamp};
use timebooth_fal::ImageEditor;

use crate::styles::edit_failed;

/// Pacing delay between consecutive removal passes. Policy constant,
/// not a failure backoff.
pub const INTER_PASS_DELAY: Duration = Duration::from_millis(1500);

/// Run `passes` sequential removal edits starting from the composite.
///
/// On success the returned frames are the composite (ordinal 0)
/// followed by one frame per pass, in pass order: `passes + 1` frames
/// total. Any failure aborts the chain with
/// [`BoothError::ChainAborted`]; pass 0 denotes the initial upload.
pub async fn run_chain(
    editor: &dyn ImageEditor,
    dirs: &BoothDirs,
    stamp: Stamp,
    composite_path: &Path,
    prompt: &str,
    passes: u32,
) -> Result<Vec<Frame>, BoothError> {
    let composite_bytes = tokio::fs::read(composite_path)
        .await
        .map_err(|e| aborted(0, format!("reading composite failed: {e}")))?;

    let mut current_url = editor
        .upload(composite_bytes, &format!("{stamp}.jpg"))
        .await
        .map_err(|e| aborted(0, format!("composite upload failed: {e}")))?;

    let mut frames = vec![Frame::new(0, composite_path)];

    for pass in 1..=passes {
        tracing::info!(stamp, pass, passes, url = %current_url, "Running removal pass");

        let result = editor
            .edit(prompt, &current_url)
            .await
            .map_err(|e| aborted(pass, edit_failed(prompt, e).to_string()))?;

        let bytes = editor
            .fetch(&result.image_url)
            .await
            .map_err(|e| aborted(pass, format!("fetching pass output failed: {e}")))?;

        let frame_path = dirs.removal_frame_path(stamp, pass);
        tokio::fs::write(&frame_path, &bytes)
            .await
            .map_err(|e| aborted(pass, format!("saving pass output failed: {e}")))?;

        tracing::info!(stamp, pass, path = %frame_path.display(), "Saved removal frame");
        frames.push(Frame::new(pass as usize, frame_path));

        // The next pass consumes this pass's literal output, so it must
        // be re-uploaded before the chain can continue.
        if pass < passes {
            tokio::time::sleep(INTER_PASS_DELAY).await;
            let name = format!("{stamp}_remove{pass}.jpg");
            current_url = editor
                .upload(bytes, &name)
                .await
                .map_err(|e| aborted(pass, format!("re-upload of pass output failed: {e}")))?;
        }
    }

    tracing::info!(stamp, frames = frames.len(), "Removal chain complete");
    Ok(frames)
}

fn aborted(pass: u32, message: String) -> BoothError {
    BoothError::ChainAborted { pass, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{tiny_jpeg, StubEditor};
    use assert_matches::assert_matches;

    async fn setup() -> (tempfile::TempDir, BoothDirs, std::path::PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = BoothDirs::new(tmp.path().join("uploads"), tmp.path().join("photos"));
        dirs.ensure().await.unwrap();
        let composite = dirs.composite_path(42);
        tokio::fs::write(&composite, tiny_jpeg(16, 16)).await.unwrap();
        (tmp, dirs, composite)
    }

    #[tokio::test(start_paused = true)]
    async fn produces_passes_plus_one_frames() {
        let (_tmp, dirs, composite) = setup().await;
        let stub = StubEditor::new();

        let frames = run_chain(&stub, &dirs, 42, &composite, "remove one", 3)
            .await
            .unwrap();

        assert_eq!(frames.len(), 4);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.ordinal, i);
        }
        assert_eq!(frames[0].path, composite);
        for frame in &frames[1..] {
            assert!(frame.path.exists());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn passes_are_strictly_sequential() {
        let (_tmp, dirs, composite) = setup().await;
        let stub = StubEditor::new();

        run_chain(&stub, &dirs, 42, &composite, "remove one", 3)
            .await
            .unwrap();

        // Pass k+1 consumed the re-uploaded output of pass k: every
        // edit call saw the most recent upload's URL.
        let log = stub.edit_log.lock().unwrap();
        assert_eq!(log.len(), 3);
        for (i, (_, url)) in log.iter().enumerate() {
            assert_eq!(url, &format!("http://stub/upload/{}", i + 1));
        }
        // Initial upload plus one re-upload per non-final pass.
        assert_eq!(stub.upload_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn single_pass_chain() {
        let (_tmp, dirs, composite) = setup().await;
        let stub = StubEditor::new();

        let frames = run_chain(&stub, &dirs, 42, &composite, "remove one", 1)
            .await
            .unwrap();
        assert_eq!(frames.len(), 2);
        // No re-upload after the final pass.
        assert_eq!(stub.upload_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_pass_aborts_the_whole_chain() {
        let (_tmp, dirs, composite) = setup().await;
        let mut stub = StubEditor::new();
        stub.fail_edit_call = Some(2);

        let err = run_chain(&stub, &dirs, 42, &composite, "remove one", 2)
            .await
            .unwrap_err();

        assert_matches!(err, BoothError::ChainAborted { pass: 2, .. });
        // No animation artifact, ever, for an aborted chain.
        assert!(!dirs.animation_path(42).exists());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_composite_aborts_at_pass_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = BoothDirs::new(tmp.path().join("u"), tmp.path().join("p"));
        dirs.ensure().await.unwrap();
        let stub = StubEditor::new();

        let err = run_chain(&stub, &dirs, 42, &dirs.composite_path(42), "remove", 2)
            .await
            .unwrap_err();
        assert_matches!(err, BoothError::ChainAborted { pass: 0, .. });
        assert_eq!(stub.edit_count(), 0);
    }
}
