//! Dual-style fan-out: the "past" and "future" edits in parallel.

use timebooth_core::error::BoothError;
use timebooth_fal::client::{EditResult, FalError};
use timebooth_fal::ImageEditor;

/// Both styled results, paired by label.
///
/// Pairing is by label, never by completion order -- whichever edit
/// finishes first, `past` always corresponds to `past_prompt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledPair {
    pub past: EditResult,
    pub future: EditResult,
}

/// Run both style edits concurrently against the same source reference
/// and join them.
///
/// All-or-nothing barrier: if either edit fails the whole fan-out
/// fails, and no partial pair is ever returned.
pub async fn fan_out_edits(
    editor: &dyn ImageEditor,
    image_url: &str,
    past_prompt: &str,
    future_prompt: &str,
) -> Result<StyledPair, BoothError> {
    tracing::info!("Sending style edits (past + future)");

    let (past, future) = tokio::try_join!(
        run_edit(editor, past_prompt, image_url),
        run_edit(editor, future_prompt, image_url),
    )?;

    tracing::info!(past = %past.image_url, future = %future.image_url, "Style edits complete");
    Ok(StyledPair { past, future })
}

/// One style edit with its failure contextualized to the prompt.
pub(crate) async fn run_edit(
    editor: &dyn ImageEditor,
    prompt: &str,
    image_url: &str,
) -> Result<EditResult, BoothError> {
    editor
        .edit(prompt, image_url)
        .await
        .map_err(|e| edit_failed(prompt, e))
}

/// Map a service failure to the taxonomy, keeping the upstream
/// status/body payload when one exists.
pub(crate) fn edit_failed(prompt: &str, e: FalError) -> BoothError {
    BoothError::EditFailed {
        prompt: prompt.to_string(),
        detail: e.detail(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::StubEditor;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn returns_both_results_paired_by_label() {
        let stub = StubEditor::new();
        let pair = fan_out_edits(&stub, "http://stub/src.jpg", "sepia 1920s", "chrome 2120s")
            .await
            .unwrap();

        assert!(pair.past.image_url.contains("sepia 1920s"));
        assert!(pair.future.image_url.contains("chrome 2120s"));
        assert_eq!(stub.edit_count(), 2);
    }

    #[tokio::test]
    async fn both_edits_see_the_same_source() {
        let stub = StubEditor::new();
        fan_out_edits(&stub, "http://stub/src.jpg", "a", "b")
            .await
            .unwrap();

        let log = stub.edit_log.lock().unwrap();
        assert!(log.iter().all(|(_, url)| url == "http://stub/src.jpg"));
    }

    #[tokio::test]
    async fn fails_atomically_when_one_edit_fails() {
        let mut stub = StubEditor::new();
        stub.fail_prompt = Some("chrome 2120s".to_string());

        let err = fan_out_edits(&stub, "http://stub/src.jpg", "sepia 1920s", "chrome 2120s")
            .await
            .unwrap_err();

        // The error names the failing prompt; no partial pair exists.
        assert_matches!(err, BoothError::EditFailed { prompt, .. } => {
            assert_eq!(prompt, "chrome 2120s");
        });
    }

    #[tokio::test]
    async fn fails_when_both_fail() {
        let mut stub = StubEditor::new();
        stub.fail_prompt = Some("sepia 1920s".to_string());
        stub.fail_edit_call = Some(2);

        let err = fan_out_edits(&stub, "http://stub/src.jpg", "sepia 1920s", "chrome 2120s")
            .await
            .unwrap_err();
        assert_matches!(err, BoothError::EditFailed { .. });
    }
}
