//! Error taxonomy shared across the pipeline.
//!
//! Synchronous-path errors (`UploadFailed`, `EditFailed`,
//! `CompositionFailed`) abort the request and surface to the client.
//! Background-path errors (`ChainAborted`, `RenderFailed`) are logged
//! only and must never affect the already-sent response.

#[derive(Debug, thiserror::Error)]
pub enum BoothError {
    /// No photo was received with the submission.
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// A generative edit call failed or returned no images.
    ///
    /// `detail` carries the upstream status/body payload when the
    /// service provided one, for diagnostics.
    #[error("Edit failed for prompt '{prompt}': {message}")]
    EditFailed {
        prompt: String,
        message: String,
        detail: Option<serde_json::Value>,
    },

    /// The strip composition could not be produced (missing template
    /// or unreadable source image).
    #[error("Composition failed: {0}")]
    CompositionFailed(String),

    /// A removal pass failed; the whole chain is abandoned.
    #[error("Removal chain aborted at pass {pass}: {message}")]
    ChainAborted { pass: u32, message: String },

    /// The ffmpeg render failed or produced no output file.
    #[error("Animation render failed: {0}")]
    RenderFailed(String),
}

impl BoothError {
    /// True for errors that only ever occur on the detached background
    /// path and therefore must not be mapped to an HTTP response.
    pub fn is_background(&self) -> bool {
        matches!(
            self,
            BoothError::ChainAborted { .. } | BoothError::RenderFailed(_)
        )
    }
}
