//! Trait seam between the pipeline and the generative service.
//!
//! The pipeline's fan-out and removal chain only ever talk to this
//! trait, so their join semantics, ordering, and failure policies are
//! testable with in-process stubs.

use async_trait::async_trait;

use crate::client::{EditResult, FalClient, FalError};

/// A service that can host images and apply prompt-driven edits.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Upload image bytes, returning a service-resolvable reference.
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, FalError>;

    /// Apply one edit to an already-uploaded image.
    async fn edit(&self, prompt: &str, image_url: &str) -> Result<EditResult, FalError>;

    /// Download a produced image.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FalError>;
}

#[async_trait]
impl ImageEditor for FalClient {
    async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, FalError> {
        FalClient::upload(self, bytes, filename).await
    }

    async fn edit(&self, prompt: &str, image_url: &str) -> Result<EditResult, FalError> {
        FalClient::edit(self, prompt, image_url).await
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FalError> {
        FalClient::fetch_bytes(self, url).await
    }
}
