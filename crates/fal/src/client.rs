//! REST client for the fal.ai storage and edit endpoints.
//!
//! The service's response shapes vary: an upload may come back as a
//! bare URL string or wrapped in `{ "file": { "url": ... } }`, and an
//! edit's image list mixes bare strings with `{ "url": ... }` objects.
//! Both variances are normalized here, at the boundary, so nothing
//! downstream ever sees them.

use std::time::Duration;

use serde::Deserialize;

/// Model identifier for prompt-driven image edits.
pub const EDIT_MODEL: &str = "fal-ai/nano-banana/edit";

/// Default service base URL.
pub const DEFAULT_API_URL: &str = "https://fal.run";

/// Connection configuration for the fal.ai service.
#[derive(Debug, Clone)]
pub struct FalConfig {
    /// Base HTTP URL (e.g. `https://fal.run`).
    pub api_url: String,
    /// API key sent as `Authorization: Key <key>`.
    pub api_key: String,
    /// Bound on every service call, including image downloads.
    pub timeout: Duration,
}

/// HTTP client for the fal.ai service.
pub struct FalClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

/// A successful edit: exactly one resolvable image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResult {
    pub image_url: String,
}

/// Errors from the fal.ai boundary.
#[derive(Debug, thiserror::Error)]
pub enum FalError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("fal.ai API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The edit response contained no images. Hard failure, not an
    /// empty result.
    #[error("edit returned no images")]
    NoImages,

    /// The upload response contained no resolvable URL.
    #[error("upload returned no URL")]
    NoUploadUrl,
}

impl FalError {
    /// Structured diagnostic payload, when the upstream body was JSON.
    pub fn detail(&self) -> Option<serde_json::Value> {
        match self {
            FalError::Api { status, body } => {
                let parsed = serde_json::from_str(body)
                    .unwrap_or_else(|_| serde_json::Value::String(body.clone()));
                Some(serde_json::json!({ "status": status, "body": parsed }))
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// One produced image: bare URL string or `{ "url": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageRef {
    Url(String),
    Object { url: String },
}

impl ImageRef {
    fn into_url(self) -> String {
        match self {
            ImageRef::Url(url) | ImageRef::Object { url } => url,
        }
    }
}

/// Body of a successful edit call.
#[derive(Debug, Deserialize)]
struct EditResponse {
    #[serde(default)]
    images: Vec<ImageRef>,
}

/// Body of a successful storage upload: bare URL string or
/// `{ "file": { "url": ... } }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UploadResponse {
    Url(String),
    Wrapped { file: UploadedFile },
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    url: Option<String>,
}

/// Extract the single result image from an edit response.
///
/// The list is ordered; the first image wins and later ones are
/// discarded. An absent or empty list is [`FalError::NoImages`].
fn first_image(response: EditResponse) -> Result<EditResult, FalError> {
    response
        .images
        .into_iter()
        .next()
        .map(|img| EditResult {
            image_url: img.into_url(),
        })
        .ok_or(FalError::NoImages)
}

fn upload_url(response: UploadResponse) -> Result<String, FalError> {
    match response {
        UploadResponse::Url(url) if !url.is_empty() => Ok(url),
        UploadResponse::Wrapped {
            file: UploadedFile { url: Some(url) },
        } if !url.is_empty() => Ok(url),
        _ => Err(FalError::NoUploadUrl),
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

impl FalClient {
    /// Create a client with a bounded per-call timeout.
    pub fn new(config: &FalConfig) -> Result<Self, FalError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Upload image bytes to service storage, returning the reference
    /// the edit endpoint can resolve.
    pub async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, FalError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("image/jpeg")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/storage/upload", self.api_url))
            .header("Authorization", format!("Key {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let parsed: UploadResponse = Self::parse_response(response).await?;
        let url = upload_url(parsed)?;
        tracing::debug!(%url, "Uploaded image to fal storage");
        Ok(url)
    }

    /// Run one prompt-driven edit against an uploaded image.
    pub async fn edit(&self, prompt: &str, image_url: &str) -> Result<EditResult, FalError> {
        let body = serde_json::json!({
            "prompt": prompt,
            "image_urls": [image_url],
            "num_images": 1,
            "output_format": "jpeg",
        });

        let response = self
            .client
            .post(format!("{}/{EDIT_MODEL}", self.api_url))
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let parsed: EditResponse = Self::parse_response(response).await?;
        first_image(parsed)
    }

    /// Download a produced image.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FalError> {
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, or capture the
    /// status and body into a [`FalError::Api`].
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FalError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FalError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, FalError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
