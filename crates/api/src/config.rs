//! Server configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use timebooth_fal::client::{FalConfig, DEFAULT_API_URL};

/// Default prompt for the background removal passes when a submission
/// does not supply one.
pub const DEFAULT_REMOVE_PROMPT: &str =
    "remove the most prominent subject from the photo, leaving the scene behind it intact";

/// Server configuration.
///
/// All fields have defaults suitable for local development except
/// `FAL_KEY`, which must be set. Constructed once at startup and
/// passed explicitly into every component that needs it.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins; empty or `*` means allow any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`).
    pub request_timeout_secs: u64,
    /// Per-call timeout for the generative service (default: `120`).
    pub edit_timeout_secs: u64,
    /// Directory for received originals (default: `uploads`).
    pub upload_dir: PathBuf,
    /// Directory for composites, frames, and animations (default: `photos`).
    pub photo_dir: PathBuf,
    /// Background template for the strip (default: `assets/background.jpg`).
    pub template_path: PathBuf,
    /// Generative service base URL.
    pub fal_api_url: String,
    /// Generative service API key.
    pub fal_key: String,
    /// Number of removal passes per submission (default: `3`).
    pub removal_passes: u32,
    /// Print server URL; the print hand-off is skipped when unset.
    pub print_server_url: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `HOST`                 | `0.0.0.0`                |
    /// | `PORT`                 | `8000`                   |
    /// | `CORS_ORIGINS`         | `*`                      |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                    |
    /// | `EDIT_TIMEOUT_SECS`    | `120`                    |
    /// | `UPLOAD_DIR`           | `uploads`                |
    /// | `PHOTO_DIR`            | `photos`                 |
    /// | `TEMPLATE_PATH`        | `assets/background.jpg`  |
    /// | `FAL_API_URL`          | `https://fal.run`        |
    /// | `FAL_KEY`              | (required)               |
    /// | `REMOVAL_PASSES`       | `3`                      |
    /// | `PRINT_SERVER_URL`     | (unset: no print hand-off) |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let edit_timeout_secs: u64 = std::env::var("EDIT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("EDIT_TIMEOUT_SECS must be a valid u64");

        let upload_dir = PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));
        let photo_dir = PathBuf::from(std::env::var("PHOTO_DIR").unwrap_or_else(|_| "photos".into()));
        let template_path = PathBuf::from(
            std::env::var("TEMPLATE_PATH").unwrap_or_else(|_| "assets/background.jpg".into()),
        );

        let fal_api_url =
            std::env::var("FAL_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let fal_key = std::env::var("FAL_KEY").expect("FAL_KEY must be set");

        let removal_passes: u32 = std::env::var("REMOVAL_PASSES")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("REMOVAL_PASSES must be a valid u32");

        let print_server_url = std::env::var("PRINT_SERVER_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            edit_timeout_secs,
            upload_dir,
            photo_dir,
            template_path,
            fal_api_url,
            fal_key,
            removal_passes,
            print_server_url,
        }
    }

    /// Generative service client configuration derived from this config.
    pub fn fal_config(&self) -> FalConfig {
        FalConfig {
            api_url: self.fal_api_url.clone(),
            api_key: self.fal_key.clone(),
            timeout: Duration::from_secs(self.edit_timeout_secs),
        }
    }
}
