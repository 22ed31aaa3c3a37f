use std::sync::Arc;

use timebooth_core::storage::BoothDirs;
use timebooth_fal::ImageEditor;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// The editor is held behind the [`ImageEditor`] seam so integration
/// tests can run the full submit path against an in-process stub.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The two durable storage directories.
    pub dirs: BoothDirs,
    /// Generative image-edit service client.
    pub fal: Arc<dyn ImageEditor>,
}
