//! HTTP client for the fal.ai generative image-edit service.
//!
//! Wraps storage upload, prompt-driven edits, and result download
//! behind a typed client, and exposes the [`editor::ImageEditor`] trait
//! so the pipeline can run against stubs in tests.

pub mod client;
pub mod editor;

pub use client::{EditResult, FalClient, FalConfig, FalError};
pub use editor::ImageEditor;
