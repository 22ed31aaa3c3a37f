//! HTTP surface of the photo-booth backend.
//!
//! Exposed as a library so integration tests can build the exact same
//! router and middleware stack the binary uses.

pub mod config;
pub mod error;
pub mod handlers;
pub mod print;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
