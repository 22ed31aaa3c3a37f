//! Domain logic for the photo-booth post-capture pipeline.
//!
//! Pure image work (strip composition, frame normalization, transition
//! graph construction), the ffmpeg command layer, durable storage
//! naming, and the shared error taxonomy. No network code lives here.

pub mod compose;
pub mod error;
pub mod ffmpeg;
pub mod frames;
pub mod storage;
pub mod transition;
