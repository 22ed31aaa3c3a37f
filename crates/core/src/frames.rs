//! Ordered frame sequences and size normalization.
//!
//! The animation is built from an ordered sequence of frames: ordinal 0
//! is the composite strip, ordinals 1..N are the successive removal
//! outputs. Before ffmpeg can blend them they must all share one
//! (width, height), taken from frame 0.

use std::path::PathBuf;

use image::imageops::FilterType;
use image::DynamicImage;

/// One frame of the animation, addressed by its position in the
/// presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 0 = composite strip, 1..N = removal pass outputs.
    pub ordinal: usize,
    /// On-disk location of the frame image.
    pub path: PathBuf,
}

impl Frame {
    pub fn new(ordinal: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            ordinal,
            path: path.into(),
        }
    }
}

/// Resize every frame to frame 0's natural dimensions.
///
/// Crop-to-fill, order preserved, length preserved. Frames already at
/// the target size pass through unchanged, so running this on an
/// already-normalized sequence is a no-op.
pub fn normalize_frames(frames: &[DynamicImage]) -> Vec<DynamicImage> {
    let Some(first) = frames.first() else {
        return Vec::new();
    };
    let (w, h) = (first.width(), first.height());

    frames
        .iter()
        .map(|f| {
            if f.width() == w && f.height() == h {
                f.clone()
            } else {
                f.resize_to_fill(w, h, FilterType::Lanczos3)
            }
        })
        .collect()
}
