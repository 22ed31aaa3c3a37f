//! Durable storage layout and timestamp-derived naming.
//!
//! Two directories back the whole system: one for received originals
//! and one for composites, removal frames, and animations. There is no
//! database -- every artifact of a submission is addressed by the
//! submission's millisecond timestamp, which also keeps concurrent
//! submissions from colliding. The core only ever appends here;
//! nothing is auto-deleted except the normalized-frame temporaries
//! owned by a single render.

use std::path::{Path, PathBuf};

/// Suffix appended to a frame's file stem for its normalized copy.
const NORM_SUFFIX: &str = "_norm";

/// Fallback extension when an uploaded filename has none.
const DEFAULT_EXT: &str = "jpg";

/// Millisecond timestamp identifying one submission.
pub type Stamp = i64;

/// Allocate a new submission stamp from the current wall clock.
pub fn new_stamp() -> Stamp {
    chrono::Utc::now().timestamp_millis()
}

/// The two durable directories used by the pipeline.
#[derive(Debug, Clone)]
pub struct BoothDirs {
    /// Received originals, served back at `/uploads`.
    pub uploads: PathBuf,
    /// Composites, removal frames, and animations, served at `/photos`.
    pub photos: PathBuf,
}

impl BoothDirs {
    pub fn new(uploads: impl Into<PathBuf>, photos: impl Into<PathBuf>) -> Self {
        Self {
            uploads: uploads.into(),
            photos: photos.into(),
        }
    }

    /// Create both directories if they do not exist yet.
    pub async fn ensure(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.uploads).await?;
        tokio::fs::create_dir_all(&self.photos).await?;
        Ok(())
    }

    /// Path for a received original: `photo_<stamp>.<ext>`.
    pub fn original_path(&self, stamp: Stamp, ext: &str) -> PathBuf {
        self.uploads.join(format!("photo_{stamp}.{ext}"))
    }

    /// Path for the composite strip: `<stamp>.jpg`.
    pub fn composite_path(&self, stamp: Stamp) -> PathBuf {
        self.photos.join(format!("{stamp}.jpg"))
    }

    /// Path for removal pass `pass` output: `<stamp>_remove<pass>.jpg`.
    pub fn removal_frame_path(&self, stamp: Stamp, pass: u32) -> PathBuf {
        self.photos.join(format!("{stamp}_remove{pass}.jpg"))
    }

    /// Path for the final animation: `<stamp>.gif`.
    pub fn animation_path(&self, stamp: Stamp) -> PathBuf {
        self.photos.join(format!("{stamp}.gif"))
    }

    /// Path for the print-ready double strip: `<stamp>_print.jpg`.
    pub fn print_path(&self, stamp: Stamp) -> PathBuf {
        self.photos.join(format!("{stamp}_print.jpg"))
    }
}

/// Extension of an uploaded filename, lowercased, defaulting to `jpg`.
///
/// Only alphanumeric extensions are accepted so a hostile filename
/// cannot smuggle path separators into the stored name.
pub fn upload_ext(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXT.to_string())
}

/// Sibling path for the normalized copy of a frame:
/// `<stem>_norm.<ext>` next to the input.
pub fn normalized_path(frame_path: &Path) -> PathBuf {
    let stem = frame_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("frame");
    let ext = frame_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or(DEFAULT_EXT);
    frame_path.with_file_name(format!("{stem}{NORM_SUFFIX}.{ext}"))
}
