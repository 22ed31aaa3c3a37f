//! Strip composition: three photos on a fixed-size background template.
//!
//! Layout is deterministic and not configurable per call: the past
//! style goes in the top cell, the original in the middle, the future
//! style at the bottom. Every input is crop-to-filled to the cell size
//! first, so the output canvas is always exactly
//! [`CANVAS_WIDTH`]x[`CANVAS_HEIGHT`] regardless of input dimensions.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use crate::error::BoothError;

// ---------------------------------------------------------------------------
// Fixed layout constants
// ---------------------------------------------------------------------------

/// Output canvas width in pixels.
pub const CANVAS_WIDTH: u32 = 600;
/// Output canvas height in pixels.
pub const CANVAS_HEIGHT: u32 = 1800;
/// Width of each photo cell.
pub const CELL_WIDTH: u32 = 540;
/// Height of each photo cell.
pub const CELL_HEIGHT: u32 = 480;
/// Left/right margin around the cells.
pub const SIDE_MARGIN: u32 = 30;
/// Margin above the first cell.
pub const TOP_MARGIN: u32 = 40;
/// Vertical gap between consecutive cells.
pub const VERTICAL_GAP: u32 = 60;

/// Number of cells on the strip.
const CELL_COUNT: usize = 3;

/// Vertical offset of cell `i` (0 = top).
fn cell_top(i: usize) -> u32 {
    TOP_MARGIN + i as u32 * (CELL_HEIGHT + VERTICAL_GAP)
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Render the three-cell strip onto the background template.
///
/// Pure in-memory composition -- the caller decides where (and whether)
/// the result is written, so a failure can never leave a partial file
/// on durable storage.
pub fn compose_strip(
    past: &DynamicImage,
    original: &DynamicImage,
    future: &DynamicImage,
    template: &DynamicImage,
) -> RgbaImage {
    let mut canvas = template
        .resize_to_fill(CANVAS_WIDTH, CANVAS_HEIGHT, FilterType::Lanczos3)
        .to_rgba8();

    let cells = [past, original, future];
    debug_assert_eq!(cells.len(), CELL_COUNT);

    for (i, cell) in cells.iter().enumerate() {
        let resized = cell.resize_to_fill(CELL_WIDTH, CELL_HEIGHT, FilterType::Lanczos3);
        image::imageops::overlay(
            &mut canvas,
            &resized.to_rgba8(),
            SIDE_MARGIN as i64,
            cell_top(i) as i64,
        );
    }

    canvas
}

/// Decode the inputs, compose the strip, and write it to `out_path`.
///
/// `past_bytes` and `future_bytes` are the downloaded styled results;
/// `original_bytes` is the captured photo as received. Any unreadable
/// input or missing template fails the whole composition before a
/// single byte is written.
pub fn compose_to_file(
    past_bytes: &[u8],
    original_bytes: &[u8],
    future_bytes: &[u8],
    template_path: &Path,
    out_path: &Path,
) -> Result<(), BoothError> {
    let template = image::open(template_path).map_err(|e| {
        BoothError::CompositionFailed(format!(
            "background template {} unreadable: {e}",
            template_path.display()
        ))
    })?;

    let past = decode("past", past_bytes)?;
    let original = decode("original", original_bytes)?;
    let future = decode("future", future_bytes)?;

    let strip = compose_strip(&past, &original, &future, &template);

    DynamicImage::ImageRgba8(strip)
        .to_rgb8()
        .save(out_path)
        .map_err(|e| {
            BoothError::CompositionFailed(format!("writing {} failed: {e}", out_path.display()))
        })?;

    tracing::info!(path = %out_path.display(), "Saved composite strip");
    Ok(())
}

fn decode(label: &str, bytes: &[u8]) -> Result<DynamicImage, BoothError> {
    image::load_from_memory(bytes)
        .map_err(|e| BoothError::CompositionFailed(format!("{label} image unreadable: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(px)))
    }

    #[test]
    fn canvas_dimensions_are_constant() {
        let template = solid(100, 100, [10, 10, 10, 255]);
        // Wildly different input sizes must still yield the fixed canvas.
        for (pw, ph, ow, oh, fw, fh) in [
            (50, 50, 4000, 100, 540, 480),
            (1, 1, 2, 3, 5, 8),
            (1920, 1080, 600, 1800, 300, 300),
        ] {
            let out = compose_strip(
                &solid(pw, ph, [255, 0, 0, 255]),
                &solid(ow, oh, [0, 255, 0, 255]),
                &solid(fw, fh, [0, 0, 255, 255]),
                &template,
            );
            assert_eq!((out.width(), out.height()), (CANVAS_WIDTH, CANVAS_HEIGHT));
        }
    }

    #[test]
    fn cells_are_placed_top_to_bottom() {
        let template = solid(600, 1800, [0, 0, 0, 255]);
        let out = compose_strip(
            &solid(10, 10, [255, 0, 0, 255]),
            &solid(10, 10, [0, 255, 0, 255]),
            &solid(10, 10, [0, 0, 255, 255]),
            &template,
        );
        // Sample the center of each cell: past, original, future.
        let cx = SIDE_MARGIN + CELL_WIDTH / 2;
        let centers: Vec<_> = (0..3)
            .map(|i| *out.get_pixel(cx, cell_top(i) + CELL_HEIGHT / 2))
            .collect();
        assert_eq!(centers[0], Rgba([255, 0, 0, 255]));
        assert_eq!(centers[1], Rgba([0, 255, 0, 255]));
        assert_eq!(centers[2], Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn layout_fits_the_canvas() {
        let bottom = cell_top(CELL_COUNT - 1) + CELL_HEIGHT;
        assert!(bottom <= CANVAS_HEIGHT);
        assert!(SIDE_MARGIN + CELL_WIDTH <= CANVAS_WIDTH);
    }

    #[test]
    fn missing_template_fails_without_output() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out.jpg");
        let bytes = encode_jpeg(&solid(10, 10, [1, 2, 3, 255]));

        let err = compose_to_file(
            &bytes,
            &bytes,
            &bytes,
            Path::new("/nonexistent/background.jpg"),
            &out,
        )
        .unwrap_err();

        assert!(matches!(err, BoothError::CompositionFailed(_)));
        assert!(!out.exists());
    }

    #[test]
    fn unreadable_source_fails_without_output() {
        let tmp = tempfile::tempdir().unwrap();
        let template_path = tmp.path().join("bg.jpg");
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 32, Rgba([9, 9, 9, 255])))
            .to_rgb8()
            .save(&template_path)
            .unwrap();
        let out = tmp.path().join("out.jpg");
        let good = encode_jpeg(&solid(10, 10, [1, 2, 3, 255]));

        let err = compose_to_file(&good, b"not an image", &good, &template_path, &out).unwrap_err();
        assert!(matches!(err, BoothError::CompositionFailed(_)));
        assert!(!out.exists());
    }

    #[test]
    fn compose_to_file_writes_fixed_canvas() {
        let tmp = tempfile::tempdir().unwrap();
        let template_path = tmp.path().join("bg.jpg");
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 32, Rgba([9, 9, 9, 255])))
            .to_rgb8()
            .save(&template_path)
            .unwrap();
        let out = tmp.path().join("out.jpg");
        let bytes = encode_jpeg(&solid(77, 33, [1, 2, 3, 255]));

        compose_to_file(&bytes, &bytes, &bytes, &template_path, &out).unwrap();

        let written = image::open(&out).unwrap();
        assert_eq!(
            (written.width(), written.height()),
            (CANVAS_WIDTH, CANVAS_HEIGHT)
        );
    }

    fn encode_jpeg(img: &DynamicImage) -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        img.to_rgb8()
            .write_to(&mut buf, image::ImageFormat::Jpeg)
            .unwrap();
        buf.into_inner()
    }
}
