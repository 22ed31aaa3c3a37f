//! Print hand-off: duplicate the strip onto a print sheet and POST it
//! to the print server.
//!
//! Fire-and-forget like the animation pipeline -- a printer problem
//! must never fail a submission that already succeeded.

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use timebooth_core::storage::{BoothDirs, Stamp};

/// Print sheet dimensions: two strips side by side.
const SHEET_WIDTH: u32 = 1200;
const SHEET_HEIGHT: u32 = 1800;
const STRIP_WIDTH: u32 = 600;

/// Detached task body: build the print sheet and hand it off.
pub async fn handoff(print_url: String, composite_path: PathBuf, dirs: BoothDirs, stamp: Stamp) {
    if let Err(e) = send_to_print_server(&print_url, &composite_path, &dirs, stamp).await {
        tracing::error!(stamp, error = %e, "Print hand-off failed");
    }
}

async fn send_to_print_server(
    print_url: &str,
    composite_path: &Path,
    dirs: &BoothDirs,
    stamp: Stamp,
) -> anyhow::Result<()> {
    let print_path = dirs.print_path(stamp);

    let composite = composite_path.to_path_buf();
    let out = print_path.clone();
    tokio::task::spawn_blocking(move || write_print_sheet(&composite, &out))
        .await
        .context("print sheet task panicked")??;

    let bytes = tokio::fs::read(&print_path)
        .await
        .with_context(|| format!("reading {}", print_path.display()))?;

    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(format!("{stamp}_print.jpg"))
        .mime_str("image/jpeg")?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let response = reqwest::Client::new()
        .post(print_url)
        .multipart(form)
        .send()
        .await
        .context("posting to print server")?;

    anyhow::ensure!(
        response.status().is_success(),
        "print server returned {}",
        response.status()
    );

    tracing::info!(stamp, "Print server accepted the strip");
    Ok(())
}

/// Two copies of the strip, side by side on a white sheet.
fn write_print_sheet(composite_path: &Path, out_path: &Path) -> anyhow::Result<()> {
    let strip = image::open(composite_path)
        .with_context(|| format!("opening {}", composite_path.display()))?
        .resize_to_fill(STRIP_WIDTH, SHEET_HEIGHT, FilterType::Lanczos3)
        .to_rgba8();

    let mut sheet = RgbaImage::from_pixel(SHEET_WIDTH, SHEET_HEIGHT, Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut sheet, &strip, 0, 0);
    image::imageops::overlay(&mut sheet, &strip, STRIP_WIDTH as i64, 0);

    DynamicImage::ImageRgba8(sheet)
        .to_rgb8()
        .save(out_path)
        .with_context(|| format!("writing {}", out_path.display()))?;
    Ok(())
}
