//! Thumbnail derivation for eligible media files.

use std::path::Path;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use image::{imageops, ImageFormat, Rgba, RgbaImage};
use tokio::process::Command;

use filesafe_core::ext::{is_video_extension, last_extension, thumbnail_eligible};
use filesafe_storage::LocalStorage;

/// Side length of the square thumbnail canvas, and target width of video
/// frame previews.
pub const THUMBNAIL_SIZE: u32 = 200;

/// Derives fixed-size previews after the upload response has been sent.
/// Failures never affect the already-communicated success status; the
/// background pool logs them and moves on.
pub struct Thumbnailer {
    ffmpeg_path: String,
}

impl Thumbnailer {
    pub fn new(ffmpeg_path: String) -> Self {
        Self { ffmpeg_path }
    }

    /// Generate the thumbnail for a stored blob. Idempotent: an existing
    /// thumbnail under the derived name short-circuits.
    ///
    /// Images are resized to fit inside the bounding box and centered on an
    /// exact square transparent canvas; videos contribute their frame at
    /// timestamp zero, scaled to a fixed width with proportional height.
    pub async fn generate(&self, storage: &LocalStorage, storage_name: &str) -> Result<()> {
        let extension = last_extension(storage_name);
        if !thumbnail_eligible(&extension) {
            return Ok(());
        }

        let thumb_path = storage.thumbnail_path(storage_name);
        if tokio::fs::try_exists(&thumb_path).await.unwrap_or(false) {
            tracing::debug!(name = %storage_name, "Thumbnail already exists, skipping");
            return Ok(());
        }

        let source = storage.blob_path(storage_name)?;

        if is_video_extension(&extension) {
            self.video_frame(&source, &thumb_path).await
        } else {
            image_thumbnail(&source, &thumb_path).await
        }
    }

    async fn video_frame(&self, source: &Path, dest: &Path) -> Result<()> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-ss")
            .arg("0")
            .arg("-i")
            .arg(source)
            .arg("-frames:v")
            .arg("1")
            .arg("-vf")
            .arg(format!("scale={}:-2", THUMBNAIL_SIZE))
            .arg("-y")
            .arg(dest)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("FFmpeg frame extraction failed: {}", stderr);
        }

        Ok(())
    }
}

async fn image_thumbnail(source: &Path, dest: &Path) -> Result<()> {
    let source = source.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let img = image::ImageReader::open(&source)
            .with_context(|| format!("Failed to open {}", source.display()))?
            .with_guessed_format()?
            .decode()
            .context("Failed to decode image")?;

        // Fit within the box, keeping aspect ratio; small images stay small.
        let resized = img.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE).to_rgba8();

        let mut canvas =
            RgbaImage::from_pixel(THUMBNAIL_SIZE, THUMBNAIL_SIZE, Rgba([0, 0, 0, 0]));
        let x = i64::from((THUMBNAIL_SIZE - resized.width()) / 2);
        let y = i64::from((THUMBNAIL_SIZE - resized.height()) / 2);
        imageops::overlay(&mut canvas, &resized, x, y);

        canvas
            .save_with_format(&dest, ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        Ok(())
    })
    .await
    .context("Thumbnail task panicked")?
}
