use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

/// Subdirectory of the media directory holding post images
pub const IMAGE_DIR: &str = "post_imgs";

/// Extensions accepted for uploaded images, compared case-insensitively
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// The lowercased extension of an acceptable image file name
pub fn image_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Writes an uploaded image under a fresh name
///
/// ### Returns
///
/// The stored path relative to `media_dir`, e.g. `post_imgs/<uuid>.png`
///
/// ### Errors
///
/// Returns an error if the file name has no accepted image extension or
/// the file cannot be written.
#[instrument(skip(media_dir, data), fields(size = data.len()))]
pub async fn save_image(media_dir: &Path, filename: &str, data: &[u8]) -> Result<String> {
    let ext = image_extension(filename)
        .with_context(|| format!("Not an accepted image file name: {filename}"))?;

    let dir = media_dir.join(IMAGE_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let stored = format!("{}.{}", uuid::Uuid::new_v4(), ext);
    let target = dir.join(&stored);
    tokio::fs::write(&target, data)
        .await
        .with_context(|| format!("Failed to write {}", target.display()))?;

    debug!("Saved image to {}", target.display());
    Ok(format!("{IMAGE_DIR}/{stored}"))
}

/// URL under which a stored media path is served
pub fn media_url(path: &str) -> String {
    format!("/media/{path}")
}
