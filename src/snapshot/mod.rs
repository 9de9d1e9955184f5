//! Annotated stills: pseudo-color, legend and statistics.
//!
//! Annotation is CPU-bound and may take longer than a frame, so the preview
//! runs it through [`annotate_async`] on the blocking pool.

mod annotate;
mod legend;
mod text;

use std::path::{Path, PathBuf};

use image::RgbImage;

pub use annotate::{pseudo_color, AnnotatedImage, Annotator, AnnotatorConfig, SnapshotError, SnapshotStats};
pub use legend::{band_labels, LegendStyle, LEGEND_HEADER};
pub use text::{draw_text, text_width, GLYPH_SIZE};

/// Annotate on the blocking thread pool.
pub async fn annotate_async(
    annotator: Annotator,
    image: RgbImage,
    metadata: Option<String>,
) -> Result<AnnotatedImage, SnapshotError> {
    tokio::task::spawn_blocking(move || annotator.annotate(&image, metadata.as_deref())).await?
}

/// Decode a still from disk as 8-bit RGB.
pub fn load_still(path: &Path) -> Result<RgbImage, SnapshotError> {
    Ok(image::open(path)?.to_rgb8())
}

/// `<dir>/snapshot-<n>.png`
pub fn snapshot_path(dir: &Path, index: u32) -> PathBuf {
    dir.join(format!("snapshot-{:04}.png", index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[tokio::test]
    async fn test_annotate_async_matches_sync() {
        let img = RgbImage::from_fn(16, 12, |x, y| Rgb([(x * 16 + y) as u8, 0, 0]));
        let annotator = Annotator::default();
        let sync = annotator.annotate(&img, Some("1/2")).unwrap();
        let async_result = annotate_async(annotator, img, Some("1/2".to_string()))
            .await
            .unwrap();
        assert_eq!(sync.image, async_result.image);
        assert_eq!(sync.stats, async_result.stats);
    }

    #[test]
    fn test_snapshot_path() {
        assert_eq!(
            snapshot_path(Path::new("/tmp/out"), 7),
            PathBuf::from("/tmp/out/snapshot-0007.png")
        );
    }

    #[test]
    fn test_load_still_missing() {
        assert!(matches!(
            load_still(Path::new("/nonexistent/x.png")),
            Err(SnapshotError::Image(_))
        ));
    }
}
