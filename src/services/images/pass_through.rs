use image::ImageFormat;
use std::fs;
use std::path::Path;

/// Hook that writes one raster member to its mirrored output path.
pub trait ImagePassThrough {
    fn pass_through(&self, image_data: &[u8], target_path: &Path) -> Result<(), String>;
}

/// Decodes the member and re-encodes it in the format implied by the target
/// extension, so a mislabelled or oddly encoded PNG comes out canonical.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReencodeImage;

impl ImagePassThrough for ReencodeImage {
    fn pass_through(&self, image_data: &[u8], target_path: &Path) -> Result<(), String> {
        let image =
            image::load_from_memory(image_data).map_err(|e| format!("Invalid image data: {e}"))?;
        let format = ImageFormat::from_path(target_path)
            .map_err(|e| format!("Unsupported image type {}: {e}", target_path.display()))?;

        // JPEG has no alpha channel.
        let image = if format == ImageFormat::Jpeg {
            image::DynamicImage::ImageRgb8(image.to_rgb8())
        } else {
            image
        };

        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("Failed to create parent: {e}"))?;
        }
        image
            .save_with_format(target_path, format)
            .map_err(|e| format!("Failed to save image {}: {e}", target_path.display()))
    }
}

/// Writes the member bytes unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyImage;

impl ImagePassThrough for CopyImage {
    fn pass_through(&self, image_data: &[u8], target_path: &Path) -> Result<(), String> {
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("Failed to create parent: {e}"))?;
        }
        fs::write(target_path, image_data)
            .map_err(|e| format!("Failed to write image {}: {e}", target_path.display()))
    }
}

#[cfg(test)]
#[path = "tests/pass_through_tests.rs"]
mod tests;
