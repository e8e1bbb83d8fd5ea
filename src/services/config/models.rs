use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Naming conventions for bundled textures referenced from brush archives.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TextureConfig {
    /// Shared directory holding named texture assets (`images/<name>`).
    pub asset_dir: PathBuf,
    /// Top-level document fields that name a bundled texture.
    pub fields: Vec<String>,
    /// Value an unset field resolves to.
    pub null_sentinel: String,
    /// Stripped from a field name to derive its default file name.
    pub default_prefix: String,
    pub default_suffix: String,
    pub default_extension: String,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("images"),
            fields: vec!["bundledGrainPath".into(), "bundledShapePath".into()],
            null_sentinel: "$null".into(),
            default_prefix: "bundled".into(),
            default_suffix: "Path".into(),
            default_extension: "png".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExtractConfig {
    /// Each brushset is extracted to `<output_dir>/<stem>.brushset`.
    pub output_dir: PathBuf,
    /// Members under these folders are never extracted.
    pub skip_folders: Vec<String>,
    /// Members whose path contains this marker are never extracted.
    pub reset_marker: String,
    pub raster_extensions: Vec<String>,
    pub archive_extension: String,
    /// Appended to the archive stem to name its resolved document.
    pub document_suffix: String,
    pub texture: TextureConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("cache"),
            skip_folders: vec![
                "AuthorPicture/".into(),
                "QuickLook/".into(),
                "Signature/".into(),
            ],
            reset_marker: "Reset".into(),
            raster_extensions: vec!["png".into(), "jpg".into(), "jpeg".into()],
            archive_extension: "archive".into(),
            document_suffix: "_resolved_params.json".into(),
            texture: TextureConfig::default(),
        }
    }
}
