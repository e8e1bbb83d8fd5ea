//! Cross-links a resolved brush document with its bundled textures.
//!
//! A brush names its grain and shape textures in top-level fields. An unset
//! field resolves to the null sentinel (`$null`) and falls back to a default
//! image extracted next to the document (`bundledShapePath` → `Shape.png`).
//! A set field names a file in the shared asset directory, which is copied
//! next to the document. Every failure here is a [`LinkWarning`].

use crate::services::config::TextureConfig;
use crate::services::fs_utils::file_utils::{base_name, copy_new_file};
use crate::services::resolver::Document;
use crate::types::errors::LinkWarning;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A resource action taken for one texture field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ResourceLink {
    /// Asset copied from the shared directory beside the document.
    Copied {
        field: String,
        from: PathBuf,
        to: PathBuf,
    },
    /// Asset already present beside the document; left untouched.
    AlreadyPresent { field: String, path: PathBuf },
    /// Null field rewritten to the default sibling image.
    DefaultSubstituted { field: String, file_name: String },
}

/// Result of linking one document.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkOutcome {
    pub document: Document,
    pub links: Vec<ResourceLink>,
    pub warnings: Vec<LinkWarning>,
}

pub struct ResourceLinker {
    config: TextureConfig,
}

impl ResourceLinker {
    pub fn new(config: TextureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TextureConfig {
        &self.config
    }

    /// Link the texture fields of `document`, whose file lives in `output_dir`.
    pub fn link(&self, mut document: Document, output_dir: &Path) -> LinkOutcome {
        let mut links = Vec::new();
        let mut warnings = Vec::new();

        if let Some(map) = document.as_mapping_mut() {
            for field in &self.config.fields {
                let Some(value) = map.get(field) else {
                    continue;
                };

                let outcome = match value.as_str() {
                    Some(v) if v == self.config.null_sentinel => {
                        self.substitute_default(field, output_dir)
                    }
                    Some(v) => self.copy_asset(field, v, output_dir),
                    None => Err(LinkWarning::UnexpectedValue {
                        field: field.clone(),
                    }),
                };

                match outcome {
                    Ok(link) => {
                        if let ResourceLink::DefaultSubstituted { file_name, .. } = &link {
                            map.insert(field.clone(), Document::String(file_name.clone()));
                        }
                        links.push(link);
                    }
                    Err(warning) => {
                        log::warn!("{warning}");
                        warnings.push(warning);
                    }
                }
            }
        }

        LinkOutcome {
            document,
            links,
            warnings,
        }
    }

    /// Default file name for a texture field: `bundledGrainPath` → `Grain.png`.
    pub fn default_file_name(&self, field: &str) -> String {
        let stem = field
            .strip_prefix(self.config.default_prefix.as_str())
            .unwrap_or(field);
        let stem = stem
            .strip_suffix(self.config.default_suffix.as_str())
            .unwrap_or(stem);
        format!("{stem}.{}", self.config.default_extension)
    }

    fn substitute_default(
        &self,
        field: &str,
        output_dir: &Path,
    ) -> Result<ResourceLink, LinkWarning> {
        let file_name = self.default_file_name(field);
        let path = output_dir.join(&file_name);
        if !path.is_file() {
            return Err(LinkWarning::DefaultMissing {
                field: field.to_string(),
                path,
            });
        }

        log::info!("{field} is unset; using default image {file_name}");
        Ok(ResourceLink::DefaultSubstituted {
            field: field.to_string(),
            file_name,
        })
    }

    fn copy_asset(
        &self,
        field: &str,
        value: &str,
        output_dir: &Path,
    ) -> Result<ResourceLink, LinkWarning> {
        let name = base_name(value).ok_or_else(|| LinkWarning::UnexpectedValue {
            field: field.to_string(),
        })?;
        let from = self.config.asset_dir.join(name);
        if !from.is_file() {
            return Err(LinkWarning::AssetNotFound {
                field: field.to_string(),
                path: from,
            });
        }

        let to = output_dir.join(name);
        match copy_new_file(&from, &to) {
            Ok(true) => {
                log::debug!("Copied {} to {}", from.display(), to.display());
                Ok(ResourceLink::Copied {
                    field: field.to_string(),
                    from,
                    to,
                })
            }
            Ok(false) => Ok(ResourceLink::AlreadyPresent {
                field: field.to_string(),
                path: to,
            }),
            Err(e) => Err(LinkWarning::CopyFailed {
                field: field.to_string(),
                from,
                to,
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "tests/linker_tests.rs"]
mod tests;
