//! Brushset extraction: walks the container members, passes raster images
//! through, and turns every `.archive` member into a resolved JSON document
//! linked with its bundled textures.
//!
//! Steps per member, in container order:
//! 1. Skip administrative folders and reset state
//! 2. Mirror directories
//! 3. Raster images go through the image pass-through hook
//! 4. Archives are decoded, resolved, linked, and written as JSON
//! 5. Report progress
//!
//! A failing member is logged and recorded; the next member still runs.

mod member;
mod progress;
mod types;

pub use member::{classify, document_path, MemberKind};
pub use progress::{percent, CancelFlag, OutputReorganizer, ProgressSink};
pub use types::{BatchOutcome, ExtractionReport, MemberFailure};

use crate::services::config::ExtractConfig;
use crate::services::container::{BrushsetContainer, MemberEntry};
use crate::services::images::{ImagePassThrough, ReencodeImage};
use crate::services::keyed_archive;
use crate::services::linker::ResourceLinker;
use crate::services::resolver;
use crate::types::errors::{ContainerError, MemberError};
use std::fs;
use std::path::{Path, PathBuf};

const OUTPUT_ROOT_EXTENSION: &str = "brushset";

pub struct BrushsetExtractor {
    config: ExtractConfig,
    linker: ResourceLinker,
    images: Box<dyn ImagePassThrough>,
    reorganizer: Option<Box<dyn OutputReorganizer>>,
}

impl BrushsetExtractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            linker: ResourceLinker::new(config.texture.clone()),
            config,
            images: Box::new(ReencodeImage),
            reorganizer: None,
        }
    }

    pub fn with_image_pass_through(mut self, hook: impl ImagePassThrough + 'static) -> Self {
        self.images = Box::new(hook);
        self
    }

    pub fn with_reorganizer(mut self, reorganizer: impl OutputReorganizer + 'static) -> Self {
        self.reorganizer = Some(Box::new(reorganizer));
        self
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// `<output_dir>/<stem>.brushset`
    pub fn output_root_for(&self, brushset: &Path) -> PathBuf {
        let stem = brushset
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "extracted".to_string());
        self.config
            .output_dir
            .join(format!("{stem}.{OUTPUT_ROOT_EXTENSION}"))
    }

    /// Extract one brushset file.
    ///
    /// Only container-level problems (unreadable file, corrupt central
    /// directory, unwritable output root) fail the call. Member problems end
    /// up in [`ExtractionReport::failures`].
    pub fn extract(
        &self,
        brushset: &Path,
        mut progress: Option<&mut (dyn ProgressSink + '_)>,
        cancel: Option<&CancelFlag>,
    ) -> Result<ExtractionReport, ContainerError> {
        let mut container = BrushsetContainer::open(brushset)?;
        let members = container.members()?;
        let output_root = self.output_root_for(brushset);
        fs::create_dir_all(&output_root).map_err(|source| ContainerError::Io {
            path: output_root.clone(),
            source,
        })?;

        log::info!(
            "Extracting {} ({} members) to {}",
            brushset.display(),
            members.len(),
            output_root.display()
        );

        let total = members.len();
        let mut report = ExtractionReport {
            source: brushset.to_path_buf(),
            output_root,
            total_members: total,
            ..Default::default()
        };

        for (idx, member) in members.iter().enumerate() {
            if cancel.is_some_and(|c| c.is_cancelled()) {
                log::info!("Extraction cancelled after {idx} of {total} members");
                report.cancelled = true;
                break;
            }

            let output_root = report.output_root.clone();
            if let Err(e) = self.process_member(&mut container, member, &output_root, &mut report)
            {
                log::error!("Failed to extract {}: {e}", member.name);
                report.failures.push(MemberFailure {
                    member: member.name.clone(),
                    error: e.to_string(),
                });
            }

            if let Some(sink) = progress.as_deref_mut() {
                sink.report(percent(idx + 1, total));
            }
        }
        drop(container);

        log::info!(
            "Extracted {}: {} documents, {} images, {} failures",
            brushset.display(),
            report.documents.len(),
            report.images.len(),
            report.failures.len()
        );

        if !report.cancelled {
            if let Some(reorganizer) = &self.reorganizer {
                if let Err(e) = reorganizer.reorganize(&report.output_root) {
                    log::warn!(
                        "Reorganizing {} failed (non-fatal): {e}",
                        report.output_root.display()
                    );
                }
            }
        }

        Ok(report)
    }

    /// Extract several brushsets. A file that cannot be opened is recorded
    /// and the rest of the batch continues.
    pub fn extract_batch(
        &self,
        paths: &[PathBuf],
        mut progress: Option<&mut (dyn ProgressSink + '_)>,
        cancel: Option<&CancelFlag>,
    ) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            if cancel.is_some_and(|c| c.is_cancelled()) {
                break;
            }
            let sink = progress.as_mut().map(|p| &mut **p as &mut dyn ProgressSink);
            let result = self.extract(path, sink, cancel);
            if let Err(e) = &result {
                log::error!("{} is not a valid .brushset file: {e}", path.display());
            }
            outcomes.push(BatchOutcome {
                source: path.clone(),
                result,
            });
        }
        outcomes
    }

    fn process_member(
        &self,
        container: &mut BrushsetContainer,
        member: &MemberEntry,
        output_root: &Path,
        report: &mut ExtractionReport,
    ) -> Result<(), MemberError> {
        let kind = classify(&member.name, member.is_dir, &self.config);
        if kind == MemberKind::Skipped {
            log::debug!("Skipping {}", member.name);
            report.skipped += 1;
            return Ok(());
        }

        let Some(relative) = &member.safe_path else {
            log::warn!("Skipping member with unsafe path: {}", member.name);
            report.skipped += 1;
            return Ok(());
        };
        let target = output_root.join(relative);

        match kind {
            MemberKind::Directory => fs::create_dir_all(&target)?,
            MemberKind::Raster => {
                let bytes = container.read_member(&member.name)?;
                self.images
                    .pass_through(&bytes, &target)
                    .map_err(MemberError::Image)?;
                log::info!("Extracted image: {}", member.name);
                report.images.push(target);
            }
            MemberKind::Archive => {
                let bytes = container.read_member(&member.name)?;
                let document = self.write_document(&bytes, &target, report)?;
                log::info!("Resolved {} -> {}", member.name, document.display());
                report.documents.push(document);
            }
            MemberKind::Other => report.ignored += 1,
            MemberKind::Skipped => {}
        }
        Ok(())
    }

    /// Decode → resolve → link → write. Returns the document path.
    fn write_document(
        &self,
        bytes: &[u8],
        member_target: &Path,
        report: &mut ExtractionReport,
    ) -> Result<PathBuf, MemberError> {
        let document = {
            let archive = keyed_archive::decode(bytes)?;
            resolver::resolve_archive(&archive)?
        };

        let doc_path = document_path(member_target, &self.config.document_suffix);
        let document_dir = doc_path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(document_dir)?;

        let outcome = self.linker.link(document, document_dir);
        report.links.extend(outcome.links);
        report.warnings.extend(outcome.warnings);

        fs::write(&doc_path, outcome.document.to_pretty_json()?)?;
        Ok(doc_path)
    }
}

#[cfg(test)]
#[path = "tests/extract_tests.rs"]
mod tests;
