use crate::services::linker::ResourceLink;
use crate::types::errors::{ContainerError, LinkWarning};
use serde::Serialize;
use std::path::PathBuf;

/// A member that failed; its siblings were still processed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberFailure {
    pub member: String,
    pub error: String,
}

/// Result of extracting one brushset.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    pub source: PathBuf,
    pub output_root: PathBuf,
    pub total_members: usize,
    /// Resolved documents written, in member order.
    pub documents: Vec<PathBuf>,
    pub images: Vec<PathBuf>,
    pub links: Vec<ResourceLink>,
    pub warnings: Vec<LinkWarning>,
    pub failures: Vec<MemberFailure>,
    pub skipped: usize,
    pub ignored: usize,
    pub cancelled: bool,
}

impl ExtractionReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty() && !self.cancelled
    }
}

/// One file of a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub source: PathBuf,
    pub result: Result<ExtractionReport, ContainerError>,
}
