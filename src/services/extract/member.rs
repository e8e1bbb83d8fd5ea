use crate::services::config::ExtractConfig;
use std::path::{Path, PathBuf};

/// How the orchestrator treats one container member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Administrative folder or reset state; never extracted.
    Skipped,
    Directory,
    Raster,
    Archive,
    /// Anything else; ignored.
    Other,
}

pub fn classify(name: &str, is_dir: bool, config: &ExtractConfig) -> MemberKind {
    let in_skipped_folder = config
        .skip_folders
        .iter()
        .any(|folder| name.contains(folder.as_str()));
    let is_reset = !config.reset_marker.is_empty() && name.contains(config.reset_marker.as_str());
    if in_skipped_folder || is_reset {
        return MemberKind::Skipped;
    }
    if is_dir {
        return MemberKind::Directory;
    }

    let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) else {
        return MemberKind::Other;
    };
    if config
        .raster_extensions
        .iter()
        .any(|r| r.eq_ignore_ascii_case(ext))
    {
        MemberKind::Raster
    } else if config.archive_extension.eq_ignore_ascii_case(ext) {
        MemberKind::Archive
    } else {
        MemberKind::Other
    }
}

/// `a/Brush.archive` → `a/Brush<suffix>`.
pub fn document_path(member_target: &Path, suffix: &str) -> PathBuf {
    let stem = member_target
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    member_target.with_file_name(format!("{stem}{suffix}"))
}
