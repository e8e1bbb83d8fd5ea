//! Zip container access for `.brushset` files.
//!
//! The archive handle lives inside [`BrushsetContainer`] and is released when
//! it is dropped, on every exit path of the caller.

use crate::types::errors::ContainerError;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// One entry of the container's central directory.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberEntry {
    pub name: String,
    pub is_dir: bool,
    /// Relative path safe to join onto an output root; `None` when the name
    /// is absolute or climbs out with `..`.
    pub safe_path: Option<PathBuf>,
}

/// Check that `path` is a readable zip container. Reads the central
/// directory only; no member is decompressed.
pub fn is_valid_container(path: &Path) -> bool {
    match BrushsetContainer::open(path) {
        Ok(_) => true,
        Err(e) => {
            log::debug!("Not a valid container: {e}");
            false
        }
    }
}

pub struct BrushsetContainer {
    archive: ZipArchive<fs::File>,
}

impl BrushsetContainer {
    pub fn open(path: &Path) -> Result<Self, ContainerError> {
        let file = fs::File::open(path).map_err(|source| ContainerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let archive = ZipArchive::new(file).map_err(|e| ContainerError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Self { archive })
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// List members in container order.
    pub fn members(&mut self) -> Result<Vec<MemberEntry>, ContainerError> {
        let mut members = Vec::with_capacity(self.archive.len());
        for i in 0..self.archive.len() {
            let entry = self.archive.by_index_raw(i).map_err(|e| ContainerError::Read {
                name: format!("#{i}"),
                reason: e.to_string(),
            })?;
            members.push(MemberEntry {
                name: entry.name().to_string(),
                is_dir: entry.is_dir(),
                safe_path: entry.enclosed_name(),
            });
        }
        Ok(members)
    }

    /// Open a member by name for streaming reads.
    pub fn open_member(&mut self, name: &str) -> Result<impl Read + '_, ContainerError> {
        self.archive.by_name(name).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => ContainerError::MissingMember(name.to_string()),
            other => ContainerError::Read {
                name: name.to_string(),
                reason: other.to_string(),
            },
        })
    }

    /// Read a member fully into memory.
    pub fn read_member(&mut self, name: &str) -> Result<Vec<u8>, ContainerError> {
        let mut reader = self.open_member(name)?;
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| ContainerError::Read {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(bytes)
    }
}

#[cfg(test)]
#[path = "tests/container_tests.rs"]
mod tests;
