use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to open or read the zip container. Fatal to one brushset file.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Failed to open container {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid or corrupt container {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
    #[error("Member not found: {0}")]
    MissingMember(String),
    #[error("Failed to read member {name}: {reason}")]
    Read { name: String, reason: String },
}

/// The bytes of an `.archive` member are not a well-formed keyed archive.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("Missing bplist00 magic header")]
    BadMagic,
    #[error("Unexpected end of data at offset {0}")]
    Truncated(usize),
    #[error("Invalid trailer: {0}")]
    BadTrailer(String),
    #[error("Object #{objref} has out-of-range offset {offset}")]
    BadOffset { objref: usize, offset: usize },
    #[error("Object reference {objref} out of range (object count {count})")]
    BadObjectRef { objref: usize, count: usize },
    #[error("Unsupported marker 0x{marker:02x} at offset {offset}")]
    UnsupportedMarker { marker: u8, offset: usize },
    #[error("Invalid string data at offset {0}")]
    InvalidString(usize),
    #[error("Dictionary key at offset {0} is not a string")]
    NonStringKey(usize),
    #[error("Object #{0} contains itself")]
    CyclicObject(usize),
    #[error("Nesting deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error("Shared objects expand past {0} decoded nodes")]
    TooManyNodes(usize),
    #[error("Not a keyed archive: {0}")]
    NotKeyedArchive(String),
    #[error("Reference {index} out of range (object table length {len})")]
    DanglingReference { index: usize, len: usize },
}

/// A reference in the object table cannot be substituted.
#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("Reference {index} out of range (object table length {len})")]
    OutOfRange { index: usize, len: usize },
    #[error("Reference {index} re-enters itself")]
    Cycle { index: usize },
    #[error("Nesting deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error("Shared references expand past {0} resolved nodes")]
    TooManyNodes(usize),
}

/// Non-fatal problem linking a bundled texture. The field is left as it was.
#[derive(Debug, Clone, Error, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum LinkWarning {
    #[error("{field}: asset {path} not found, skip copying")]
    AssetNotFound { field: String, path: PathBuf },
    #[error("{field} is unset and default image {path} not found")]
    DefaultMissing { field: String, path: PathBuf },
    #[error("{field}: failed to copy {from} to {to}: {reason}")]
    CopyFailed {
        field: String,
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },
    #[error("{field} does not hold a file name")]
    UnexpectedValue { field: String },
}

/// Configuration file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of one container member. Logged and recorded; siblings continue.
#[derive(Debug, Error)]
pub enum MemberError {
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("Resolve failed: {0}")]
    Resolve(#[from] ResolveError),
    #[error("Image error: {0}")]
    Image(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Serialize for MemberError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
