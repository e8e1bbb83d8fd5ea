//! Procreate brushset resolver: unpacks `.brushset` zip bundles, decodes the
//! NSKeyedArchiver binary plists inside them into plain JSON documents, and
//! links each document to its bundled grain and shape textures.

pub mod services;
pub mod types;
#[cfg(test)]
pub mod test_utils;

pub use services::config::{ExtractConfig, TextureConfig};
pub use services::extract::{BrushsetExtractor, CancelFlag, ExtractionReport};
