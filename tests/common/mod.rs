#![allow(dead_code)]

// `cfg(test)` items of the lib are not visible to integration tests, so the
// same fixture module is compiled in here by path.
#[path = "../../src/test_utils.rs"]
mod fixtures;

pub use fixtures::*;
