pub mod pass_through;

pub use pass_through::{CopyImage, ImagePassThrough, ReencodeImage};
