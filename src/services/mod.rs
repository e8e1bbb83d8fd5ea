pub mod config;
pub mod container;
pub mod extract;
pub mod fs_utils;
pub mod images;
pub mod keyed_archive;
pub mod linker;
pub mod resolver;
