pub mod archive;
pub mod compression;
pub mod config;
pub mod core;
pub mod fs_utils;
pub mod packaging;
pub mod workspace;
