//! Build a DIM package from a populated content directory.

pub mod cover;
pub mod metadata;
pub mod naming;
pub mod pipeline;
pub mod spec;
pub mod support;

pub use pipeline::{run_packaging, PackagingStage};
pub use spec::PackageSpec;

#[cfg(test)]
#[path = "tests/naming_tests.rs"]
mod naming_tests;

#[cfg(test)]
#[path = "tests/support_tests.rs"]
mod support_tests;

#[cfg(test)]
#[path = "tests/cover_tests.rs"]
mod cover_tests;

#[cfg(test)]
#[path = "tests/metadata_tests.rs"]
mod metadata_tests;

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod pipeline_tests;
