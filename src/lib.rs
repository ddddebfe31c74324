//! Tabane - Folder to CBZ Batch Conversion Library
//!
//! This crate turns directories of images into CBZ (ZIP) comic archives, many at
//! a time. It discovers source folders, decides which of their files belong in an
//! archive, writes one `.cbz` per folder on a fixed pool of async workers and
//! reports aggregate results.
//!
//! # Getting Started
//!
//! Configure a run with the `ConverterConfig` builder, then execute it with
//! [`ConverterConfig::run`]. Progress and problems are delivered to a
//! [`Reporter`]; by default they go to the `log` facade.
//!
//! ```rust,no_run
//! use tabane::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> tabane::error::Result<()> {
//!     let reporter = Arc::new(MemoryReporter::new());
//!
//!     // 1. Every subdirectory of ./library becomes one archive in ./cbz
//!     let config = ConverterConfig::builder()
//!         .input_roots(vec![PathBuf::from("./library")])
//!         .output_dir(PathBuf::from("./cbz"))
//!         .collection_mode(CollectionMode::Recursive)
//!         .filter_mode(FilterMode::Smart)
//!         .concurrency(8)
//!         .reporter(reporter.clone())
//!         .build()?;
//!
//!     // 2. Convert everything and inspect the outcome
//!     let stats = config.run().await?;
//!     println!(
//!         "{} created, {} failed, {} skipped",
//!         stats.success, stats.errors, stats.skipped
//!     );
//!
//!     for warning in reporter.messages(Level::Warning) {
//!         println!("warning: {}", warning);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! The building blocks ([`Collector`], [`classifier`], [`generator`],
//! [`WorkerPool`]) are public as well, for hosts that want to drive a single step.

pub mod classifier;
pub mod collector;
pub mod converter;
pub mod error;
pub mod generator;
pub mod path_utils;
pub mod pool;
pub mod reporter;
pub mod stats;
pub mod types;

/// Version of the library, as declared in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Publicly expose the main `ConverterConfig` struct and its builder
pub use converter::ConverterConfig;
pub use converter::ConverterConfigBuilder;

// Re-export the building blocks and core types for direct access
pub use collector::Collector;
pub use pool::WorkerPool;
pub use reporter::{Level, LogReporter, MemoryReporter, Reporter};
pub use stats::{Stats, StatsAggregator};
pub use types::{
    Classification, ClassifiedContent, CollectionMode, FilterMode, Job, Reason, Verdict,
};

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and traits, allowing you to
/// import everything you need with a single `use tabane::prelude::*;` statement.
pub mod prelude {
    pub use super::{
        Classification, ClassifiedContent, CollectionMode, ConverterConfig,
        ConverterConfigBuilder, FilterMode, Job, Level, LogReporter, MemoryReporter, Reason,
        Reporter, Stats, Verdict, error, generator, types,
    };
    pub use crate::collector::Collector;
    pub use crate::pool::WorkerPool;
    pub use std::path::{Path, PathBuf};
    pub use std::sync::Arc;
}
