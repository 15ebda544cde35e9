//! Shared types, error model, and configuration for doxbook.
//!
//! This crate is the foundation depended on by all other doxbook crates.
//! It provides:
//! - [`DoxbookError`]: the unified error type
//! - Domain types ([`SourceFile`], [`ExtractedDocument`], [`Book`], [`Summary`], [`Navigation`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], config loading)
//! - [`join_bounded`]: bounded fan-out used by the I/O stages

pub mod config;
pub mod error;
pub mod pool;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildConfig, BuildSection, CONFIG_FILE_NAME, SummaryPolicy, book_config_path,
    config_dir, init_config, load_config, load_config_from,
};
pub use error::{DoxbookError, Result};
pub use pool::join_bounded;
pub use types::{
    Article, Book, Chapter, DOC_EXTENSION, ExtractedDocument, Navigation, NavigationSegment,
    SourceFile, Summary,
};
