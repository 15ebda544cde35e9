//! Doc generation pipeline for doxbook.
//!
//! This crate ties together source discovery, comment extraction and
//! markdown writing, then records the generated pages in the host book
//! (summary articles and navigation order).

pub mod book;
pub mod extract;
pub mod navigation;
pub mod pipeline;
pub mod prepare;
pub mod summary;
pub mod writer;

pub use book::BookStore;
pub use pipeline::{
    PipelineOutcome, ProgressReporter, RunReport, SilentProgress, Stage, generate_docs, run,
};
