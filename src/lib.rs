// file: src/lib.rs
// version: 1.0.0
// guid: 0b7e9d54-2c1a-4f86-a3e0-5d9c71b8e426

//! # bowtie2-wrapper
//!
//! Builds bowtie2 command lines (optionally piped through `samtools view` to
//! produce BAM), runs them through a shell and turns bowtie2's `(ERR):` report
//! into a typed error. Batches of alignments can be described in a YAML
//! manifest and run with a JSON report.

pub mod bowtie2;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod reporter;
pub mod security;
pub mod utils;

pub use error::{Result, WrapperError};

/// Version information for the wrapper
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
