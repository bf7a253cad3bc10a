// file: src/logging/mod.rs
// version: 1.0.0
// guid: e52deb77-b4e4-4c57-a2f7-0e5fb255a563

//! Logging system for bt2wrap

pub mod logger;

pub use logger::{init_logger, LogFormat};
