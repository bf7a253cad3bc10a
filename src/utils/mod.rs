// file: src/utils/mod.rs
// version: 1.0.0
// guid: be2325f6-e2ed-4c1b-9e89-5ad62c9fff8e

//! Utility modules for bt2wrap

pub mod system;

pub use system::{SystemUtils, ToolStatus};
