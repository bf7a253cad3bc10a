// file: src/cli/mod.rs
// version: 1.0.0
// guid: 6f0c2b8e-3d41-4a7e-9b15-c8e2d7a40f93

//! Command line interface for bt2wrap

pub mod args;
pub mod commands;

pub use args::Cli;
pub use commands::*;
