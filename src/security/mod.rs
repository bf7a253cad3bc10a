// file: src/security/mod.rs
// version: 1.0.0
// guid: ba00e53f-692b-4f30-9938-2fae8a7af4b4

//! Checks applied to values before they reach the shell

pub mod sanitizer;

pub use sanitizer::{sanitize_binary, sanitize_path_argument};
