// file: src/security/sanitizer.rs
// version: 1.0.0
// guid: 13d63310-44bd-439d-9ce8-2fd1e8e39f77

//! Argument sanitization module
//!
//! Alignment jobs are rendered into a single shell line, so every path that ends up on it
//! is checked for characters the shell would interpret.

use crate::error::{Result, WrapperError};
use regex::Regex;
use tracing::debug;

/// Longest argument accepted on the command line
pub const MAX_ARGUMENT_LENGTH: usize = 4096;

/// Validate a path-like argument before it is placed on a shell command line
pub fn sanitize_path_argument(role: &str, arg: &str) -> Result<()> {
    if arg.trim().is_empty() {
        return Err(WrapperError::validation(format!("{} cannot be empty", role)));
    }

    if arg.starts_with('-') {
        return Err(WrapperError::security(format!(
            "{} cannot start with '-', bowtie2 would read it as an option: {}",
            role, arg
        )));
    }

    check_for_injection_patterns(role, arg)?;

    if arg.chars().any(char::is_whitespace) {
        return Err(WrapperError::security(format!(
            "{} contains whitespace, which the shell would split: {:?}",
            role, arg
        )));
    }

    validate_length(role, arg, MAX_ARGUMENT_LENGTH)?;
    debug!("Accepted {} argument: {}", role, arg);
    Ok(())
}

/// Validate a binary name or path from configuration
pub fn sanitize_binary(role: &str, binary: &str) -> Result<()> {
    sanitize_path_argument(&format!("{} binary", role), binary)
}

/// Check for shell metacharacters and substitution syntax
fn check_for_injection_patterns(role: &str, arg: &str) -> Result<()> {
    let injection_patterns = [
        r"`",
        r"\$\(",
        r"\$\{",
        r"\$[A-Za-z_]",
        r"&",
        r"\|",
        r";",
        r">",
        r"<",
        r#"['"\\]"#,
        r"[*?\[\]]",
        r"[{}()]",
        r"[!#~]",
        r"[\r\n]",
    ];

    for pattern in &injection_patterns {
        let regex = Regex::new(pattern)
            .map_err(|e| WrapperError::validation(format!("Regex error: {}", e)))?;
        if regex.is_match(arg) {
            return Err(WrapperError::security(format!(
                "{} contains shell pattern '{}': {}",
                role, pattern, arg
            )));
        }
    }

    Ok(())
}

/// Validate argument length
fn validate_length(role: &str, arg: &str, max_length: usize) -> Result<()> {
    if arg.len() > max_length {
        let preview: String = arg.chars().take(50).collect();
        return Err(WrapperError::validation(format!(
            "{} too long ({} > {} chars): {}...",
            role,
            arg.len(),
            max_length,
            preview
        )));
    }
    Ok(())
}
