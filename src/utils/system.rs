// file: src/utils/system.rs
// version: 1.0.0
// guid: 51bd701b-5188-40c2-80e1-2938308c12a4

//! System utility functions

use crate::config::AppConfig;
use crate::error::{Result, WrapperError};
use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Where a required binary was found, and what it reports as its version
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub role: String,
    pub name: String,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
}

impl ToolStatus {
    pub fn found(&self) -> bool {
        self.path.is_some()
    }
}

/// System utility functions
pub struct SystemUtils;

impl SystemUtils {
    /// Resolve a command through PATH (or as a path, if it contains a separator)
    pub fn locate(command: &str) -> Option<PathBuf> {
        which::which(command).ok()
    }

    /// Check if a command exists in PATH
    pub fn command_exists(command: &str) -> bool {
        Self::locate(command).is_some()
    }

    /// First line of `<binary> --version`
    pub async fn tool_version(binary: &str) -> anyhow::Result<String> {
        let output = Command::new(binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to run {} --version", binary))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} --version exited with {:?}",
                binary,
                output.status.code()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .with_context(|| format!("{} --version printed nothing", binary))
    }

    /// Probe the shell, bowtie2 and samtools named in the configuration
    pub async fn probe_tools(config: &AppConfig) -> Vec<ToolStatus> {
        let tools = [
            ("shell", config.tools.shell.as_str()),
            ("bowtie2", config.tools.bowtie2.as_str()),
            ("samtools", config.tools.samtools.as_str()),
        ];

        let mut statuses = Vec::with_capacity(tools.len());
        for (role, name) in tools {
            let path = Self::locate(name);
            let version = match (&path, role) {
                (Some(_), "shell") | (None, _) => None,
                (Some(_), _) => match Self::tool_version(name).await {
                    Ok(version) => Some(version),
                    Err(e) => {
                        warn!("Could not determine {} version: {:#}", role, e);
                        None
                    }
                },
            };
            debug!("{} -> {:?} ({:?})", role, path, version);
            statuses.push(ToolStatus {
                role: role.to_string(),
                name: name.to_string(),
                path,
                version,
            });
        }
        statuses
    }

    /// Fail with [`WrapperError::ToolNotFound`] unless every binary needed is on PATH
    pub fn require_tools(config: &AppConfig, needs_samtools: bool) -> Result<()> {
        let mut required = vec![config.tools.shell.as_str(), config.tools.bowtie2.as_str()];
        if needs_samtools {
            required.push(config.tools.samtools.as_str());
        }

        let missing: Vec<&str> = required
            .into_iter()
            .filter(|name| !Self::command_exists(name))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(WrapperError::tool_not_found(format!(
                "{} (install it or point bt2wrap at it in the [tools] config section)",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        assert!(SystemUtils::command_exists("sh"));
        assert!(!SystemUtils::command_exists("bt2wrap-no-such-binary"));
    }

    #[test]
    fn test_require_tools_reports_missing() {
        let mut config = AppConfig::default();
        config.tools.shell = "sh".to_string();
        config.tools.bowtie2 = "bt2wrap-missing-bowtie2".to_string();
        config.tools.samtools = "bt2wrap-missing-samtools".to_string();

        let err = SystemUtils::require_tools(&config, false).unwrap_err().to_string();
        assert!(err.contains("bt2wrap-missing-bowtie2"));
        assert!(!err.contains("bt2wrap-missing-samtools"));

        let err = SystemUtils::require_tools(&config, true).unwrap_err().to_string();
        assert!(err.contains("bt2wrap-missing-bowtie2, bt2wrap-missing-samtools"));
    }

    #[test]
    fn test_require_tools_ok_with_stand_ins() {
        let mut config = AppConfig::default();
        config.tools.shell = "sh".to_string();
        config.tools.bowtie2 = "sh".to_string();
        config.tools.samtools = "sh".to_string();
        assert!(SystemUtils::require_tools(&config, true).is_ok());
    }

    #[tokio::test]
    async fn test_tool_version_missing_binary() {
        assert!(SystemUtils::tool_version("bt2wrap-no-such-binary").await.is_err());
    }

    #[tokio::test]
    async fn test_probe_tools_marks_missing() {
        let mut config = AppConfig::default();
        config.tools.shell = "sh".to_string();
        config.tools.bowtie2 = "bt2wrap-missing-bowtie2".to_string();

        let statuses = SystemUtils::probe_tools(&config).await;
        assert_eq!(statuses.len(), 3);
        assert_eq!(statuses[0].role, "shell");
        assert!(statuses[0].found());
        assert!(statuses[0].version.is_none());
        assert!(!statuses[1].found());
    }
}
