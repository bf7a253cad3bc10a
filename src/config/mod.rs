// file: src/config/mod.rs
// version: 1.0.0
// guid: 9cd40602-6e30-4323-96ed-e5999cbef56f

//! Application configuration and batch manifests
//!
//! `AppConfig` is layered from TOML files and environment variables; batch manifests are
//! YAML documents handled by [`loader::ManifestLoader`].

pub mod loader;
pub mod manifest;

pub use loader::ManifestLoader;
pub use manifest::{BatchManifest, JobSpec};

use crate::bowtie2::ToolPaths;
use crate::error::{Result, WrapperError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Project-local configuration file name
pub const PROJECT_CONFIG_FILE: &str = ".bt2wrap.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub tools: ToolsConfig,
    pub safety: SafetyConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory the shell runs in
    pub working_directory: Option<PathBuf>,
    /// Wall-clock limit per alignment; unlimited when unset
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub bowtie2: String,
    pub samtools: String,
    pub shell: String,
    /// Run the shell with `-o pipefail`
    pub pipefail: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            bowtie2: "bowtie2".to_string(),
            samtools: "samtools".to_string(),
            shell: "bash".to_string(),
            pipefail: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub dry_run: bool,
    /// Reject paths containing shell metacharacters
    pub validate_paths: bool,
    /// Look the binaries up on PATH before running anything
    pub check_tools: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            validate_paths: true,
            check_tools: true,
        }
    }
}

/// Partial configuration as written in a file; absent sections keep earlier values
#[derive(Debug, Default, Deserialize)]
struct ConfigLayer {
    general: Option<GeneralConfig>,
    tools: Option<ToolsConfig>,
    safety: Option<SafetyConfig>,
}

impl AppConfig {
    /// Load configuration from the user file, the project file, an optional explicit
    /// file, then environment overrides
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                info!("Loading user configuration from: {}", user_config.display());
                config.apply_file(&user_config).await?;
            }
        }

        let project_config = Path::new(PROJECT_CONFIG_FILE);
        if project_config.exists() {
            info!(
                "Loading project configuration from: {}",
                project_config.display()
            );
            config.apply_file(project_config).await?;
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(WrapperError::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            info!("Loading configuration from: {}", path.display());
            config.apply_file(path).await?;
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;

        debug!("Final configuration: {:#?}", config);
        Ok(config)
    }

    /// Get the user configuration file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bt2wrap").join("config.toml"))
    }

    /// Parse a TOML document into a full configuration
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config = Self::default();
        config.merge(toml::from_str(content)?);
        Ok(config)
    }

    /// Overlay the sections present in a TOML file
    pub async fn apply_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            WrapperError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let layer: ConfigLayer = toml::from_str(&content).map_err(|e| {
            WrapperError::config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        self.merge(layer);
        Ok(())
    }

    fn merge(&mut self, layer: ConfigLayer) {
        if let Some(general) = layer.general {
            self.general = general;
        }
        if let Some(tools) = layer.tools {
            self.tools = tools;
        }
        if let Some(safety) = layer.safety {
            self.safety = safety;
        }
    }

    /// Apply `BT2WRAP_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bowtie2) = lookup("BT2WRAP_BOWTIE2") {
            self.tools.bowtie2 = bowtie2;
        }

        if let Some(samtools) = lookup("BT2WRAP_SAMTOOLS") {
            self.tools.samtools = samtools;
        }

        if let Some(shell) = lookup("BT2WRAP_SHELL") {
            self.tools.shell = shell;
        }

        if let Some(dry_run) = lookup("BT2WRAP_DRY_RUN") {
            self.safety.dry_run = parse_bool(&dry_run).ok_or_else(|| {
                WrapperError::config(format!("BT2WRAP_DRY_RUN is not a boolean: {}", dry_run))
            })?;
        }

        if let Some(timeout) = lookup("BT2WRAP_TIMEOUT") {
            let secs = timeout.parse::<u64>().map_err(|_| {
                WrapperError::config(format!("BT2WRAP_TIMEOUT is not a number: {}", timeout))
            })?;
            self.general.timeout_seconds = if secs == 0 { None } else { Some(secs) };
        }

        Ok(())
    }

    /// Binary names handed to the command builder
    pub fn tool_paths(&self) -> ToolPaths {
        ToolPaths {
            bowtie2: self.tools.bowtie2.clone(),
            samtools: self.tools.samtools.clone(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
