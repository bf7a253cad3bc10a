// file: src/config/loader.rs
// version: 1.0.0
// guid: 65180e44-201d-426c-8474-ea7115016d54

//! Manifest file loading and environment variable substitution

use super::BatchManifest;
use crate::error::{Result, WrapperError};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Manifest loader with `${VAR}` substitution
pub struct ManifestLoader {
    env_vars: HashMap<String, String>,
}

impl ManifestLoader {
    /// Create a loader seeded with the process environment
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Create a loader that only knows the given variables
    pub fn with_vars(env_vars: HashMap<String, String>) -> Self {
        Self { env_vars }
    }

    /// Load and validate a batch manifest from a YAML file
    pub fn load_manifest<P: AsRef<Path>>(&self, path: P) -> Result<BatchManifest> {
        let content = fs::read_to_string(&path).map_err(|e| {
            WrapperError::config(format!(
                "Failed to read manifest {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let manifest = self.parse_manifest(&content)?;
        debug!(
            "Loaded {} job(s) from {}",
            manifest.jobs.len(),
            path.as_ref().display()
        );
        Ok(manifest)
    }

    /// Parse and validate a batch manifest from YAML text
    pub fn parse_manifest(&self, content: &str) -> Result<BatchManifest> {
        let expanded = self.expand_env_vars(content)?;
        let manifest: BatchManifest = serde_yaml::from_str(&expanded)?;

        manifest.validate()?;

        Ok(manifest)
    }

    /// Expand environment variables in manifest content
    fn expand_env_vars(&self, content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| WrapperError::config(format!("Invalid regex pattern: {}", e)))?;

        let mut missing_vars = Vec::new();
        let expanded = re.replace_all(content, |cap: &regex::Captures| {
            let var_name = &cap[1];
            match self.env_vars.get(var_name) {
                Some(value) => value.clone(),
                None => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    cap[0].to_string()
                }
            }
        });

        if !missing_vars.is_empty() {
            return Err(WrapperError::config(format!(
                "Missing environment variables: {}",
                missing_vars.join(", ")
            )));
        }

        Ok(expanded.into_owned())
    }

    /// Set environment variable for substitution
    pub fn set_env_var(&mut self, key: String, value: String) {
        self.env_vars.insert(key, value);
    }
}

impl Default for ManifestLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_env_var_expansion() {
        let mut loader = ManifestLoader::with_vars(HashMap::new());
        loader.set_env_var("TEST_VAR".to_string(), "test_value".to_string());

        let content = "key: ${TEST_VAR}/${TEST_VAR}";
        let result = loader.expand_env_vars(content).unwrap();
        assert_eq!(result, "key: test_value/test_value");
    }

    #[test]
    fn test_missing_env_vars_listed_once() {
        let loader = ManifestLoader::with_vars(HashMap::new());
        let content = "a: ${MISSING_A}\nb: ${MISSING_B}\nc: ${MISSING_A}";

        let err = loader.expand_env_vars(content).unwrap_err().to_string();
        assert!(err.contains("Missing environment variables: MISSING_A, MISSING_B"));
    }

    #[test]
    fn test_load_manifest() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
index: ${{DB}}/OM-RGC
jobs:
  - name: sample
    mate1: ${{READS}}/s_1.fq.gz
    mate2: ${{READS}}/s_2.fq.gz
    output_prefix: out/sample
"#
        )
        .unwrap();

        let mut loader = ManifestLoader::with_vars(HashMap::new());
        loader.set_env_var("DB".to_string(), "/data/db".to_string());
        loader.set_env_var("READS".to_string(), "/data/reads".to_string());

        let manifest = loader.load_manifest(file.path())?;
        assert_eq!(manifest.index, Some(PathBuf::from("/data/db/OM-RGC")));
        assert_eq!(manifest.jobs[0].mate1, Some(PathBuf::from("/data/reads/s_1.fq.gz")));

        Ok(())
    }

    #[test]
    fn test_load_invalid_manifest() {
        let loader = ManifestLoader::with_vars(HashMap::new());
        assert!(matches!(
            loader.parse_manifest("jobs: []"),
            Err(WrapperError::Validation(_))
        ));
        assert!(matches!(
            loader.parse_manifest("jobs: [unclosed"),
            Err(WrapperError::Yaml(_))
        ));
        assert!(loader.load_manifest("/nonexistent/manifest.yaml").is_err());
    }
}
