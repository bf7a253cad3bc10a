// file: src/bowtie2/preset.rs
// version: 1.0.0
// guid: e75bfffb-7519-4ecb-b829-9766e04f444c

//! Alignment presets and end-to-end/local mode

use crate::error::WrapperError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named bundle of bowtie2 sensitivity parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum MapPreset {
    #[serde(rename = "very-fast")]
    #[value(name = "very-fast")]
    VeryFast,
    #[serde(rename = "fast")]
    Fast,
    #[default]
    #[serde(rename = "sensitive")]
    Sensitive,
    #[serde(rename = "very-sensitive")]
    #[value(name = "very-sensitive")]
    VerySensitive,
}

impl MapPreset {
    /// Every preset, fastest first
    pub const ALL: [MapPreset; 4] = [
        MapPreset::VeryFast,
        MapPreset::Fast,
        MapPreset::Sensitive,
        MapPreset::VerySensitive,
    ];

    /// Get the preset as bowtie2 spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            MapPreset::VeryFast => "very-fast",
            MapPreset::Fast => "fast",
            MapPreset::Sensitive => "sensitive",
            MapPreset::VerySensitive => "very-sensitive",
        }
    }

    /// Preset name with the `-local` suffix applied when needed
    pub fn name_for(&self, mode: AlignMode) -> String {
        match mode {
            AlignMode::EndToEnd => self.as_str().to_string(),
            AlignMode::Local => format!("{}-local", self.as_str()),
        }
    }

    /// The individual parameters bowtie2 expands the preset into
    pub fn equivalent(&self, mode: AlignMode) -> &'static str {
        match (self, mode) {
            (MapPreset::VeryFast, AlignMode::EndToEnd) => "-D 5 -R 1 -N 0 -L 22 -i S,0,2.50",
            (MapPreset::Fast, AlignMode::EndToEnd) => "-D 10 -R 2 -N 0 -L 22 -i S,0,2.50",
            (MapPreset::Sensitive, AlignMode::EndToEnd) => "-D 15 -R 2 -N 0 -L 22 -i S,1,1.15",
            (MapPreset::VerySensitive, AlignMode::EndToEnd) => "-D 20 -R 3 -N 0 -L 20 -i S,1,0.50",
            (MapPreset::VeryFast, AlignMode::Local) => "-D 5 -R 1 -N 0 -L 25 -i S,1,2.00",
            (MapPreset::Fast, AlignMode::Local) => "-D 10 -R 2 -N 0 -L 22 -i S,1,1.75",
            (MapPreset::Sensitive, AlignMode::Local) => "-D 15 -R 2 -N 0 -L 20 -i S,1,0.75",
            (MapPreset::VerySensitive, AlignMode::Local) => "-D 20 -R 3 -N 0 -L 20 -i S,1,0.50",
        }
    }

    /// The full command-line flag, e.g. `--sensitive-local`
    pub fn flag(&self, mode: AlignMode) -> String {
        format!("--{}", self.name_for(mode))
    }
}

impl fmt::Display for MapPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MapPreset {
    type Err = WrapperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        MapPreset::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| {
                WrapperError::invalid_argument(format!(
                    "Unknown preset '{}', expected one of: {}",
                    s,
                    MapPreset::ALL.map(|p| p.as_str()).join(", ")
                ))
            })
    }
}

/// End-to-end (whole read must align) or local (soft clipping allowed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignMode {
    #[default]
    #[serde(rename = "end-to-end")]
    EndToEnd,
    #[serde(rename = "local")]
    Local,
}

impl AlignMode {
    pub fn from_local(local: bool) -> Self {
        if local {
            AlignMode::Local
        } else {
            AlignMode::EndToEnd
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, AlignMode::Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preset_is_sensitive() {
        assert_eq!(MapPreset::default(), MapPreset::Sensitive);
        assert_eq!(AlignMode::default(), AlignMode::EndToEnd);
    }

    #[test]
    fn test_local_appends_suffix() {
        assert_eq!(MapPreset::VeryFast.flag(AlignMode::EndToEnd), "--very-fast");
        assert_eq!(MapPreset::VeryFast.flag(AlignMode::Local), "--very-fast-local");
        assert_eq!(MapPreset::Sensitive.name_for(AlignMode::Local), "sensitive-local");
    }

    #[test]
    fn test_equivalent_parameters() {
        assert_eq!(
            MapPreset::Sensitive.equivalent(AlignMode::EndToEnd),
            "-D 15 -R 2 -N 0 -L 22 -i S,1,1.15"
        );
        assert!(MapPreset::VeryFast.equivalent(AlignMode::Local).contains("-L 25"));
    }

    #[test]
    fn test_parse_presets() {
        assert_eq!("very-sensitive".parse::<MapPreset>().unwrap(), MapPreset::VerySensitive);
        assert_eq!("Very_Fast".parse::<MapPreset>().unwrap(), MapPreset::VeryFast);
        assert_eq!(" fast ".parse::<MapPreset>().unwrap(), MapPreset::Fast);

        let err = "ultra".parse::<MapPreset>().unwrap_err();
        assert!(err.to_string().contains("very-fast, fast, sensitive, very-sensitive"));
    }

    #[test]
    fn test_all_order() {
        let names: Vec<_> = MapPreset::ALL.iter().map(|p| p.to_string()).collect();
        assert_eq!(names, ["very-fast", "fast", "sensitive", "very-sensitive"]);
    }

    #[test]
    fn test_preset_serde_names() {
        let yaml = serde_yaml::to_string(&MapPreset::VerySensitive).unwrap();
        assert_eq!(yaml.trim(), "very-sensitive");
        let parsed: MapPreset = serde_yaml::from_str("very-fast").unwrap();
        assert_eq!(parsed, MapPreset::VeryFast);
    }
}
