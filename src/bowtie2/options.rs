// file: src/bowtie2/options.rs
// version: 1.0.0
// guid: 228dd27c-82f5-4211-9a48-64c713e7e949

//! Reporting, paired-end and output options

use crate::error::{Result, WrapperError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How many alignments bowtie2 reports per read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReportAlnsRepr", into = "ReportAlnsRepr")]
pub enum ReportAlns {
    /// Report up to N alignments; 1 keeps bowtie2's best-alignment default
    Count(u32),
    /// Report every alignment found
    All,
}

impl Default for ReportAlns {
    fn default() -> Self {
        ReportAlns::Count(1)
    }
}

impl ReportAlns {
    /// Flag tokens: `-a`, `-k N`, or nothing for a single best alignment
    pub fn tokens(&self) -> Vec<String> {
        match self {
            ReportAlns::All => vec!["-a".to_string()],
            ReportAlns::Count(k) if *k > 1 => vec!["-k".to_string(), k.to_string()],
            ReportAlns::Count(_) => Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let ReportAlns::Count(0) = self {
            return Err(WrapperError::validation(
                "report_alns must be a positive integer or 'all'",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for ReportAlns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportAlns::All => f.write_str("all"),
            ReportAlns::Count(k) => write!(f, "{}", k),
        }
    }
}

impl std::str::FromStr for ReportAlns {
    type Err = WrapperError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(ReportAlns::All);
        }
        match s.parse::<u32>() {
            Ok(k) if k > 0 => Ok(ReportAlns::Count(k)),
            _ => Err(WrapperError::invalid_argument(format!(
                "report_alns must be a positive integer or 'all', got '{}'",
                s
            ))),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ReportAlnsRepr {
    Count(i64),
    Word(String),
}

impl TryFrom<ReportAlnsRepr> for ReportAlns {
    type Error = WrapperError;

    fn try_from(repr: ReportAlnsRepr) -> Result<Self> {
        match repr {
            ReportAlnsRepr::Count(k) if k > 0 && k <= i64::from(u32::MAX) => {
                Ok(ReportAlns::Count(k as u32))
            }
            ReportAlnsRepr::Count(k) => Err(WrapperError::invalid_argument(format!(
                "report_alns must be a positive integer or 'all', got {}",
                k
            ))),
            ReportAlnsRepr::Word(word) => word.parse(),
        }
    }
}

impl From<ReportAlns> for ReportAlnsRepr {
    fn from(report: ReportAlns) -> Self {
        match report {
            ReportAlns::All => ReportAlnsRepr::Word("all".to_string()),
            ReportAlns::Count(k) => ReportAlnsRepr::Count(i64::from(k)),
        }
    }
}

/// Paired-end options; ignored for unpaired input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairedEndOptions {
    /// Minimum fragment length (`-I`)
    pub min_ins: u32,
    /// Maximum fragment length (`-X`)
    pub max_ins: u32,
    pub no_mixed: bool,
    pub no_discordant: bool,
    pub dovetail: bool,
    pub no_contain: bool,
    pub no_overlap: bool,
}

impl Default for PairedEndOptions {
    fn default() -> Self {
        Self {
            min_ins: 0,
            max_ins: 500,
            no_mixed: false,
            no_discordant: false,
            dovetail: false,
            no_contain: false,
            no_overlap: false,
        }
    }
}

impl PairedEndOptions {
    /// Concordant pairs only: no unpaired or discordant alignments, `-I 0 -X <max_ins>`
    pub fn strict_pairs(max_ins: u32) -> Self {
        Self {
            min_ins: 0,
            max_ins,
            no_mixed: true,
            no_discordant: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_ins > self.max_ins {
            return Err(WrapperError::validation(format!(
                "min_ins ({}) cannot exceed max_ins ({})",
                self.min_ins, self.max_ins
            )));
        }
        Ok(())
    }

    /// `-I <min> -X <max>` followed by each enabled toggle
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = vec![
            "-I".to_string(),
            self.min_ins.to_string(),
            "-X".to_string(),
            self.max_ins.to_string(),
        ];

        let toggles = [
            (self.no_mixed, "--no-mixed"),
            (self.no_discordant, "--no-discordant"),
            (self.dovetail, "--dovetail"),
            (self.no_contain, "--no-contain"),
            (self.no_overlap, "--no-overlap"),
        ];
        tokens.extend(
            toggles
                .into_iter()
                .filter(|(enabled, _)| *enabled)
                .map(|(_, flag)| flag.to_string()),
        );

        tokens
    }
}

/// Where the alignments end up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pipe through `samtools view -bS` into `<prefix>.bam`
    #[default]
    Bam,
    /// Let bowtie2 write `<prefix>.sam` itself
    Sam,
}

impl OutputFormat {
    pub fn from_bam(bam: bool) -> Self {
        if bam {
            OutputFormat::Bam
        } else {
            OutputFormat::Sam
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Bam => "bam",
            OutputFormat::Sam => "sam",
        }
    }
}

/// Names or paths of the external binaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    pub bowtie2: String,
    pub samtools: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            bowtie2: "bowtie2".to_string(),
            samtools: "samtools".to_string(),
        }
    }
}
