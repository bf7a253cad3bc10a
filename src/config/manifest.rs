// file: src/config/manifest.rs
// version: 1.0.0
// guid: 8b3edd7d-1ee3-45c3-ba3d-32570a7d42d2

//! Batch manifest structures

use crate::bowtie2::{
    AlignMode, AlignmentJob, MapPreset, OutputFormat, PairedEndOptions, ReadInput, ReportAlns,
};
use crate::error::{Result, WrapperError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// A list of alignment jobs with shared defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchManifest {
    /// Index used by jobs that do not name one
    #[serde(default)]
    pub index: Option<PathBuf>,
    /// Thread count used by jobs that do not set one
    #[serde(default)]
    pub threads: Option<u32>,
    /// Keep running remaining jobs after a failure
    #[serde(default)]
    pub continue_on_error: bool,
    pub jobs: Vec<JobSpec>,
}

/// One job as written in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobSpec {
    pub name: String,
    /// Paired input, mate 1
    #[serde(default)]
    pub mate1: Option<PathBuf>,
    /// Paired input, mate 2
    #[serde(default)]
    pub mate2: Option<PathBuf>,
    /// Unpaired input
    #[serde(default)]
    pub reads: Option<PathBuf>,
    pub output_prefix: PathBuf,
    #[serde(default)]
    pub index: Option<PathBuf>,
    #[serde(default = "default_bam")]
    pub bam: bool,
    #[serde(default)]
    pub local: bool,
    #[serde(default)]
    pub preset: MapPreset,
    #[serde(default)]
    pub report_alns: ReportAlns,
    #[serde(default)]
    pub min_ins: u32,
    #[serde(default = "default_max_ins")]
    pub max_ins: u32,
    #[serde(default)]
    pub no_mixed: bool,
    #[serde(default)]
    pub no_discordant: bool,
    #[serde(default)]
    pub dovetail: bool,
    #[serde(default)]
    pub no_contain: bool,
    #[serde(default)]
    pub no_overlap: bool,
    #[serde(default)]
    pub met_file: Option<PathBuf>,
    #[serde(default)]
    pub threads: Option<u32>,
}

fn default_bam() -> bool {
    true
}

fn default_max_ins() -> u32 {
    PairedEndOptions::default().max_ins
}

impl BatchManifest {
    /// Validate the manifest as a whole
    pub fn validate(&self) -> Result<()> {
        if self.jobs.is_empty() {
            return Err(WrapperError::validation("Manifest contains no jobs"));
        }

        let mut seen = HashSet::new();
        for job in &self.jobs {
            if !seen.insert(job.name.as_str()) {
                return Err(WrapperError::validation(format!(
                    "Duplicate job name in manifest: {}",
                    job.name
                )));
            }
        }

        for job in &self.jobs {
            self.resolve(job)?;
        }
        Ok(())
    }

    /// Turn every job spec into an alignment job, applying manifest defaults
    pub fn alignment_jobs(&self) -> Result<Vec<(String, AlignmentJob)>> {
        self.jobs
            .iter()
            .map(|spec| Ok((spec.name.clone(), self.resolve(spec)?)))
            .collect()
    }

    /// Build the alignment job for one spec
    pub fn resolve(&self, spec: &JobSpec) -> Result<AlignmentJob> {
        if spec.name.trim().is_empty() {
            return Err(WrapperError::validation("Job name cannot be empty"));
        }

        let index = spec
            .index
            .clone()
            .or_else(|| self.index.clone())
            .ok_or_else(|| {
                WrapperError::validation(format!(
                    "Job '{}' has no index and the manifest sets no default",
                    spec.name
                ))
            })?;

        let input = spec.read_input()?;
        let threads = spec.threads.or(self.threads).unwrap_or(1);

        let job = AlignmentJob {
            input,
            output_prefix: spec.output_prefix.clone(),
            index,
            output: OutputFormat::from_bam(spec.bam),
            mode: AlignMode::from_local(spec.local),
            preset: spec.preset,
            report: spec.report_alns,
            paired: spec.paired_options(),
            met_file: spec.met_file.clone(),
            threads,
        };

        job.validate().map_err(|e| {
            WrapperError::validation(format!("Job '{}': {}", spec.name, e))
        })?;
        Ok(job)
    }
}

impl JobSpec {
    fn paired_options(&self) -> PairedEndOptions {
        PairedEndOptions {
            min_ins: self.min_ins,
            max_ins: self.max_ins,
            no_mixed: self.no_mixed,
            no_discordant: self.no_discordant,
            dovetail: self.dovetail,
            no_contain: self.no_contain,
            no_overlap: self.no_overlap,
        }
    }

    fn read_input(&self) -> Result<ReadInput> {
        match (&self.mate1, &self.mate2, &self.reads) {
            (Some(mate1), Some(mate2), None) => Ok(ReadInput::Paired {
                mate1: mate1.clone(),
                mate2: mate2.clone(),
            }),
            (None, None, Some(reads)) => Ok(ReadInput::Unpaired {
                reads: reads.clone(),
            }),
            (Some(_), None, _) | (None, Some(_), _) => Err(WrapperError::validation(format!(
                "Job '{}' must set both mate1 and mate2",
                self.name
            ))),
            (None, None, None) => Err(WrapperError::validation(format!(
                "Job '{}' has no input; set mate1/mate2 or reads",
                self.name
            ))),
            _ => Err(WrapperError::validation(format!(
                "Job '{}' sets both paired mates and unpaired reads",
                self.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
index: /db/OM-RGC
threads: 8
jobs:
  - name: SRR5787995.local
    mate1: reads/SRR5787995_1.fastq.gz
    mate2: reads/SRR5787995_2.fastq.gz
    output_prefix: out/SRR5787995.local
    local: true
    report_alns: 20
    met_file: out/SRR5787995.local.met
  - name: SRR5787995_1.local
    reads: reads/SRR5787995_1.fastq.gz
    output_prefix: out/SRR5787995_1.local
    index: /db/other
    bam: false
    preset: very-fast
    report_alns: all
    threads: 2
"#;

    fn manifest() -> BatchManifest {
        serde_yaml::from_str(MANIFEST).unwrap()
    }

    #[test]
    fn test_parse_and_resolve() {
        let m = manifest();
        assert!(m.validate().is_ok());
        assert!(!m.continue_on_error);

        let jobs = m.alignment_jobs().unwrap();
        assert_eq!(jobs.len(), 2);

        let (name, paired) = &jobs[0];
        assert_eq!(name, "SRR5787995.local");
        assert!(paired.input.is_paired());
        assert_eq!(paired.index, PathBuf::from("/db/OM-RGC"));
        assert_eq!(paired.threads, 8);
        assert_eq!(paired.mode, AlignMode::Local);
        assert_eq!(paired.report, ReportAlns::Count(20));
        assert_eq!(paired.output, OutputFormat::Bam);
        assert_eq!(paired.paired, PairedEndOptions::default());

        let (_, single) = &jobs[1];
        assert!(!single.input.is_paired());
        assert_eq!(single.index, PathBuf::from("/db/other"));
        assert_eq!(single.threads, 2);
        assert_eq!(single.output, OutputFormat::Sam);
        assert_eq!(single.preset, MapPreset::VeryFast);
        assert_eq!(single.report, ReportAlns::All);
    }

    #[test]
    fn test_paired_options_from_job_fields() {
        let m: BatchManifest = serde_yaml::from_str(
            r#"
index: idx
jobs:
  - name: a
    mate1: a_1.fq
    mate2: a_2.fq
    output_prefix: out/a
    max_ins: 800
    no_mixed: true
    dovetail: true
"#,
        )
        .unwrap();
        let jobs = m.alignment_jobs().unwrap();
        let pe = &jobs[0].1.paired;
        assert_eq!(pe.min_ins, 0);
        assert_eq!(pe.max_ins, 800);
        assert!(pe.no_mixed && pe.dovetail);
        assert!(!pe.no_discordant);
        assert_eq!(jobs[0].1.threads, 1);
    }

    #[test]
    fn test_missing_index() {
        let mut m = manifest();
        m.index = None;
        let err = m.validate().unwrap_err();
        assert!(err.to_string().contains("has no index"));
    }

    #[test]
    fn test_duplicate_names() {
        let mut m = manifest();
        m.jobs[1].name = m.jobs[0].name.clone();
        assert!(m.validate().unwrap_err().to_string().contains("Duplicate job name"));
    }

    #[test]
    fn test_input_forms() {
        let mut m = manifest();
        m.jobs[0].mate2 = None;
        assert!(m.validate().unwrap_err().to_string().contains("both mate1 and mate2"));

        let mut m = manifest();
        m.jobs[1].reads = None;
        assert!(m.validate().unwrap_err().to_string().contains("has no input"));

        let mut m = manifest();
        m.jobs[0].reads = Some(PathBuf::from("x.fq"));
        assert!(m.validate().unwrap_err().to_string().contains("sets both"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut m = manifest();
        m.jobs[0].min_ins = 900;
        assert!(m.validate().unwrap_err().to_string().contains("Job 'SRR5787995.local'"));

        let mut m = manifest();
        m.jobs[1].threads = Some(0);
        assert!(m.validate().is_err());

        let mut m = manifest();
        m.jobs.clear();
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: std::result::Result<BatchManifest, _> = serde_yaml::from_str(
            "jobs:\n  - name: a\n    reads: r.fq\n    output_prefix: o\n    sensitivity: high\n",
        );
        assert!(result.is_err());
    }
}
