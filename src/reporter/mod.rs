// file: src/reporter/mod.rs
// version: 1.0.0
// guid: a534bce1-cd67-4cd5-a29b-37b8489a2bd8

//! Batch run reporting

use crate::bowtie2::{AlignmentJob, AlignmentOutcome};
use crate::error::{Result, WrapperError};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Final state of one manifest job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Succeeded,
    Failed,
    /// Command was assembled and logged but not executed
    DryRun,
    /// Skipped because an earlier job failed
    NotRun,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::DryRun => "dry-run",
            JobStatus::NotRun => "not-run",
        }
    }
}

/// Report entry for one job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub name: String,
    pub status: JobStatus,
    pub command: Option<String>,
    pub output_path: Option<PathBuf>,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl JobReport {
    /// Entry for a job that ran (or was dry-run) without error
    pub fn from_outcome(name: impl Into<String>, outcome: &AlignmentOutcome) -> Self {
        Self {
            name: name.into(),
            status: if outcome.executed {
                JobStatus::Succeeded
            } else {
                JobStatus::DryRun
            },
            command: Some(outcome.command.clone()),
            output_path: Some(outcome.output_path.clone()),
            duration_ms: outcome.duration.as_millis() as u64,
            error: None,
        }
    }

    /// Entry for a job that failed after running for `elapsed`
    pub fn failed(
        name: impl Into<String>,
        job: &AlignmentJob,
        error: &WrapperError,
        elapsed: Duration,
    ) -> Self {
        let command = match error {
            WrapperError::AlignerFailed { command, .. } | WrapperError::Process { command, .. } => {
                Some(command.clone())
            }
            _ => None,
        };

        Self {
            name: name.into(),
            status: JobStatus::Failed,
            command,
            output_path: Some(job.output_path()),
            duration_ms: elapsed.as_millis() as u64,
            error: Some(error.to_string()),
        }
    }

    /// Entry for a job skipped after an earlier failure
    pub fn not_run(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: JobStatus::NotRun,
            command: None,
            output_path: None,
            duration_ms: 0,
            error: None,
        }
    }
}

/// Everything that happened in one `bt2wrap batch` invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub manifest: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    pub fn new(manifest: impl Into<PathBuf>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            manifest: manifest.into(),
            started_at: Utc::now(),
            finished_at: None,
            jobs: Vec::new(),
        }
    }

    pub fn record(&mut self, job: JobReport) {
        self.jobs.push(job);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn count(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|j| j.status == status).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(JobStatus::Failed) > 0
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("Batch report written to {}", path.display());
        Ok(())
    }

    /// One line per job plus a totals line, colored for terminals
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .jobs
            .iter()
            .map(|job| {
                let status = match job.status {
                    JobStatus::Succeeded => job.status.as_str().green(),
                    JobStatus::Failed => job.status.as_str().red(),
                    JobStatus::DryRun => job.status.as_str().cyan(),
                    JobStatus::NotRun => job.status.as_str().yellow(),
                };
                let detail = match (&job.error, &job.output_path) {
                    (Some(error), _) => error.clone(),
                    (None, Some(path)) => path.display().to_string(),
                    (None, None) => String::new(),
                };
                format!("{:<10} {:<30} {}", status, job.name, detail)
            })
            .collect();

        lines.push(format!(
            "{} succeeded, {} failed, {} dry-run, {} not run",
            self.count(JobStatus::Succeeded),
            self.count(JobStatus::Failed),
            self.count(JobStatus::DryRun),
            self.count(JobStatus::NotRun)
        ));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> AlignmentJob {
        AlignmentJob::single("r.fq", "out/r", "idx")
    }

    fn outcome(executed: bool) -> AlignmentOutcome {
        AlignmentOutcome {
            command: "bowtie2 -x idx -U r.fq --sensitive --quiet -p 1".to_string(),
            output_path: PathBuf::from("out/r.bam"),
            executed,
            duration: Duration::from_millis(2500),
            output: String::new(),
        }
    }

    #[test]
    fn test_job_report_from_outcome() {
        let report = JobReport::from_outcome("r", &outcome(true));
        assert_eq!(report.status, JobStatus::Succeeded);
        assert_eq!(report.duration_ms, 2500);

        let report = JobReport::from_outcome("r", &outcome(false));
        assert_eq!(report.status, JobStatus::DryRun);
    }

    #[test]
    fn test_failed_keeps_command() {
        let err = WrapperError::AlignerFailed {
            command: "bowtie2 -x idx".to_string(),
            output: "(ERR): bowtie2-align exited with value 1".to_string(),
        };
        let report = JobReport::failed("r", &job(), &err, Duration::from_millis(1200));
        assert_eq!(report.status, JobStatus::Failed);
        assert_eq!(report.duration_ms, 1200);
        assert_eq!(report.output_path, Some(PathBuf::from("out/r.bam")));
        assert_eq!(report.command.as_deref(), Some("bowtie2 -x idx"));
        assert!(report.error.unwrap().contains("(ERR)"));

        let report = JobReport::failed(
            "r",
            &job(),
            &WrapperError::validation("bad"),
            Duration::ZERO,
        );
        assert!(report.command.is_none());
    }

    #[test]
    fn test_counts_and_summary() {
        colored::control::set_override(false);

        let mut report = BatchReport::new("jobs.yaml");
        report.record(JobReport::from_outcome("a", &outcome(true)));
        report.record(JobReport::failed(
            "b",
            &job(),
            &WrapperError::validation("bad"),
            Duration::ZERO,
        ));
        report.record(JobReport::not_run("c"));
        report.finish();

        assert!(report.has_failures());
        assert_eq!(report.count(JobStatus::Succeeded), 1);
        assert!(report.finished_at.is_some());

        let lines = report.summary_lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("succeeded"));
        assert!(lines[0].contains("out/r.bam"));
        assert!(lines[1].contains("Validation error: bad"));
        assert_eq!(lines[3], "1 succeeded, 1 failed, 0 dry-run, 1 not run");
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let mut report = BatchReport::new("jobs.yaml");
        report.record(JobReport::from_outcome("a", &outcome(false)));
        report.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["jobs"][0]["status"], "dry-run");
        assert_eq!(value["manifest"], "jobs.yaml");
        assert!(value["run_id"].is_string());
    }
}
