// file: src/bowtie2/runner.rs
// version: 1.0.0
// guid: 7bf99447-1be7-43a1-bf6e-ad76009cb5f7

//! Runs alignment jobs and interprets bowtie2's output

use super::command::AlignmentJob;
use super::options::{ReportAlns, ToolPaths};
use super::preset::MapPreset;
use crate::config::AppConfig;
use crate::error::{Result, WrapperError};
use crate::executor::{LocalShell, ShellExecutor};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, Instrument};

/// Prefix bowtie2 puts on the final line of a failed run
pub const ERROR_SENTINEL: &str = "(ERR):";

/// Return the last line of `output` if it carries the bowtie2 error sentinel
pub fn detect_aligner_error(output: &str) -> Option<&str> {
    output
        .lines()
        .last()
        .filter(|line| line.starts_with(ERROR_SENTINEL))
}

/// What a finished (or dry-run) job produced
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentOutcome {
    pub command: String,
    pub output_path: PathBuf,
    pub executed: bool,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Captured stdout followed by stderr
    pub output: String,
}

fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Drives bowtie2 through a [`ShellExecutor`]
pub struct Bowtie2Runner<E: ShellExecutor = LocalShell> {
    executor: E,
    tools: ToolPaths,
    validate_paths: bool,
}

impl Bowtie2Runner<LocalShell> {
    /// Runner with a local shell configured from `config`
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(LocalShell::from_config(config), config.tool_paths())
            .with_path_validation(config.safety.validate_paths)
    }
}

impl<E: ShellExecutor> Bowtie2Runner<E> {
    pub fn new(executor: E, tools: ToolPaths) -> Self {
        Self {
            executor,
            tools,
            validate_paths: true,
        }
    }

    pub fn with_path_validation(mut self, validate_paths: bool) -> Self {
        self.validate_paths = validate_paths;
        self
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Assemble the command line for `job` the way [`Bowtie2Runner::run`] would
    pub fn command_line(&self, job: &AlignmentJob) -> Result<String> {
        if self.validate_paths {
            job.command_line(&self.tools)
        } else {
            job.render(&self.tools)
        }
    }

    /// Run one alignment job to completion
    pub async fn run(&self, job: &AlignmentJob) -> Result<AlignmentOutcome> {
        let span = tracing::info_span!("align", job = %job.label());
        self.run_inner(job).instrument(span).await
    }

    async fn run_inner(&self, job: &AlignmentJob) -> Result<AlignmentOutcome> {
        let command = self.command_line(job)?;
        debug!("{}", command);

        info!(
            "Aligning {} against {} ({})",
            job.label(),
            job.index.display(),
            job.preset.name_for(job.mode)
        );
        let shell_output = self.executor.run(&command).await?;
        let output = shell_output.combined();

        if detect_aligner_error(&output).is_some() {
            error!("{}", output);
            return Err(WrapperError::AlignerFailed { command, output });
        }

        if !shell_output.success() {
            error!(
                "Alignment command exited with {:?}: {}",
                shell_output.exit_code,
                shell_output.stderr.trim()
            );
            return Err(WrapperError::Process {
                command,
                exit_code: shell_output.exit_code,
                stderr: shell_output.stderr,
            });
        }

        if shell_output.executed {
            info!(
                "Finished {} in {:.1}s -> {}",
                job.label(),
                shell_output.duration.as_secs_f64(),
                job.output_path().display()
            );
        }

        Ok(AlignmentOutcome {
            command,
            output_path: job.output_path(),
            executed: shell_output.executed,
            duration: shell_output.duration,
            output,
        })
    }

    /// Paired-end alignment with explicit options
    pub async fn align_paired(
        &self,
        mate1: impl Into<PathBuf>,
        mate2: impl Into<PathBuf>,
        output_prefix: impl Into<PathBuf>,
        index: impl Into<PathBuf>,
        configure: impl FnOnce(AlignmentJob) -> AlignmentJob,
    ) -> Result<AlignmentOutcome> {
        let job = configure(AlignmentJob::paired(mate1, mate2, output_prefix, index));
        self.run(&job).await
    }

    /// Single-end alignment with explicit options
    pub async fn align_single(
        &self,
        reads: impl Into<PathBuf>,
        output_prefix: impl Into<PathBuf>,
        index: impl Into<PathBuf>,
        configure: impl FnOnce(AlignmentJob) -> AlignmentJob,
    ) -> Result<AlignmentOutcome> {
        let job = configure(AlignmentJob::single(reads, output_prefix, index));
        self.run(&job).await
    }

    /// Quick BAM mapping, paired when `fq2` is given
    #[allow(clippy::too_many_arguments)]
    pub async fn align_simple(
        &self,
        fq1: impl Into<PathBuf>,
        fq2: Option<PathBuf>,
        output_prefix: impl Into<PathBuf>,
        index: impl Into<PathBuf>,
        preset: MapPreset,
        report: ReportAlns,
        max_ins: u32,
        threads: u32,
    ) -> Result<AlignmentOutcome> {
        let job = AlignmentJob::simple(
            fq1,
            fq2,
            output_prefix,
            index,
            preset,
            report,
            max_ins,
            threads,
        );
        self.run(&job).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bowtie2::{AlignMode, OutputFormat};
    use crate::executor::ShellOutput;
    use std::sync::Mutex;

    /// Records command lines and replays a canned output
    struct RecordingShell {
        commands: Mutex<Vec<String>>,
        response: ShellOutput,
    }

    impl RecordingShell {
        fn replying(exit_code: i32, stdout: &str, stderr: &str) -> Self {
            Self {
                commands: Mutex::new(Vec::new()),
                response: ShellOutput {
                    exit_code: Some(exit_code),
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                    executed: true,
                    duration: Duration::from_millis(5),
                },
            }
        }

        fn commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ShellExecutor for RecordingShell {
        async fn run(&self, command_line: &str) -> Result<ShellOutput> {
            self.commands.lock().unwrap().push(command_line.to_string());
            Ok(self.response.clone())
        }
    }

    fn runner(shell: RecordingShell) -> Bowtie2Runner<RecordingShell> {
        Bowtie2Runner::new(shell, ToolPaths::default())
    }

    #[test]
    fn test_detect_sentinel_on_last_line_only() {
        assert_eq!(
            detect_aligner_error("warning\n(ERR): bowtie2-align exited with value 1\n"),
            Some("(ERR): bowtie2-align exited with value 1")
        );
        assert_eq!(detect_aligner_error("(ERR): early\nrecovered"), None);
        assert_eq!(detect_aligner_error(""), None);
        assert_eq!(detect_aligner_error("  (ERR): indented"), None);
    }

    #[tokio::test]
    async fn test_run_success_records_command() {
        let r = runner(RecordingShell::replying(0, "", ""));
        let job = AlignmentJob::single("r.fq", "out/r", "idx");

        let outcome = r.run(&job).await.unwrap();
        assert!(outcome.executed);
        assert_eq!(outcome.output_path, PathBuf::from("out/r.bam"));
        assert_eq!(r.executor().commands(), vec![outcome.command.clone()]);
        assert!(outcome.command.starts_with("bowtie2 -x idx -U r.fq"));
    }

    #[tokio::test]
    async fn test_run_sentinel_becomes_error() {
        let stderr = "Error: reads file does not look like a FASTQ file\n\
                      (ERR): bowtie2-align exited with value 1\n";
        let r = runner(RecordingShell::replying(0, "", stderr));
        let job = AlignmentJob::single("r.fq", "out/r", "idx");

        let err = r.run(&job).await.unwrap_err();
        match err {
            WrapperError::AlignerFailed { command, output } => {
                assert!(command.starts_with("bowtie2"));
                assert!(output.contains("does not look like a FASTQ file"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_run_sentinel_wins_over_exit_code() {
        let r = runner(RecordingShell::replying(1, "", "(ERR): bowtie2-align exited with value 1"));
        let job = AlignmentJob::single("r.fq", "out/r", "idx");
        assert!(r.run(&job).await.unwrap_err().is_aligner_failure());
    }

    #[tokio::test]
    async fn test_run_nonzero_exit_is_process_error() {
        let r = runner(RecordingShell::replying(127, "", "bowtie2: command not found\n"));
        let job = AlignmentJob::single("r.fq", "out/r", "idx");

        match r.run(&job).await.unwrap_err() {
            WrapperError::Process { exit_code, stderr, .. } => {
                assert_eq!(exit_code, Some(127));
                assert!(stderr.contains("command not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_job_never_reaches_shell() {
        let r = runner(RecordingShell::replying(0, "", ""));
        let job = AlignmentJob::single("r.fq", "out/r", "idx").with_threads(0);

        assert!(r.run(&job).await.is_err());
        assert!(r.executor().commands().is_empty());
    }

    #[tokio::test]
    async fn test_path_validation_toggle() {
        let job = AlignmentJob::single("r.fq|x", "out/r", "idx");

        let strict = runner(RecordingShell::replying(0, "", ""));
        assert!(matches!(strict.run(&job).await, Err(WrapperError::Security(_))));

        let lax = runner(RecordingShell::replying(0, "", "")).with_path_validation(false);
        assert!(lax.run(&job).await.is_ok());
    }

    #[tokio::test]
    async fn test_align_paired_configures_job() {
        let r = runner(RecordingShell::replying(0, "", ""));
        let outcome = r
            .align_paired("a_1.fq", "a_2.fq", "out/a", "idx", |job| {
                job.with_mode(AlignMode::Local)
                    .with_output(OutputFormat::Sam)
                    .with_report(ReportAlns::All)
            })
            .await
            .unwrap();

        assert_eq!(
            outcome.command,
            "bowtie2 -x idx -1 a_1.fq -2 a_2.fq -S out/a.sam --sensitive-local -a -I 0 -X 500 --quiet -p 1"
        );
        assert_eq!(outcome.output_path, PathBuf::from("out/a.sam"));
    }

    #[tokio::test]
    async fn test_align_single_and_simple() {
        let r = runner(RecordingShell::replying(0, "", ""));
        r.align_single("u.fq", "out/u", "idx", |job| job.with_threads(2))
            .await
            .unwrap();
        r.align_simple(
            "s_1.fq",
            Some(PathBuf::from("s_2.fq")),
            "out/s",
            "idx",
            MapPreset::VerySensitive,
            ReportAlns::Count(1),
            300,
            2,
        )
        .await
        .unwrap();

        let commands = r.executor().commands();
        assert_eq!(commands.len(), 2);
        assert!(commands[0].contains("-U u.fq --sensitive --quiet -p 2 | samtools view -bS -@ 1"));
        assert!(commands[1].contains("--very-sensitive -I 0 -X 300 --no-mixed --no-discordant --quiet"));
    }

    #[test]
    fn test_outcome_serializes_millis() {
        let outcome = AlignmentOutcome {
            command: "bowtie2".to_string(),
            output_path: PathBuf::from("o.bam"),
            executed: false,
            duration: Duration::from_millis(1500),
            output: String::new(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["duration_ms"], 1500);
    }
}
