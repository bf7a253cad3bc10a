// file: src/bowtie2/command.rs
// version: 1.0.0
// guid: 0a2d8546-e471-46b8-ad22-2c78bdbe4a6b

//! Alignment job description and command-line assembly

use super::options::{OutputFormat, PairedEndOptions, ReportAlns, ToolPaths};
use super::preset::{AlignMode, MapPreset};
use crate::error::{Result, WrapperError};
use crate::security::{sanitize_binary, sanitize_path_argument};
use std::path::{Path, PathBuf};

/// FASTQ input for a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadInput {
    /// Mates 1 and 2 (`-1`/`-2`)
    Paired { mate1: PathBuf, mate2: PathBuf },
    /// Unpaired reads (`-U`)
    Unpaired { reads: PathBuf },
}

impl ReadInput {
    pub fn is_paired(&self) -> bool {
        matches!(self, ReadInput::Paired { .. })
    }
}

/// One bowtie2 invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentJob {
    pub input: ReadInput,
    /// Output path without extension
    pub output_prefix: PathBuf,
    /// bowtie2 index prefix (minus trailing .X.bt2)
    pub index: PathBuf,
    pub output: OutputFormat,
    pub mode: AlignMode,
    pub preset: MapPreset,
    pub report: ReportAlns,
    /// Only emitted for paired input
    pub paired: PairedEndOptions,
    pub met_file: Option<PathBuf>,
    pub threads: u32,
}

impl AlignmentJob {
    /// Paired-end job with BAM output, end-to-end `sensitive`, one thread
    pub fn paired(
        mate1: impl Into<PathBuf>,
        mate2: impl Into<PathBuf>,
        output_prefix: impl Into<PathBuf>,
        index: impl Into<PathBuf>,
    ) -> Self {
        Self::with_input(
            ReadInput::Paired {
                mate1: mate1.into(),
                mate2: mate2.into(),
            },
            output_prefix.into(),
            index.into(),
        )
    }

    /// Single-end job with the same defaults as [`AlignmentJob::paired`]
    pub fn single(
        reads: impl Into<PathBuf>,
        output_prefix: impl Into<PathBuf>,
        index: impl Into<PathBuf>,
    ) -> Self {
        Self::with_input(
            ReadInput::Unpaired {
                reads: reads.into(),
            },
            output_prefix.into(),
            index.into(),
        )
    }

    /// Quick mapping: single-end when `fq2` is absent, otherwise paired with
    /// `--no-mixed --no-discordant` and the given maximum insert size.
    #[allow(clippy::too_many_arguments)]
    pub fn simple(
        fq1: impl Into<PathBuf>,
        fq2: Option<PathBuf>,
        output_prefix: impl Into<PathBuf>,
        index: impl Into<PathBuf>,
        preset: MapPreset,
        report: ReportAlns,
        max_ins: u32,
        threads: u32,
    ) -> Self {
        let job = match fq2 {
            None => Self::single(fq1, output_prefix, index),
            Some(fq2) => Self::paired(fq1, fq2, output_prefix, index)
                .with_paired_options(PairedEndOptions::strict_pairs(max_ins)),
        };

        job.with_preset(preset)
            .with_report(report)
            .with_threads(threads)
    }

    fn with_input(input: ReadInput, output_prefix: PathBuf, index: PathBuf) -> Self {
        Self {
            input,
            output_prefix,
            index,
            output: OutputFormat::default(),
            mode: AlignMode::default(),
            preset: MapPreset::default(),
            report: ReportAlns::default(),
            paired: PairedEndOptions::default(),
            met_file: None,
            threads: 1,
        }
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    pub fn with_mode(mut self, mode: AlignMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_preset(mut self, preset: MapPreset) -> Self {
        self.preset = preset;
        self
    }

    pub fn with_report(mut self, report: ReportAlns) -> Self {
        self.report = report;
        self
    }

    pub fn with_paired_options(mut self, paired: PairedEndOptions) -> Self {
        self.paired = paired;
        self
    }

    pub fn with_met_file(mut self, met_file: Option<PathBuf>) -> Self {
        self.met_file = met_file;
        self
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    /// File the alignments are written to
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(format!(
            "{}.{}",
            self.output_prefix.display(),
            self.output.extension()
        ))
    }

    /// Short label for logs, taken from the output prefix
    pub fn label(&self) -> String {
        self.output_prefix
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.output_prefix.display().to_string())
    }

    /// Check option values that bowtie2 would reject
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(WrapperError::validation("threads must be at least 1"));
        }
        let mut paths: Vec<(&str, &Path)> = vec![
            ("index", self.index.as_path()),
            ("output prefix", self.output_prefix.as_path()),
        ];
        match &self.input {
            ReadInput::Paired { mate1, mate2 } => {
                paths.push(("mate1", mate1.as_path()));
                paths.push(("mate2", mate2.as_path()));
            }
            ReadInput::Unpaired { reads } => paths.push(("reads", reads.as_path())),
        }
        for (role, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(WrapperError::validation(format!("{} cannot be empty", role)));
            }
        }
        self.report.validate()?;
        if self.input.is_paired() {
            self.paired.validate()?;
        }
        Ok(())
    }

    /// Check every path and binary that lands on the shell line
    pub fn sanitize(&self, tools: &ToolPaths) -> Result<()> {
        sanitize_binary("bowtie2", &tools.bowtie2)?;
        if self.output == OutputFormat::Bam {
            sanitize_binary("samtools", &tools.samtools)?;
        }

        sanitize_path_argument("index", path_str("index", &self.index)?)?;
        sanitize_path_argument("output prefix", path_str("output prefix", &self.output_prefix)?)?;
        match &self.input {
            ReadInput::Paired { mate1, mate2 } => {
                sanitize_path_argument("mate1", path_str("mate1", mate1)?)?;
                sanitize_path_argument("mate2", path_str("mate2", mate2)?)?;
            }
            ReadInput::Unpaired { reads } => {
                sanitize_path_argument("reads", path_str("reads", reads)?)?;
            }
        }
        if let Some(met_file) = &self.met_file {
            sanitize_path_argument("metrics file", path_str("metrics file", met_file)?)?;
        }
        Ok(())
    }

    /// Validate, sanitize and render the shell command line
    pub fn command_line(&self, tools: &ToolPaths) -> Result<String> {
        self.sanitize(tools)?;
        self.render(tools)
    }

    /// Render the shell command line after option validation only
    pub fn render(&self, tools: &ToolPaths) -> Result<String> {
        self.validate()?;
        Ok(self.tokens(tools)?.join(" "))
    }

    fn tokens(&self, tools: &ToolPaths) -> Result<Vec<String>> {
        let mut tokens = vec![
            tools.bowtie2.clone(),
            "-x".to_string(),
            path_str("index", &self.index)?.to_string(),
        ];

        match &self.input {
            ReadInput::Paired { mate1, mate2 } => {
                tokens.push("-1".to_string());
                tokens.push(path_str("mate1", mate1)?.to_string());
                tokens.push("-2".to_string());
                tokens.push(path_str("mate2", mate2)?.to_string());
            }
            ReadInput::Unpaired { reads } => {
                tokens.push("-U".to_string());
                tokens.push(path_str("reads", reads)?.to_string());
            }
        }

        if self.output == OutputFormat::Sam {
            tokens.push("-S".to_string());
            tokens.push(self.output_path().display().to_string());
        }

        tokens.push(self.preset.flag(self.mode));
        tokens.extend(self.report.tokens());

        if self.input.is_paired() {
            tokens.extend(self.paired.tokens());
        }

        if let Some(met_file) = &self.met_file {
            tokens.push("--met-file".to_string());
            tokens.push(path_str("metrics file", met_file)?.to_string());
        }

        tokens.push("--quiet".to_string());
        tokens.push("-p".to_string());
        tokens.push(self.threads.to_string());

        if self.output == OutputFormat::Bam {
            tokens.extend([
                "|".to_string(),
                tools.samtools.clone(),
                "view".to_string(),
                "-bS".to_string(),
                "-@".to_string(),
                (self.threads - 1).to_string(),
                "-".to_string(),
                ">".to_string(),
                self.output_path().display().to_string(),
            ]);
        }

        Ok(tokens)
    }
}

fn path_str<'a>(role: &str, path: &'a Path) -> Result<&'a str> {
    path.to_str()
        .ok_or_else(|| WrapperError::invalid_argument(format!("{} is not valid UTF-8: {:?}", role, path)))
}
