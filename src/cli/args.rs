// file: src/cli/args.rs
// version: 1.0.0
// guid: 2578df37-46a4-4651-a3c5-6d42e656873a

//! Command line argument definitions

use crate::bowtie2::{
    AlignMode, AlignmentJob, MapPreset, OutputFormat, PairedEndOptions, ReportAlns,
};
use crate::logging::LogFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bt2wrap")]
#[command(about = "Assemble and run bowtie2 | samtools alignment command lines")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[arg(long, global = true, value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Extra TOML configuration file, applied after user and project files
    #[arg(short, long, global = true, env = "BT2WRAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log the commands instead of running them
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align paired-end FASTQ files
    Paired {
        #[arg(short = 'x', long, help = "bowtie2 index prefix")]
        index: PathBuf,

        #[arg(short = '1', long, help = "Files with #1 mates")]
        mate1: PathBuf,

        #[arg(short = '2', long, help = "Files with #2 mates")]
        mate2: PathBuf,

        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        paired: PairedArgs,
    },

    /// Align unpaired FASTQ reads
    Single {
        #[arg(short = 'x', long, help = "bowtie2 index prefix")]
        index: PathBuf,

        #[arg(short = 'U', long, help = "Files with unpaired reads")]
        reads: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Quick BAM mapping; paired when -2 is given
    Simple {
        #[arg(short = 'x', long, help = "bowtie2 index prefix")]
        index: PathBuf,

        #[arg(short = '1', long)]
        fq1: PathBuf,

        #[arg(short = '2', long)]
        fq2: Option<PathBuf>,

        #[arg(short, long, help = "Output prefix (.bam is appended)")]
        output_prefix: PathBuf,

        #[arg(long, value_enum, default_value = "sensitive")]
        preset: MapPreset,

        #[arg(short = 'k', long, default_value = "1", help = "Alignments per read: N or 'all'")]
        report: ReportAlns,

        #[arg(short = 'X', long, default_value = "500")]
        maxins: u32,

        #[arg(short = 'p', long, default_value = "1")]
        threads: u32,
    },

    /// Run every job listed in a YAML manifest
    Batch {
        manifest: PathBuf,

        #[arg(long, help = "Write a JSON report of the run to this file")]
        report: Option<PathBuf>,

        #[arg(long, help = "Keep going after a failed job")]
        keep_going: bool,
    },

    /// Check that bowtie2, samtools and the shell are available
    CheckPrereqs {
        #[arg(long)]
        json: bool,
    },

    /// List alignment presets
    Presets,
}

/// Options shared by `paired` and `single`
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    #[arg(short, long, help = "Output prefix (.bam or .sam is appended)")]
    pub output_prefix: PathBuf,

    #[arg(long, help = "Write SAM with -S instead of piping to samtools")]
    pub sam: bool,

    #[arg(long, help = "Local alignment; uses the -local preset variant")]
    pub local: bool,

    #[arg(long, value_enum, default_value = "sensitive")]
    pub preset: MapPreset,

    #[arg(short = 'k', long, default_value = "1", help = "Alignments per read: N or 'all'")]
    pub report: ReportAlns,

    #[arg(long, help = "Send bowtie2 metrics to this file")]
    pub met_file: Option<PathBuf>,

    #[arg(short = 'p', long, default_value = "1")]
    pub threads: u32,

    #[arg(long, help = "Print the command line and exit")]
    pub print_only: bool,
}

/// Paired-end options
#[derive(Args, Debug, Clone)]
pub struct PairedArgs {
    #[arg(short = 'I', long, default_value = "0", help = "Minimum fragment length")]
    pub minins: u32,

    #[arg(short = 'X', long, default_value = "500", help = "Maximum fragment length")]
    pub maxins: u32,

    #[arg(long)]
    pub no_mixed: bool,

    #[arg(long)]
    pub no_discordant: bool,

    #[arg(long)]
    pub dovetail: bool,

    #[arg(long)]
    pub no_contain: bool,

    #[arg(long)]
    pub no_overlap: bool,
}

impl CommonArgs {
    /// Apply the shared options to a job
    pub fn apply(&self, job: AlignmentJob) -> AlignmentJob {
        job.with_output(OutputFormat::from_bam(!self.sam))
            .with_mode(AlignMode::from_local(self.local))
            .with_preset(self.preset)
            .with_report(self.report)
            .with_met_file(self.met_file.clone())
            .with_threads(self.threads)
    }
}

impl From<&PairedArgs> for PairedEndOptions {
    fn from(args: &PairedArgs) -> Self {
        PairedEndOptions {
            min_ins: args.minins,
            max_ins: args.maxins,
            no_mixed: args.no_mixed,
            no_discordant: args.no_discordant,
            dovetail: args.dovetail,
            no_contain: args.no_contain,
            no_overlap: args.no_overlap,
        }
    }
}
