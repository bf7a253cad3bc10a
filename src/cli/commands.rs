// file: src/cli/commands.rs
// version: 1.0.0
// guid: d121cd6c-7e4c-439d-bb86-fb7377bc0374

//! Command implementations for the CLI

use super::args::{CommonArgs, PairedArgs};
use crate::{
    bowtie2::{AlignMode, AlignmentJob, Bowtie2Runner, MapPreset, OutputFormat, ReportAlns},
    config::{AppConfig, ManifestLoader},
    error::WrapperError,
    logging::logger::with_async_operation_span,
    reporter::{BatchReport, JobReport, JobStatus},
    utils::SystemUtils,
    Result,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Align a pair of FASTQ files
pub async fn paired_command(
    config: &AppConfig,
    index: PathBuf,
    mate1: PathBuf,
    mate2: PathBuf,
    common: &CommonArgs,
    paired: &PairedArgs,
) -> Result<()> {
    let job = common
        .apply(AlignmentJob::paired(
            mate1,
            mate2,
            common.output_prefix.clone(),
            index,
        ))
        .with_paired_options(paired.into());

    run_job(config, &job, common.print_only).await
}

/// Align a file of unpaired reads
pub async fn single_command(
    config: &AppConfig,
    index: PathBuf,
    reads: PathBuf,
    common: &CommonArgs,
) -> Result<()> {
    let job = common.apply(AlignmentJob::single(
        reads,
        common.output_prefix.clone(),
        index,
    ));

    run_job(config, &job, common.print_only).await
}

/// Quick BAM mapping, paired when `fq2` is present
#[allow(clippy::too_many_arguments)]
pub async fn simple_command(
    config: &AppConfig,
    index: PathBuf,
    fq1: PathBuf,
    fq2: Option<PathBuf>,
    output_prefix: PathBuf,
    preset: MapPreset,
    report: ReportAlns,
    maxins: u32,
    threads: u32,
) -> Result<()> {
    let job = AlignmentJob::simple(fq1, fq2, output_prefix, index, preset, report, maxins, threads);
    run_job(config, &job, false).await
}

async fn run_job(config: &AppConfig, job: &AlignmentJob, print_only: bool) -> Result<()> {
    let runner = Bowtie2Runner::from_config(config);

    if print_only {
        println!("{}", runner.command_line(job)?);
        return Ok(());
    }

    if config.safety.check_tools && !config.safety.dry_run {
        SystemUtils::require_tools(config, job.output == OutputFormat::Bam)?;
    }

    let outcome = runner.run(job).await?;
    if outcome.executed {
        info!("Alignment written to {}", outcome.output_path.display());
    } else {
        println!("{}", outcome.command);
    }
    Ok(())
}

/// Run every job in a manifest, in order
pub async fn batch_command(
    config: &AppConfig,
    manifest_path: &Path,
    report_path: Option<&Path>,
    keep_going: bool,
) -> Result<()> {
    let loader = ManifestLoader::new();
    let manifest = loader.load_manifest(manifest_path)?;
    let jobs = manifest.alignment_jobs()?;
    let keep_going = keep_going || manifest.continue_on_error;

    info!(
        "Running {} job(s) from {}",
        jobs.len(),
        manifest_path.display()
    );

    if config.safety.check_tools && !config.safety.dry_run {
        let needs_samtools = jobs.iter().any(|(_, job)| job.output == OutputFormat::Bam);
        SystemUtils::require_tools(config, needs_samtools)?;
    }

    let runner = Bowtie2Runner::from_config(config);
    let mut report = BatchReport::new(manifest_path);
    let (runner, jobs, entries) = (&runner, &jobs, &mut report);

    with_async_operation_span("batch", move || async move {
        let mut remaining = jobs.iter();
        for (name, job) in remaining.by_ref() {
            let started = Instant::now();
            match runner.run(job).await {
                Ok(outcome) => entries.record(JobReport::from_outcome(name, &outcome)),
                Err(e) => {
                    error!("Job {} failed: {}", name, e);
                    entries.record(JobReport::failed(name, job, &e, started.elapsed()));
                    if !keep_going {
                        break;
                    }
                }
            }
        }

        let skipped: Vec<&String> = remaining.map(|(name, _)| name).collect();
        if !skipped.is_empty() {
            warn!("Stopping after failure; {} job(s) not run", skipped.len());
        }
        for name in skipped {
            entries.record(JobReport::not_run(name));
        }
    })
    .await;

    report.finish();

    for line in report.summary_lines() {
        println!("{}", line);
    }

    if let Some(path) = report_path {
        report.write_json(path)?;
    }

    if report.has_failures() {
        return Err(WrapperError::execution(format!(
            "{} of {} job(s) failed",
            report.count(JobStatus::Failed),
            report.jobs.len()
        )));
    }

    Ok(())
}

/// Check that the configured binaries can be found
pub async fn check_prerequisites_command(config: &AppConfig, json_output: bool) -> Result<()> {
    let statuses = SystemUtils::probe_tools(config).await;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else {
        for status in &statuses {
            match &status.path {
                Some(path) => println!(
                    "✓ {:<9} {} ({})",
                    status.role,
                    path.display(),
                    status.version.as_deref().unwrap_or("version unknown")
                ),
                None => println!("✗ {:<9} {} not found", status.role, status.name),
            }
        }
    }

    let missing: Vec<&str> = statuses
        .iter()
        .filter(|s| !s.found())
        .map(|s| s.name.as_str())
        .collect();

    if missing.is_empty() {
        info!("All prerequisites satisfied");
        Ok(())
    } else {
        Err(WrapperError::tool_not_found(missing.join(", ")))
    }
}

/// Print the presets and what they expand to
pub fn presets_command() -> Result<()> {
    for mode in [AlignMode::EndToEnd, AlignMode::Local] {
        println!(
            "{}:",
            if mode.is_local() { "--local" } else { "--end-to-end" }
        );
        for preset in MapPreset::ALL {
            println!(
                "  {:<24} {}",
                preset.flag(mode),
                preset.equivalent(mode)
            );
        }
    }
    Ok(())
}
