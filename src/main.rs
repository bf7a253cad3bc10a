// file: src/main.rs
// version: 1.0.0
// guid: 9a3d6e12-8f47-4b0c-a5d1-e26c0f7b8394

//! bt2wrap - main entry point

use bowtie2_wrapper::{
    cli::{
        args::{Cli, Commands},
        commands::*,
    },
    config::AppConfig,
    logging, Result,
};
use clap::Parser;
use tracing::{debug, error, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logger(cli.verbose, cli.quiet, cli.log_format) {
        eprintln!("{}", e);
    }

    let command_future = run(cli);

    tokio::select! {
        result = command_future => {
            if let Err(e) = result {
                error!("{}", e);
                std::process::exit(1);
            }
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => warn!("Interrupted, stopping"),
                Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
            }
            std::process::exit(130);
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Presets = cli.command {
        return presets_command();
    }

    let mut config = AppConfig::load(cli.config.as_deref()).await?;
    if cli.dry_run {
        config.safety.dry_run = true;
    }
    debug!("Effective configuration: {:?}", config);

    match cli.command {
        Commands::Paired {
            index,
            mate1,
            mate2,
            common,
            paired,
        } => paired_command(&config, index, mate1, mate2, &common, &paired).await,
        Commands::Single {
            index,
            reads,
            common,
        } => single_command(&config, index, reads, &common).await,
        Commands::Simple {
            index,
            fq1,
            fq2,
            output_prefix,
            preset,
            report,
            maxins,
            threads,
        } => {
            simple_command(
                &config,
                index,
                fq1,
                fq2,
                output_prefix,
                preset,
                report,
                maxins,
                threads,
            )
            .await
        }
        Commands::Batch {
            manifest,
            report,
            keep_going,
        } => batch_command(&config, &manifest, report.as_deref(), keep_going).await,
        Commands::CheckPrereqs { json } => check_prerequisites_command(&config, json).await,
        Commands::Presets => presets_command(),
    }
}
