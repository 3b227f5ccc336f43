// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! prfflow - Benson14 retinotopy orchestrator
//!
//! Runs neuropythy's benson14_retinotopy for one FreeSurfer subject and
//! collects the pRF maps.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prfflow::cli::{collect, run, submit, validate, Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prfflow=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    prfflow::utils::configure_colors();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Run {
            config,
            output,
            license,
            scratch,
            runtime,
            image,
            dry_run,
            format,
        } => {
            let args = run::RunArgs {
                config,
                output,
                license,
                scratch,
                runtime,
                image,
                dry_run,
                format,
            };
            run::run(args, cli.verbose).await
        }
        Commands::Validate { config, license } => validate::run(config, license, cli.verbose).await,
        Commands::Collect {
            subject,
            output,
            format,
        } => collect::run(subject, output, format, cli.verbose).await,
        Commands::Submit {
            config,
            output,
            walltime,
            ppn,
            name,
            script,
            scheduler_command,
            no_submit,
            license,
        } => {
            let args = submit::SubmitArgs {
                config,
                output,
                walltime,
                ppn,
                name,
                script,
                scheduler_command,
                no_submit,
                license,
            };
            submit::run(args, cli.verbose).await
        }
    }
}
