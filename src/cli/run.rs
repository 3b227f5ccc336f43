// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Run command - execute the pipeline for one subject

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::OutputFormat;
use crate::errors::RecoverySuggestion;
use crate::pipeline::{PipelineRunner, RunOptions, RunReport, Runtime};
use crate::utils::{create_spinner, format_duration, print_field, print_header, print_section, print_success};

/// Arguments of the run command
#[derive(Debug)]
pub struct RunArgs {
    pub config: PathBuf,
    pub output: Option<PathBuf>,
    pub license: Option<String>,
    pub scratch: Option<PathBuf>,
    pub runtime: Option<Runtime>,
    pub image: Option<String>,
    pub dry_run: bool,
    pub format: OutputFormat,
}

/// Run the pipeline
pub async fn run(args: RunArgs, verbose: bool) -> Result<()> {
    let working_dir = std::env::current_dir()
        .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;

    let options = RunOptions {
        license: args.license,
        scratch_dir: args.scratch,
        output: args.output,
        runtime: args.runtime,
        image: args.image,
        working_dir,
        dry_run: args.dry_run,
    };

    let mut runner = PipelineRunner::new(options);

    let spinner = (args.format == OutputFormat::Text && !args.dry_run)
        .then(|| create_spinner("Running benson14 retinotopy..."));

    let outcome = runner.run(&args.config).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            let step = runner.state().failed_step().unwrap_or("unknown");
            eprintln!("{} {}", "✗".red(), format!("Run failed at step '{}'", step).red().bold());
            if let Some(suggestion) = RecoverySuggestion::for_error(&e) {
                eprintln!();
                eprintln!("{}", suggestion);
            }
            if verbose {
                if let crate::errors::PrfError::Execution { stdout, .. } = &e {
                    if !stdout.is_empty() {
                        eprintln!("{}", stdout.dimmed());
                    }
                }
            }
            return Err(e.into());
        }
    };

    match args.format {
        OutputFormat::Text => print_text_report(&report, verbose),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| miette::miette!("Failed to serialize report: {}", e))?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn print_text_report(report: &RunReport, verbose: bool) {
    if report.dry_run {
        print_header("Planned run");
        print_field("Subject", report.subject.display());
        print_field("Runner", &report.runner);
        print_field("Command", &report.command);
        println!();
        println!("{}", "Dry run: nothing was executed.".dimmed());
        return;
    }

    print_header("Retinotopy run");
    print_field("Subject", report.subject.display());
    print_field("Runner", &report.runner);
    print_field("Tool time", format_duration(report.tool_seconds));

    if !report.converted.is_empty() {
        print_section("Converted");
        for path in &report.converted {
            print_success(&path.display().to_string());
        }
    }

    if let Some(ref collection) = report.collection {
        print_section(&format!("Collected into {}", collection.destination.display()));
        for file in &collection.files {
            let name = file
                .destination
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if file.unchanged {
                println!("  {} {} {}", "✓".green(), name, "(unchanged)".dimmed());
            } else {
                print_success(&name);
            }
            if verbose {
                println!("      {}", file.digest.dimmed());
            }
        }
    }

    println!();
    println!(
        "{}",
        format!("Pipeline completed in {}", format_duration(report.total_seconds)).green()
    );
}
