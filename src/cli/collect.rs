// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Collect command - gather outputs of a finished retinotopy run

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::OutputFormat;
use crate::pipeline::collect_and_rename;
use crate::utils::{print_header, print_info, print_success};

/// Run the collect command
pub async fn run(subject: PathBuf, output: PathBuf, format: OutputFormat, _verbose: bool) -> Result<()> {
    let report = collect_and_rename(&subject, &output)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| miette::miette!("Failed to serialize report: {}", e))?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            print_header(&format!("Collected into {}", report.destination.display()));
            for file in &report.files {
                let line = format!("{} ← {}", file.destination.display(), file.source.display());
                if file.unchanged {
                    print_info(&line);
                } else {
                    print_success(&line);
                }
            }
            println!();
            println!(
                "{}",
                format!("{} written, {} unchanged", report.written(), report.files.len() - report.written()).green()
            );
        }
    }

    Ok(())
}
