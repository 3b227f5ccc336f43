// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Validate command - check preconditions without running anything

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::executors::runner_for;
use crate::pipeline::{resolve_license, RunConfig};
use crate::utils::{print_error, print_success, print_warning};

/// Run the validate command
pub async fn run(config_path: PathBuf, license: Option<String>, verbose: bool) -> Result<()> {
    println!("{}", "Validating run...".bold());
    println!();

    let mut errors = 0;

    let config = match RunConfig::from_file(&config_path) {
        Ok(config) => {
            print_success(&format!("Configuration {} is valid", config_path.display()));
            config
        }
        Err(e) => {
            print_error(&e.to_string());
            return Err(miette::miette!("Configuration is invalid"));
        }
    };

    match config.subject() {
        Ok(subject) => {
            if subject.path().is_dir() {
                print_success(&format!("Subject directory {} exists", subject.path().display()));
            } else {
                print_warning(&format!(
                    "Subject directory {} not found on this host",
                    subject.path().display()
                ));
            }
        }
        Err(e) => {
            errors += 1;
            print_error(&e.to_string());
        }
    }

    match resolve_license(license.as_deref()) {
        Ok(_) => print_success("FreeSurfer license is set"),
        Err(e) => {
            errors += 1;
            print_error(&e.to_string());
        }
    }

    let runner = runner_for(&config);
    match runner.check_available().await {
        Ok(true) => print_success(&format!("Runtime '{}' is available", runner.name())),
        _ => {
            errors += 1;
            print_error(&format!("Runtime '{}' not found in PATH", runner.name()));
        }
    }

    if which::which(&config.converter).is_ok() {
        print_success(&format!("Converter '{}' is available", config.converter));
    } else {
        print_warning(&format!("Converter '{}' not found in PATH", config.converter));
    }

    if verbose {
        println!();
        println!("{}:", "Run summary".bold());
        println!("  Runtime:   {}", config.runtime);
        println!("  Image:     {}", config.image);
        println!("  Converter: {}", config.converter);
        println!("  Output:    {}", config.output.display());
    }

    println!();

    if errors > 0 {
        Err(miette::miette!("Validation failed with {} error(s)", errors))
    } else {
        println!("{}", "Ready to run!".green().bold());
        Ok(())
    }
}
