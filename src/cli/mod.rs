// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for prfflow.

pub mod collect;
pub mod run;
pub mod submit;
pub mod validate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::Runtime;

/// Benson14 retinotopy orchestrator
///
/// Runs neuropythy's benson14_retinotopy on a FreeSurfer subject inside a
/// container and collects the pRF maps.
#[derive(Parser, Debug)]
#[clap(
    name = "prfflow",
    version,
    about = "Orchestrates containerized Benson14 pRF retinotopy runs",
    long_about = None,
    after_help = "Examples:\n\
        prfflow run --config config.json          Run the full pipeline\n\
        prfflow run --config config.json --dry-run\n\
        prfflow validate --config config.json     Check config, license and runtime\n\
        prfflow collect --subject /data/sub01     Collect existing outputs into prf/\n\
        prfflow submit --config config.json       Submit the run as a PBS job\n\n\
        See 'prfflow <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the retinotopy pipeline for one subject
    Run {
        /// Configuration file (JSON, YAML or TOML)
        #[clap(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Output directory (overrides the config)
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// FreeSurfer license text
        #[clap(long, env = "FREESURFER_LICENSE", hide_env_values = true)]
        license: Option<String>,

        /// Directory for the transient license file
        #[clap(long, value_name = "DIR")]
        scratch: Option<PathBuf>,

        /// Container runtime (singularity, apptainer, docker, host)
        #[clap(long)]
        runtime: Option<Runtime>,

        /// Container image (overrides the config)
        #[clap(long)]
        image: Option<String>,

        /// Show the planned invocation without running it
        #[clap(long)]
        dry_run: bool,

        /// Output format
        #[clap(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Check configuration, license and runtime availability
    Validate {
        /// Configuration file
        #[clap(short, long, default_value = "config.json")]
        config: PathBuf,

        /// FreeSurfer license text
        #[clap(long, env = "FREESURFER_LICENSE", hide_env_values = true)]
        license: Option<String>,
    },

    /// Collect existing retinotopy outputs of a subject
    Collect {
        /// FreeSurfer subject directory
        #[clap(short, long)]
        subject: PathBuf,

        /// Output directory
        #[clap(short, long, default_value = "prf")]
        output: PathBuf,

        /// Output format
        #[clap(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Write a PBS job script for the run and submit it
    Submit {
        /// Configuration file
        #[clap(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Output directory passed to the job
        #[clap(short, long)]
        output: Option<PathBuf>,

        /// Wall-clock limit
        #[clap(long, default_value = "01:00:00")]
        walltime: String,

        /// Processors per node
        #[clap(long, default_value = "1")]
        ppn: u32,

        /// Job name
        #[clap(long, default_value = "prfflow")]
        name: String,

        /// Where to write the job script (default: next to the config)
        #[clap(long)]
        script: Option<PathBuf>,

        /// Scheduler submit command
        #[clap(long, default_value = "qsub")]
        scheduler_command: String,

        /// Only write the script
        #[clap(long)]
        no_submit: bool,

        /// FreeSurfer license text the job will inherit
        #[clap(long, env = "FREESURFER_LICENSE", hide_env_values = true)]
        license: Option<String>,
    },
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}
