// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Pipeline runner
//!
//! Runs one subject end to end. Steps are strictly sequential and any
//! failure halts the run; there is no resume.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::errors::{PrfError, PrfResult};
use crate::executors::{runner_for, HostRunner, ToolRunner};
use crate::pipeline::collect::{collect_and_rename, CollectionReport};
use crate::pipeline::convert::{convert_volumes, OUTPUT_PATTERN};
use crate::pipeline::invoke::{invoke, retinotopy_invocation};
use crate::pipeline::license::{materialize_license, resolve_license};
use crate::pipeline::{RunConfig, Runtime};

/// Where a run currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Init,
    ConfigLoaded,
    LicenseResolved,
    Invoked,
    Converted,
    Collected,
    Done,
    Failed { step: String, reason: String },
}

impl RunState {
    /// Step recorded on failure, if the run failed
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            RunState::Failed { step, .. } => Some(step.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Init => f.write_str("init"),
            RunState::ConfigLoaded => f.write_str("config-loaded"),
            RunState::LicenseResolved => f.write_str("license-resolved"),
            RunState::Invoked => f.write_str("invoked"),
            RunState::Converted => f.write_str("converted"),
            RunState::Collected => f.write_str("collected"),
            RunState::Done => f.write_str("done"),
            RunState::Failed { step, .. } => write!(f, "failed ({})", step),
        }
    }
}

/// Options threaded in from the entry point
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// License text, usually from FREESURFER_LICENSE
    pub license: Option<String>,
    /// Directory for the transient license file
    pub scratch_dir: Option<PathBuf>,
    /// Destination override
    pub output: Option<PathBuf>,
    /// Runtime override
    pub runtime: Option<Runtime>,
    /// Image override
    pub image: Option<String>,
    /// Base for relative subject paths
    pub working_dir: PathBuf,
    /// Stop after resolving the license and report the plan
    pub dry_run: bool,
}

/// Summary of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub subject: PathBuf,
    pub command: String,
    pub runner: String,
    pub dry_run: bool,
    pub tool_seconds: f64,
    pub converted: Vec<PathBuf>,
    pub collection: Option<CollectionReport>,
    pub total_seconds: f64,
}

/// Pipeline runner
pub struct PipelineRunner {
    options: RunOptions,
    tool: Option<Box<dyn ToolRunner>>,
    converter: Box<dyn ToolRunner>,
    state: RunState,
    step: &'static str,
}

const LOAD_CONFIG: &str = "load-config";
const RESOLVE_LICENSE: &str = "resolve-license";
const MATERIALIZE_LICENSE: &str = "materialize-license";
const INVOKE: &str = "invoke";
const CONVERT_VOLUMES: &str = "convert-volumes";
const COLLECT_OUTPUTS: &str = "collect-outputs";

impl PipelineRunner {
    /// Create a runner; the tool runner is chosen from the configuration
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            tool: None,
            converter: Box::new(HostRunner::new()),
            state: RunState::Init,
            step: LOAD_CONFIG,
        }
    }

    /// Use a specific runner for the retinotopy tool
    pub fn with_tool_runner(mut self, runner: Box<dyn ToolRunner>) -> Self {
        self.tool = Some(runner);
        self
    }

    /// Use a specific runner for volume conversion
    pub fn with_converter(mut self, runner: Box<dyn ToolRunner>) -> Self {
        self.converter = runner;
        self
    }

    /// Current state
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Apply command-line overrides to a loaded configuration
    pub fn apply_overrides(&self, config: &mut RunConfig) {
        if let Some(runtime) = self.options.runtime {
            config.runtime = runtime;
        }
        if let Some(ref image) = self.options.image {
            config.image = image.clone();
        }
        if let Some(ref output) = self.options.output {
            config.output = output.clone();
        }
    }

    /// Execute the run for the configuration at `config_path`
    pub async fn run(&mut self, config_path: &Path) -> PrfResult<RunReport> {
        match self.execute(config_path).await {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::error!(step = self.step, reached = %self.state, "run failed");
                self.state = RunState::Failed {
                    step: self.step.to_string(),
                    reason: e.to_string(),
                };
                Err(e)
            }
        }
    }

    async fn execute(&mut self, config_path: &Path) -> PrfResult<RunReport> {
        let start = Instant::now();

        self.step = LOAD_CONFIG;
        let mut config = RunConfig::from_file(config_path)?;
        self.apply_overrides(&mut config);
        let subject = config.subject()?;
        advance(&mut self.state, RunState::ConfigLoaded);

        self.step = RESOLVE_LICENSE;
        let secret = resolve_license(self.options.license.as_deref())?;
        advance(&mut self.state, RunState::LicenseResolved);

        let subject_root = subject.absolute_root(&self.options.working_dir);
        let subject_dir = subject_root.join(subject.name());
        let scratch_dir = self
            .options
            .scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        let tool: &dyn ToolRunner = &**self.tool.get_or_insert_with(|| runner_for(&config));

        if self.options.dry_run {
            let planned = retinotopy_invocation(
                &config,
                &subject,
                &subject_root,
                &scratch_dir.join("fs-license-XXXXXX.txt"),
            );
            return Ok(RunReport {
                subject: subject_dir,
                command: planned.display(),
                runner: tool.name().to_string(),
                dry_run: true,
                tool_seconds: 0.0,
                converted: vec![],
                collection: None,
                total_seconds: start.elapsed().as_secs_f64(),
            });
        }

        self.step = MATERIALIZE_LICENSE;
        // The guard removes the license file on every path out of this scope
        let license = materialize_license(&secret, &scratch_dir)?;

        self.step = INVOKE;
        let invocation = retinotopy_invocation(&config, &subject, &subject_root, license.path());
        let result = invoke(tool, &invocation).await?;
        drop(license);
        advance(&mut self.state, RunState::Invoked);

        self.step = CONVERT_VOLUMES;
        let converted = convert_volumes(
            self.converter.as_ref(),
            &config.converter,
            &subject_dir,
            OUTPUT_PATTERN,
        )
        .await?;
        advance(&mut self.state, RunState::Converted);

        self.step = COLLECT_OUTPUTS;
        let collection = collect_and_rename(&subject_dir, &config.output)?;
        advance(&mut self.state, RunState::Collected);

        advance(&mut self.state, RunState::Done);

        Ok(RunReport {
            subject: subject_dir,
            command: invocation.display(),
            runner: tool.name().to_string(),
            dry_run: false,
            tool_seconds: result.duration.as_secs_f64(),
            converted,
            collection: Some(collection),
            total_seconds: start.elapsed().as_secs_f64(),
        })
    }
}

fn advance(state: &mut RunState, next: RunState) {
    tracing::info!(from = %state, to = %next, "pipeline step");
    *state = next;
}
