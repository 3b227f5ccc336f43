// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Tool runners
//!
//! Every external process the pipeline starts goes through [`ToolRunner`],
//! so orchestration can be tested with a fake and does not depend on any
//! particular isolation technology.

mod container;
mod host;

pub use container::ContainerRunner;
pub use host::HostRunner;

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::PrfError;
use crate::pipeline::{RunConfig, Runtime};

/// A host path made visible inside the execution environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    /// Path on the host
    pub host: PathBuf,
    /// Path inside the environment
    pub guest: PathBuf,
    /// Mount read-only
    pub read_only: bool,
}

impl Mount {
    /// Mount a host path at the same location inside the environment
    pub fn same_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            host: path.clone(),
            guest: path,
            read_only: false,
        }
    }

    /// Mount a host path read-only at `guest`
    pub fn read_only(host: impl Into<PathBuf>, guest: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            guest: guest.into(),
            read_only: true,
        }
    }

    /// `host:guest[:ro]` as understood by docker and singularity
    pub fn bind_arg(&self) -> String {
        let mut arg = format!("{}:{}", self.host.display(), self.guest.display());
        if self.read_only {
            arg.push_str(":ro");
        }
        arg
    }
}

/// A command to run
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Program; container runners leave it to the image entrypoint
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Bind mounts (ignored by host runners)
    pub mounts: Vec<Mount>,
    /// Extra environment variables
    pub env: HashMap<String, String>,
}

impl Invocation {
    /// Create an invocation of `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add a bind mount
    pub fn mount(mut self, mount: Mount) -> Self {
        self.mounts.push(mount);
        self
    }

    /// Add an environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Printable command line
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of running a command
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Whether the process exited with status 0
    pub success: bool,

    /// Standard output
    pub stdout: String,

    /// Standard error
    pub stderr: String,

    /// Exit code (-1 when terminated by a signal)
    pub exit_code: i32,

    /// Execution duration
    pub duration: Duration,
}

impl ExecutionResult {
    /// Create a successful result
    pub fn success(stdout: String, duration: Duration) -> Self {
        Self {
            success: true,
            stdout,
            stderr: String::new(),
            exit_code: 0,
            duration,
        }
    }

    /// Create a failed result
    pub fn failure(stderr: String, exit_code: i32, duration: Duration) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr,
            exit_code,
            duration,
        }
    }

    /// stdout and stderr joined
    pub fn combined_output(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (true, _) => self.stderr.clone(),
            (false, true) => self.stdout.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

/// Narrow interface over process execution
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run to completion; a non-zero exit is reported in the result, not as an error
    async fn run(&self, invocation: &Invocation) -> Result<ExecutionResult, PrfError>;

    /// Check if the underlying runtime is available
    async fn check_available(&self) -> Result<bool, PrfError>;

    /// Runner name for messages
    fn name(&self) -> &str;
}

/// Create the runner the configuration asks for
pub fn runner_for(config: &RunConfig) -> Box<dyn ToolRunner> {
    match config.runtime {
        Runtime::Host => Box::new(HostRunner::new()),
        runtime => Box::new(ContainerRunner::new(runtime, config.image.clone())),
    }
}
