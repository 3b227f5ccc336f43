// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Container executor
//!
//! Runs the image entrypoint under Singularity, Apptainer or Docker with the
//! requested bind mounts.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Instant;
use tokio::process::Command;

use super::{ExecutionResult, Invocation, ToolRunner};
use crate::errors::PrfError;
use crate::pipeline::Runtime;

/// Container runner
pub struct ContainerRunner {
    runtime: Runtime,
    image: String,
}

impl ContainerRunner {
    /// Create a runner for `image` under `runtime`
    pub fn new(runtime: Runtime, image: impl Into<String>) -> Self {
        Self {
            runtime,
            image: image.into(),
        }
    }

    /// Arguments passed to the runtime binary
    pub fn runtime_args(&self, invocation: &Invocation) -> Vec<String> {
        let mut args = Vec::new();

        match self.runtime {
            Runtime::Docker => {
                args.push("run".to_string());
                args.push("--rm".to_string());
                for mount in &invocation.mounts {
                    args.push("-v".to_string());
                    args.push(mount.bind_arg());
                }
                for (key, value) in sorted_env(invocation) {
                    args.push("-e".to_string());
                    args.push(format!("{}={}", key, value));
                }
            }
            _ => {
                args.push("run".to_string());
                args.push("-e".to_string());
                for mount in &invocation.mounts {
                    args.push("-B".to_string());
                    args.push(mount.bind_arg());
                }
                for (key, value) in sorted_env(invocation) {
                    args.push("--env".to_string());
                    args.push(format!("{}={}", key, value));
                }
            }
        }

        args.push(self.image.clone());
        args.extend(invocation.args.iter().cloned());
        args
    }

    fn locate(&self) -> Result<PathBuf, PrfError> {
        which::which(self.runtime.binary())
            .map_err(|_| PrfError::runtime_not_found(self.runtime.binary()))
    }
}

fn sorted_env(invocation: &Invocation) -> Vec<(&String, &String)> {
    let mut env: Vec<_> = invocation.env.iter().collect();
    env.sort();
    env
}

#[async_trait]
impl ToolRunner for ContainerRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ExecutionResult, PrfError> {
        let binary = self.locate()?;
        let args = self.runtime_args(invocation);

        tracing::debug!(
            runtime = %self.runtime,
            command = %format!("{} {}", binary.display(), args.join(" ")),
            "running in container"
        );

        let start = Instant::now();

        let output = Command::new(&binary).args(&args).output().await.map_err(|e| {
            PrfError::execution_failed(
                self.runtime.binary(),
                -1,
                String::new(),
                format!("failed to start {}: {}", binary.display(), e),
            )
        })?;

        Ok(ExecutionResult {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }

    async fn check_available(&self) -> Result<bool, PrfError> {
        Ok(self.locate().is_ok())
    }

    fn name(&self) -> &str {
        self.runtime.binary()
    }
}
