// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Host executor
//!
//! Runs a program directly on the host.

use async_trait::async_trait;
use std::time::Instant;
use tokio::process::Command;

use super::{ExecutionResult, Invocation, ToolRunner};
use crate::errors::PrfError;

/// Host process runner
pub struct HostRunner;

impl HostRunner {
    /// Create a new host runner
    pub fn new() -> Self {
        Self
    }
}

impl Default for HostRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolRunner for HostRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ExecutionResult, PrfError> {
        let start = Instant::now();

        tracing::debug!(command = %invocation.display(), "running on host");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        cmd.envs(&invocation.env);

        let output = cmd.output().await.map_err(|e| {
            PrfError::execution_failed(
                &invocation.program,
                -1,
                String::new(),
                format!("failed to start '{}': {}", invocation.program, e),
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
        Ok(true)
    }

    fn name(&self) -> &str {
        "host"
    }
}
