// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Error types
//!
//! Every failure names the pipeline step it came from, and errors raised by
//! external processes carry what the process printed.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for prfflow operations
pub type PrfResult<T> = Result<T, PrfError>;

/// Number of trailing output lines kept in error messages
const OUTPUT_TAIL_LINES: usize = 20;

/// Main error type for prfflow
#[derive(Error, Debug, Diagnostic)]
pub enum PrfError {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Configuration error in '{path}': {reason}")]
    #[diagnostic(
        code(prfflow::config),
        help("The configuration must contain a non-empty \"freesurfer\" field, e.g. {{\"freesurfer\": \"/data/sub01\"}}")
    )]
    Config { path: PathBuf, reason: String },

    #[error("FreeSurfer license is missing: {variable} is unset or empty")]
    #[diagnostic(
        code(prfflow::missing_credential),
        help("Export the license text: export {variable}=\"$(cat license.txt)\"")
    )]
    MissingCredential { variable: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Execution Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Step '{step}' failed with exit code {exit_code}\n{}", tail(.stderr, .stdout))]
    #[diagnostic(code(prfflow::execution))]
    Execution {
        step: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
        #[help]
        help: Option<String>,
    },

    #[error("Converting '{file}' failed with exit code {exit_code}\n{}", tail(.output, ""))]
    #[diagnostic(
        code(prfflow::conversion),
        help("Check that the converter (mri_convert by default) is installed and on PATH")
    )]
    Conversion {
        file: PathBuf,
        exit_code: i32,
        output: String,
    },

    #[error("Expected output missing: {}", display_paths(.missing))]
    #[diagnostic(
        code(prfflow::output_missing),
        help("The retinotopy tool did not produce a complete result set; inspect its log output")
    )]
    OutputMissing { missing: Vec<PathBuf> },

    #[error("Runtime '{runtime}' not found")]
    #[diagnostic(code(prfflow::runtime_not_found), help("{suggestion}"))]
    RuntimeNotFound { runtime: String, suggestion: String },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(prfflow::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(prfflow::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(prfflow::io_error))]
    Io { message: String },

    #[error("JSON error: {message}")]
    #[diagnostic(code(prfflow::json_error))]
    Json { message: String },

    #[error("Glob pattern error: {message}")]
    #[diagnostic(code(prfflow::glob_error))]
    GlobPattern { message: String },
}

impl From<std::io::Error> for PrfError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_json::Error> for PrfError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<glob::PatternError> for PrfError {
    fn from(e: glob::PatternError) -> Self {
        Self::GlobPattern { message: e.to_string() }
    }
}

impl PrfError {
    /// Create a configuration error for the given file
    pub fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a runtime not found error with installation suggestion
    pub fn runtime_not_found(runtime: &str) -> Self {
        let suggestion = match runtime {
            "singularity" | "apptainer" => {
                "Load the module on your cluster (e.g. 'module load singularity') or install Apptainer: https://apptainer.org/docs/".to_string()
            }
            "docker" => "Install Docker: https://docs.docker.com/get-docker/".to_string(),
            _ => format!("Install {} and ensure it's in your PATH", runtime),
        };

        Self::RuntimeNotFound {
            runtime: runtime.to_string(),
            suggestion,
        }
    }

    /// Create an execution error with hints derived from the tool output
    pub fn execution_failed(step: &str, exit_code: i32, stdout: String, stderr: String) -> Self {
        let help = Self::help_for_tool_output(&stderr).or_else(|| Self::help_for_tool_output(&stdout));
        Self::Execution {
            step: step.to_string(),
            exit_code,
            stdout,
            stderr,
            help,
        }
    }

    fn help_for_tool_output(output: &str) -> Option<String> {
        if output.contains("license") || output.contains("License") {
            Some("The tool rejected the FreeSurfer license. Check the FREESURFER_LICENSE value.".into())
        } else if output.contains("No such file or directory") {
            Some("A path was not visible inside the container. Check the subject directory and bind mounts.".into())
        } else if output.contains("FATAL") && output.contains("image") {
            Some("The container image could not be loaded. Check the 'image' setting.".into())
        } else {
            None
        }
    }
}

fn tail(primary: &str, fallback: &str) -> String {
    let source = if primary.trim().is_empty() { fallback } else { primary };
    let lines: Vec<&str> = source.trim_end().lines().collect();
    let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
    lines[start..].join("\n")
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_keeps_output_tail() {
        let stderr = (0..50).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let err = PrfError::execution_failed("invoke", 2, String::new(), stderr);
        let message = err.to_string();

        assert!(message.contains("exit code 2"));
        assert!(message.contains("line 49"));
        assert!(!message.contains("line 10\n"));
    }

    #[test]
    fn test_execution_error_falls_back_to_stdout() {
        let err = PrfError::execution_failed("invoke", 1, "boom".into(), String::new());
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_license_hint() {
        let err = PrfError::execution_failed("invoke", 1, String::new(), "ERROR: License file invalid".into());
        match err {
            PrfError::Execution { help, .. } => assert!(help.unwrap().contains("FREESURFER_LICENSE")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
