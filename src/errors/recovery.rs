// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for recovering from a failed run.

use super::PrfError;

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Pick a suggestion for an error, if one applies
    pub fn for_error(error: &PrfError) -> Option<Self> {
        match error {
            PrfError::MissingCredential { variable } => Some(Self::set_license(variable)),
            PrfError::Config { .. } => Some(Self::fix_config()),
            PrfError::RuntimeNotFound { runtime, .. } => Some(Self::install_runtime(runtime)),
            PrfError::OutputMissing { .. } => Some(Self::rerun_tool()),
            _ => None,
        }
    }

    /// Suggest exporting the FreeSurfer license
    pub fn set_license(variable: &str) -> Self {
        Self {
            action: format!("Set {}", variable),
            steps: vec![
                "The retinotopy container needs a FreeSurfer license".into(),
                "Register at https://surfer.nmr.mgh.harvard.edu/registration.html to obtain one".into(),
            ],
            commands: vec![
                "# Export the license text:".into(),
                format!("export {}=\"$(cat ~/license.txt)\"", variable),
            ],
        }
    }

    /// Suggest fixing the run configuration
    pub fn fix_config() -> Self {
        Self {
            action: "Fix the run configuration".into(),
            steps: vec![
                "The configuration must be valid JSON, YAML or TOML".into(),
                "It must contain a non-empty \"freesurfer\" field pointing at the subject".into(),
            ],
            commands: vec![
                "# Minimal config.json:".into(),
                "{\"freesurfer\": \"/data/sub01\"}".into(),
                "".into(),
                "# Check it:".into(),
                "prfflow validate --config config.json".into(),
            ],
        }
    }

    /// Suggest installing a container runtime
    pub fn install_runtime(runtime: &str) -> Self {
        match runtime {
            "singularity" | "apptainer" => Self {
                action: format!("Make {} available", runtime),
                steps: vec![
                    "On most clusters the runtime is provided as an environment module".into(),
                    "Alternatively select another runtime with --runtime".into(),
                ],
                commands: vec![
                    format!("module load {}", runtime),
                    "".into(),
                    "# Or run with Docker:".into(),
                    "prfflow run --config config.json --runtime docker".into(),
                ],
            },
            _ => Self {
                action: format!("Install {}", runtime),
                steps: vec![format!("Install {} and ensure it's in your PATH", runtime)],
                commands: vec![],
            },
        }
    }

    /// Suggest inspecting and re-running the retinotopy tool
    pub fn rerun_tool() -> Self {
        Self {
            action: "Re-run the retinotopy step".into(),
            steps: vec![
                "Some benson14 volumes were not found under <subject>/mri".into(),
                "Run with --verbose to see the tool output".into(),
            ],
            commands: vec![
                "ls <subject>/mri/*benson14* <subject>/surf/*benson14*".into(),
                "prfflow --verbose run --config config.json".into(),
            ],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}
