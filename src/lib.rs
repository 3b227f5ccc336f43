// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! # prfflow - Benson14 retinotopy orchestrator
//!
//! `prfflow` runs neuropythy's `benson14_retinotopy` on a FreeSurfer subject
//! inside a container and gathers the resulting pRF maps.
//!
//! ## Pipeline
//!
//! 1. Load the run configuration (`freesurfer` subject path)
//! 2. Resolve the FreeSurfer license and write it to a transient file
//! 3. Invoke the retinotopy tool with the subject and license bind-mounted
//! 4. Convert the produced volumes to compressed NIfTI
//! 5. Collect the results into a flat directory under canonical names
//!
//! ## Quick Start
//!
//! ```bash
//! export FREESURFER_LICENSE="$(cat license.txt)"
//! echo '{"freesurfer": "/data/sub01"}' > config.json
//!
//! prfflow validate --config config.json
//! prfflow run --config config.json
//! ```

pub mod cli;
pub mod errors;
pub mod executors;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use errors::{PrfError, PrfResult};
pub use executors::{ExecutionResult, Invocation, Mount, ToolRunner};
pub use pipeline::{PipelineRunner, RunConfig, RunOptions, RunState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
