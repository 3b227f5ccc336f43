// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Retinotopy pipeline
//!
//! Configuration, license handling, tool invocation, volume conversion and
//! output collection for a single subject run.

pub mod collect;
pub mod convert;
mod definition;
mod executor;
pub mod invoke;
pub mod license;

pub use collect::{collect_and_rename, CollectionReport};
pub use convert::convert_volumes;
pub use definition::*;
pub use executor::{PipelineRunner, RunOptions, RunReport, RunState};
pub use license::{materialize_license, resolve_license, LicenseFile, LicenseSecret, LICENSE_ENV};
