// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Utility modules
//!
//! Terminal output helpers and content hashing.

pub mod colors;
pub mod hash;
pub mod spinner;

pub use colors::*;
pub use spinner::*;
