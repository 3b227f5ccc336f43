// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! FreeSurfer license handling
//!
//! The secret only ever exists in memory and in one transient file that is
//! removed when its guard goes out of scope.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::errors::{PrfError, PrfResult};

/// Environment variable holding the license text
pub const LICENSE_ENV: &str = "FREESURFER_LICENSE";

/// License text; never printed
#[derive(Clone)]
pub struct LicenseSecret(String);

impl LicenseSecret {
    /// Raw license text
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for LicenseSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LicenseSecret(<redacted>)")
    }
}

impl std::fmt::Display for LicenseSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Validate the license value handed in by the entry point
pub fn resolve_license(value: Option<&str>) -> PrfResult<LicenseSecret> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(LicenseSecret(v.to_string())),
        _ => Err(PrfError::MissingCredential {
            variable: LICENSE_ENV.to_string(),
        }),
    }
}

/// A license file on disk, deleted on drop
#[derive(Debug)]
pub struct LicenseFile {
    file: NamedTempFile,
}

impl LicenseFile {
    /// Location of the transient file
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Write the secret to a transient file inside `scratch_dir`
pub fn materialize_license(secret: &LicenseSecret, scratch_dir: &Path) -> PrfResult<LicenseFile> {
    std::fs::create_dir_all(scratch_dir).map_err(|e| PrfError::FileWriteError {
        path: scratch_dir.to_path_buf(),
        error: e.to_string(),
    })?;

    let mut file = tempfile::Builder::new()
        .prefix("fs-license-")
        .suffix(".txt")
        .tempfile_in(scratch_dir)
        .map_err(|e| PrfError::FileWriteError {
            path: scratch_dir.to_path_buf(),
            error: e.to_string(),
        })?;

    // tempfile creates the file with mode 0600 on unix
    let mut text = secret.expose().to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }

    file.write_all(text.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| PrfError::FileWriteError {
            path: file.path().to_path_buf(),
            error: e.to_string(),
        })?;

    tracing::debug!(path = %file.path().display(), "materialized license file");

    Ok(LicenseFile { file })
}
