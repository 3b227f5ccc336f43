// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Volume conversion to compressed NIfTI

use std::path::{Path, PathBuf};

use crate::errors::{PrfError, PrfResult};
use crate::executors::{Invocation, ToolRunner};

/// Glob matching the retinotopy outputs
pub const OUTPUT_PATTERN: &str = "*benson14*";

const NIFTI_GZ: &str = ".nii.gz";

/// Files directly under `dir` whose names match `pattern`, sorted
///
/// Only the file name is matched, so `dir` may contain glob metacharacters.
/// A missing directory yields no files.
pub fn matching_files(dir: &Path, pattern: &str) -> PrfResult<Vec<PathBuf>> {
    let pattern = glob::Pattern::new(pattern)?;

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(PrfError::FileReadError {
                path: dir.to_path_buf(),
                error: e.to_string(),
            })
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| pattern.matches(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();

    files.sort();
    Ok(files)
}

/// Target path of a converted volume: `benson14_angle.mgz` → `benson14_angle.nii.gz`
///
/// A volume already in `.nii.gz` form is its own target.
pub fn nifti_target(volume: &Path) -> PathBuf {
    let name = volume
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if name.ends_with(NIFTI_GZ) {
        return volume.to_path_buf();
    }

    let stem = [".mgz", ".mgh", ".nii"]
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(&name);

    volume.with_file_name(format!("{}{}", stem, NIFTI_GZ))
}

/// Whether `volume` has been superseded by a converted `.nii.gz` sibling
pub fn has_converted_twin(volume: &Path) -> bool {
    let target = nifti_target(volume);
    target != volume && target.is_file()
}

/// Convert every matching volume under `<output_dir>/mri` with `converter`
///
/// Files already in `.nii.gz` form are skipped. Stops at the first failure.
/// Returns the converted files.
pub async fn convert_volumes(
    runner: &dyn ToolRunner,
    converter: &str,
    output_dir: &Path,
    pattern: &str,
) -> PrfResult<Vec<PathBuf>> {
    let mri = output_dir.join("mri");
    let volumes: Vec<PathBuf> = matching_files(&mri, pattern)?
        .into_iter()
        .filter(|p| nifti_target(p) != *p)
        .collect();

    let mut converted = Vec::with_capacity(volumes.len());

    for volume in volumes {
        let target = nifti_target(&volume);
        let invocation = Invocation::new(converter)
            .arg(volume.display().to_string())
            .arg(target.display().to_string());

        tracing::info!(from = %volume.display(), to = %target.display(), "converting volume");

        let result = runner.run(&invocation).await.map_err(|e| PrfError::Conversion {
            file: volume.clone(),
            exit_code: -1,
            output: e.to_string(),
        })?;

        if !result.success {
            return Err(PrfError::Conversion {
                file: volume,
                exit_code: result.exit_code,
                output: result.combined_output(),
            });
        }

        converted.push(target);
    }

    Ok(converted)
}
