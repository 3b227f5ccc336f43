// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Output collection and renaming
//!
//! Copies the retinotopy results from `<subject>/surf` and `<subject>/mri`
//! into one flat directory, giving the four volume outputs their canonical
//! names. A volume is collected in its converted `.nii.gz` form when one
//! exists. Nothing is written unless the required outputs are all present.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::errors::{PrfError, PrfResult};
use crate::pipeline::convert::{has_converted_twin, matching_files, OUTPUT_PATTERN};
use crate::utils::hash::{has_digest, hash_file};

const PRODUCED_PREFIX: &str = "benson14_";

/// Produced quantity name and its canonical name
pub const RENAME_MAP: [(&str, &str); 4] = [
    ("eccen", "eccentricity"),
    ("sigma", "rfWidth"),
    ("angle", "polarAngle"),
    ("varea", "varea"),
];

/// Canonical name for a produced file name
///
/// `benson14_eccen.nii.gz` → `eccentricity.nii.gz`; names outside the map,
/// such as `lh.benson14_eccen.mgz`, are returned unchanged.
pub fn canonical_name(file_name: &str) -> String {
    let renamed = file_name.strip_prefix(PRODUCED_PREFIX).and_then(|rest| {
        let (quantity, extension) = rest.split_once('.')?;
        RENAME_MAP
            .iter()
            .find(|(produced, _)| *produced == quantity)
            .map(|(_, canonical)| format!("{}.{}", canonical, extension))
    });

    renamed.unwrap_or_else(|| file_name.to_string())
}

/// One file placed in the destination directory
#[derive(Debug, Clone, Serialize)]
pub struct CollectedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub digest: String,
    /// Destination already held identical content
    pub unchanged: bool,
}

/// Outcome of a collection
#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub destination: PathBuf,
    pub files: Vec<CollectedFile>,
}

impl CollectionReport {
    /// Number of files actually written
    pub fn written(&self) -> usize {
        self.files.iter().filter(|f| !f.unchanged).count()
    }
}

/// Required outputs that are absent
///
/// Each quantity needs a volume `mri/benson14_<q>.*` and at least one
/// surface map `surf/*benson14_<q>.*`.
pub fn missing_outputs(output_dir: &Path) -> PrfResult<Vec<PathBuf>> {
    let mri = output_dir.join("mri");
    let surf = output_dir.join("surf");
    let mut missing = Vec::new();

    for (quantity, _) in RENAME_MAP {
        let volume = format!("{}{}.*", PRODUCED_PREFIX, quantity);
        if matching_files(&mri, &volume)?.is_empty() {
            missing.push(mri.join(volume));
        }

        let surface = format!("*{}{}.*", PRODUCED_PREFIX, quantity);
        if matching_files(&surf, &surface)?.is_empty() {
            missing.push(surf.join(surface));
        }
    }

    Ok(missing)
}

/// Copy every `*benson14*` output into `dest_dir` under its canonical name
pub fn collect_and_rename(output_dir: &Path, dest_dir: &Path) -> PrfResult<CollectionReport> {
    let missing = missing_outputs(output_dir)?;
    if !missing.is_empty() {
        return Err(PrfError::OutputMissing { missing });
    }

    let mut sources = matching_files(&output_dir.join("surf"), OUTPUT_PATTERN)?;
    sources.extend(
        matching_files(&output_dir.join("mri"), OUTPUT_PATTERN)?
            .into_iter()
            .filter(|volume| !has_converted_twin(volume)),
    );

    std::fs::create_dir_all(dest_dir).map_err(|e| PrfError::FileWriteError {
        path: dest_dir.to_path_buf(),
        error: e.to_string(),
    })?;

    let mut files = Vec::with_capacity(sources.len());

    for source in sources {
        let Some(name) = source.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        let destination = dest_dir.join(canonical_name(&name));
        let digest = hash_file(&source)?;

        let unchanged = has_digest(&destination, &digest);
        if !unchanged {
            std::fs::copy(&source, &destination).map_err(|e| PrfError::FileWriteError {
                path: destination.clone(),
                error: e.to_string(),
            })?;
        }

        tracing::debug!(
            from = %source.display(),
            to = %destination.display(),
            unchanged,
            "collected output"
        );

        files.push(CollectedFile {
            source,
            destination,
            digest,
            unchanged,
        });
    }

    tracing::info!(
        destination = %dest_dir.display(),
        files = files.len(),
        "collected retinotopy outputs"
    );

    Ok(CollectionReport {
        destination: dest_dir.to_path_buf(),
        files,
    })
}
