// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Run configuration
//!
//! The configuration file is usually an app-level document carrying many
//! fields; only `freesurfer` is required here and unknown keys are ignored.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{PrfError, PrfResult};

/// Run configuration loaded once at start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// FreeSurfer subject directory
    pub freesurfer: PathBuf,

    /// Execution environment for the retinotopy tool
    #[serde(default)]
    pub runtime: Runtime,

    /// Container image reference
    #[serde(default = "default_image")]
    pub image: String,

    /// Program invoked by the `host` runtime
    #[serde(default = "default_executable")]
    pub executable: String,

    /// License path inside the container
    #[serde(default = "default_license_mount")]
    pub license_mount: PathBuf,

    /// Volume format converter
    #[serde(default = "default_converter")]
    pub converter: String,

    /// Destination for collected results
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_image() -> String {
    "docker://nben/neuropythy:v0.12.15".to_string()
}

fn default_executable() -> String {
    "neuropythy".to_string()
}

fn default_license_mount() -> PathBuf {
    PathBuf::from("/opt/freesurfer/license.txt")
}

fn default_converter() -> String {
    "mri_convert".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("prf")
}

/// Where the retinotopy tool runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    #[default]
    Singularity,
    Apptainer,
    Docker,
    Host,
}

impl Runtime {
    /// Binary name of the runtime
    pub fn binary(&self) -> &'static str {
        match self {
            Runtime::Singularity => "singularity",
            Runtime::Apptainer => "apptainer",
            Runtime::Docker => "docker",
            Runtime::Host => "host",
        }
    }
}

impl std::fmt::Display for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.binary())
    }
}

impl std::str::FromStr for Runtime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "singularity" => Ok(Self::Singularity),
            "apptainer" => Ok(Self::Apptainer),
            "docker" => Ok(Self::Docker),
            "host" => Ok(Self::Host),
            _ => Err(format!("Unknown runtime: {}", s)),
        }
    }
}

/// Serialization format of a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension; JSON otherwise
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

impl RunConfig {
    /// Load the configuration from a file
    pub fn from_file(path: &Path) -> PrfResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PrfError::config(path, format!("cannot read file: {}", e)))?;

        Self::parse(&content, ConfigFormat::from_path(path), path)
    }

    /// Parse configuration text; `origin` is only used in error messages
    pub fn parse(content: &str, format: ConfigFormat, origin: &Path) -> PrfResult<Self> {
        let parsed: Result<Self, String> = match format {
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        };

        let mut config = parsed.map_err(|reason| PrfError::config(origin, reason))?;

        let raw = config.freesurfer.to_string_lossy().to_string();
        if raw.trim().is_empty() {
            return Err(PrfError::config(origin, "field \"freesurfer\" is empty"));
        }

        let expanded = shellexpand::full(&raw)
            .map_err(|e| PrfError::config(origin, format!("cannot expand \"freesurfer\": {}", e)))?;
        config.freesurfer = PathBuf::from(expanded.as_ref());

        Ok(config)
    }

    /// Subject path derived from the `freesurfer` field
    pub fn subject(&self) -> PrfResult<SubjectPath> {
        SubjectPath::new(&self.freesurfer)
    }
}

/// Load a configuration file and return the configured subject directory
pub fn load_config(path: &Path) -> PrfResult<PathBuf> {
    RunConfig::from_file(path).map(|config| config.freesurfer)
}

/// A FreeSurfer subject directory split the way the retinotopy tool expects it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPath {
    path: PathBuf,
    root: PathBuf,
    name: String,
}

impl SubjectPath {
    /// Split a subject directory into root and name
    pub fn new(path: &Path) -> PrfResult<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                PrfError::config(path, "subject path has no directory name component")
            })?;

        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(Self {
            path: path.to_path_buf(),
            root,
            name,
        })
    }

    /// The subject directory itself
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parent directory passed to the tool's `-d` flag
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Subject directory name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root resolved against `base` when relative; bind mounts need absolute paths
    pub fn absolute_root(&self, base: &Path) -> PathBuf {
        if self.root.is_absolute() {
            self.root.clone()
        } else if self.root == Path::new(".") {
            base.to_path_buf()
        } else {
            base.join(&self.root)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_json(content: &str) -> PrfResult<RunConfig> {
        RunConfig::parse(content, ConfigFormat::Json, Path::new("config.json"))
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_json(r#"{"freesurfer": "/data/sub01"}"#).unwrap();

        assert_eq!(config.freesurfer, PathBuf::from("/data/sub01"));
        assert_eq!(config.runtime, Runtime::Singularity);
        assert_eq!(config.converter, "mri_convert");
        assert_eq!(config.output, PathBuf::from("prf"));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let config = parse_json(r#"{"freesurfer": "sub01", "t1": "anat.nii.gz", "_app": 3}"#).unwrap();
        assert_eq!(config.freesurfer, PathBuf::from("sub01"));
    }

    #[test]
    fn test_missing_freesurfer_is_config_error() {
        let err = parse_json(r#"{"t1": "anat.nii.gz"}"#).unwrap_err();
        assert!(matches!(err, PrfError::Config { .. }));
        assert!(err.to_string().contains("freesurfer"));
    }

    #[test]
    fn test_empty_freesurfer_is_config_error() {
        let err = parse_json(r#"{"freesurfer": "  "}"#).unwrap_err();
        assert!(matches!(err, PrfError::Config { .. }));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = parse_json("{freesurfer: ").unwrap_err();
        assert!(matches!(err, PrfError::Config { .. }));
    }

    #[test]
    fn test_freesurfer_path_is_expanded() {
        let config = parse_json(r#"{"freesurfer": "${PATH}/sub01"}"#).unwrap();
        let expanded = config.freesurfer.to_string_lossy().to_string();

        assert!(!expanded.contains('$'));
        assert!(expanded.ends_with("/sub01"));
    }

    #[test]
    fn test_unset_variable_is_config_error() {
        let err = parse_json(r#"{"freesurfer": "$PRFFLOW_SURELY_UNSET_VAR/sub01"}"#).unwrap_err();
        assert!(matches!(err, PrfError::Config { .. }));
    }

    #[test]
    fn test_parse_yaml_and_toml() {
        let yaml = RunConfig::parse(
            "freesurfer: /data/sub02\nruntime: docker\n",
            ConfigFormat::Yaml,
            Path::new("config.yaml"),
        )
        .unwrap();
        assert_eq!(yaml.freesurfer, PathBuf::from("/data/sub02"));
        assert_eq!(yaml.runtime, Runtime::Docker);

        let toml = RunConfig::parse(
            "freesurfer = \"/data/sub03\"\nruntime = \"apptainer\"\n",
            ConfigFormat::Toml,
            Path::new("config.toml"),
        )
        .unwrap();
        assert_eq!(toml.runtime, Runtime::Apptainer);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Json);
    }

    #[test]
    fn test_load_config_returns_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        for subject in ["/data/sub01", "relative/sub02", "sub03"] {
            let path = dir.path().join("config.json");
            std::fs::write(&path, serde_json::json!({ "freesurfer": subject }).to_string()).unwrap();
            assert_eq!(load_config(&path).unwrap(), PathBuf::from(subject));
        }
    }

    #[test]
    fn test_unreadable_config_is_config_error() {
        let err = load_config(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, PrfError::Config { .. }));
    }

    #[test]
    fn test_subject_path_split() {
        let subject = SubjectPath::new(Path::new("/data/sub01")).unwrap();
        assert_eq!(subject.name(), "sub01");
        assert_eq!(subject.root(), Path::new("/data"));

        let relative = SubjectPath::new(Path::new("sub01")).unwrap();
        assert_eq!(relative.root(), Path::new("."));
        assert_eq!(relative.absolute_root(Path::new("/work")), PathBuf::from("/work"));
    }

    #[test]
    fn test_subject_path_without_name_fails() {
        assert!(SubjectPath::new(Path::new("/")).is_err());
    }

    #[test]
    fn test_runtime_from_str() {
        assert_eq!("Docker".parse::<Runtime>().unwrap(), Runtime::Docker);
        assert!("podman".parse::<Runtime>().is_err());
    }
}
