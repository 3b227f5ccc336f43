// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Retinotopy tool invocation

use std::path::Path;

use crate::errors::{PrfError, PrfResult};
use crate::executors::{ExecutionResult, Invocation, Mount, ToolRunner};
use crate::pipeline::{RunConfig, SubjectPath};

/// neuropythy subcommand computing the Benson14 template fit
pub const RETINOTOPY_COMMAND: &str = "benson14_retinotopy";

/// Build the retinotopy command for a subject
///
/// `subject_root` must be absolute; it is mounted at the same path so the
/// `-d` argument is valid on both sides of the container boundary.
pub fn retinotopy_invocation(
    config: &RunConfig,
    subject: &SubjectPath,
    subject_root: &Path,
    license_file: &Path,
) -> Invocation {
    Invocation::new(config.executable.clone())
        .arg(RETINOTOPY_COMMAND)
        .arg(subject.name())
        .arg("-d")
        .arg(subject_root.display().to_string())
        .mount(Mount::same_path(subject_root))
        .mount(Mount::read_only(license_file, &config.license_mount))
        .env("FS_LICENSE", config.license_mount.display().to_string())
}

/// Run the retinotopy tool and fail on a non-zero exit
pub async fn invoke(runner: &dyn ToolRunner, invocation: &Invocation) -> PrfResult<ExecutionResult> {
    tracing::info!(runner = runner.name(), command = %invocation.display(), "invoking retinotopy tool");

    let result = runner.run(invocation).await?;

    if !result.success {
        return Err(PrfError::execution_failed(
            RETINOTOPY_COMMAND,
            result.exit_code,
            result.stdout,
            result.stderr,
        ));
    }

    tracing::info!(
        seconds = result.duration.as_secs_f64(),
        "retinotopy tool finished"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ConfigFormat, RunConfig};
    use async_trait::async_trait;
    use std::time::Duration;

    struct ExitWith(i32);

    #[async_trait]
    impl ToolRunner for ExitWith {
        async fn run(&self, _invocation: &Invocation) -> Result<ExecutionResult, PrfError> {
            if self.0 == 0 {
                Ok(ExecutionResult::success("done".into(), Duration::ZERO))
            } else {
                Ok(ExecutionResult::failure("segfault".into(), self.0, Duration::ZERO))
            }
        }

        async fn check_available(&self) -> Result<bool, PrfError> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn config() -> RunConfig {
        RunConfig::parse(
            r#"{"freesurfer": "/data/sub01"}"#,
            ConfigFormat::Json,
            Path::new("config.json"),
        )
        .unwrap()
    }

    #[test]
    fn test_retinotopy_invocation() {
        let config = config();
        let subject = config.subject().unwrap();
        let inv = retinotopy_invocation(&config, &subject, Path::new("/data"), Path::new("/tmp/lic.txt"));

        assert_eq!(inv.display(), "neuropythy benson14_retinotopy sub01 -d /data");
        assert_eq!(inv.mounts[0], Mount::same_path("/data"));
        assert_eq!(inv.mounts[1].guest, Path::new("/opt/freesurfer/license.txt"));
        assert!(inv.mounts[1].read_only);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_execution_error() {
        let err = invoke(&ExitWith(139), &Invocation::new("x")).await.unwrap_err();

        match err {
            PrfError::Execution { exit_code, stderr, .. } => {
                assert_eq!(exit_code, 139);
                assert_eq!(stderr, "segfault");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_exit_succeeds() {
        let result = invoke(&ExitWith(0), &Invocation::new("x")).await.unwrap();
        assert_eq!(result.stdout, "done");
    }
}
