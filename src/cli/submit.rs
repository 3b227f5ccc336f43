// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Submit command - run the pipeline as a PBS batch job

use colored::Colorize;
use miette::Result;
use std::path::{Path, PathBuf};

use crate::errors::PrfError;
use crate::executors::{HostRunner, Invocation, ToolRunner};
use crate::pipeline::{resolve_license, RunConfig};
use crate::utils::{print_info, print_success};

/// Settings of the generated job
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub name: String,
    pub walltime: String,
    pub ppn: u32,
    pub executable: PathBuf,
    pub config: PathBuf,
    pub output: PathBuf,
    pub working_dir: PathBuf,
}

/// Render the PBS job script
///
/// The script never contains the license; `-V` exports the submitting
/// environment, FREESURFER_LICENSE included.
pub fn render_job_script(spec: &JobSpec) -> String {
    format!(
        "#!/bin/bash\n\
         #PBS -l nodes=1:ppn={ppn},walltime={walltime}\n\
         #PBS -N {name}\n\
         #PBS -V\n\
         \n\
         set -e\n\
         cd {workdir}\n\
         exec {exe} run --config {config} --output {output}\n",
        ppn = spec.ppn,
        walltime = spec.walltime,
        name = spec.name,
        workdir = shell_quote(&spec.working_dir),
        exe = shell_quote(&spec.executable),
        config = shell_quote(&spec.config),
        output = shell_quote(&spec.output),
    )
}

fn shell_quote(path: &Path) -> String {
    let raw = path.display().to_string();
    if raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "/._-+:@".contains(c))
    {
        raw
    } else {
        format!("'{}'", raw.replace('\'', "'\\''"))
    }
}

fn absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Walltime must look like `[[HH:]MM:]SS`
fn valid_walltime(walltime: &str) -> bool {
    let parts: Vec<&str> = walltime.split(':').collect();
    (1..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// Arguments of the submit command
#[derive(Debug)]
pub struct SubmitArgs {
    pub config: PathBuf,
    pub output: Option<PathBuf>,
    pub walltime: String,
    pub ppn: u32,
    pub name: String,
    pub script: Option<PathBuf>,
    pub scheduler_command: String,
    pub no_submit: bool,
    pub license: Option<String>,
}

/// Run the submit command
pub async fn run(args: SubmitArgs, verbose: bool) -> Result<()> {
    if !valid_walltime(&args.walltime) {
        return Err(miette::miette!(
            "Invalid walltime '{}': expected HH:MM:SS",
            args.walltime
        ));
    }

    let config = RunConfig::from_file(&args.config)?;
    resolve_license(args.license.as_deref())?;

    let working_dir = std::env::current_dir()
        .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;
    let executable = std::env::current_exe()
        .map_err(|e| miette::miette!("Failed to locate prfflow executable: {}", e))?;

    let config_path = absolute(&args.config, &working_dir);
    let spec = JobSpec {
        name: args.name,
        walltime: args.walltime,
        ppn: args.ppn,
        executable,
        output: absolute(args.output.as_ref().unwrap_or(&config.output), &working_dir),
        config: config_path.clone(),
        working_dir,
    };

    let script_path = args.script.unwrap_or_else(|| {
        config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("prfflow.pbs")
    });

    let script = render_job_script(&spec);
    std::fs::write(&script_path, &script).map_err(|e| PrfError::FileWriteError {
        path: script_path.clone(),
        error: e.to_string(),
    })?;
    print_success(&format!("Wrote job script {}", script_path.display()));

    if verbose {
        println!();
        println!("{}", script.dimmed());
    }

    if args.no_submit {
        print_info("Submission skipped (--no-submit)");
        return Ok(());
    }

    let invocation = Invocation::new(args.scheduler_command.clone()).arg(script_path.display().to_string());
    let result = HostRunner::new().run(&invocation).await?;

    if !result.success {
        return Err(PrfError::execution_failed(
            &args.scheduler_command,
            result.exit_code,
            result.stdout,
            result.stderr,
        )
        .into());
    }

    tracing::info!(job = %result.stdout.trim(), "job submitted");
    print_success(&format!("Submitted job {}", result.stdout.trim().bold()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> JobSpec {
        JobSpec {
            name: "prf-sub01".into(),
            walltime: "02:00:00".into(),
            ppn: 4,
            executable: PathBuf::from("/opt/bin/prfflow"),
            config: PathBuf::from("/work/config.json"),
            output: PathBuf::from("/work/prf"),
            working_dir: PathBuf::from("/work"),
        }
    }

    #[test]
    fn test_render_job_script() {
        let script = render_job_script(&spec());

        assert!(script.starts_with("#!/bin/bash\n"));
        assert!(script.contains("#PBS -l nodes=1:ppn=4,walltime=02:00:00\n"));
        assert!(script.contains("#PBS -N prf-sub01\n"));
        assert!(script.contains("exec /opt/bin/prfflow run --config /work/config.json --output /work/prf\n"));
        assert!(!script.contains("FREESURFER_LICENSE="));
    }

    #[test]
    fn test_paths_with_spaces_are_quoted() {
        let mut spec = spec();
        spec.config = PathBuf::from("/my data/config.json");
        assert!(render_job_script(&spec).contains("--config '/my data/config.json'"));
    }

    #[test]
    fn test_shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote(Path::new("/a'b")), "'/a'\\''b'");
    }

    #[test]
    fn test_walltime_validation() {
        assert!(valid_walltime("01:00:00"));
        assert!(valid_walltime("90"));
        assert!(!valid_walltime("1h"));
        assert!(!valid_walltime("01::00"));
        assert!(!valid_walltime("1:2:3:4"));
    }
}
