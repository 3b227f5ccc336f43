// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn prfflow() -> Command {
    let mut cmd = Command::cargo_bin("prfflow").expect("binary present");
    cmd.env_remove("FREESURFER_LICENSE").env("NO_COLOR", "1");
    cmd
}

#[test]
fn run_without_license_fails() {
    let temp = tempdir().unwrap();
    std::fs::write(temp.path().join("config.json"), r#"{"freesurfer": "/data/sub01"}"#).unwrap();

    prfflow()
        .current_dir(temp.path())
        .args(["run", "--config", "config.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("FREESURFER_LICENSE"));
}

#[test]
fn run_with_empty_license_fails() {
    let temp = tempdir().unwrap();
    std::fs::write(temp.path().join("config.json"), r#"{"freesurfer": "/data/sub01"}"#).unwrap();

    prfflow()
        .current_dir(temp.path())
        .env("FREESURFER_LICENSE", "")
        .args(["run", "--config", "config.json"])
        .assert()
        .failure();
}

#[test]
fn run_with_missing_field_fails() {
    let temp = tempdir().unwrap();
    std::fs::write(temp.path().join("config.json"), r#"{"t1": "anat.nii.gz"}"#).unwrap();

    prfflow()
        .current_dir(temp.path())
        .env("FREESURFER_LICENSE", "XYZ")
        .args(["run", "--config", "config.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("freesurfer"));
}

#[test]
fn dry_run_prints_plan_without_secret() {
    let temp = tempdir().unwrap();
    std::fs::write(
        temp.path().join("config.json"),
        r#"{"freesurfer": "/data/sub01", "runtime": "docker"}"#,
    )
    .unwrap();

    prfflow()
        .current_dir(temp.path())
        .env("FREESURFER_LICENSE", "SECRET-LICENSE-TEXT")
        .args(["run", "--config", "config.json", "--dry-run", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("benson14_retinotopy sub01 -d /data"))
        .stdout(predicate::str::contains("SECRET-LICENSE-TEXT").not())
        .stderr(predicate::str::contains("SECRET-LICENSE-TEXT").not());
}

#[test]
fn collect_renames_existing_outputs() {
    let temp = tempdir().unwrap();
    let subject = temp.path().join("sub01");
    std::fs::create_dir_all(subject.join("mri")).unwrap();
    std::fs::create_dir_all(subject.join("surf")).unwrap();
    for q in ["eccen", "sigma", "angle", "varea"] {
        std::fs::write(subject.join("mri").join(format!("benson14_{}.nii.gz", q)), q).unwrap();
        std::fs::write(subject.join("surf").join(format!("lh.benson14_{}.mgz", q)), q).unwrap();
    }

    prfflow()
        .current_dir(temp.path())
        .args(["collect", "--subject", "sub01"])
        .assert()
        .success();

    for name in ["eccentricity", "rfWidth", "polarAngle", "varea"] {
        assert!(temp.path().join("prf").join(format!("{}.nii.gz", name)).is_file());
    }
}

#[test]
fn collect_with_missing_outputs_fails() {
    let temp = tempdir().unwrap();
    std::fs::create_dir_all(temp.path().join("sub01/mri")).unwrap();

    prfflow()
        .current_dir(temp.path())
        .args(["collect", "--subject", "sub01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("benson14_eccen"));

    assert!(!temp.path().join("prf").exists());
}

#[test]
fn submit_writes_job_script() {
    let temp = tempdir().unwrap();
    std::fs::write(temp.path().join("config.json"), r#"{"freesurfer": "/data/sub01"}"#).unwrap();

    prfflow()
        .current_dir(temp.path())
        .env("FREESURFER_LICENSE", "XYZ")
        .args(["submit", "--config", "config.json", "--walltime", "02:00:00", "--no-submit"])
        .assert()
        .success();

    let script = std::fs::read_to_string(temp.path().join("prfflow.pbs")).unwrap();
    assert!(script.contains("walltime=02:00:00"));
    assert!(script.contains("run --config"));
}

/// Scheduler stand-in that records each submission in `marker`
#[cfg(unix)]
fn fake_scheduler(dir: &std::path::Path, marker: &std::path::Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-qsub");
    std::fs::write(
        &path,
        format!("#!/bin/sh\necho \"$1\" >> '{}'\necho 4242.pbs\n", marker.display()),
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn submit_without_license_never_reaches_scheduler() {
    let temp = tempdir().unwrap();
    std::fs::write(temp.path().join("config.json"), r#"{"freesurfer": "/data/sub01"}"#).unwrap();
    let marker = temp.path().join("submitted");
    let scheduler = fake_scheduler(temp.path(), &marker);

    prfflow()
        .current_dir(temp.path())
        .args(["submit", "--config", "config.json", "--scheduler-command"])
        .arg(&scheduler)
        .assert()
        .failure()
        .stderr(predicate::str::contains("FREESURFER_LICENSE"));

    assert!(!marker.exists());
    assert!(!temp.path().join("prfflow.pbs").exists());
}

#[cfg(unix)]
#[test]
fn submit_hands_script_to_scheduler() {
    let temp = tempdir().unwrap();
    std::fs::write(temp.path().join("config.json"), r#"{"freesurfer": "/data/sub01"}"#).unwrap();
    let marker = temp.path().join("submitted");
    let scheduler = fake_scheduler(temp.path(), &marker);

    prfflow()
        .current_dir(temp.path())
        .env("FREESURFER_LICENSE", "SECRET-LICENSE-TEXT")
        .args(["submit", "--config", "config.json", "--scheduler-command"])
        .arg(&scheduler)
        .assert()
        .success()
        .stdout(predicate::str::contains("4242.pbs"));

    let submitted = std::fs::read_to_string(&marker).unwrap();
    assert!(submitted.trim().ends_with("prfflow.pbs"));

    let script = std::fs::read_to_string(temp.path().join("prfflow.pbs")).unwrap();
    assert!(!script.contains("SECRET-LICENSE-TEXT"));
}

#[test]
fn validate_reports_missing_license() {
    let temp = tempdir().unwrap();
    std::fs::write(
        temp.path().join("config.json"),
        r#"{"freesurfer": "/data/sub01", "runtime": "host"}"#,
    )
    .unwrap();

    prfflow()
        .current_dir(temp.path())
        .args(["validate", "--config", "config.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("FREESURFER_LICENSE"));
}

#[test]
fn validate_passes_for_host_runtime() {
    let temp = tempdir().unwrap();
    std::fs::create_dir_all(temp.path().join("sub01")).unwrap();
    std::fs::write(
        temp.path().join("config.json"),
        r#"{"freesurfer": "sub01", "runtime": "host"}"#,
    )
    .unwrap();

    prfflow()
        .current_dir(temp.path())
        .env("FREESURFER_LICENSE", "XYZ")
        .args(["validate", "--config", "config.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ready to run!"));
}
