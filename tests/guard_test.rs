//! Integration tests for the virtualenv guard
//!
//! Every command that touches the install root must refuse to run without
//! an activated virtual environment.

#![cfg(unix)]

mod common;

use common::{stderr, TestEnv};

#[tokio::test]
async fn test_missing_virtual_env_fails() {
    let env = TestEnv::new();

    let output = env.bare_command().output().await.unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("VIRTUAL_ENV is not set. Activate a virtual environment first."));
}

#[tokio::test]
async fn test_empty_virtual_env_fails() {
    let env = TestEnv::new();

    let output = env
        .bare_command()
        .env("VIRTUAL_ENV", "")
        .arg("install")
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("VIRTUAL_ENV is not set"));
}

#[tokio::test]
async fn test_nonexistent_virtual_env_fails() {
    let env = TestEnv::new();
    let missing = env.root().join("does-not-exist");

    let output = env
        .bare_command()
        .env("VIRTUAL_ENV", &missing)
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("does not exist"));
}

#[tokio::test]
async fn test_guard_runs_before_any_step() {
    let env = TestEnv::new();

    for command in ["haystack", "fetch", "build", "verify", "clean"] {
        let output = env.bare_command().arg(command).output().await.unwrap();
        assert_eq!(output.status.code(), Some(1), "{command} should fail");
        assert!(
            stderr(&output).contains("VIRTUAL_ENV is not set"),
            "{command} should report the guard"
        );
    }
}

#[tokio::test]
async fn test_guard_wins_over_invalid_overrides() {
    let env = TestEnv::new();

    for (var, value) in [("XAPIAN_JOBS", "abc"), ("XAPIAN_TRANSFER", "ftp")] {
        let output = env
            .bare_command()
            .env(var, value)
            .arg("install")
            .output()
            .await
            .unwrap();

        assert_eq!(output.status.code(), Some(1), "{var}={value}");
        assert!(
            stderr(&output).contains("VIRTUAL_ENV is not set"),
            "{var}={value} should report the guard"
        );
    }
}

#[tokio::test]
async fn test_invalid_override_fails_inside_virtual_env() {
    let env = TestEnv::new();

    let output = env
        .command()
        .env("XAPIAN_JOBS", "abc")
        .arg("fetch")
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid value 'abc' for --jobs"));
}

#[tokio::test]
async fn test_json_errors_go_to_stdout() {
    let env = TestEnv::new();

    let output = env.bare_command().arg("--json").output().await.unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "error");
    assert!(json["error"].as_str().unwrap().contains("VIRTUAL_ENV"));
}
