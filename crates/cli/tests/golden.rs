//! Golden tests for verifying JSON output format stability
//!
//! These tests ensure that the JSON output format remains stable
//! across releases.
//!
//! Run with: `cargo test --features golden`

#![cfg(feature = "golden")]

use std::process::{Command, Stdio};

/// Get the path to the ossadm binary
fn ossadm_binary() -> String {
    // Use cargo to build and get the binary path
    let output = Command::new("cargo")
        .args(["build", "--release", "-p", "ossadm"])
        .output()
        .expect("Failed to build ossadm binary");

    if !output.status.success() {
        panic!(
            "Failed to build ossadm binary: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    // Return path to binary
    env!("CARGO_MANIFEST_DIR").to_string() + "/../../target/release/ossadm"
}

mod alias_tests {
    use super::*;
    use tempfile::TempDir;

    fn run_alias(config_dir: &str, args: &[&str]) -> std::process::Output {
        Command::new(ossadm_binary())
            .arg("alias")
            .args(args)
            .arg("--json")
            .env("OSSADM_CONFIG_DIR", config_dir)
            .output()
            .expect("Failed to execute ossadm")
    }

    fn stdout_json(output: &std::process::Output) -> serde_json::Value {
        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&stdout).expect("Output should be valid JSON")
    }

    #[test]
    fn test_alias_set_json() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().to_str().unwrap();

        let output = run_alias(
            config_dir,
            &["set", "test-alias", "http://localhost:9000", "accesskey", "secretkey"],
        );

        assert!(output.status.success(), "Command should succeed");
        insta::assert_json_snapshot!("alias_set_success", stdout_json(&output));
    }

    #[test]
    fn test_alias_set_with_retry_budget_json() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().to_str().unwrap();

        let output = run_alias(
            config_dir,
            &[
                "set",
                "s3",
                "https://s3.amazonaws.com",
                "awskey",
                "awssecret",
                "--region",
                "us-west-2",
                "--retry-times",
                "5",
            ],
        );

        assert!(output.status.success(), "Command should succeed");
        insta::assert_json_snapshot!("alias_set_with_retry", stdout_json(&output));
    }

    #[test]
    fn test_alias_set_invalid_name_json() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().to_str().unwrap();

        let output = run_alias(
            config_dir,
            &["set", "a/b", "http://localhost:9000", "accesskey", "secretkey"],
        );

        assert_eq!(output.status.code(), Some(2), "Exit code should be 2 (USAGE)");
        assert!(output.stdout.is_empty(), "Nothing should reach stdout");
    }

    #[test]
    fn test_alias_remove_json() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().to_str().unwrap();

        run_alias(
            config_dir,
            &["set", "to-remove", "http://localhost:9000", "accesskey", "secretkey"],
        );
        let output = run_alias(config_dir, &["remove", "to-remove"]);

        assert!(output.status.success(), "Command should succeed");
        insta::assert_json_snapshot!("alias_remove_success", stdout_json(&output));
    }

    #[test]
    fn test_alias_remove_not_found_json() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().to_str().unwrap();

        let output = run_alias(config_dir, &["remove", "nonexistent"]);

        // Should fail with NOT_FOUND exit code (5)
        assert_eq!(
            output.status.code(),
            Some(5),
            "Exit code should be 5 (NOT_FOUND)"
        );

        let stderr = String::from_utf8_lossy(&output.stderr);
        let json: serde_json::Value =
            serde_json::from_str(&stderr).expect("Output should be valid JSON");

        insta::assert_json_snapshot!("alias_remove_not_found", json);
    }
}

mod rm_tests {
    use super::*;
    use tempfile::TempDir;

    /// Run `ossadm rm` with an isolated config holding one alias
    fn run_rm(args: &[&str]) -> std::process::Output {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().to_str().unwrap();

        Command::new(ossadm_binary())
            .args([
                "alias",
                "set",
                "local",
                "http://127.0.0.1:1",
                "accesskey",
                "secretkey",
                "--json",
            ])
            .env("OSSADM_CONFIG_DIR", config_dir)
            .output()
            .expect("Failed to set alias");

        Command::new(ossadm_binary())
            .arg("rm")
            .args(args)
            .arg("--json")
            .env("OSSADM_CONFIG_DIR", config_dir)
            .stdin(Stdio::null())
            .output()
            .expect("Failed to execute ossadm")
    }

    fn stderr_json(output: &std::process::Output) -> serde_json::Value {
        let stderr = String::from_utf8_lossy(&output.stderr);
        serde_json::from_str(&stderr).expect("Error output should be valid JSON")
    }

    #[test]
    fn test_rm_bucket_with_key_json() {
        let output = run_rm(&["local/b/key", "--bucket", "--force"]);

        assert_eq!(output.status.code(), Some(2), "Exit code should be 2 (USAGE)");
        assert!(output.stdout.is_empty(), "Nothing should reach stdout");
        insta::assert_json_snapshot!("rm_bucket_with_key", stderr_json(&output));
    }

    #[test]
    fn test_rm_bucket_multipart_requires_recursive_json() {
        let output = run_rm(&["local/b", "--bucket", "--multipart", "--force"]);

        assert_eq!(output.status.code(), Some(2), "Exit code should be 2 (USAGE)");
        insta::assert_json_snapshot!("rm_bucket_multipart_not_recursive", stderr_json(&output));
    }

    #[test]
    fn test_rm_missing_key_json() {
        let output = run_rm(&["local/b", "--force"]);

        assert_eq!(output.status.code(), Some(2), "Exit code should be 2 (USAGE)");
        insta::assert_json_snapshot!("rm_missing_key", stderr_json(&output));
    }

    #[test]
    fn test_rm_unknown_alias_json() {
        let output = run_rm(&["nowhere/b/key", "--force"]);

        assert_eq!(output.status.code(), Some(5), "Exit code should be 5 (NOT_FOUND)");
        insta::assert_json_snapshot!("rm_unknown_alias", stderr_json(&output));
    }

    #[test]
    fn test_rm_declined_prompt_keeps_stdout_json() {
        // Closed stdin declines the prompt before any request is sent
        let output = run_rm(&["local/b/logs/", "--recursive"]);

        assert!(output.status.success(), "A declined prompt is not an error");

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value =
            serde_json::from_str(&stdout).expect("Stdout should hold only the JSON summary");
        assert_eq!(json["status"], "cancelled");
        assert_eq!(json["objects"]["status"], "cancelled");
        assert_eq!(json["objects"]["scanned"], 0);

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Remove all objects under 'b/logs/'? (y/n): "));
    }
}
