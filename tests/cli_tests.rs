//! Integration tests for the tfexport CLI
//!
//! These tests run the compiled binary against saved describe responses in
//! `tests/fixtures`, so no AWS credentials are needed.

use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Empty config so the user's own configuration never leaks into a test
fn isolated_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "parallelism: 2\n").unwrap();
    path
}

/// Run tfexport with an isolated config and return its output
fn run_tfexport(args: &[&str]) -> std::process::Output {
    let dir = TempDir::new().unwrap();
    let config = isolated_config(&dir);

    Command::new(env!("CARGO_BIN_EXE_tfexport"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .env_remove("AWS_PROFILE")
        .env_remove("AWS_REGION")
        .output()
        .expect("Failed to execute tfexport")
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_tfexport_version() {
    let output = run_tfexport(&["--version"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("tfexport"));
}

#[test]
fn test_tfexport_help() {
    let output = run_tfexport(&["--help"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("ec2"));
    assert!(stdout.contains("ecc"));
}

#[test]
fn test_tfexport_list() {
    let output = run_tfexport(&["list"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("aws_instance"));
    assert!(stdout.contains("aws_elasticache_cluster"));
}

#[test]
fn test_ec2_template_from_file() {
    let ec2 = fixture("ec2.json");
    let output = run_tfexport(&["ec2", "--from-file", ec2.to_str().unwrap()]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#"resource "aws_instance" "web-server""#));
    assert!(stdout.contains(r#"resource "aws_instance" "i-0a1b2c3d4e5f60002""#));
    assert!(stdout.contains(r#"vpc_security_group_ids      = ["sg-0aa", "sg-0bb"]"#));
    assert!(stdout.contains(r#"security_groups             = ["default"]"#));
    assert!(stdout.contains(r#""Environment" = "production""#));
}

#[test]
fn test_ec2_tfstate_from_file() {
    let ec2 = fixture("ec2.json");
    let output = run_tfexport(&["ec2", "--tfstate", "--from-file", ec2.to_str().unwrap()]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let state = stdout_json(&output);
    assert_eq!(state["version"], json!(1));
    assert_eq!(state["serial"], json!(1));

    let vpc = &state["modules"][0]["resources"]["aws_instance.web-server"];
    assert_eq!(vpc["type"], json!("aws_instance"));
    assert_eq!(vpc["primary"]["id"], json!("i-0a1b2c3d4e5f60001"));
    assert_eq!(vpc["primary"]["meta"], json!({"schema_version": "1"}));

    let attrs = &vpc["primary"]["attributes"];
    assert_eq!(attrs["vpc_security_group_ids.#"], json!("2"));
    assert_eq!(attrs["security_groups.#"], json!("0"));
    assert_eq!(attrs["subnet_id"], json!("subnet-0abc"));
    assert_eq!(attrs["ebs_block_device.#"], json!("2"));
    assert_eq!(attrs["root_block_device.#"], json!("1"));
    assert_eq!(attrs["ebs_optimized"], json!("true"));

    let classic = &state["modules"][0]["resources"]["aws_instance.i-0a1b2c3d4e5f60002"]["primary"]["attributes"];
    assert_eq!(classic["security_groups.#"], json!("1"));
    assert_eq!(classic["vpc_security_group_ids.#"], json!("0"));
    assert_eq!(classic["public_ip"], json!(""));
    assert_eq!(classic["root_block_device.#"], json!("0"));
    assert!(classic.get("subnet_id").is_none());
}

#[test]
fn test_ecc_tfstate_from_file() {
    let ecc = fixture("ecc.json");
    let output = run_tfexport(&["ecc", "--tfstate", "--from-file", ecc.to_str().unwrap()]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let state = stdout_json(&output);
    let cluster = &state["modules"][0]["resources"]["aws_elasticache_cluster.sessions"];

    assert!(cluster["primary"].get("meta").is_none());

    let attrs = &cluster["primary"]["attributes"];
    assert_eq!(attrs["cache_nodes.#"], json!("3"));
    assert_eq!(attrs["security_group_ids.#"], json!("2"));
    assert_eq!(attrs["security_group_names.#"], json!("0"));
    assert_eq!(attrs["num_cache_nodes"], json!("3"));
    assert_eq!(attrs["port"], json!("11211"));
    assert_eq!(attrs["tags.#"], json!("0"));
}

#[test]
fn test_merge_replaces_and_keeps_base_entries() {
    let ec2 = fixture("ec2.json");
    let base = fixture("base.tfstate");
    let output = run_tfexport(&[
        "ec2",
        "--merge",
        base.to_str().unwrap(),
        "--from-file",
        ec2.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let state = stdout_json(&output);
    let resources = &state["modules"][0]["resources"];

    assert_eq!(state["serial"], json!(42));
    assert_eq!(resources.as_object().unwrap().len(), 3);
    assert_eq!(resources["aws_s3_bucket.logs"]["primary"]["attributes"]["acl"], json!("private"));
    assert_eq!(
        resources["aws_instance.web-server"]["primary"]["id"],
        json!("i-0a1b2c3d4e5f60001")
    );
}

#[test]
fn test_merge_overwrite_writes_file() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("terraform.tfstate");
    std::fs::copy(fixture("base.tfstate"), &state_path).unwrap();

    let ecc = fixture("ecc.json");
    let output = run_tfexport(&[
        "ecc",
        "--merge",
        state_path.to_str().unwrap(),
        "--overwrite",
        "--from-file",
        ecc.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    let state: Value = serde_json::from_str(&std::fs::read_to_string(&state_path).unwrap()).unwrap();
    assert!(state["modules"][0]["resources"]["aws_elasticache_cluster.sessions"].is_object());
    assert!(state["modules"][0]["resources"]["aws_s3_bucket.logs"].is_object());
}

#[test]
fn test_overwrite_without_merge_is_usage_error() {
    let output = run_tfexport(&["ec2", "--overwrite"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--merge"));
}

#[test]
fn test_missing_snapshot_fails() {
    let output = run_tfexport(&["ec2", "--from-file", "/definitely/not/here.json"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Provider API error"));
}

#[test]
fn test_malformed_snapshot_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ec2.json");
    std::fs::write(&path, "{\"Reservations\": 7}").unwrap();

    let output = run_tfexport(&["ec2", "--tfstate", "--from-file", path.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unexpected response"));
}

#[test]
fn test_all_from_snapshot_dir() {
    let dir = TempDir::new().unwrap();
    std::fs::copy(fixture("ec2.json"), dir.path().join("ec2.json")).unwrap();
    std::fs::copy(fixture("ecc.json"), dir.path().join("ecc.json")).unwrap();

    let output = run_tfexport(&[
        "all",
        "--tfstate",
        "--snapshot-dir",
        dir.path().to_str().unwrap(),
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let state = stdout_json(&output);
    assert_eq!(state["modules"][0]["resources"].as_object().unwrap().len(), 3);
}

#[test]
fn test_all_partial_failure_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    std::fs::copy(fixture("ecc.json"), dir.path().join("ecc.json")).unwrap();

    let output = run_tfexport(&[
        "all",
        "--tfstate",
        "--snapshot-dir",
        dir.path().to_str().unwrap(),
    ]);

    assert!(!output.status.success());

    let state = stdout_json(&output);
    assert!(state["modules"][0]["resources"]["aws_elasticache_cluster.sessions"].is_object());
    assert!(String::from_utf8_lossy(&output.stderr).contains("aws_instance failed"));
}

#[test]
fn test_templates_dir_override() {
    let dir = TempDir::new().unwrap();
    let templates = dir.path().join("templates");
    std::fs::create_dir(&templates).unwrap();
    std::fs::write(
        templates.join("elasticache_cluster.tf.hbs"),
        "{{#each cache_clusters}}# {{CacheClusterId}} on port {{cluster_port this}}\n{{/each}}",
    )
    .unwrap();

    let config = dir.path().join("config.yaml");
    std::fs::write(&config, format!("templates_dir: {}\n", templates.display())).unwrap();

    let ecc = fixture("ecc.json");
    let output = Command::new(env!("CARGO_BIN_EXE_tfexport"))
        .args(["--config", config.to_str().unwrap(), "ecc", "--from-file", ecc.to_str().unwrap()])
        .output()
        .expect("Failed to execute tfexport");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# sessions on port 11211"));
    assert!(!stdout.contains("resource \"aws_elasticache_cluster\""));
}

#[test]
fn test_missing_explicit_config_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_tfexport"))
        .args(["--config", "/no/such/config.yaml", "list"])
        .output()
        .expect("Failed to execute tfexport");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Configuration file not found"));
}
