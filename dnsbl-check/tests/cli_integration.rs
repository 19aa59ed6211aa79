// dnsbl-check/tests/cli_integration.rs

//! CLI tests that never reach the network: every case fails or exits before
//! the first DNS lookup.

use assert_cmd::Command;
use dnsbl_check_lib::ConfigManager;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A command isolated from the user's config files and `DBC_*` variables.
fn dnsbl_check(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dnsbl-check").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("DBC_CONCURRENCY")
        .env_remove("DBC_TIMEOUT")
        .env_remove("DBC_OUTPUT_FORMAT")
        .env_remove("DBC_CUSTOM_BLACKLISTS")
        .env_remove("DBC_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_flags() {
    let home = TempDir::new().unwrap();
    dnsbl_check(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--concurrency"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--blacklist"))
        .stdout(predicate::str::contains("--no-defaults"))
        .stdout(predicate::str::contains("--init-config"))
        .stdout(predicate::str::contains("--list-blacklists"));
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    dnsbl_check(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_target_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    dnsbl_check(home.path()).assert().failure();
}

#[test]
fn test_invalid_address_exits_with_error() {
    let home = TempDir::new().unwrap();
    dnsbl_check(home.path())
        .arg("999.1.1.1")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid IP address: 999.1.1.1"));
}

#[test]
fn test_ipv6_address_is_rejected() {
    let home = TempDir::new().unwrap();
    dnsbl_check(home.path())
        .arg("2001:db8::1")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid IP address"));
}

#[test]
fn test_malformed_subnet_exits_with_error() {
    let home = TempDir::new().unwrap();
    dnsbl_check(home.path())
        .arg("203.0.113.0/abc")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid subnet format"));
}

#[test]
fn test_unsupported_prefix_names_the_prefix() {
    let home = TempDir::new().unwrap();
    dnsbl_check(home.path())
        .arg("203.0.113.0/23")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/23"))
        .stderr(predicate::str::contains("only /24 subnets are supported"));
}

#[test]
fn test_invalid_target_writes_no_report() {
    let home = TempDir::new().unwrap();
    dnsbl_check(home.path()).arg("not-an-ip").assert().code(1);

    let entries = fs::read_dir(home.path()).unwrap().count();
    assert_eq!(entries, 0);
}

#[test]
fn test_list_blacklists_shows_registry() {
    let home = TempDir::new().unwrap();
    dnsbl_check(home.path())
        .arg("--list-blacklists")
        .assert()
        .success()
        .stdout(predicate::str::contains("Blacklists (36):"))
        .stdout(predicate::str::contains("access.redhawk.org"))
        .stdout(predicate::str::contains("rbl.rtbh.com.tr"));
}

#[test]
fn test_list_blacklists_marks_custom_zones() {
    let home = TempDir::new().unwrap();
    dnsbl_check(home.path())
        .args(["--list-blacklists", "--no-defaults", "-b", "dnsbl.example.org"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Blacklists (1):"))
        .stdout(predicate::str::contains("dnsbl.example.org (custom)"))
        .stdout(predicate::str::contains("bl.spamcop.net").not());
}

#[test]
fn test_invalid_concurrency_is_rejected() {
    let home = TempDir::new().unwrap();
    dnsbl_check(home.path())
        .args(["203.0.113.5", "-c", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Concurrency must be between 1 and 1000"));
}

#[test]
fn test_invalid_format_is_rejected() {
    let home = TempDir::new().unwrap();
    dnsbl_check(home.path())
        .args(["203.0.113.5", "-f", "csv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported output format 'csv'"));
}

#[test]
fn test_no_blacklists_is_an_error() {
    let home = TempDir::new().unwrap();
    dnsbl_check(home.path())
        .args(["203.0.113.5", "--no-defaults"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No blacklists to check"));
}

#[test]
fn test_init_config_writes_effective_configuration() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("conf").join("dnsbl-check.toml");

    dnsbl_check(home.path())
        .args(["-c", "8", "-t", "5s", "-f", "text", "-b", "dnsbl.example.org"])
        .arg("--init-config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration written to"));

    let saved = ConfigManager::new(false).load_file(&path).unwrap();
    let defaults = saved.defaults.unwrap();
    assert_eq!(defaults.concurrency, Some(8));
    assert_eq!(defaults.timeout.as_deref(), Some("5s"));
    assert_eq!(defaults.output_format.as_deref(), Some("text"));

    let lists = saved.blacklists.unwrap();
    assert_eq!(lists.zones.map(|z| z.len()), Some(36));
    assert_eq!(lists.custom, Some(vec!["dnsbl.example.org".to_string()]));
}

#[test]
fn test_precedence_env_over_file_and_cli_over_env() {
    let home = TempDir::new().unwrap();
    let config_path = home.path().join("custom.toml");
    fs::write(
        &config_path,
        "[defaults]\nconcurrency = 12\ntimeout = \"7s\"\n",
    )
    .unwrap();
    let out = home.path().join("out.toml");

    dnsbl_check(home.path())
        .env("DBC_CONFIG", &config_path)
        .env("DBC_TIMEOUT", "9s")
        .args(["-c", "3", "--init-config"])
        .arg(&out)
        .assert()
        .success();

    let defaults = ConfigManager::new(false)
        .load_file(&out)
        .unwrap()
        .defaults
        .unwrap();
    assert_eq!(defaults.concurrency, Some(3));
    assert_eq!(defaults.timeout.as_deref(), Some("9s"));
}

#[test]
fn test_discovered_local_config_is_applied() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join(".dnsbl-check.toml"),
        "[blacklists]\nzones = [\"local.example\"]\n",
    )
    .unwrap();

    dnsbl_check(home.path())
        .arg("--list-blacklists")
        .assert()
        .success()
        .stdout(predicate::str::contains("Blacklists (1):"))
        .stdout(predicate::str::contains("local.example"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let home = TempDir::new().unwrap();
    dnsbl_check(home.path())
        .args(["203.0.113.5", "--config", "does-not-exist.toml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn test_invalid_discovered_config_is_fatal() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("dnsbl-check.toml"),
        "[defaults]\nconcurrency = 0\n",
    )
    .unwrap();

    dnsbl_check(home.path())
        .arg("203.0.113.5")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}
