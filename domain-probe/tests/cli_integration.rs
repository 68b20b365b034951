use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command isolated from the user's config files and `DP_*` variables.
fn probe_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("domain-probe").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env_remove("RUST_LOG");
    for var in [
        "DP_POOL_SIZE",
        "DP_TIMEOUT",
        "DP_COLUMN",
        "DP_INPUT",
        "DP_OUTPUT",
        "DP_JSON",
        "DP_CONFIG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Write an input CSV with the domains in column 3.
fn write_input(dir: &TempDir, name: &str, domains: &[&str]) {
    let mut content = String::from("id,name,owner,domain\n");
    for (i, domain) in domains.iter().enumerate() {
        content.push_str(&format!("{},site{},team,{}\n", i + 1, i + 1, domain));
    }
    fs::write(dir.path().join(name), content).unwrap();
}

#[test]
fn test_help_lists_options() {
    let dir = TempDir::new().unwrap();
    probe_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--pool-size"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_missing_input_file_fails() {
    let dir = TempDir::new().unwrap();
    probe_cmd(&dir)
        .arg("missing.csv")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("missing.csv"));
}

#[test]
fn test_default_input_missing_fails() {
    let dir = TempDir::new().unwrap();
    probe_cmd(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("domains.csv"));
}

#[test]
fn test_invalid_pool_size_rejected() {
    let dir = TempDir::new().unwrap();
    probe_cmd(&dir)
        .args(["-c", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pool size must be between 1 and 1000"));
}

#[test]
fn test_dry_run_lists_domains() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "domains.csv", &["shop.example.com", " blog.example.org "]);

    probe_cmd(&dir)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("shop.example.com"))
        .stdout(predicate::str::contains("blog.example.org"));

    assert!(!dir.path().join("output.csv").exists());
}

#[test]
fn test_unreachable_domains_are_http_errors() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "sites.csv", &["127.0.0.1:1", "127.0.0.1:2"]);

    probe_cmd(&dir)
        .args(["sites.csv", "-o", "results.csv", "-c", "2", "--timeout", "2s"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 domains with 0 valid."));

    let output = fs::read_to_string(dir.path().join("results.csv")).unwrap();
    let mut lines = output.lines();
    assert_eq!(lines.next(), Some("domain,status,message"));

    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|r| r.starts_with("127.0.0.1:1,http error,")));
    assert!(rows.iter().any(|r| r.starts_with("127.0.0.1:2,http error,")));
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "domains.csv", &["127.0.0.1:1"]);

    probe_cmd(&dir)
        .args(["--json", "--timeout", "2s"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"domain\": \"127.0.0.1:1\""))
        .stdout(predicate::str::contains("\"status\": \"http error\""))
        .stderr(predicate::str::contains("Processed 1 domains with 0 valid."));

    assert!(!dir.path().join("output.csv").exists());
}

#[test]
fn test_config_file_sets_column_and_output() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("first-column.csv"),
        "domain,notes\n127.0.0.1:1,local\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("domain-probe.toml"),
        "[defaults]\ncolumn = 0\ntimeout = \"2s\"\n\n[output]\npath = \"configured.csv\"\n",
    )
    .unwrap();

    probe_cmd(&dir)
        .arg("first-column.csv")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 1 domains with 0 valid."));

    let output = fs::read_to_string(dir.path().join("configured.csv")).unwrap();
    assert!(output.contains("127.0.0.1:1,http error,"));
}

#[test]
fn test_verbose_prints_breakdown() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, "domains.csv", &["127.0.0.1:1"]);

    let assert = probe_cmd(&dir)
        .args(["-v", "--timeout", "2s"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http error"));

    // The output file is reported once, by the library
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert_eq!(stderr.matches("wrote results").count(), 1);
    assert!(!stderr.contains("results written"));
}
