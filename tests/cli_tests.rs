#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::{NamedTempFile, tempdir};

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_reports_month_exclusions() {
    run_cli(
        "scope add business 2024-12-25\nscope add commerce 2024-01-01\nmonth 2024 1\nmonth 2024 12\nquit\n",
    )
    .success()
    .stdout(str_contains("Exclusions in 2024-01: 2024-01-01"))
    .stdout(str_contains("Exclusions in 2024-12: 2024-12-25"));
}

#[test]
fn cli_checks_and_filters_dates() {
    run_cli(
        "scope add queue 2024-06-10\ncheck 2024-06-10\ncheck 2024-06-11\nfilter 2024-06-09,2024-06-10,2024-06-11\nnext 2024-06-09\nquit\n",
    )
    .success()
    .stdout(str_contains("2024-06-10 is excluded."))
    .stdout(str_contains("2024-06-11 is available."))
    .stdout(str_contains("Available: 2024-06-09, 2024-06-11"))
    .stdout(str_contains("Next available: 2024-06-11"));
}

#[test]
fn cli_rejects_unknown_scope() {
    run_cli("scope add region 2024-06-10\nquit\n")
        .success()
        .stdout(str_contains("unknown scope 'region'"));
}

#[test]
fn cli_formats_numbers() {
    run_cli("currency 1234.5\ncurrency abc\npercent 12.345\nquit\n")
        .success()
        .stdout(str_contains("1,234.50"))
        .stdout(str_contains("0.00"))
        .stdout(str_contains("12.35%"));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().display();
    let script = format!(
        "scope add business 2024-12-25\nsave json {}\nscope add queue 2030-01-01\nload json {}\nexclusions\nquit\n",
        path, path
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Scopes loaded from"));
    let after_reload = output
        .split("Scopes loaded from")
        .last()
        .unwrap_or_default();
    assert!(after_reload.contains("Exclusions: 2024-12-25"));
    assert!(
        !after_reload.contains("2030-01-01"),
        "unsaved date should not appear after reload:\n{}",
        after_reload
    );
}

#[test]
fn cli_export_writes_csv_into_export_dir() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("records.json");
    std::fs::write(&input, r#"[{"name": "Ana", "note": "a,b"}]"#).unwrap();

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env("QUEUE_DESK_EXPORT_DIR", dir.path())
        .write_stdin(format!("export {} visits\nquit\n", input.display()))
        .assert()
        .success()
        .stdout(str_contains("Exported to"));

    let written = std::fs::read_to_string(dir.path().join("visits.csv")).unwrap();
    assert_eq!(written, "\u{FEFF}name,note\nAna,\"a,b\"\n");
}
