use assert_cmd::prelude::*;
use once_cell::sync::Lazy;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

static CHANGES: Lazy<String> = Lazy::new(|| {
    r#"{
  "maxWidth": 1280,
  "maxHeight": 800,
  "safeWidth": 1024,
  "safeHeight": 768,
  "position": { "x": 20 }
}
"#
    .to_string()
});

fn write_changes(payload: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp changes file");
    tmp.write_all(payload.as_bytes()).expect("write changes");
    tmp
}

#[test]
fn cli_reports_contain_fit() {
    let mut cmd = Command::cargo_bin("safe-scale").expect("binary exists");
    cmd.arg("--viewport").arg("1280x800");
    cmd.assert()
        .success()
        .stdout(contains("Resolutions max=1320x780 safe=1024x660 fit=contain"))
        .stdout(contains(
            "viewport 1280x800 scale=0.9697 canvas=1280.00x756.36 view=(0.00, 0.00, 1320.00, 780.00) label=(10.00, 10.00)",
        ));
}

#[test]
fn cli_safe_fit_moves_label_with_view_area() {
    let mut cmd = Command::cargo_bin("safe-scale").expect("binary exists");
    cmd.args(["--fit", "safe", "--viewport", "1280x800"]);
    cmd.assert()
        .success()
        .stdout(contains("fit=safe"))
        .stdout(contains(
            "viewport 1280x800 scale=1.2121 canvas=1600.00x945.45 view=(132.00, 60.00, 1188.00, 720.00) label=(142.00, 70.00)",
        ));
}

#[test]
fn cli_replays_each_viewport() {
    let mut cmd = Command::cargo_bin("safe-scale").expect("binary exists");
    cmd.args(["--viewport", "1280x800", "--viewport", "660x390"]);
    cmd.assert()
        .success()
        .stdout(contains("viewport 1280x800 scale=0.9697"))
        .stdout(contains("viewport 660x390 scale=0.5000 canvas=660.00x390.00"));
}

#[test]
fn cli_applies_changes_file() {
    let changes = write_changes(&CHANGES);
    let mut cmd = Command::cargo_bin("safe-scale").expect("binary exists");
    cmd.arg("--viewport")
        .arg("1280x800")
        .arg("--changes")
        .arg(changes.path());
    cmd.assert()
        .success()
        .stdout(contains("Applied changes from"))
        .stdout(contains(
            "viewport 1280x800 scale=1.0000 canvas=1280.00x800.00 view=(0.00, 0.00, 1280.00, 800.00) label=(20.00, 10.00)",
        ));
}

#[test]
fn cli_rejects_malformed_changes() {
    let changes = write_changes("[1, 2, 3]");
    let mut cmd = Command::cargo_bin("safe-scale").expect("binary exists");
    cmd.arg("--changes").arg(changes.path());
    cmd.assert()
        .failure()
        .stderr(contains("failed to parse changes file"));
}

#[test]
fn cli_rejects_unknown_arguments() {
    let mut cmd = Command::cargo_bin("safe-scale").expect("binary exists");
    cmd.arg("--stretch");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --stretch"));
}
