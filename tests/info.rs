mod common;

use common::{pdfops, write_pdf};
use predicates::prelude::*;

#[test]
fn info_prints_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_pdf(dir.path(), "in.pdf", 3);

    pdfops()
        .arg("info")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Pages: 3"))
        .stdout(predicate::str::contains("Title: Fixture"))
        .stdout(predicate::str::contains("Encrypted: no"));
}

#[test]
fn info_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_pdf(dir.path(), "in.pdf", 2);

    let output = pdfops()
        .arg("info")
        .arg(&input)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["pages"], 2);
    assert_eq!(report["encrypted"], false);
    assert_eq!(report["title"], "Fixture");
    assert_eq!(report["author"], "pdfops tests");
    assert!(report["file"].as_str().unwrap().ends_with("in.pdf"));
}

#[test]
fn verbose_logs_go_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_pdf(dir.path(), "in.pdf", 2);

    pdfops()
        .env_remove("RUST_LOG")
        .args(["-vv", "info", "--json"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("opened document"))
        .stdout(predicate::str::starts_with("{"));
}
