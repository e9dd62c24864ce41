//! End-to-end CLI integration tests for the `relabel` binary.
//!
//! Each test creates its own temporary git repository, writes field
//! definitions into it, and runs the binary as a subprocess via `assert_cmd`.

use assert_cmd::Command;
use pretty_assertions::assert_eq;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const NS: &str = "http://soap.sforce.com/2006/04/metadata";
const MARKED: &str = "objects/Account/fields/Number__c.field-meta.xml";

/// Build a `Command` targeting the cargo-built `relabel` binary.
fn relabel() -> Command {
    let mut cmd = Command::cargo_bin("relabel").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap().trim_end().to_string()
}

/// Initialize a fresh repository with a local identity.
fn init_repo() -> TempDir {
    let tmp = TempDir::new().unwrap();
    git(tmp.path(), &["init", "-q"]);
    git(tmp.path(), &["config", "user.name", "Relabel Test"]);
    git(tmp.path(), &["config", "user.email", "relabel@example.com"]);
    git(tmp.path(), &["config", "commit.gpgsign", "false"]);
    tmp
}

fn field_doc(marker: bool, field_type: &str, label: &str) -> String {
    let marker = if marker { r#" x-gs-devobject="true""# } else { "" };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomField{marker} xmlns="{NS}">
    <fullName>Number__c</fullName>
    <externalId>false</externalId>
    <label>{label}</label>
    <type>{field_type}</type>
</CustomField>
"#
    )
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

fn label_of(doc: &str) -> String {
    let start = doc.find("<label>").unwrap() + "<label>".len();
    let end = doc.find("</label>").unwrap();
    doc[start..end].to_string()
}

fn commit_count(dir: &Path) -> String {
    git(dir, &["rev-list", "--all", "--count"])
}

// ---------------------------------------------------------------------------
// Relabel and commit
// ---------------------------------------------------------------------------

#[test]
fn marked_auto_number_is_relabeled_and_committed() {
    let tmp = init_repo();
    write(tmp.path(), MARKED, &field_doc(true, "AutoNumber", "Old"));

    relabel()
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("relabeled 1 file"))
        .stdout(predicate::str::contains("Automated change to prod GS Pipeline"));

    let doc = read(tmp.path(), MARKED);
    let label = label_of(&doc);
    assert_eq!(label.len(), 8);
    assert!(label.chars().all(|c| c.is_ascii_alphabetic()), "{label}");
    assert!(doc.contains(r#"x-gs-devobject="true""#));
    assert!(doc.contains("<type>AutoNumber</type>"));

    assert_eq!(commit_count(tmp.path()), "1");
    assert_eq!(
        git(tmp.path(), &["log", "-1", "--format=%s"]),
        "Automated change to prod GS Pipeline"
    );
    assert_eq!(git(tmp.path(), &["ls-tree", "-r", "--name-only", "HEAD"]), MARKED);
}

#[test]
fn marker_element_form_is_accepted() {
    let tmp = init_repo();
    let doc = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomField xmlns="{NS}">
    <fullName>Foo__c</fullName>
    <x-gs-devobject>true</x-gs-devobject>
    <type>AutoNumber</type>
    <label>Old</label>
</CustomField>
"#
    );
    let path = "objects/Account/fields/Foo__c.field-meta.xml";
    write(tmp.path(), path, &doc);

    relabel().arg(tmp.path()).assert().success();

    let rewritten = read(tmp.path(), path);
    assert_eq!(label_of(&rewritten).len(), 8);
    assert!(rewritten.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    assert!(rewritten.contains("\n\t<label>"));
    assert_eq!(git(tmp.path(), &["ls-tree", "-r", "--name-only", "HEAD"]), path);
}

#[test]
fn message_flag_sets_commit_subject() {
    let tmp = init_repo();
    write(tmp.path(), MARKED, &field_doc(true, "AutoNumber", "Old"));

    relabel()
        .arg(tmp.path())
        .args(["-m", "Rotate labels"])
        .assert()
        .success();

    assert_eq!(git(tmp.path(), &["log", "-1", "--format=%s"]), "Rotate labels");
}

#[test]
fn root_defaults_to_current_directory() {
    let tmp = init_repo();
    write(tmp.path(), MARKED, &field_doc(true, "AutoNumber", "Old"));

    relabel().current_dir(tmp.path()).assert().success();

    assert_ne!(label_of(&read(tmp.path(), MARKED)), "Old");
    assert_eq!(commit_count(tmp.path()), "1");
}

// ---------------------------------------------------------------------------
// Files left alone
// ---------------------------------------------------------------------------

#[test]
fn ineligible_files_are_untouched_and_nothing_is_committed() {
    let tmp = init_repo();
    let unmarked = field_doc(false, "AutoNumber", "Plain");
    let text = field_doc(true, "Text", "Name");
    write(tmp.path(), "objects/A/fields/Unmarked__c.field-meta.xml", &unmarked);
    write(tmp.path(), "objects/A/fields/Text__c.field-meta.xml", &text);

    relabel()
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("relabeled 0 files"));

    assert_eq!(read(tmp.path(), "objects/A/fields/Unmarked__c.field-meta.xml"), unmarked);
    assert_eq!(read(tmp.path(), "objects/A/fields/Text__c.field-meta.xml"), text);
    assert_eq!(commit_count(tmp.path()), "0");
}

#[test]
fn unparseable_file_is_ignored() {
    let tmp = init_repo();
    let broken = format!(r#"<CustomField xmlns="{NS}"><label>"#);
    write(tmp.path(), "objects/A/fields/Broken__c.field-meta.xml", &broken);
    write(tmp.path(), MARKED, &field_doc(true, "AutoNumber", "Old"));

    relabel().arg(tmp.path()).assert().success();

    assert_eq!(read(tmp.path(), "objects/A/fields/Broken__c.field-meta.xml"), broken);
    assert_eq!(git(tmp.path(), &["ls-tree", "-r", "--name-only", "HEAD"]), MARKED);
}

#[test]
fn files_outside_the_filter_are_untouched() {
    let tmp = init_repo();
    let doc = field_doc(true, "AutoNumber", "Old");
    write(tmp.path(), "objects/A/layouts/Number__c.xml", &doc);

    relabel().arg(tmp.path()).assert().success();

    assert_eq!(read(tmp.path(), "objects/A/layouts/Number__c.xml"), doc);
    assert_eq!(commit_count(tmp.path()), "0");
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

#[test]
fn dry_run_changes_nothing() {
    let tmp = init_repo();
    let doc = field_doc(true, "AutoNumber", "Old");
    write(tmp.path(), MARKED, &doc);

    relabel()
        .arg(tmp.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("would relabel {MARKED}: Old -> ")));

    assert_eq!(read(tmp.path(), MARKED), doc);
    assert_eq!(commit_count(tmp.path()), "0");
}

#[test]
fn no_commit_leaves_changes_staged() {
    let tmp = init_repo();
    write(tmp.path(), MARKED, &field_doc(true, "AutoNumber", "Old"));

    relabel().arg(tmp.path()).arg("--no-commit").assert().success();

    assert_eq!(commit_count(tmp.path()), "0");
    assert_eq!(git(tmp.path(), &["diff", "--cached", "--name-only"]), MARKED);
}

#[test]
fn json_output_reports_relabels() {
    let tmp = init_repo();
    write(tmp.path(), MARKED, &field_doc(true, "AutoNumber", "Old"));

    let output = relabel().arg(tmp.path()).arg("--json").output().unwrap();
    assert!(
        output.status.success(),
        "relabel failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(json["dry_run"], false);
    assert_eq!(json["relabeled"][0]["path"], MARKED);
    assert_eq!(json["relabeled"][0]["old"], "Old");
    assert_eq!(
        json["relabeled"][0]["new"].as_str().unwrap(),
        label_of(&read(tmp.path(), MARKED))
    );
    assert_eq!(
        json["commit"].as_str().unwrap(),
        git(tmp.path(), &["rev-parse", "HEAD"])
    );
}

#[test]
fn seeded_runs_pick_the_same_label() {
    let mut labels = Vec::new();
    for _ in 0..2 {
        let tmp = init_repo();
        write(tmp.path(), "relabel.yaml", "labels:\n  seed: 42\n");
        write(tmp.path(), MARKED, &field_doc(true, "AutoNumber", "Old"));
        relabel().arg(tmp.path()).assert().success();
        labels.push(label_of(&read(tmp.path(), MARKED)));
    }
    assert_eq!(labels[0], labels[1]);
}

#[test]
fn print_config_shows_effective_settings() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "relabel.yaml", "labels:\n  length: 12\n");

    relabel()
        .arg(tmp.path())
        .arg("--print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("length: 12"))
        .stdout(predicate::str::contains("path_filter: fields"));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn outside_a_repository_fails() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), MARKED, &field_doc(true, "AutoNumber", "Old"));

    relabel()
        .arg(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn json_errors_are_reported_as_json() {
    let output = relabel()
        .args(["/nonexistent/directory/xyz", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert!(json["error"].as_str().unwrap().contains("not a directory"));
}
