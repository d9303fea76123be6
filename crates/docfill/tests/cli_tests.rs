//! Integration tests for the fill command and global options

mod common;

use assert_cmd::assert::OutputAssertExt;
use common::docfill;
use docfill_testkit::{DocxBuilder, TableSpec, CellSpec, document_text, temp_dir_in_workspace};
use predicates::prelude::*;

fn write_template(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("demanda.docx");
    DocxBuilder::new()
        .paragraph(&["Señor ", "{{NOM", "BRE}}", ", presente."])
        .table(TableSpec::new().row(vec![CellSpec::new(&["{{JUZGADO}}"])]))
        .header(&[&["Exp. ", "{{DEMANDA_ID}}"]])
        .footer(&[&["Página"]])
        .write_to(&path);
    path
}

#[test]
fn test_help_lists_commands() {
    let temp = temp_dir_in_workspace();
    docfill(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fill"))
        .stdout(predicate::str::contains("template"))
        .stdout(predicate::str::contains("doctor"));
}

#[test]
fn test_fill_writes_docx() {
    let temp = temp_dir_in_workspace();
    let input = write_template(temp.path());
    let output = temp.path().join("out.docx");

    docfill(temp.path())
        .arg("fill")
        .arg(&input)
        .args([
            "--metadata-json",
            r#"{"nombre": "Juan Pérez", "juzgado": "Civil 3", "demanda_id": 123}"#,
            "-o",
        ])
        .arg(&output)
        .assert()
        .success();

    let filled = std::fs::read(&output).unwrap();
    assert_eq!(
        document_text(&filled, "word/document.xml"),
        "Señor Juan Pérez, presente.\nCivil 3"
    );
    assert_eq!(document_text(&filled, "word/header1.xml"), "Exp. 123");
    assert_eq!(document_text(&filled, "word/footer1.xml"), "Página");
}

#[test]
fn test_fill_reads_metadata_file() {
    let temp = temp_dir_in_workspace();
    let input = write_template(temp.path());
    let metadata = temp.path().join("metadata.json");
    std::fs::write(&metadata, r#"{"NOMBRE": "Ana"}"#).unwrap();
    let output = temp.path().join("out.docx");

    docfill(temp.path())
        .arg("fill")
        .arg(&input)
        .arg("--metadata")
        .arg(&metadata)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let filled = std::fs::read(&output).unwrap();
    let text = document_text(&filled, "word/document.xml");
    assert!(text.starts_with("Señor Ana, presente."));
    assert!(text.contains("{{JUZGADO}}"));
}

#[test]
fn test_fill_text_base64_goes_to_stdout() {
    let temp = temp_dir_in_workspace();
    let input = write_template(temp.path());

    let assert = docfill(temp.path())
        .arg("fill")
        .arg(&input)
        .args(["--metadata-json", r#"{"nombre": "Ana"}"#, "--format", "text-base64"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let filled = docfill_core::files::decode_base64(&stdout).unwrap();
    assert!(document_text(&filled, "word/document.xml").starts_with("Señor Ana"));
}

#[test]
fn test_fill_accepts_base64_input() {
    let temp = temp_dir_in_workspace();
    let input = write_template(temp.path());
    let encoded = temp.path().join("demanda.b64");
    std::fs::write(
        &encoded,
        docfill_core::files::encode_base64(&std::fs::read(&input).unwrap()),
    )
    .unwrap();
    let output = temp.path().join("out.docx");

    docfill(temp.path())
        .arg("fill")
        .arg(&encoded)
        .args(["--input-base64", "--metadata-json", r#"{"nombre": "Ana"}"#, "-o"])
        .arg(&output)
        .assert()
        .success();

    let filled = std::fs::read(&output).unwrap();
    assert!(document_text(&filled, "word/document.xml").starts_with("Señor Ana"));
}

#[test]
fn test_fill_rejects_unknown_format() {
    let temp = temp_dir_in_workspace();
    let input = write_template(temp.path());

    docfill(temp.path())
        .arg("fill")
        .arg(&input)
        .args(["--metadata-json", r#"{"nombre": "Ana"}"#, "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("VALIDATION_ERROR"))
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn test_fill_rejects_empty_metadata() {
    let temp = temp_dir_in_workspace();
    let input = write_template(temp.path());

    docfill(temp.path())
        .arg("fill")
        .arg(&input)
        .args(["--metadata-json", "{}", "-o", "out.docx"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: VALIDATION_ERROR"));
    assert!(!temp.path().join("out.docx").exists());
}

#[test]
fn test_fill_bytes_requires_output() {
    let temp = temp_dir_in_workspace();
    let input = write_template(temp.path());

    docfill(temp.path())
        .arg("fill")
        .arg(&input)
        .args(["--metadata-json", r#"{"nombre": "Ana"}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output is required"));
}

#[test]
fn test_fill_requires_metadata() {
    let temp = temp_dir_in_workspace();
    let input = write_template(temp.path());

    docfill(temp.path())
        .arg("fill")
        .arg(&input)
        .args(["-o", "out.docx"])
        .assert()
        .failure();
}

#[test]
fn test_fill_reports_corrupt_document() {
    let temp = temp_dir_in_workspace();
    let input = temp.path().join("broken.docx");
    std::fs::write(&input, b"not a zip").unwrap();

    docfill(temp.path())
        .arg("fill")
        .arg(&input)
        .args(["--metadata-json", r#"{"a": "b"}"#, "-o", "out.docx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PROCESSING_ERROR"));
}

#[test]
fn test_invalid_config_fails_commands() {
    let temp = temp_dir_in_workspace();
    let input = write_template(temp.path());
    std::fs::write(
        temp.path().join("docfill.toml"),
        "[converter]\ntimeout_secs = 0\n",
    )
    .unwrap();

    docfill(temp.path())
        .arg("fill")
        .arg(&input)
        .args(["--metadata-json", r#"{"a": "b"}"#, "-o", "out.docx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_INVALID_VALUE"));
}
