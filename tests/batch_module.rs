use coxswain::batch::{parse_samples, run_batch, BatchError};
use std::fs;
use tempfile::tempdir;

fn write_app(dir: &std::path::Path) {
    fs::write(
        dir.join("inputs"),
        "{\"align.sample\": \"{{ sample_id }}\", \"align.project\": \"{{ project_name }}\"}",
    )
    .expect("write inputs template");
    fs::write(dir.join("workflow.wdl"), "workflow align {}\n").expect("write workflow template");
}

#[test]
fn parse_samples_maps_header_columns_onto_each_row() {
    let dir = tempdir().expect("tempdir");
    let sheet = dir.path().join("samples.csv");
    fs::write(&sheet, "sample_id,reference\ns1,hg38\ns2,hg19\n").expect("write sheet");

    let samples = parse_samples(&sheet).expect("parse samples");
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].get("sample_id").map(String::as_str), Some("s1"));
    assert_eq!(samples[1].get("reference").map(String::as_str), Some("hg19"));
}

#[test]
fn parse_samples_rejects_rows_with_the_wrong_width() {
    let dir = tempdir().expect("tempdir");
    let sheet = dir.path().join("samples.csv");
    fs::write(&sheet, "sample_id,reference\ns1\n").expect("write sheet");

    let err = parse_samples(&sheet).expect_err("short row");
    match err {
        BatchError::RowWidth {
            line,
            found,
            expected,
        } => {
            assert_eq!(line, 2);
            assert_eq!(found, 1);
            assert_eq!(expected, 2);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn parse_samples_rejects_an_empty_sheet() {
    let dir = tempdir().expect("tempdir");
    let sheet = dir.path().join("samples.csv");
    fs::write(&sheet, "\n").expect("write sheet");
    parse_samples(&sheet).expect_err("empty sheet");
}

#[test]
fn run_batch_builds_a_project_directory_per_sample() {
    let dir = tempdir().expect("tempdir");
    let app_dir = dir.path().join("app");
    fs::create_dir_all(&app_dir).expect("app dir");
    write_app(&app_dir);

    let sheet = dir.path().join("samples.csv");
    fs::write(&sheet, "sample_id,reference\ns1,hg38\ns2,hg38\n").expect("write sheet");

    let workdir = dir.path().join("work");
    fs::create_dir_all(&workdir).expect("workdir");

    let report = run_batch(&app_dir, "demo-project", &sheet, &workdir).expect("run batch");
    assert_eq!(report.samples.len(), 2);

    let first_inputs =
        fs::read_to_string(report.project_path.join("s1/inputs")).expect("rendered inputs");
    assert!(first_inputs.contains("\"align.sample\": \"s1\""));
    assert!(first_inputs.contains("\"align.project\": \"demo-project\""));
    assert!(report.project_path.join("s2/workflow.wdl").exists());

    let manifest = fs::read_to_string(&report.manifest_path).expect("manifest");
    let mut lines = manifest.lines();
    assert_eq!(lines.next(), Some("project_name,reference,sample_id"));
    assert_eq!(lines.next(), Some("demo-project,hg38,s1"));
    assert_eq!(lines.next(), Some("demo-project,hg38,s2"));
}

#[test]
fn run_batch_copies_the_dependency_archive_when_present() {
    let dir = tempdir().expect("tempdir");
    let app_dir = dir.path().join("app");
    fs::create_dir_all(&app_dir).expect("app dir");
    write_app(&app_dir);
    fs::write(app_dir.join("tasks.zip"), b"PK").expect("write tasks.zip");

    let sheet = dir.path().join("samples.csv");
    fs::write(&sheet, "sample_id\ns1\n").expect("write sheet");

    let workdir = dir.path().join("work");
    fs::create_dir_all(&workdir).expect("workdir");

    let report = run_batch(&app_dir, "demo", &sheet, &workdir).expect("run batch");
    assert!(report.project_path.join("s1/tasks.zip").exists());
}

#[test]
fn run_batch_requires_a_sample_id_column() {
    let dir = tempdir().expect("tempdir");
    let app_dir = dir.path().join("app");
    fs::create_dir_all(&app_dir).expect("app dir");
    write_app(&app_dir);

    let sheet = dir.path().join("samples.csv");
    fs::write(&sheet, "name\ns1\n").expect("write sheet");

    let workdir = dir.path().join("work");
    fs::create_dir_all(&workdir).expect("workdir");

    let err = run_batch(&app_dir, "demo", &sheet, &workdir).expect_err("missing sample_id");
    assert!(matches!(err, BatchError::MissingSampleId));
}

#[test]
fn run_batch_refuses_an_existing_project_directory() {
    let dir = tempdir().expect("tempdir");
    let app_dir = dir.path().join("app");
    fs::create_dir_all(&app_dir).expect("app dir");
    write_app(&app_dir);

    let sheet = dir.path().join("samples.csv");
    fs::write(&sheet, "sample_id\ns1\n").expect("write sheet");

    let workdir = dir.path().join("work");
    fs::create_dir_all(workdir.join("demo")).expect("existing project");

    let err = run_batch(&app_dir, "demo", &sheet, &workdir).expect_err("existing project");
    assert!(matches!(err, BatchError::ProjectExists { .. }));
}
