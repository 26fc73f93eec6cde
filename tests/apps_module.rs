use coxswain::apps::{install_app, list_apps, render_app_file, render_template, SampleRecord};
use std::fs;
use std::io::Write;
use tempfile::tempdir;
use zip::write::SimpleFileOptions;

fn sample(entries: &[(&str, &str)]) -> SampleRecord {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn render_template_substitutes_known_placeholders() {
    let record = sample(&[("sample_id", "s1"), ("reference", "hg38")]);
    let rendered = render_template(
        "{\"align.sample\": \"{{ sample_id }}\", \"align.ref\": \"{{reference}}\"}",
        &record,
    );
    assert_eq!(
        rendered,
        "{\"align.sample\": \"s1\", \"align.ref\": \"hg38\"}"
    );
}

#[test]
fn render_template_leaves_unknown_placeholders_untouched() {
    let record = sample(&[("sample_id", "s1")]);
    let rendered = render_template("{{ sample_id }} {{ missing }}", &record);
    assert_eq!(rendered, "s1 {{ missing }}");
}

#[test]
fn render_app_file_reads_the_named_template() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("inputs"), "sample={{ sample_id }}").expect("write template");
    let record = sample(&[("sample_id", "s7")]);
    let rendered = render_app_file(dir.path(), "inputs", &record).expect("render");
    assert_eq!(rendered, "sample=s7");
}

#[test]
fn render_app_file_reports_a_missing_template() {
    let dir = tempdir().expect("tempdir");
    let record = sample(&[]);
    let err = render_app_file(dir.path(), "inputs", &record).expect_err("missing template");
    assert!(err.to_string().contains("inputs"));
}

#[test]
fn list_apps_returns_sorted_directories_only() {
    let dir = tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("variant-calling")).expect("dir");
    fs::create_dir(dir.path().join("alignment")).expect("dir");
    fs::write(dir.path().join("README"), "not an app").expect("file");

    let apps = list_apps(dir.path()).expect("list apps");
    assert_eq!(apps, vec!["alignment".to_string(), "variant-calling".to_string()]);
}

#[test]
fn install_app_extracts_the_archive_under_its_stem() {
    let dir = tempdir().expect("tempdir");
    let archive_path = dir.path().join("alignment.zip");
    {
        let file = fs::File::create(&archive_path).expect("create archive");
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("workflow.wdl", SimpleFileOptions::default())
            .expect("start workflow.wdl");
        writer
            .write_all(b"workflow align {}")
            .expect("write workflow.wdl");
        writer
            .start_file("tasks/map.wdl", SimpleFileOptions::default())
            .expect("start tasks/map.wdl");
        writer.write_all(b"task map {}").expect("write tasks/map.wdl");
        writer.finish().expect("finish archive");
    }

    let app_dir = dir.path().join("apps");
    fs::create_dir_all(&app_dir).expect("app dir");
    let name = install_app(&app_dir, &archive_path).expect("install");
    assert_eq!(name, "alignment");

    let workflow = fs::read_to_string(app_dir.join("alignment/workflow.wdl")).expect("workflow");
    assert_eq!(workflow, "workflow align {}");
    let task = fs::read_to_string(app_dir.join("alignment/tasks/map.wdl")).expect("task");
    assert_eq!(task, "task map {}");

    let apps = list_apps(&app_dir).expect("list apps");
    assert_eq!(apps, vec!["alignment".to_string()]);
}

#[test]
fn install_app_rejects_a_non_archive_file() {
    let dir = tempdir().expect("tempdir");
    let bogus = dir.path().join("app.zip");
    fs::write(&bogus, "not a zip").expect("write bogus");

    let app_dir = dir.path().join("apps");
    fs::create_dir_all(&app_dir).expect("app dir");
    install_app(&app_dir, &bogus).expect_err("invalid archive");
}
