use crate::app::command_support::{load_settings, ParsedArgs};
use crate::apps::{install_app, list_apps};
use crate::batch::run_batch;
use crate::config::Settings;
use std::path::{Path, PathBuf};

pub fn cmd_apps(args: &[String]) -> Result<String, String> {
    let _parsed = ParsedArgs::parse(args, &[], &[])?;
    let settings = load_settings()?;
    let app_dir = configured_app_dir(&settings)?;
    let apps = list_apps(&app_dir).map_err(|err| err.to_string())?;
    if apps.is_empty() {
        return Ok(format!("no apps installed in {}", app_dir.display()));
    }
    Ok(apps.join("\n"))
}

pub fn cmd_install(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, &[], &[])?;
    let archive = PathBuf::from(parsed.positional(0, "zip_file")?);
    let settings = load_settings()?;
    let app_dir = configured_app_dir(&settings)?;

    let name = install_app(&app_dir, &archive).map_err(|err| err.to_string())?;
    Ok(format!(
        "Installed app `{name}` to {}",
        app_dir.join(&name).display()
    ))
}

const BATCH_VALUE_OPTIONS: &[&str] = &["project-name", "server", "label", "username"];

pub fn cmd_batch(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, BATCH_VALUE_OPTIONS, &[])?;
    let app_name = parsed.positional(0, "app_name")?;
    let samples = PathBuf::from(parsed.positional(1, "samples")?);
    let project_name = parsed
        .value("project-name")
        .ok_or_else(|| "`--project-name` is required".to_string())?;

    let settings = load_settings()?;
    let app_dir = configured_app_dir(&settings)?.join(app_name);
    build_project(&app_dir, project_name, &samples)
}

pub fn cmd_testapp(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, &["project-name"], &[])?;
    let app_dir = PathBuf::from(parsed.positional(0, "app_dir")?);
    let samples = PathBuf::from(parsed.positional(1, "samples")?);
    let project_name = parsed
        .value("project-name")
        .ok_or_else(|| "`--project-name` is required".to_string())?;

    build_project(&app_dir, project_name, &samples)
}

fn build_project(app_dir: &Path, project_name: &str, samples: &Path) -> Result<String, String> {
    let working_dir = std::env::current_dir().map_err(|err| err.to_string())?;
    let report =
        run_batch(app_dir, project_name, samples, &working_dir).map_err(|err| err.to_string())?;
    Ok(format!(
        "prepared {} sample project(s) under {}\nmanifest: {}",
        report.samples.len(),
        report.project_path.display(),
        report.manifest_path.display()
    ))
}

fn configured_app_dir(settings: &Settings) -> Result<PathBuf, String> {
    settings
        .app_dir
        .clone()
        .ok_or_else(|| "`app_dir` is not configured in settings".to_string())
}
