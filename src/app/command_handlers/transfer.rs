use crate::app::command_support::{load_settings, ParsedArgs};
use crate::storage::upload_workflow_inputs;
use std::path::PathBuf;

const UPLOAD_VALUE_OPTIONS: &[&str] = &["bucket", "dependencies"];

pub fn cmd_upload(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, UPLOAD_VALUE_OPTIONS, &[])?;
    let workflow = PathBuf::from(parsed.positional(0, "wdl")?);
    let inputs = PathBuf::from(parsed.positional(1, "json")?);

    let settings = load_settings()?;
    let bucket = parsed
        .value("bucket")
        .map(str::to_string)
        .or_else(|| settings.default_bucket.clone())
        .ok_or_else(|| "no bucket given and `default_bucket` is not configured".to_string())?;
    let dependencies = parsed.value("dependencies").map(PathBuf::from);

    let report = upload_workflow_inputs(
        &bucket,
        &settings.storage.copy_tool,
        &workflow,
        &inputs,
        dependencies.as_deref(),
    )
    .map_err(|err| err.to_string())?;

    Ok(format!(
        "The following files have been uploaded to {bucket}:\n{}",
        report.uploaded.join("\n")
    ))
}
