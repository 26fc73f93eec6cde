use crate::app::command_support::{engine_config, load_settings, render_json, ParsedArgs};
use crate::engine::EngineClient;
use crate::explain::explain;
use crate::labels::parse_labels;
use crate::validate::validate_inputs;
use serde_json::{json, Value};
use std::path::PathBuf;

pub fn cmd_validate(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, &[], &[])?;
    let workflow = PathBuf::from(parsed.positional(0, "wdl")?);
    let inputs = PathBuf::from(parsed.positional(1, "json")?);

    let errors = validate_inputs(&workflow, &inputs);
    if !errors.is_empty() {
        return Err(format!(
            "{} contains the following errors:\n{}",
            inputs.display(),
            errors.join("\n")
        ));
    }
    Ok(format!("No errors found in {}", workflow.display()))
}

pub fn cmd_abort(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, &["server"], &[])?;
    let workflow_id = parsed.positional(0, "workflow_id")?;
    let settings = load_settings()?;
    let config = engine_config(&settings, parsed.value("server"))?;
    let client = EngineClient::new(config);

    let status = client.abort(workflow_id).map_err(|err| err.to_string())?;
    Ok(render_json(&json!({
        "id": workflow_id,
        "status": status.as_str(),
    })))
}

pub fn cmd_restart(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, &["server"], &["disable-caching"])?;
    let workflow_id = parsed.positional(0, "workflow_id")?;
    let settings = load_settings()?;
    let config = engine_config(&settings, parsed.value("server"))?;
    let client = EngineClient::new(config);

    match client.restart(workflow_id, parsed.flag("disable-caching")) {
        Ok(handle) => Ok(format!(
            "Workflow restarted successfully; new workflow id: {}",
            handle.id
        )),
        Err(err) => Err(format!("Workflow was not restarted successfully: {err}")),
    }
}

pub fn cmd_label(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, &["server", "label"], &[])?;
    let workflow_id = parsed.positional(0, "workflow_id")?;
    let raw_labels = parsed.values("label");
    if raw_labels.is_empty() {
        return Err("label requires at least one `--label key:value`".to_string());
    }
    let labels = parse_labels(&raw_labels).map_err(|err| err.to_string())?;

    let settings = load_settings()?;
    let config = engine_config(&settings, parsed.value("server"))?;
    let client = EngineClient::new(config);
    client
        .label_workflow(workflow_id, &labels)
        .map_err(|err| err.to_string())?;

    let value = serde_json::to_value(&labels).map_err(|err| err.to_string())?;
    Ok(format!("Labels successfully applied:\n{}", render_json(&value)))
}

pub fn cmd_explain(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, &["server"], &["input"])?;
    let workflow_id = parsed.positional(0, "workflow_id")?;
    let settings = load_settings()?;
    let config = engine_config(&settings, parsed.value("server"))?;
    let client = EngineClient::new(config.clone());

    let report = explain(&client, workflow_id, parsed.flag("input"))
        .map_err(|err| err.to_string())?;

    let Some(summary) = report.summary else {
        return Ok("Workflow not found.".to_string());
    };

    let mut out = vec![
        "-------------Workflow Status-------------".to_string(),
        render_json(&Value::Object(summary)),
    ];

    if !report.extra.is_empty() {
        out.push("-------------Additional Parameters-------------".to_string());
        out.push(render_json(&Value::Object(report.extra)));
    }

    for shard in &report.failed_shards {
        out.push("-------------Failed Shard-------------".to_string());
        out.push(format!("Call: {} (shard {})", shard.call, shard.shard_index));
        out.push(format!("Stderr: {}", shard.stderr_path));
        if shard.script.is_empty() {
            out.push("Script: <unavailable>".to_string());
        } else {
            out.push(format!("Script:\n{}", shard.script));
        }
    }

    out.push("-------------Engine Links-------------".to_string());
    out.push(config.metadata_link(workflow_id));
    out.push(config.timing_link(workflow_id));
    Ok(out.join("\n"))
}
