use crate::app::command_support::{
    engine_config, load_settings, parse_i64, render_json, resolve_username, ParsedArgs,
};
use crate::engine::{EngineClient, WorkflowStatus};
use crate::explain::script_for_stderr;
use crate::labels::parse_labels;
use crate::monitor::since_timestamp;
use serde_json::{json, Value};

const QUERY_VALUE_OPTIONS: &[&str] = &["server", "label", "days", "filter", "username"];
const QUERY_SWITCHES: &[&str] = &["status", "metadata", "logs", "all"];

pub fn cmd_query(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, QUERY_VALUE_OPTIONS, QUERY_SWITCHES)?;
    let settings = load_settings()?;
    let config = engine_config(&settings, parsed.value("server"))?;
    let client = EngineClient::new(config);

    let labels = parsed.values("label");
    let workflow_id = parsed.optional_positional(0);

    if workflow_id.is_none() && labels.is_empty() {
        return cmd_list(args);
    }

    if !labels.is_empty() {
        let labels = parse_labels(&labels).map_err(|err| err.to_string())?;
        let summaries = client
            .query_by_labels(&labels)
            .map_err(|err| err.to_string())?;
        let value = serde_json::to_value(summaries).map_err(|err| err.to_string())?;
        return Ok(render_json(&value));
    }

    let workflow_id = workflow_id.unwrap_or_default();
    let mut responses: Vec<Value> = Vec::new();
    if parsed.flag("status") {
        let status = client
            .query_status(workflow_id)
            .map_err(|err| err.to_string())?;
        responses.push(json!({"id": workflow_id, "status": status.as_str()}));
    }
    if parsed.flag("metadata") {
        responses.push(
            client
                .query_metadata(workflow_id)
                .map_err(|err| err.to_string())?,
        );
    }
    if parsed.flag("logs") {
        let logs = client
            .query_logs(workflow_id)
            .map_err(|err| err.to_string())?;
        responses.push(serde_json::to_value(logs).map_err(|err| err.to_string())?);
    }
    if responses.is_empty() {
        return Err("query requires one of --status, --metadata, --logs or --label".to_string());
    }
    let value = Value::Array(responses);
    Ok(render_json(&value))
}

const LIST_VALUE_OPTIONS: &[&str] = &["server", "days", "filter", "username", "label"];
const LIST_SWITCHES: &[&str] = &["all", "status", "metadata", "logs"];

pub fn cmd_list(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, LIST_VALUE_OPTIONS, LIST_SWITCHES)?;
    let settings = load_settings()?;
    let config = engine_config(&settings, parsed.value("server"))?;
    let client = EngineClient::new(config.clone());
    let username = resolve_username(&parsed);

    let days = match parsed.value("days") {
        Some(raw) => parse_i64(raw, "days")?,
        None => settings.query_days,
    };
    let owner = if parsed.flag("all") {
        "*"
    } else {
        username.as_str()
    };

    let filters = parse_status_filters(&parsed.values("filter"))?;
    let since = since_timestamp(settings.timezone(), days);
    let summaries = client
        .list_workflows(owner, &since)
        .map_err(|err| err.to_string())?;

    let rows: Vec<Value> = summaries
        .into_iter()
        .filter(|summary| filters.is_empty() || filters.contains(&summary.status))
        .map(|summary| {
            let mut row = serde_json::to_value(&summary).unwrap_or_else(|_| json!({}));
            if let Some(object) = row.as_object_mut() {
                object.insert(
                    "metadata".to_string(),
                    Value::String(config.metadata_link(&summary.id)),
                );
                object.insert(
                    "timing".to_string(),
                    Value::String(config.timing_link(&summary.id)),
                );
            }
            row
        })
        .collect();
    Ok(render_json(&Value::Array(rows)))
}

const LOG_VALUE_OPTIONS: &[&str] = &["server"];

pub fn cmd_log(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, LOG_VALUE_OPTIONS, &[])?;
    let workflow_id = parsed.positional(0, "workflow_id")?;
    let settings = load_settings()?;
    let config = engine_config(&settings, parsed.value("server"))?;
    let client = EngineClient::new(config);

    let logs = client
        .query_logs(workflow_id)
        .map_err(|err| err.to_string())?;

    let mut out = Vec::new();
    for (call, shards) in &logs {
        for shard in shards {
            let Some(stderr_path) = shard.stderr.as_deref() else {
                continue;
            };
            out.push(format!("{call}:"));
            out.push(String::new());
            out.push(script_for_stderr(stderr_path));
            out.push(String::new());
        }
    }
    if out.is_empty() {
        return Ok(format!("no call logs recorded for workflow {workflow_id}"));
    }
    Ok(out.join("\n"))
}

fn parse_status_filters(raw: &[String]) -> Result<Vec<WorkflowStatus>, String> {
    raw.iter()
        .map(|value| {
            WorkflowStatus::parse(value)
                .ok_or_else(|| format!("unknown workflow status filter `{value}`"))
        })
        .collect()
}
