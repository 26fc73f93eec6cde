use crate::engine::{EngineApi, EngineError, WorkflowStatus};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ExplainReport {
    pub summary: Option<Map<String, Value>>,
    pub extra: Map<String, Value>,
    pub failed_shards: Vec<FailedShardLog>,
}

#[derive(Debug, Clone)]
pub struct FailedShardLog {
    pub call: String,
    pub shard_index: i64,
    pub stderr_path: String,
    pub script: String,
}

impl ExplainReport {
    pub fn not_found() -> Self {
        Self {
            summary: None,
            extra: Map::new(),
            failed_shards: Vec::new(),
        }
    }
}

pub fn explain<E: EngineApi>(
    engine: &E,
    workflow_id: &str,
    include_inputs: bool,
) -> Result<ExplainReport, EngineError> {
    let status = match engine.query_status(workflow_id) {
        Ok(status) => status,
        Err(err) if err.is_not_found() => return Ok(ExplainReport::not_found()),
        Err(err) => return Err(err),
    };

    let metadata = engine.query_metadata(workflow_id)?;
    let mut summary = Map::new();
    summary.insert("id".to_string(), Value::String(workflow_id.to_string()));
    summary.insert(
        "status".to_string(),
        Value::String(status.as_str().to_string()),
    );
    for field in ["workflowName", "submission", "start", "end"] {
        if let Some(value) = metadata.get(field) {
            summary.insert(field.to_string(), value.clone());
        }
    }
    if let Some(failures) = metadata.get("failures") {
        summary.insert(
            "failures".to_string(),
            Value::Array(failure_messages(failures)),
        );
    }

    let mut extra = Map::new();
    if include_inputs {
        if let Some(inputs) = metadata.get("inputs") {
            extra.insert("inputs".to_string(), inputs.clone());
        }
        if let Some(labels) = metadata.get("labels") {
            extra.insert("labels".to_string(), labels.clone());
        }
    }

    let mut failed_shards = Vec::new();
    if status == WorkflowStatus::Failed {
        let logs = engine.query_logs(workflow_id)?;
        for (call, shards) in &logs {
            for shard in shards {
                if !shard.failed() {
                    continue;
                }
                let Some(stderr_path) = shard.stderr.as_deref() else {
                    continue;
                };
                failed_shards.push(FailedShardLog {
                    call: call.clone(),
                    shard_index: shard.shard_index.unwrap_or(-1),
                    stderr_path: stderr_path.to_string(),
                    script: script_for_stderr(stderr_path),
                });
            }
        }
    }

    Ok(ExplainReport {
        summary: Some(summary),
        extra,
        failed_shards,
    })
}

// The executed command lives in a `script` file next to the shard stderr.
// This is a debugging aid; an unreadable script is reported as empty.
pub fn script_for_stderr(stderr_path: &str) -> String {
    let script_path = Path::new(stderr_path).with_file_name("script");
    std::fs::read_to_string(script_path).unwrap_or_default()
}

fn failure_messages(failures: &Value) -> Vec<Value> {
    let mut messages = Vec::new();
    if let Some(entries) = failures.as_array() {
        for entry in entries {
            if let Some(message) = entry.get("message").and_then(Value::as_str) {
                messages.push(Value::String(message.to_string()));
            }
            if let Some(caused_by) = entry.get("causedBy") {
                messages.extend(failure_messages(caused_by));
            }
        }
    }
    messages
}
