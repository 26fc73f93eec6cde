use super::types::{CallLogs, LabelSet, WorkflowHandle, WorkflowStatus, WorkflowSummary};
use super::{EngineApi, EngineError, MultipartBody};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    base_url: String,
}

impl EngineConfig {
    pub fn new(host: &str, port: u16) -> Self {
        let host = host.trim().trim_end_matches('/');
        let base_url = if host.contains("://") {
            format!("{host}:{port}")
        } else {
            format!("http://{host}:{port}")
        };
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn metadata_link(&self, workflow_id: &str) -> String {
        format!("{}/api/workflows/v1/{workflow_id}/metadata", self.base_url)
    }

    pub fn timing_link(&self, workflow_id: &str) -> String {
        format!("{}/api/workflows/v1/{workflow_id}/timing", self.base_url)
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api/workflows/v1{path}", self.base_url)
    }
}

#[derive(Debug, Clone)]
pub struct SubmitRequest<'a> {
    pub workflow: &'a Path,
    pub inputs: &'a Path,
    pub dependencies: Option<&'a Path>,
    pub extra_options: BTreeMap<String, String>,
    pub labels: LabelSet,
    pub disable_caching: bool,
    pub bucket: Option<&'a str>,
}

pub fn workflow_options(
    extra_options: &BTreeMap<String, String>,
    disable_caching: bool,
    bucket: Option<&str>,
) -> Value {
    let mut options = serde_json::Map::new();
    for (key, value) in extra_options {
        options.insert(key.clone(), Value::String(value.clone()));
    }
    if disable_caching {
        options.insert("read_from_cache".to_string(), Value::Bool(false));
    }
    if let Some(bucket) = bucket {
        options.insert(
            "final_workflow_outputs_dir".to_string(),
            Value::String(bucket.to_string()),
        );
    }
    Value::Object(options)
}

#[derive(Debug, Clone)]
pub struct EngineClient {
    config: EngineConfig,
}

impl EngineClient {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn submit(&self, request: &SubmitRequest<'_>) -> Result<WorkflowHandle, EngineError> {
        let workflow_source = read_input(request.workflow)?;
        let inputs_document = read_input(request.inputs)?;
        let dependencies = request
            .dependencies
            .map(|path| read_input_bytes(path))
            .transpose()?;

        let options =
            workflow_options(&request.extra_options, request.disable_caching, request.bucket);
        let options_blob =
            serde_json::to_string(&options).map_err(EngineError::Encode)?;
        let labels_blob =
            serde_json::to_string(&request.labels).map_err(EngineError::Encode)?;

        self.post_submission(
            &workflow_source,
            &inputs_document,
            dependencies.as_deref(),
            &options_blob,
            &labels_blob,
        )
    }

    pub fn query_status(&self, workflow_id: &str) -> Result<WorkflowStatus, EngineError> {
        let value = self.get_json(&self.config.api(&format!("/{workflow_id}/status")))?;
        status_from_value(&value)
    }

    pub fn query_metadata(&self, workflow_id: &str) -> Result<Value, EngineError> {
        self.get_json(&self.config.api(&format!("/{workflow_id}/metadata")))
    }

    pub fn query_logs(&self, workflow_id: &str) -> Result<CallLogs, EngineError> {
        let value = self.get_json(&self.config.api(&format!("/{workflow_id}/logs")))?;
        let calls = value
            .get("calls")
            .ok_or(EngineError::MissingField { field: "calls" })?;
        serde_json::from_value(calls.clone()).map_err(|err| EngineError::Decode {
            message: err.to_string(),
        })
    }

    pub fn query_by_labels(&self, labels: &LabelSet) -> Result<Vec<WorkflowSummary>, EngineError> {
        let mut query: Vec<(&str, String)> = labels
            .iter()
            .map(|(key, value)| ("label", format!("{key}:{value}")))
            .collect();
        query.push(("additionalQueryResultFields", "labels".to_string()));
        let value = self.get_json(&with_query(&self.config.api("/query"), &query))?;
        summaries_from_value(&value)
    }

    pub fn label_workflow(&self, workflow_id: &str, labels: &LabelSet) -> Result<(), EngineError> {
        let url = self.config.api(&format!("/{workflow_id}/labels"));
        let body = serde_json::to_value(labels).map_err(EngineError::Encode)?;
        ureq::request("PATCH", &url)
            .send_json(body)
            .map_err(map_ureq_error)?;
        Ok(())
    }

    pub fn abort(&self, workflow_id: &str) -> Result<WorkflowStatus, EngineError> {
        let url = self.config.api(&format!("/{workflow_id}/abort"));
        let response = ureq::post(&url).call().map_err(map_ureq_error)?;
        let value = decode_json(response)?;
        status_from_value(&value)
    }

    pub fn restart(
        &self,
        workflow_id: &str,
        disable_caching: bool,
    ) -> Result<WorkflowHandle, EngineError> {
        let metadata = self.query_metadata(workflow_id)?;
        let submitted = metadata
            .get("submittedFiles")
            .ok_or(EngineError::MissingField {
                field: "submittedFiles",
            })?;
        let workflow_source = submitted
            .get("workflow")
            .and_then(Value::as_str)
            .ok_or(EngineError::MissingField { field: "workflow" })?;
        let inputs_document = submitted
            .get("inputs")
            .and_then(Value::as_str)
            .unwrap_or("{}");
        let labels_blob = submitted
            .get("labels")
            .and_then(Value::as_str)
            .unwrap_or("{}");

        let mut options: serde_json::Map<String, Value> = submitted
            .get("options")
            .and_then(Value::as_str)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();
        if disable_caching {
            options.insert("read_from_cache".to_string(), Value::Bool(false));
        }
        let options_blob =
            serde_json::to_string(&Value::Object(options)).map_err(EngineError::Encode)?;

        self.post_submission(workflow_source, inputs_document, None, &options_blob, labels_blob)
    }

    pub fn list_workflows(
        &self,
        owner: &str,
        since_iso: &str,
    ) -> Result<Vec<WorkflowSummary>, EngineError> {
        let mut query: Vec<(&str, String)> = vec![
            ("start", since_iso.to_string()),
            ("additionalQueryResultFields", "labels".to_string()),
        ];
        if owner != "*" {
            query.push(("label", format!("username:{owner}")));
        }
        let value = self.get_json(&with_query(&self.config.api("/query"), &query))?;
        summaries_from_value(&value)
    }

    fn post_submission(
        &self,
        workflow_source: &str,
        inputs_document: &str,
        dependencies: Option<&[u8]>,
        options_blob: &str,
        labels_blob: &str,
    ) -> Result<WorkflowHandle, EngineError> {
        let mut body = MultipartBody::new()?;
        body.add_file(
            "workflowSource",
            "workflow.wdl",
            "application/octet-stream",
            workflow_source.as_bytes(),
        );
        body.add_file(
            "workflowInputs",
            "inputs.json",
            "application/json",
            inputs_document.as_bytes(),
        );
        if let Some(archive) = dependencies {
            body.add_file(
                "workflowDependencies",
                "dependencies.zip",
                "application/zip",
                archive,
            );
        }
        body.add_text("workflowOptions", options_blob);
        body.add_text("labels", labels_blob);

        let content_type = body.content_type();
        let response = ureq::post(&self.config.api(""))
            .set("Content-Type", &content_type)
            .send_bytes(&body.finish())
            .map_err(map_ureq_error)?;
        let value = decode_json(response)?;
        handle_from_value(&value)
    }

    fn get_json(&self, url: &str) -> Result<Value, EngineError> {
        let response = ureq::get(url).call().map_err(map_ureq_error)?;
        decode_json(response)
    }
}

impl EngineApi for EngineClient {
    fn query_status(&self, workflow_id: &str) -> Result<WorkflowStatus, EngineError> {
        EngineClient::query_status(self, workflow_id)
    }

    fn query_metadata(&self, workflow_id: &str) -> Result<Value, EngineError> {
        EngineClient::query_metadata(self, workflow_id)
    }

    fn query_logs(&self, workflow_id: &str) -> Result<CallLogs, EngineError> {
        EngineClient::query_logs(self, workflow_id)
    }

    fn list_workflows(
        &self,
        owner: &str,
        since_iso: &str,
    ) -> Result<Vec<WorkflowSummary>, EngineError> {
        EngineClient::list_workflows(self, owner, since_iso)
    }
}

fn with_query(url: &str, query: &[(&str, String)]) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let encoded = query
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{url}?{encoded}")
}

fn map_ureq_error(err: ureq::Error) -> EngineError {
    match err {
        ureq::Error::Status(status, response) => EngineError::Api {
            status,
            message: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => EngineError::Transport {
            message: transport.to_string(),
        },
    }
}

fn decode_json(response: ureq::Response) -> Result<Value, EngineError> {
    response
        .into_json::<Value>()
        .map_err(|err| EngineError::Decode {
            message: err.to_string(),
        })
}

pub fn status_from_value(value: &Value) -> Result<WorkflowStatus, EngineError> {
    let raw = value
        .get("status")
        .and_then(Value::as_str)
        .ok_or(EngineError::MissingField { field: "status" })?;
    WorkflowStatus::parse(raw).ok_or_else(|| EngineError::UnknownStatus {
        value: raw.to_string(),
    })
}

pub fn handle_from_value(value: &Value) -> Result<WorkflowHandle, EngineError> {
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .ok_or(EngineError::MissingField { field: "id" })?;
    Ok(WorkflowHandle::new(id))
}

pub fn summaries_from_value(value: &Value) -> Result<Vec<WorkflowSummary>, EngineError> {
    let results = value
        .get("results")
        .ok_or(EngineError::MissingField { field: "results" })?;
    serde_json::from_value(results.clone()).map_err(|err| EngineError::Decode {
        message: err.to_string(),
    })
}

fn read_input(path: &Path) -> Result<String, EngineError> {
    fs::read_to_string(path).map_err(|source| EngineError::ReadInput {
        path: path.display().to_string(),
        source,
    })
}

fn read_input_bytes(path: &Path) -> Result<Vec<u8>, EngineError> {
    fs::read(path).map_err(|source| EngineError::ReadInput {
        path: path.display().to_string(),
        source,
    })
}
