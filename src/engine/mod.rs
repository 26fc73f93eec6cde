mod client;
mod multipart;
mod types;

pub use client::{
    handle_from_value, status_from_value, summaries_from_value, workflow_options, EngineClient,
    EngineConfig, SubmitRequest,
};
pub use multipart::MultipartBody;
pub use types::{CallLogs, LabelSet, ShardLog, WorkflowHandle, WorkflowStatus, WorkflowSummary};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine request failed: {message}")]
    Transport { message: String },
    #[error("engine rejected request with status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("engine response missing expected field `{field}`")]
    MissingField { field: &'static str },
    #[error("engine reported unknown workflow status `{value}`")]
    UnknownStatus { value: String },
    #[error("failed to read input file {path}: {source}")]
    ReadInput {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode request payload: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode engine response: {message}")]
    Decode { message: String },
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    pub fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingField { .. })
    }
}

pub trait EngineApi {
    fn query_status(&self, workflow_id: &str) -> Result<WorkflowStatus, EngineError>;
    fn query_metadata(&self, workflow_id: &str) -> Result<serde_json::Value, EngineError>;
    fn query_logs(&self, workflow_id: &str) -> Result<CallLogs, EngineError>;
    fn list_workflows(
        &self,
        owner: &str,
        since_iso: &str,
    ) -> Result<Vec<WorkflowSummary>, EngineError>;
}
