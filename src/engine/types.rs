use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type LabelSet = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowHandle {
    pub id: String,
}

impl WorkflowHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl std::fmt::Display for WorkflowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.id.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkflowStatus {
    Submitted,
    Running,
    Aborting,
    Aborted,
    Failed,
    Succeeded,
    OnHold,
}

impl WorkflowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::Running => "Running",
            Self::Aborting => "Aborting",
            Self::Aborted => "Aborted",
            Self::Failed => "Failed",
            Self::Succeeded => "Succeeded",
            Self::OnHold => "On Hold",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Submitted" => Some(Self::Submitted),
            "Running" => Some(Self::Running),
            "Aborting" => Some(Self::Aborting),
            "Aborted" => Some(Self::Aborted),
            "Failed" => Some(Self::Failed),
            "Succeeded" => Some(Self::Succeeded),
            "On Hold" => Some(Self::OnHold),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Aborted)
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for WorkflowStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WorkflowStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown workflow status `{raw}`"))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub submission: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub labels: LabelSet,
}

impl WorkflowSummary {
    pub fn handle(&self) -> WorkflowHandle {
        WorkflowHandle::new(self.id.clone())
    }
}

pub type CallLogs = BTreeMap<String, Vec<ShardLog>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardLog {
    #[serde(default, rename = "shardIndex")]
    pub shard_index: Option<i64>,
    #[serde(default)]
    pub attempt: Option<i64>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default, rename = "executionStatus")]
    pub execution_status: Option<String>,
    #[serde(default, rename = "returnCode")]
    pub return_code: Option<i64>,
}

impl ShardLog {
    pub fn failed(&self) -> bool {
        if let Some(status) = self.execution_status.as_deref() {
            return status == "Failed";
        }
        matches!(self.return_code, Some(code) if code != 0)
    }
}
