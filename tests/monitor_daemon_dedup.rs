use coxswain::engine::{
    CallLogs, EngineApi, EngineConfig, EngineError, LabelSet, WorkflowStatus, WorkflowSummary,
};
use coxswain::monitor::{Monitor, MonitorConfig};
use coxswain::notify::{Notifier, NotifyError};
use std::cell::RefCell;
use std::collections::VecDeque;

struct SnapshotEngine {
    snapshots: RefCell<VecDeque<Result<Vec<WorkflowSummary>, EngineError>>>,
    owners_seen: RefCell<Vec<String>>,
}

impl SnapshotEngine {
    fn new(snapshots: Vec<Result<Vec<WorkflowSummary>, EngineError>>) -> Self {
        Self {
            snapshots: RefCell::new(snapshots.into()),
            owners_seen: RefCell::new(Vec::new()),
        }
    }
}

impl EngineApi for SnapshotEngine {
    fn query_status(&self, _workflow_id: &str) -> Result<WorkflowStatus, EngineError> {
        panic!("daemon polling must use the list endpoint");
    }

    fn query_metadata(&self, _workflow_id: &str) -> Result<serde_json::Value, EngineError> {
        Ok(serde_json::json!({}))
    }

    fn query_logs(&self, _workflow_id: &str) -> Result<CallLogs, EngineError> {
        Ok(CallLogs::new())
    }

    fn list_workflows(
        &self,
        owner: &str,
        _since_iso: &str,
    ) -> Result<Vec<WorkflowSummary>, EngineError> {
        self.owners_seen.borrow_mut().push(owner.to_string());
        self.snapshots
            .borrow_mut()
            .pop_front()
            .expect("list queried after the scripted snapshots ended")
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: RefCell<Vec<(String, String)>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, recipient: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        self.sent
            .borrow_mut()
            .push((recipient.to_string(), subject.to_string()));
        Ok(())
    }
}

fn summary(id: &str, status: WorkflowStatus, owner: Option<&str>) -> WorkflowSummary {
    let mut labels = LabelSet::new();
    if let Some(owner) = owner {
        labels.insert("username".to_string(), owner.to_string());
    }
    WorkflowSummary {
        id: id.to_string(),
        name: Some("align".to_string()),
        status,
        submission: None,
        start: None,
        end: None,
        labels,
    }
}

fn monitor_config() -> MonitorConfig {
    MonitorConfig {
        user: "dana".to_string(),
        interval_secs: 0,
        verbose: false,
        no_notify: false,
        notify_domain: "example.org".to_string(),
        timezone: chrono_tz::UTC,
        log_dir: None,
    }
}

#[test]
fn newly_terminal_workflows_are_notified_exactly_once_across_ticks() {
    let engine = SnapshotEngine::new(vec![
        Ok(vec![
            summary("wf-a", WorkflowStatus::Running, Some("dana")),
            summary("wf-b", WorkflowStatus::Succeeded, Some("blake")),
        ]),
        Ok(vec![
            summary("wf-a", WorkflowStatus::Succeeded, Some("dana")),
            summary("wf-b", WorkflowStatus::Succeeded, Some("blake")),
        ]),
    ]);
    let notifier = RecordingNotifier::default();
    let links = EngineConfig::new("localhost", 8000);
    let mut monitor = Monitor::new(&engine, links, &notifier, monitor_config());

    let first = monitor
        .poll_owned_once("*", "2026-01-01T00:00:00+00:00")
        .expect("first tick");
    assert_eq!(first.pending, 1);
    assert_eq!(first.notified, 1);

    let second = monitor
        .poll_owned_once("*", "2026-01-01T00:00:00+00:00")
        .expect("second tick");
    assert_eq!(second.pending, 0);
    assert_eq!(second.notified, 1);

    let sent = notifier.sent.borrow();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, "blake@example.org");
    assert!(sent[0].1.contains("wf-b"));
    assert_eq!(sent[1].0, "dana@example.org");
    assert!(sent[1].1.contains("wf-a"));
}

#[test]
fn daemon_owner_wildcard_is_passed_to_the_list_query() {
    let engine = SnapshotEngine::new(vec![Ok(Vec::new())]);
    let notifier = RecordingNotifier::default();
    let links = EngineConfig::new("localhost", 8000);
    let mut monitor = Monitor::new(&engine, links, &notifier, monitor_config());

    monitor
        .poll_owned_once("*", "2026-01-01T00:00:00+00:00")
        .expect("tick");
    assert_eq!(engine.owners_seen.borrow().as_slice(), ["*"]);
}

#[test]
fn a_restarted_workflow_is_a_distinct_identity_in_the_notify_ledger() {
    let engine = SnapshotEngine::new(vec![
        Ok(vec![summary("wf-1", WorkflowStatus::Failed, Some("dana"))]),
        Ok(vec![
            summary("wf-1", WorkflowStatus::Failed, Some("dana")),
            summary("wf-2", WorkflowStatus::Succeeded, Some("dana")),
        ]),
    ]);
    let notifier = RecordingNotifier::default();
    let links = EngineConfig::new("localhost", 8000);
    let mut monitor = Monitor::new(&engine, links, &notifier, monitor_config());

    monitor
        .poll_owned_once("dana", "2026-01-01T00:00:00+00:00")
        .expect("first tick");
    monitor
        .poll_owned_once("dana", "2026-01-01T00:00:00+00:00")
        .expect("second tick");

    let sent = notifier.sent.borrow();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].1.contains("wf-1"));
    assert!(sent[1].1.contains("wf-2"));
}

#[test]
fn summary_without_username_label_falls_back_to_the_monitor_user() {
    let engine = SnapshotEngine::new(vec![Ok(vec![summary(
        "wf-9",
        WorkflowStatus::Succeeded,
        None,
    )])]);
    let notifier = RecordingNotifier::default();
    let links = EngineConfig::new("localhost", 8000);
    let mut monitor = Monitor::new(&engine, links, &notifier, monitor_config());

    monitor
        .poll_owned_once("dana", "2026-01-01T00:00:00+00:00")
        .expect("tick");
    let sent = notifier.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "dana@example.org");
}

#[test]
fn missing_results_field_is_transient_for_the_daemon_tick() {
    let engine = SnapshotEngine::new(vec![Err(EngineError::MissingField { field: "results" })]);
    let notifier = RecordingNotifier::default();
    let links = EngineConfig::new("localhost", 8000);
    let mut monitor = Monitor::new(&engine, links, &notifier, monitor_config());

    let err = monitor
        .poll_owned_once("dana", "2026-01-01T00:00:00+00:00")
        .expect_err("missing results");
    assert!(err.is_transient());
}
