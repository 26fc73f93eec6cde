use crate::engine::{EngineApi, EngineConfig, EngineError, WorkflowStatus, WorkflowSummary};
use crate::labels::USERNAME_LABEL;
use crate::notify::Notifier;
use crate::shared::append_client_log;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

pub const MONITOR_RETRY_BUDGET: u32 = 4;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("monitor query failed: {0}")]
    Engine(#[from] EngineError),
}

impl MonitorError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Engine(err) if err.is_missing_field())
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub user: String,
    pub interval_secs: u64,
    pub verbose: bool,
    pub no_notify: bool,
    pub notify_domain: String,
    pub timezone: chrono_tz::Tz,
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    pub pending: usize,
    pub notified: usize,
}

pub struct Monitor<'a, E: EngineApi> {
    engine: &'a E,
    links: EngineConfig,
    notifier: &'a dyn Notifier,
    config: MonitorConfig,
    // Notify-once ledger for list-mode monitoring. In-memory only: a
    // restarted monitor process renotifies workflows that went terminal
    // before the restart.
    seen: BTreeSet<String>,
}

impl<'a, E: EngineApi> Monitor<'a, E> {
    pub fn new(
        engine: &'a E,
        links: EngineConfig,
        notifier: &'a dyn Notifier,
        config: MonitorConfig,
    ) -> Self {
        Self {
            engine,
            links,
            notifier,
            config,
            seen: BTreeSet::new(),
        }
    }

    pub fn monitor_workflow(&mut self, workflow_id: &str) -> Result<WorkflowStatus, MonitorError> {
        loop {
            let status = self.engine.query_status(workflow_id)?;
            if status.is_terminal() {
                let (subject, body) = self.terminal_report(workflow_id, status)?;
                let recipient = self.mail_address(&self.config.user);
                self.send_notification(&recipient, &subject, &body);
                return Ok(status);
            }
            if self.config.verbose {
                println!("Workflow {workflow_id} is {status}");
            }
            self.sleep_interval();
        }
    }

    pub fn poll_owned_once(
        &mut self,
        owner: &str,
        since_iso: &str,
    ) -> Result<PollOutcome, MonitorError> {
        let snapshot = self.engine.list_workflows(owner, since_iso)?;
        let mut outcome = PollOutcome::default();
        for summary in &snapshot {
            if !summary.status.is_terminal() {
                outcome.pending += 1;
                if self.config.verbose {
                    println!("Workflow {} is {}", summary.id, summary.status);
                }
                continue;
            }
            if !self.seen.insert(summary.id.clone()) {
                continue;
            }
            let (subject, body) = self.summary_report(summary);
            let recipient = self.recipient_for(summary);
            self.send_notification(&recipient, &subject, &body);
            outcome.notified += 1;
        }
        Ok(outcome)
    }

    // User-level and daemon monitoring share this loop; daemon mode is
    // `owner == "*"`. The loop runs until the process is terminated.
    pub fn run(&mut self, owner: &str, since_days: i64) -> Result<(), MonitorError> {
        loop {
            let since = since_timestamp(self.config.timezone, since_days);
            let outcome = self.poll_owned_once(owner, &since)?;
            if outcome.notified > 0 {
                self.log(
                    "info",
                    "monitor.tick",
                    &format!(
                        "owner={owner} notified={} pending={}",
                        outcome.notified, outcome.pending
                    ),
                );
            }
            self.sleep_interval();
        }
    }

    pub fn notified_count(&self) -> usize {
        self.seen.len()
    }

    pub fn log(&self, level: &str, event: &str, message: &str) {
        if let Some(log_dir) = &self.config.log_dir {
            append_client_log(log_dir, &self.config.user, level, event, message);
        }
    }

    fn terminal_report(
        &self,
        workflow_id: &str,
        status: WorkflowStatus,
    ) -> Result<(String, String), MonitorError> {
        let metadata = self.engine.query_metadata(workflow_id)?;
        let subject = format!("Workflow {workflow_id}: {status}");

        let mut lines = Vec::new();
        if let Some(name) = metadata.get("workflowName").and_then(Value::as_str) {
            lines.push(format!("Workflow name: {name}"));
        }
        lines.push(format!("Workflow id: {workflow_id}"));
        lines.push(format!("Status: {status}"));
        for (label, field) in [("Started", "start"), ("Ended", "end")] {
            if let Some(value) = metadata.get(field).and_then(Value::as_str) {
                lines.push(format!("{label}: {value}"));
            }
        }
        lines.push(format!("Metadata: {}", self.links.metadata_link(workflow_id)));
        lines.push(format!("Timing: {}", self.links.timing_link(workflow_id)));

        if status == WorkflowStatus::Failed {
            let logs = self.engine.query_logs(workflow_id)?;
            let failing: Vec<&str> = logs
                .iter()
                .filter(|(_, shards)| shards.iter().any(|shard| shard.failed()))
                .map(|(call, _)| call.as_str())
                .collect();
            if !failing.is_empty() {
                lines.push(format!("Failing calls: {}", failing.join(", ")));
            }
        }

        Ok((subject, lines.join("\n")))
    }

    fn summary_report(&self, summary: &WorkflowSummary) -> (String, String) {
        let subject = format!("Workflow {}: {}", summary.id, summary.status);
        let mut lines = Vec::new();
        if let Some(name) = &summary.name {
            lines.push(format!("Workflow name: {name}"));
        }
        lines.push(format!("Workflow id: {}", summary.id));
        lines.push(format!("Status: {}", summary.status));
        for (label, field) in [("Started", &summary.start), ("Ended", &summary.end)] {
            if let Some(value) = field {
                lines.push(format!("{label}: {value}"));
            }
        }
        lines.push(format!("Metadata: {}", self.links.metadata_link(&summary.id)));
        lines.push(format!("Timing: {}", self.links.timing_link(&summary.id)));
        (subject, lines.join("\n"))
    }

    fn recipient_for(&self, summary: &WorkflowSummary) -> String {
        let owner = summary
            .labels
            .get(USERNAME_LABEL)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty() && *value != "*")
            .unwrap_or(&self.config.user);
        self.mail_address(owner)
    }

    fn mail_address(&self, user: &str) -> String {
        format!("{user}@{}", self.config.notify_domain)
    }

    fn send_notification(&self, recipient: &str, subject: &str, body: &str) {
        if self.config.no_notify {
            return;
        }
        if let Err(err) = self.notifier.notify(recipient, subject, body) {
            self.log(
                "warn",
                "notify.failed",
                &format!("notification to {recipient} failed: {err}"),
            );
        }
    }

    fn sleep_interval(&self) {
        if self.config.interval_secs > 0 {
            thread::sleep(Duration::from_secs(self.config.interval_secs));
        }
    }
}

pub fn since_timestamp(timezone: chrono_tz::Tz, days: i64) -> String {
    let now = chrono::Utc::now().with_timezone(&timezone);
    let cutoff = now - chrono::Duration::days(days);
    cutoff.to_rfc3339()
}

// Bounded retry for the run-command monitor hand-off: only the
// missing-expected-field class consumes budget; anything else stops the
// loop on the spot. Returns the remaining budget. Exhaustion is accepted
// silently so a monitoring failure never masks a successful submission.
pub fn monitor_with_retry<E: EngineApi>(
    monitor: &mut Monitor<'_, E>,
    workflow_id: &str,
) -> u32 {
    let mut budget = MONITOR_RETRY_BUDGET;
    while budget > 0 {
        match monitor.monitor_workflow(workflow_id) {
            Ok(_) => break,
            Err(err) if err.is_transient() => {
                budget -= 1;
                monitor.log(
                    "debug",
                    "monitor.retry",
                    &format!("transient monitor failure for {workflow_id}: {err}"),
                );
            }
            Err(err) => {
                monitor.log(
                    "error",
                    "monitor.stopped",
                    &format!("monitoring {workflow_id} stopped: {err}"),
                );
                break;
            }
        }
    }
    budget
}
