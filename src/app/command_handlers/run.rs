use crate::app::command_support::{
    engine_config, load_settings, parse_u64, resolve_log_dir, resolve_username, ParsedArgs,
};
use crate::engine::{EngineClient, SubmitRequest};
use crate::labels::{parse_labels, with_username};
use crate::monitor::{monitor_with_retry, Monitor, MonitorConfig};
use crate::notify::SendmailNotifier;
use crate::shared::append_client_log;
use crate::validate::validate_inputs;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

const RUN_VALUE_OPTIONS: &[&str] = &[
    "server",
    "label",
    "interval",
    "extra-option",
    "dependencies",
    "bucket",
    "username",
];
const RUN_SWITCHES: &[&str] = &[
    "validate",
    "monitor",
    "verbose",
    "no-notify",
    "disable-caching",
];

pub fn cmd_run(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, RUN_VALUE_OPTIONS, RUN_SWITCHES)?;
    let workflow = PathBuf::from(parsed.positional(0, "wdl")?);
    let inputs = PathBuf::from(parsed.positional(1, "json")?);

    let settings = load_settings()?;
    let username = resolve_username(&parsed);
    let log_dir = resolve_log_dir(&settings);

    if parsed.flag("validate") {
        let errors = validate_inputs(&workflow, &inputs);
        if !errors.is_empty() {
            return Err(format!(
                "{} contains the following errors:\n{}",
                inputs.display(),
                errors.join("\n")
            ));
        }
    }

    let labels = with_username(
        parse_labels(&parsed.values("label")).map_err(|err| err.to_string())?,
        &username,
    );
    let extra_options: BTreeMap<String, String> = parse_labels(&parsed.values("extra-option"))
        .map_err(|err| err.to_string())?
        .into_iter()
        .collect();

    let config = engine_config(&settings, parsed.value("server"))?;
    let client = EngineClient::new(config.clone());

    let dependencies = parsed.value("dependencies").map(PathBuf::from);
    let bucket = parsed
        .value("bucket")
        .map(str::to_string)
        .or_else(|| settings.default_bucket.clone());

    let request = SubmitRequest {
        workflow: &workflow,
        inputs: &inputs,
        dependencies: dependencies.as_deref(),
        extra_options,
        labels,
        disable_caching: parsed.flag("disable-caching"),
        bucket: bucket.as_deref(),
    };
    let handle = client.submit(&request).map_err(|err| err.to_string())?;

    let mut out = vec![
        "-------------Engine Links-------------".to_string(),
        config.metadata_link(&handle.id),
        config.timing_link(&handle.id),
    ];
    if let Some(log_dir) = &log_dir {
        append_client_log(
            log_dir,
            &username,
            "info",
            "run.submitted",
            &format!("workflow_id={} metadata={}", handle.id, config.metadata_link(&handle.id)),
        );
    }

    if parsed.flag("monitor") {
        out.push("These will also be e-mailed to you when the workflow completes.".to_string());
        println!("{}", out.join("\n"));

        // Give the engine time to register the job before the first poll.
        let grace = settings.monitor.submit_grace_secs;
        if grace > 0 {
            thread::sleep(Duration::from_secs(grace));
        }

        let interval = match parsed.value("interval") {
            Some(raw) => parse_u64(raw, "interval")?,
            None => settings.monitor.interval_secs,
        };
        let notifier = SendmailNotifier::new(
            settings.notify.sendmail_path.clone(),
            settings.notify.sender.clone(),
        );
        let monitor_config = MonitorConfig {
            user: username.clone(),
            interval_secs: interval,
            verbose: parsed.flag("verbose"),
            no_notify: parsed.flag("no-notify"),
            notify_domain: settings.notify.domain.clone(),
            timezone: settings.timezone(),
            log_dir: log_dir.clone(),
        };
        let mut monitor = Monitor::new(&client, config.clone(), &notifier, monitor_config);
        let remaining = monitor_with_retry(&mut monitor, &handle.id);
        if let Some(log_dir) = &log_dir {
            if remaining == 0 {
                append_client_log(
                    log_dir,
                    &username,
                    "warn",
                    "run.monitor.exhausted",
                    &format!("monitor retry budget exhausted for {}", handle.id),
                );
            }
        }
        out.clear();
    }

    out.push(
        serde_json::to_string_pretty(&json!({
            "id": handle.id,
            "status": "Submitted",
        }))
        .map_err(|err| err.to_string())?,
    );
    Ok(out.join("\n"))
}
