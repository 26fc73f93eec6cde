use crate::app::command_support::{
    engine_config, load_settings, parse_i64, parse_u64, resolve_log_dir, resolve_username,
    ParsedArgs,
};
use crate::engine::EngineClient;
use crate::monitor::{Monitor, MonitorConfig};
use crate::notify::SendmailNotifier;

const MONITOR_VALUE_OPTIONS: &[&str] = &["server", "username", "interval", "days"];
const MONITOR_SWITCHES: &[&str] = &["verbose", "no-notify", "daemon"];

pub fn cmd_monitor(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, MONITOR_VALUE_OPTIONS, MONITOR_SWITCHES)?;
    let settings = load_settings()?;
    let config = engine_config(&settings, parsed.value("server"))?;
    let client = EngineClient::new(config.clone());
    let username = resolve_username(&parsed);

    let interval = match parsed.value("interval") {
        Some(raw) => parse_u64(raw, "interval")?,
        None => settings.monitor.interval_secs,
    };
    let days = match parsed.value("days") {
        Some(raw) => parse_i64(raw, "days")?,
        None => settings.query_days,
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
        log_dir: resolve_log_dir(&settings),
    };
    let mut monitor = Monitor::new(&client, config, &notifier, monitor_config);

    println!("-------------Monitoring Workflow-------------");
    if let Some(workflow_id) = parsed.optional_positional(0) {
        let status = monitor
            .monitor_workflow(workflow_id)
            .map_err(|err| err.to_string())?;
        return Ok(format!("Workflow {workflow_id} finished with status {status}"));
    }

    let owner = if parsed.flag("daemon") {
        "*"
    } else {
        username.as_str()
    };
    monitor.run(owner, days).map_err(|err| err.to_string())?;
    Ok(String::new())
}

const EMAIL_VALUE_OPTIONS: &[&str] = &["server", "username"];

pub fn cmd_email(args: &[String]) -> Result<String, String> {
    let parsed = ParsedArgs::parse(args, EMAIL_VALUE_OPTIONS, &[])?;
    let workflow_id = parsed.positional(0, "workflow_id")?;
    let settings = load_settings()?;
    let config = engine_config(&settings, parsed.value("server"))?;
    let client = EngineClient::new(config.clone());
    let username = resolve_username(&parsed);

    let notifier = SendmailNotifier::new(
        settings.notify.sendmail_path.clone(),
        settings.notify.sender.clone(),
    );
    let monitor_config = MonitorConfig {
        user: username.clone(),
        interval_secs: 0,
        verbose: false,
        no_notify: false,
        notify_domain: settings.notify.domain.clone(),
        timezone: settings.timezone(),
        log_dir: resolve_log_dir(&settings),
    };
    let mut monitor = Monitor::new(&client, config, &notifier, monitor_config);
    let status = monitor
        .monitor_workflow(workflow_id)
        .map_err(|err| err.to_string())?;
    Ok(format!(
        "Workflow {workflow_id} report sent to {username}; status {status}"
    ))
}
