use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod apps;
pub mod monitoring;
pub mod queries;
pub mod run;
pub mod transfer;
pub mod workflow_ops;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Run => run::cmd_run(&args[1..]),
        CliVerb::Query => queries::cmd_query(&args[1..]),
        CliVerb::Validate => workflow_ops::cmd_validate(&args[1..]),
        CliVerb::Abort => workflow_ops::cmd_abort(&args[1..]),
        CliVerb::Monitor => monitoring::cmd_monitor(&args[1..]),
        CliVerb::Restart => workflow_ops::cmd_restart(&args[1..]),
        CliVerb::Explain => workflow_ops::cmd_explain(&args[1..]),
        CliVerb::Log => queries::cmd_log(&args[1..]),
        CliVerb::Label => workflow_ops::cmd_label(&args[1..]),
        CliVerb::Email => monitoring::cmd_email(&args[1..]),
        CliVerb::List => queries::cmd_list(&args[1..]),
        CliVerb::Upload => transfer::cmd_upload(&args[1..]),
        CliVerb::Batch => apps::cmd_batch(&args[1..]),
        CliVerb::Testapp => apps::cmd_testapp(&args[1..]),
        CliVerb::Install => apps::cmd_install(&args[1..]),
        CliVerb::Apps => apps::cmd_apps(&args[1..]),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
