#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Run,
    Query,
    Validate,
    Abort,
    Monitor,
    Restart,
    Explain,
    Log,
    Label,
    Email,
    List,
    Upload,
    Batch,
    Testapp,
    Install,
    Apps,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "run" => CliVerb::Run,
        "query" => CliVerb::Query,
        "validate" => CliVerb::Validate,
        "abort" => CliVerb::Abort,
        "monitor" => CliVerb::Monitor,
        "restart" => CliVerb::Restart,
        "explain" => CliVerb::Explain,
        "log" => CliVerb::Log,
        "label" => CliVerb::Label,
        "email" => CliVerb::Email,
        "list" => CliVerb::List,
        "upload" => CliVerb::Upload,
        "batch" => CliVerb::Batch,
        "testapp" => CliVerb::Testapp,
        "install" => CliVerb::Install,
        "apps" => CliVerb::Apps,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  run <wdl> <json>                     Submit a workflow for execution".to_string(),
        "  query [workflow_id]                  Query status/metadata/logs for a workflow"
            .to_string(),
        "  validate <wdl> <json>                Validate a JSON inputs file for a workflow"
            .to_string(),
        "  abort <workflow_id>                  Abort a submitted workflow".to_string(),
        "  monitor [workflow_id]                Poll workflows and notify on completion"
            .to_string(),
        "  restart <workflow_id>                Resubmit a workflow from its original submission"
            .to_string(),
        "  explain <workflow_id>                Explain the status of a workflow".to_string(),
        "  log <workflow_id>                    Print the commands executed by a workflow"
            .to_string(),
        "  label <workflow_id>                  Apply key:value labels to a workflow".to_string(),
        "  email <workflow_id>                  E-mail the terminal report for a workflow"
            .to_string(),
        "  list                                 List recent workflows for a user".to_string(),
        "  upload <wdl> <json>                  Upload workflow input files to a bucket"
            .to_string(),
        "  batch <app_name> <samples>           Build per-sample projects from an installed app"
            .to_string(),
        "  testapp <app_dir> <samples>          Build per-sample projects from a local app dir"
            .to_string(),
        "  install <zip_file>                   Install an app bundle into the app directory"
            .to_string(),
        "  apps                                 List installed apps".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}
