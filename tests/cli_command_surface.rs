use coxswain::app::cli::{cli_help_lines, parse_cli_verb, CliVerb};
use coxswain::app::command_handlers::run_cli;

#[test]
fn every_subcommand_verb_parses() {
    let expected = [
        ("run", CliVerb::Run),
        ("query", CliVerb::Query),
        ("validate", CliVerb::Validate),
        ("abort", CliVerb::Abort),
        ("monitor", CliVerb::Monitor),
        ("restart", CliVerb::Restart),
        ("explain", CliVerb::Explain),
        ("log", CliVerb::Log),
        ("label", CliVerb::Label),
        ("email", CliVerb::Email),
        ("list", CliVerb::List),
        ("upload", CliVerb::Upload),
        ("batch", CliVerb::Batch),
        ("testapp", CliVerb::Testapp),
        ("install", CliVerb::Install),
        ("apps", CliVerb::Apps),
    ];
    for (raw, verb) in expected {
        assert_eq!(parse_cli_verb(raw), verb, "verb `{raw}`");
    }
    assert_eq!(parse_cli_verb("bogus"), CliVerb::Unknown);
}

#[test]
fn help_lists_every_subcommand() {
    let help = cli_help_lines().join("\n");
    for verb in [
        "run", "query", "validate", "abort", "monitor", "restart", "explain", "log", "label",
        "email", "list", "upload", "batch", "testapp", "install", "apps",
    ] {
        assert!(help.contains(verb), "help is missing `{verb}`");
    }
}

#[test]
fn empty_invocation_prints_help() {
    let output = run_cli(Vec::new()).expect("help output");
    assert!(output.contains("Commands:"));
    assert!(output.contains("run <wdl> <json>"));
}

#[test]
fn unknown_command_is_an_error() {
    let err = run_cli(vec!["bogus".to_string()]).expect_err("unknown command");
    assert!(err.contains("bogus"));
}

#[test]
fn validate_requires_both_positional_arguments() {
    let err = run_cli(vec!["validate".to_string()]).expect_err("missing arguments");
    assert!(err.contains("wdl"));
}

#[test]
fn unknown_options_are_rejected_before_any_network_call() {
    let err = run_cli(vec![
        "abort".to_string(),
        "wf-1".to_string(),
        "--bogus".to_string(),
    ])
    .expect_err("unknown option");
    assert!(err.contains("--bogus"));
}
