use clap::CommandFactory;

use super::*;

#[test]
fn cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn navigate_help_says_each_run_starts_fresh() {
    let cli = Cli::command();
    let navigate = cli.find_subcommand("navigate").unwrap();
    let help = navigate.get_long_about().unwrap().to_string();
    assert!(help.contains("fresh stack"));
}

#[test]
fn navigate_parses_primitive_and_url() {
    let cli = Cli::try_parse_from(["session-shell", "navigate", "navigateTo", "/pages/mine/index"]).unwrap();
    match cli.command {
        Command::Navigate { primitive, url } => {
            assert_eq!(primitive, "navigateTo");
            assert_eq!(url, "/pages/mine/index");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
