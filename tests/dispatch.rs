//! Integration tests for dispatching an invocation to a subcommand

mod common;

use cmdflag::{dispatch, Command, Invocation, Resolution, Slot, Var};
use common::{main_command, subcommands};
use std::time::Duration;

#[test]
fn test_dispatch_returns_subcommand_and_trailing_args() {
    let mut main = main_command();
    let inv = Invocation::new(["example", "demo", "--subflag"]);

    match dispatch(inv, &mut main, subcommands()) {
        Resolution::Dispatched { command, args } => {
            assert_eq!(command.name, "demo");
            assert_eq!(args, vec!["--subflag".to_string()]);
        }
        other => panic!("expected dispatch, got {:?}", other),
    }
}

#[test]
fn test_dispatched_command_parses_its_own_flags() {
    let mut main = main_command();
    let subflag = Slot::new(false);
    let seen = subflag.clone();
    let demo = Command::new("demo")
        .with_flag(cmdflag::Flag::bool("subflag", false, "demo a subflag"))
        .with_run(move |cmd, args| {
            let flags = cmd.bind_flag_set([("subflag", Var::from(&seen))]);
            flags.parse(&args)?;
            Ok(())
        });

    let inv = Invocation::new(["example", "demo", "--subflag"]);
    let (mut command, args) = match dispatch(inv, &mut main, vec![demo]) {
        Resolution::Dispatched { command, args } => (command, args),
        other => panic!("expected dispatch, got {:?}", other),
    };
    command.execute(args).unwrap();

    assert!(subflag.get());
    assert!(command.is_bound());
}

#[test]
fn test_missing_subcommand_fails_with_full_usage() {
    let mut main = main_command();
    let timeout = Slot::new(Duration::ZERO);
    main.bind_flag_set([("timeout", Var::from(&timeout))]);

    match dispatch(Invocation::new(["example"]), &mut main, subcommands()) {
        Resolution::Failed { message, usage } => {
            assert_eq!(message, None);
            assert!(usage.starts_with("Usage of example:\nexample - a self-completing program\n"));
            assert!(usage.contains("--timeout <duration>"));
            assert!(usage.contains("timeout for command execution"));
            assert!(usage.contains("\nSubcommands:\n  demo:    example demo\n  deploy:  example deploy\n"));
            assert!(usage.ends_with("\tcomplete -C example example\n"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_empty_argument_vector_fails() {
    let mut main = main_command();
    let resolution = dispatch(Invocation::new(Vec::<String>::new()), &mut main, subcommands());
    assert!(matches!(resolution, Resolution::Failed { message: None, .. }));
}

#[test]
fn test_unknown_subcommand_is_reported() {
    let mut main = main_command();
    match dispatch(Invocation::new(["example", "bogus"]), &mut main, subcommands()) {
        Resolution::Failed { message, usage } => {
            assert_eq!(message.as_deref(), Some("mode provided but not defined: bogus"));
            assert!(usage.contains("Subcommands:"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn test_main_flags_precede_subcommand() {
    let mut main = main_command();
    let timeout = Slot::new(Duration::ZERO);
    let config_file = Slot::new(String::new());
    main.bind_flag_set([
        ("timeout", Var::from(&timeout)),
        ("config-file", Var::from(&config_file)),
    ]);

    let inv = Invocation::new([
        "example",
        "--timeout=1m30s",
        "--config-file",
        "app.yml",
        "deploy",
        "staging",
    ]);
    match dispatch(inv, &mut main, subcommands()) {
        Resolution::Dispatched { command, args } => {
            assert_eq!(command.name, "deploy");
            assert_eq!(args, vec!["staging".to_string()]);
        }
        other => panic!("expected dispatch, got {:?}", other),
    }
    assert_eq!(timeout.get(), Duration::from_secs(90));
    assert_eq!(config_file.get(), "app.yml");
}

#[test]
fn test_ungrouped_flags_share_storage_after_merge() {
    let mut main = main_command();
    let timeout = Slot::new(Duration::ZERO);
    main.bind_flag_set([("timeout", Var::from(&timeout))]);

    let mut inv = Invocation::new(["example", "--std-flag", "--timeout", "2s", "demo"]);
    let std_flag = inv.flags().bool("std-flag", false, "placeholder");
    let resolution = dispatch(inv, &mut main, subcommands());

    assert!(matches!(resolution, Resolution::Dispatched { .. }));
    assert!(std_flag.get());
    assert_eq!(timeout.get(), Duration::from_secs(2));
}

#[test]
fn test_later_subcommand_with_same_name_wins() {
    let mut main = main_command();
    let subs = vec![
        Command::new("demo").with_usage_line("first"),
        Command::new("demo").with_usage_line("second"),
    ];
    match dispatch(Invocation::new(["example", "demo"]), &mut main, subs) {
        Resolution::Dispatched { command, args } => {
            assert_eq!(command.usage_line, "second");
            assert!(args.is_empty());
        }
        other => panic!("expected dispatch, got {:?}", other),
    }
}

#[test]
fn test_no_subcommands_registered() {
    let mut main = main_command();
    match dispatch(Invocation::new(["example", "demo"]), &mut main, Vec::new()) {
        Resolution::Failed { message, usage } => {
            assert_eq!(message.as_deref(), Some("mode provided but not defined: demo"));
            assert!(!usage.contains("Subcommands:"));
            assert!(usage.contains("complete -C example example"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}
