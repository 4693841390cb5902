//! example - a self-completing program
//!
//! Install completions with `complete -C example example`.

use cmdflag::flag::format_duration;
use cmdflag::{Command, Error, Flag, Invocation, Predictor, Slot, Var};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::process;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DOC: &str = "example - a self-completing program";

/// Settings read from `--config-file`
#[derive(Debug, Clone, Default, Deserialize)]
struct DemoConfig {
    /// Extra line printed by the demo subcommand
    #[serde(default)]
    greeting: Option<String>,
}

fn load_config(path: &Path) -> cmdflag::Result<DemoConfig> {
    let contents = fs::read_to_string(path).map_err(|error| Error::ConfigFile {
        path: path.to_path_buf(),
        error,
    })?;
    let config: DemoConfig = serde_yaml::from_str(&contents)?;
    if config.greeting.as_deref().is_some_and(|g| g.trim().is_empty()) {
        return Err(Error::Config(format!("{}: greeting must not be blank", path.display())));
    }
    Ok(config)
}

fn main_command() -> Command {
    Command::new("example")
        .with_usage_long(DOC)
        .with_flag(Flag::duration(
            "timeout",
            Duration::ZERO,
            "timeout for command execution",
        ))
        .with_flag(
            Flag::string("config-file", "", "local config file").with_predictor(Predictor::files("*")),
        )
}

fn demo_command(std_flag: Slot<bool>, config: Slot<DemoConfig>) -> Command {
    Command::new("demo")
        .with_usage_line("example demo")
        .with_usage_long("Run a simple demo.")
        .with_flag(Flag::bool("subflag", false, "demo a subflag"))
        .with_run(move |cmd, args| {
            let subflag = Slot::new(false);
            let flags = cmd.bind_flag_set([("subflag", Var::from(&subflag))]);
            flags.parse(&args)?;

            println!("demo stdflag: {} subflag: {}", std_flag.get(), subflag.get());
            if let Some(greeting) = config.get().greeting {
                println!("{}", greeting);
            }
            Ok(())
        })
}

fn run() -> anyhow::Result<()> {
    let mut inv = Invocation::from_env();
    let std_flag = inv.flags().bool(
        "std-flag",
        false,
        "Just a placeholder to show standard flag support.",
    );

    let timeout = Slot::new(Duration::ZERO);
    let config_file = Slot::new(String::new());
    let config = Slot::new(DemoConfig::default());

    let mut main_cmd = main_command();
    main_cmd.bind_flag_set([
        ("timeout", Var::from(&timeout)),
        ("config-file", Var::from(&config_file)),
    ]);

    let subcommands = vec![demo_command(std_flag, config.clone())];
    let (mut cmd, args) = cmdflag::parse(inv, &mut main_cmd, subcommands);

    let path = config_file.get();
    if !path.is_empty() {
        config.set(load_config(Path::new(&path))?);
    }
    if !timeout.get().is_zero() {
        debug!(timeout = %format_duration(timeout.get()), "command timeout requested");
    }

    cmd.execute(args)
}

fn main() {
    // stdout carries completion candidates, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
