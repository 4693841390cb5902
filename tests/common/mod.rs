//! Common test utilities

#![allow(dead_code)]

use cmdflag::{Command, Flag, Predictor};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// The main command used across integration tests
pub fn main_command() -> Command {
    Command::new("example")
        .with_usage_long("example - a self-completing program")
        .with_flag(Flag::duration(
            "timeout",
            Duration::ZERO,
            "timeout for command execution",
        ))
        .with_flag(
            Flag::string("config-file", "", "local config file").with_predictor(Predictor::files("*")),
        )
}

/// Subcommands `demo` and `deploy`; `deploy --mode` completes `fast` or `slow`
pub fn subcommands() -> Vec<Command> {
    vec![
        Command::new("demo")
            .with_usage_line("example demo")
            .with_usage_long("Run a simple demo.")
            .with_flag(Flag::bool("subflag", false, "demo a subflag"))
            .with_flag(Flag::bool("v", false, "verbose"))
            .with_flag(Flag::string("level", "info", "log level").with_predictor(
                Predictor::set(["debug", "info", "warn"]),
            )),
        Command::new("deploy")
            .with_usage_line("example deploy")
            .with_flag(
                Flag::string("mode", "fast", "rollout mode")
                    .with_predictor(Predictor::set(["fast", "slow"])),
            )
            .with_args(Predictor::set(["staging", "production"])),
    ]
}

/// Create a temporary directory with a few files and a subdirectory
pub fn create_test_tree() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("app.yml"), "greeting: hi\n").unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "notes\n").unwrap();
    fs::create_dir(temp_dir.path().join("nested")).unwrap();
    fs::write(temp_dir.path().join("nested").join("inner.yml"), "").unwrap();
    temp_dir
}

/// Absolute path of `name` inside `dir`, as a string
pub fn path_in(dir: &Path, name: &str) -> String {
    dir.join(name).to_string_lossy().into_owned()
}
