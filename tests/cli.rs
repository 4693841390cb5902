//! End-to-end tests for the `example` binary

mod common;

use assert_cmd::Command;
use common::{create_test_tree, path_in};
use predicates::prelude::*;

fn example() -> Command {
    let mut cmd = Command::cargo_bin("example").unwrap();
    cmd.env_remove("COMP_LINE").env_remove("COMP_POINT");
    cmd
}

#[test]
fn test_no_subcommand_prints_usage() {
    example()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage of example:"))
        .stderr(predicate::str::contains("Subcommands:"))
        .stderr(predicate::str::contains("complete -C example example"));
}

#[test]
fn test_unknown_subcommand() {
    example()
        .arg("bogus")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mode provided but not defined: bogus"));
}

#[test]
fn test_demo_with_subflag() {
    example()
        .args(["demo", "--subflag"])
        .assert()
        .success()
        .stdout("demo stdflag: false subflag: true\n");
}

#[test]
fn test_ungrouped_flag_before_subcommand() {
    example()
        .args(["--std-flag", "demo"])
        .assert()
        .success()
        .stdout("demo stdflag: true subflag: false\n");
}

#[test]
fn test_bool_flag_explicit_value() {
    example()
        .args(["demo", "--subflag=false"])
        .assert()
        .success()
        .stdout(predicate::str::contains("subflag: false"));
}

#[test]
fn test_undefined_main_flag() {
    example()
        .arg("--bogus")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("flag provided but not defined: --bogus"));
}

#[test]
fn test_invalid_duration() {
    example()
        .args(["--timeout", "soon", "demo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid value \"soon\" for flag"));
}

#[test]
fn test_main_help_exits_zero() {
    example()
        .arg("--help")
        .assert()
        .success()
        .stderr(predicate::str::contains("--timeout <duration>"))
        .stderr(predicate::str::contains("demo:"));
}

#[test]
fn test_subcommand_help_exits_zero() {
    example()
        .args(["demo", "-h"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Usage of demo:"))
        .stderr(predicate::str::contains("Run a simple demo."))
        .stderr(predicate::str::contains("--subflag"));
}

#[test]
fn test_completion_of_subcommand() {
    example()
        .env("COMP_LINE", "example de")
        .assert()
        .success()
        .stdout("demo\n");
}

#[test]
fn test_completion_of_bool_subflag() {
    example()
        .env("COMP_LINE", "example demo --s")
        .assert()
        .success()
        .stdout("--subflag=0\n--subflag=1\n");
}

#[test]
fn test_completion_does_not_run_subcommand() {
    example()
        .env("COMP_LINE", "example demo ")
        .assert()
        .success()
        .stdout(predicate::str::contains("demo stdflag").not());
}

#[test]
fn test_completion_of_config_file_path() {
    let dir = create_test_tree();
    let line = format!("example --config-file {}/", dir.path().display());

    example()
        .env("COMP_LINE", line)
        .assert()
        .success()
        .stdout(predicate::str::contains(path_in(dir.path(), "app.yml")))
        .stdout(predicate::str::contains(format!("{}/", path_in(dir.path(), "nested"))));
}

#[test]
fn test_config_file_greeting() {
    let dir = create_test_tree();

    example()
        .args(["--config-file", &path_in(dir.path(), "app.yml"), "demo"])
        .assert()
        .success()
        .stdout("demo stdflag: false subflag: false\nhi\n");
}

#[test]
fn test_missing_config_file() {
    let dir = create_test_tree();

    example()
        .args(["--config-file", &path_in(dir.path(), "missing.yml"), "demo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Failed to read config file"));
}

#[test]
fn test_blank_greeting_is_rejected() {
    let dir = create_test_tree();
    let config = path_in(dir.path(), "blank.yml");
    std::fs::write(&config, "greeting: \"  \"\n").unwrap();

    example()
        .args(["--config-file", &config, "demo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Configuration error:"))
        .stderr(predicate::str::contains("greeting must not be blank"));
}
