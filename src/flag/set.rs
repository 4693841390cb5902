//! Flag sets and argument parsing
//!
//! A [`FlagSet`] keeps the registered flags and their storage. Every parse
//! builds a `clap::Command` from the registrations, lets clap match the
//! argument vector, and writes the matched values back into the storage.

use crate::error::{is_help, FlagError, FlagResult};
use crate::flag::value::{parse_duration, FlagType, FlagValue, Slot, Var};
use clap::builder::BoolishValueParser;
use clap::error::{ContextKind, ErrorKind};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::BTreeMap;
use std::fmt;
use std::process;
use std::rc::Rc;
use std::time::Duration;

/// Renders the usage text of a flag set
pub type UsageFn = Rc<dyn Fn(&FlagSet) -> String>;

/// Engine ids of the positional remainder and the help switch; a flag name
/// can never start with `[`
const REST_ID: &str = "[args]";
const HELP_ID: &str = "[help]";

/// What [`FlagSet::parse`] does after reporting a parse failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorHandling {
    /// Return the error to the caller
    ContinueOnError,
    /// Exit the process: status 0 for a help request, 1 otherwise
    ExitOnError,
    /// Panic with the error message
    PanicOnError,
}

/// A registered flag
#[derive(Debug, Clone)]
pub struct FlagEntry {
    pub name: String,
    pub usage: String,
    pub value: Var,
    /// Value of the storage at registration time
    pub default: FlagValue,
}

impl FlagEntry {
    pub fn is_bool(&self) -> bool {
        self.value.is_bool()
    }
}

/// Render a flag name with its conventional prefix: `-x` for one-character
/// names, `--name` for anything longer
pub fn flag_name(name: &str) -> String {
    if name.chars().count() > 1 {
        format!("--{}", name)
    } else {
        format!("-{}", name)
    }
}

/// A named set of flags parsed from one argument vector
pub struct FlagSet {
    name: String,
    error_handling: ErrorHandling,
    flags: BTreeMap<String, FlagEntry>,
    args: Vec<String>,
    parsed: bool,
    usage: Option<UsageFn>,
}

impl FlagSet {
    pub fn new(name: impl Into<String>, error_handling: ErrorHandling) -> Self {
        FlagSet {
            name: name.into(),
            error_handling,
            flags: BTreeMap::new(),
            args: Vec::new(),
            parsed: false,
            usage: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error_handling(&self) -> ErrorHandling {
        self.error_handling
    }

    /// Register a flag backed by existing storage
    ///
    /// The current content of the storage becomes the flag's default.
    /// Panics if the name is malformed or already registered.
    pub fn var(&mut self, value: Var, name: &str, usage: &str) {
        if name.is_empty() || name.starts_with(['-', '[']) || name.contains(['=', ' ']) {
            panic!("flag {:?} has an invalid name", name);
        }
        if self.flags.contains_key(name) {
            if self.name.is_empty() {
                panic!("flag redefined: {}", name);
            }
            panic!("{} flag redefined: {}", self.name, name);
        }
        let default = value.value();
        self.flags.insert(
            name.to_string(),
            FlagEntry {
                name: name.to_string(),
                usage: usage.to_string(),
                value,
                default,
            },
        );
    }

    pub fn int(&mut self, name: &str, default: i64, usage: &str) -> Slot<i64> {
        let slot = Slot::new(default);
        self.var(Var::from(&slot), name, usage);
        slot
    }

    pub fn string(&mut self, name: &str, default: &str, usage: &str) -> Slot<String> {
        let slot = Slot::new(default.to_string());
        self.var(Var::from(&slot), name, usage);
        slot
    }

    pub fn duration(&mut self, name: &str, default: Duration, usage: &str) -> Slot<Duration> {
        let slot = Slot::new(default);
        self.var(Var::from(&slot), name, usage);
        slot
    }

    pub fn bool(&mut self, name: &str, default: bool, usage: &str) -> Slot<bool> {
        let slot = Slot::new(default);
        self.var(Var::from(&slot), name, usage);
        slot
    }

    pub fn lookup(&self, name: &str) -> Option<&FlagEntry> {
        self.flags.get(name)
    }

    /// Visit every registered flag in lexicographic order
    pub fn visit_all(&self, mut f: impl FnMut(&FlagEntry)) {
        for entry in self.flags.values() {
            f(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Whether [`parse`](Self::parse) has been called
    pub fn parsed(&self) -> bool {
        self.parsed
    }

    /// Positional arguments left after parsing
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Replace the usage renderer
    pub fn set_usage(&mut self, usage: UsageFn) {
        self.usage = Some(usage);
    }

    /// Full usage text, from the installed renderer or the default one
    pub fn usage_text(&self) -> String {
        match &self.usage {
            Some(render) => render(self),
            None if self.name.is_empty() => format!("Usage:\n{}", self.defaults_text()),
            None => format!("Usage of {}:\n{}", self.name, self.defaults_text()),
        }
    }

    /// Listing of every flag with its value name, usage and non-zero
    /// default, as rendered by the engine's help writer
    pub fn defaults_text(&self) -> String {
        if self.flags.is_empty() {
            return String::new();
        }
        let rendered = self.command().help_template("{options}").render_help().to_string();
        let listing = rendered.trim_end();
        if listing.is_empty() {
            String::new()
        } else {
            format!("{}\n", listing)
        }
    }

    /// Parse flags from `arguments`, which must not include the program name
    ///
    /// Parsing stops at the first non-flag argument or after `--`; the
    /// remainder is available from [`args`](Self::args). On failure the error
    /// and the usage text are written to stderr and the configured
    /// [`ErrorHandling`] applies.
    pub fn parse(&mut self, arguments: &[String]) -> FlagResult<()> {
        self.parsed = true;
        let err = match self.command().try_get_matches_from(arguments) {
            Ok(matches) => {
                self.store(&matches);
                return Ok(());
            }
            Err(err) => flag_error(&err),
        };
        self.args.clear();

        if !is_help(&err) {
            eprintln!("{}", err);
        }
        eprint!("{}", self.usage_text());

        match self.error_handling {
            ErrorHandling::ContinueOnError => Err(err),
            ErrorHandling::ExitOnError => process::exit(if is_help(&err) { 0 } else { 1 }),
            ErrorHandling::PanicOnError => panic!("{}", err),
        }
    }

    /// The engine command for the current registrations
    fn command(&self) -> Command {
        let name = if self.name.is_empty() { "flags" } else { self.name.as_str() };
        let mut cmd = Command::new(name.to_string())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true)
            .args(self.flags.values().map(engine_arg))
            .arg(
                Arg::new(REST_ID)
                    .action(ArgAction::Append)
                    .num_args(1..)
                    .trailing_var_arg(true)
                    .value_parser(clap::value_parser!(String))
                    .hide(true),
            );

        // A registered `h` or `help` flag takes precedence over the help switch.
        let short = !self.flags.contains_key("h");
        let long = !self.flags.contains_key("help");
        if short || long {
            let mut help = Arg::new(HELP_ID).action(ArgAction::Help).hide(true);
            if short {
                help = help.short('h');
            }
            if long {
                help = help.long("help");
            }
            cmd = cmd.arg(help);
        }
        cmd
    }

    /// Copy matched values into the registered storage
    fn store(&mut self, matches: &ArgMatches) {
        for entry in self.flags.values() {
            let id = entry.name.as_str();
            let matched = match entry.value.flag_type() {
                FlagType::Int => matches.get_one::<i64>(id).map(|v| FlagValue::Int(*v)),
                FlagType::String => matches.get_one::<String>(id).cloned().map(FlagValue::Str),
                FlagType::Duration => matches.get_one::<Duration>(id).map(|v| FlagValue::Duration(*v)),
                FlagType::Bool => matches.get_one::<bool>(id).map(|v| FlagValue::Bool(*v)),
            };
            if let Some(value) = matched {
                entry.value.assign(&value);
            }
        }
        self.args = matches
            .get_many::<String>(REST_ID)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSet")
            .field("name", &self.name)
            .field("error_handling", &self.error_handling)
            .field("flags", &self.flags.keys().collect::<Vec<_>>())
            .field("args", &self.args)
            .field("parsed", &self.parsed)
            .finish()
    }
}

/// One engine argument per registered flag: `-x` for one-character names,
/// `--name` otherwise
fn engine_arg(entry: &FlagEntry) -> Arg {
    let (word, usage) = unquote_usage(entry);
    let mut help = usage;
    if !entry.default.is_zero() {
        match &entry.default {
            FlagValue::Str(s) => help.push_str(&format!(" (default {:?})", s)),
            other => help.push_str(&format!(" (default {})", other)),
        }
    }

    let mut arg = Arg::new(entry.name.clone())
        .help(help)
        .value_name(word)
        .action(ArgAction::Set);
    let mut chars = entry.name.chars();
    arg = match (chars.next(), chars.next()) {
        (Some(short), None) => arg.short(short),
        _ => arg.long(entry.name.clone()),
    };

    match entry.value.flag_type() {
        // Bool values attach with `=` only; a bare flag means true.
        FlagType::Bool => arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_parser(BoolishValueParser::new()),
        FlagType::Int => arg
            .allow_negative_numbers(true)
            .value_parser(clap::value_parser!(i64)),
        FlagType::String => arg
            .allow_hyphen_values(true)
            .value_parser(clap::value_parser!(String)),
        FlagType::Duration => arg.value_parser(parse_duration),
    }
}

/// Translate an engine error into the flag error it reports
fn flag_error(err: &clap::Error) -> FlagError {
    let context = |kind: ContextKind| err.get(kind).map(ToString::to_string).unwrap_or_default();

    match err.kind() {
        ErrorKind::DisplayHelp => FlagError::Help,
        ErrorKind::UnknownArgument => FlagError::NotDefined(context(ContextKind::InvalidArg)),
        kind @ (ErrorKind::InvalidValue | ErrorKind::ValueValidation) => {
            let flag = flag_token(&context(ContextKind::InvalidArg));
            let value = context(ContextKind::InvalidValue);
            if kind == ErrorKind::InvalidValue && value.is_empty() {
                return FlagError::NeedsArgument(flag);
            }
            let reason = std::error::Error::source(err)
                .map(ToString::to_string)
                .unwrap_or_else(|| "invalid value".to_string());
            FlagError::InvalidValue {
                flag,
                value,
                reason,
            }
        }
        kind => FlagError::Rejected(kind.as_str().unwrap_or("invalid arguments").to_string()),
    }
}

/// The flag itself out of an engine rendering such as `--timeout <duration>`
fn flag_token(rendered: &str) -> String {
    rendered
        .split([' ', '[', '='])
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Extract a back-quoted value name from the usage text, falling back to the
/// flag's type word
fn unquote_usage(entry: &FlagEntry) -> (String, String) {
    let usage = &entry.usage;
    if let Some(start) = usage.find('`') {
        if let Some(len) = usage[start + 1..].find('`') {
            let word = &usage[start + 1..start + 1 + len];
            let plain = format!("{}{}{}", &usage[..start], word, &usage[start + 2 + len..]);
            return (word.to_string(), plain);
        }
    }
    (entry.value.flag_type().type_word().to_string(), usage.clone())
}
