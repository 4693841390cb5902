//! Commands and their declared flags

use crate::complete::{CompletionCommand, Predictor};
use crate::flag::{flag_name, ErrorHandling, FlagSet, FlagType, FlagValue, Var};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Handler invoked with the resolved command and its remaining arguments
pub type RunFn = Rc<dyn Fn(&mut Command, Vec<String>) -> anyhow::Result<()>>;

/// A declared flag
///
/// The flag's type is the variant of its default value, so the two can never
/// disagree.
#[derive(Debug, Clone)]
pub struct Flag {
    pub name: String,
    pub default: FlagValue,
    pub usage: String,
    /// Candidates offered for the flag's value; ignored for bool flags
    pub predictor: Predictor,
}

impl Flag {
    pub fn new(name: impl Into<String>, default: FlagValue, usage: impl Into<String>) -> Self {
        Flag {
            name: name.into(),
            default,
            usage: usage.into(),
            predictor: Predictor::nothing(),
        }
    }

    pub fn int(name: impl Into<String>, default: i64, usage: impl Into<String>) -> Self {
        Flag::new(name, FlagValue::Int(default), usage)
    }

    pub fn string(name: impl Into<String>, default: impl Into<String>, usage: impl Into<String>) -> Self {
        Flag::new(name, FlagValue::Str(default.into()), usage)
    }

    pub fn duration(name: impl Into<String>, default: Duration, usage: impl Into<String>) -> Self {
        Flag::new(name, FlagValue::Duration(default), usage)
    }

    pub fn bool(name: impl Into<String>, default: bool, usage: impl Into<String>) -> Self {
        Flag::new(name, FlagValue::Bool(default), usage)
    }

    pub fn with_predictor(mut self, predictor: Predictor) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn flag_type(&self) -> FlagType {
        self.default.flag_type()
    }
}

/// A named operating mode with its own flags and run handler
pub struct Command {
    /// Unique name, also the completion key
    pub name: String,
    /// One-line summary shown in the subcommand table
    pub usage_line: String,
    /// Full help text
    pub usage_long: String,
    pub flags: Vec<Flag>,
    /// Positional argument predictor
    pub args: Predictor,
    handler: Option<RunFn>,
    flag_set: Option<FlagSet>,
    bound: bool,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Command {
            name: name.into(),
            usage_line: String::new(),
            usage_long: String::new(),
            flags: Vec::new(),
            args: Predictor::nothing(),
            handler: None,
            flag_set: None,
            bound: false,
        }
    }

    pub fn with_usage_line(mut self, usage: impl Into<String>) -> Self {
        self.usage_line = usage.into();
        self
    }

    pub fn with_usage_long(mut self, usage: impl Into<String>) -> Self {
        self.usage_long = usage.into();
        self
    }

    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn with_args(mut self, predictor: Predictor) -> Self {
        self.args = predictor;
        self
    }

    pub fn with_run<F>(mut self, run: F) -> Self
    where
        F: Fn(&mut Command, Vec<String>) -> anyhow::Result<()> + 'static,
    {
        self.handler = Some(Rc::new(run));
        self
    }

    /// Whether a non-empty binding has been made
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn has_flag_set(&self) -> bool {
        self.flag_set.is_some()
    }

    /// Bind declared flags to caller-owned storage and return the flag set
    ///
    /// Every requested name is checked against the declarations before the
    /// flag set is touched. An empty binding only materializes the flag set
    /// and leaves the command unbound.
    ///
    /// # Panics
    ///
    /// If the command was already bound, if a name is not declared or appears
    /// twice, or if the storage type differs from the declared flag type.
    pub fn bind_flag_set<'a, I>(&mut self, targets: I) -> &mut FlagSet
    where
        I: IntoIterator<Item = (&'a str, Var)>,
    {
        if self.bound {
            panic!("flag set already bound for command: {}", self.name);
        }

        let mut resolved = Vec::new();
        for (name, var) in targets {
            let index = self
                .flags
                .iter()
                .position(|flag| flag.name == name)
                .unwrap_or_else(|| panic!("attempt to bind invalid flag: {}", name));
            if resolved.iter().any(|(seen, _)| *seen == index) {
                panic!("flag {} bound twice for command {}", name, self.name);
            }
            let declared = self.flags[index].flag_type();
            if declared != var.flag_type() {
                panic!(
                    "flag {} of command {} is {:?} but was bound to {:?} storage",
                    name,
                    self.name,
                    declared,
                    var.flag_type()
                );
            }
            resolved.push((index, var));
        }

        let fs = self
            .flag_set
            .get_or_insert_with(|| command_flag_set(&self.name, &self.usage_long));
        for (index, var) in &resolved {
            let flag = &self.flags[*index];
            var.assign(&flag.default);
            fs.var(var.clone(), &flag.name, &flag.usage);
        }
        self.bound = !resolved.is_empty();
        fs
    }

    /// The command's flag set, created empty on first access
    pub fn flag_set(&mut self) -> &mut FlagSet {
        if self.flag_set.is_none() {
            self.bind_flag_set(Vec::new());
        }
        self.flag_set
            .get_or_insert_with(|| command_flag_set(&self.name, &self.usage_long))
    }

    /// Take over an existing flag set as this command's own
    pub(crate) fn adopt_flag_set(&mut self, fs: FlagSet) {
        self.flag_set = Some(fs);
    }

    /// Completion keys for every flag of this command
    ///
    /// Covers the declared flags and anything else registered on the flag
    /// set. Bool flags are offered only as complete `=0`/`=1` tokens.
    pub fn complete_flags(&mut self) -> BTreeMap<String, Predictor> {
        let mut completions = BTreeMap::new();
        for flag in &self.flags {
            insert_completion(
                &mut completions,
                &flag.name,
                flag.flag_type() == FlagType::Bool,
                flag.predictor.clone(),
            );
        }

        self.flag_set();
        if let Some(fs) = &self.flag_set {
            fs.visit_all(|entry| {
                if !self.flags.iter().any(|flag| flag.name == entry.name) {
                    insert_completion(&mut completions, &entry.name, entry.is_bool(), Predictor::nothing());
                }
            });
        }
        completions
    }

    /// Completion specification of this command without subcommands
    pub fn complete_command(&mut self) -> CompletionCommand {
        CompletionCommand {
            sub: BTreeMap::new(),
            flags: self.complete_flags(),
            args: self.args.clone(),
        }
    }

    /// Invoke the run handler with the given arguments
    pub fn execute(&mut self, args: Vec<String>) -> anyhow::Result<()> {
        let handler = self
            .handler
            .clone()
            .ok_or_else(|| anyhow::anyhow!("command {} has no run handler", self.name))?;
        handler(self, args)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("usage_line", &self.usage_line)
            .field("flags", &self.flags)
            .field("flag_set", &self.flag_set)
            .field("bound", &self.bound)
            .finish()
    }
}

fn insert_completion(
    completions: &mut BTreeMap<String, Predictor>,
    name: &str,
    is_bool: bool,
    predictor: Predictor,
) {
    let key = flag_name(name);
    // A bool value must be attached with `=`; a bare suggestion would make
    // the shell append a space and the next word would be misread.
    if is_bool {
        completions.insert(format!("{}=0", key), Predictor::nothing());
        completions.insert(format!("{}=1", key), Predictor::nothing());
    } else {
        completions.insert(key, predictor);
    }
}

fn command_flag_set(name: &str, usage_long: &str) -> FlagSet {
    let mut fs = FlagSet::new(name, ErrorHandling::ExitOnError);
    let header = format!("Usage of {}:\n\n{}", name, ensure_newline(usage_long));
    fs.set_usage(Rc::new(move |fs: &FlagSet| format!("{}{}", header, fs.defaults_text())));
    fs
}

pub(crate) fn ensure_newline(s: &str) -> String {
    if s.ends_with('\n') {
        s.to_string()
    } else {
        format!("{}\n", s)
    }
}
