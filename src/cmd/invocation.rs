//! The argument source of one program run
//!
//! An [`Invocation`] holds everything the dispatcher reads from the process:
//! the argument vector, the shell's completion line and the ungrouped flag
//! set for flags registered outside any command. It is built once, and
//! [`dispatch`](crate::cmd::dispatch) consumes it.

use crate::complete::{COMP_LINE, COMP_POINT};
use crate::flag::{ErrorHandling, FlagSet};
use std::env;
use std::path::Path;

pub struct Invocation {
    pub(crate) args: Vec<String>,
    pub(crate) comp_line: Option<String>,
    pub(crate) comp_point: Option<String>,
    pub(crate) flags: FlagSet,
}

impl Invocation {
    /// Build from an explicit argument vector, program name first
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let program = args
            .first()
            .and_then(|arg0| Path::new(arg0).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Invocation {
            args,
            comp_line: None,
            comp_point: None,
            flags: FlagSet::new(program, ErrorHandling::ExitOnError),
        }
    }

    /// Build from the process arguments and completion environment
    pub fn from_env() -> Self {
        let mut inv = Invocation::new(env::args());
        inv.comp_line = env::var(COMP_LINE).ok();
        inv.comp_point = env::var(COMP_POINT).ok();
        inv
    }

    /// Mark this run as a completion request for `line`
    pub fn with_completion_line(mut self, line: impl Into<String>) -> Self {
        self.comp_line = Some(line.into());
        self
    }

    pub fn with_completion_point(mut self, point: usize) -> Self {
        self.comp_point = Some(point.to_string());
        self
    }

    /// Program name as invoked, empty when the argument vector is empty
    pub fn program(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }

    /// Arguments after the program name
    pub fn args(&self) -> &[String] {
        self.args.get(1..).unwrap_or(&[])
    }

    pub fn completion_line(&self) -> Option<&str> {
        self.comp_line.as_deref()
    }

    /// The ungrouped flag set, for flags declared outside any command
    ///
    /// Flags registered here are merged into the main command when
    /// dispatching. Parsing this set directly is not allowed.
    pub fn flags(&mut self) -> &mut FlagSet {
        &mut self.flags
    }
}
