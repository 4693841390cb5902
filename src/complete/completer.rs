//! Serving shell completion requests
//!
//! A shell configured with `complete -C <program> <program>` runs the
//! program with `COMP_LINE` set to the line being edited (and `COMP_POINT`
//! to the cursor position) and reads candidates from stdout, one per line.

use crate::complete::{Args, CompletionCommand};
use std::io::{self, Write};
use tracing::debug;

/// Environment variable carrying the in-progress command line
pub const COMP_LINE: &str = "COMP_LINE";

/// Environment variable carrying the cursor position within [`COMP_LINE`]
pub const COMP_POINT: &str = "COMP_POINT";

/// Answers a completion request for a command tree
#[derive(Debug, Clone)]
pub struct Completer {
    name: String,
    command: CompletionCommand,
    line: Option<String>,
    point: Option<String>,
}

impl Completer {
    pub fn new(name: impl Into<String>, command: CompletionCommand) -> Self {
        Completer {
            name: name.into(),
            command,
            line: None,
            point: None,
        }
    }

    /// Use an explicit completion line and cursor position
    pub fn with_line(mut self, line: Option<String>, point: Option<String>) -> Self {
        self.line = line;
        self.point = point;
        self
    }

    /// Candidates for the word under the cursor, or `None` when this is not
    /// a completion request
    pub fn candidates(&self) -> Option<Vec<String>> {
        let line = self.line.as_deref().filter(|line| !line.is_empty())?;

        // Only the text before the cursor matters; the point is a byte offset.
        let line = match self.point.as_deref().and_then(|p| p.parse::<usize>().ok()) {
            Some(point) => line.get(..point).unwrap_or(line),
            None => line,
        };

        let args = Args::new(line);
        let mut matches: Vec<String> = Vec::new();
        for option in self.command.predict(&args) {
            if option.starts_with(&args.last) && !matches.contains(&option) {
                matches.push(option);
            }
        }
        debug!(program = %self.name, line = %line, count = matches.len(), "completion candidates");
        Some(matches)
    }
}

/// Write one candidate per line
pub fn write_candidates(out: &mut impl Write, candidates: &[String]) -> io::Result<()> {
    for candidate in candidates {
        writeln!(out, "{}", candidate)?;
    }
    out.flush()
}
