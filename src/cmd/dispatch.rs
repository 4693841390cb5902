//! Top-level parsing and subcommand dispatch

use crate::cmd::command::ensure_newline;
use crate::cmd::{Command, Invocation};
use crate::complete::{write_candidates, Args, Completer, CompletionCommand, Predictor};
use crate::flag::FlagSet;
use std::collections::BTreeMap;
use std::io;
use std::process;
use std::rc::Rc;
use tracing::debug;

/// Where a dispatch ended up
#[derive(Debug)]
pub enum Resolution {
    /// A subcommand was selected; `args` are the words following its name
    Dispatched { command: Command, args: Vec<String> },
    /// The run was a completion request, answered with these candidates
    Completed(Vec<String>),
    /// No subcommand, or an unknown one, was requested
    Failed {
        message: Option<String>,
        usage: String,
    },
}

/// Parse the invocation and resolve the subcommand to run
///
/// Completion requests are answered with [`Resolution::Completed`]; flag
/// syntax errors follow the main flag set's own error policy.
///
/// # Panics
///
/// If the invocation's ungrouped flag set was already parsed.
pub fn dispatch(inv: Invocation, main: &mut Command, mut subs: Vec<Command>) -> Resolution {
    let Invocation {
        args,
        comp_line,
        comp_point,
        flags: defaults,
    } = inv;

    if defaults.parsed() {
        panic!("the default flag set was already parsed; dispatch must perform the only parse");
    }
    merge_default_flags(main, defaults);

    let listing: Vec<(String, String)> = subs
        .iter()
        .map(|sub| (sub.name.clone(), sub.usage_line.clone()))
        .collect();
    let program = main.name.clone();
    let description = main.usage_long.clone();
    main.flag_set().set_usage(Rc::new(move |fs: &FlagSet| {
        render_usage(&program, &description, &listing, fs)
    }));

    let mut nested = BTreeMap::new();
    for sub in subs.iter_mut() {
        nested.insert(sub.name.clone(), sub.complete_command());
    }
    let mut tree = CompletionCommand {
        sub: nested,
        flags: main.complete_flags(),
        args: Predictor::nothing(),
    };

    if let Some(line) = comp_line.as_deref() {
        narrow_dangling_equals(&mut tree, line);
    }

    let fs = main.flag_set();
    if let Err(e) = fs.parse(args.get(1..).unwrap_or(&[])) {
        // Already reported by the flag set; subcommands re-parse their own args.
        debug!("main flag parse failed: {}", e);
    }
    let mut positional = fs.args().to_vec();

    let completer = Completer::new(main.name.clone(), tree).with_line(comp_line, comp_point);
    if let Some(candidates) = completer.candidates() {
        debug!(count = candidates.len(), "served completion request");
        return Resolution::Completed(candidates);
    }

    let name = if positional.is_empty() {
        String::new()
    } else {
        positional.remove(0)
    };

    if !name.is_empty() {
        // Later declarations shadow earlier ones with the same name.
        if let Some(index) = subs.iter().rposition(|sub| sub.name == name) {
            debug!(command = %name, args = ?positional, "dispatching");
            return Resolution::Dispatched {
                command: subs.swap_remove(index),
                args: positional,
            };
        }
    }

    Resolution::Failed {
        message: (!name.is_empty()).then(|| format!("mode provided but not defined: {}", name)),
        usage: main.flag_set().usage_text(),
    }
}

/// Process entry point: dispatch, then exit for anything but a selected
/// subcommand
///
/// A served completion request prints its candidates to stdout and exits 0.
/// A missing or unknown subcommand prints the error and usage to stderr and
/// exits 1.
pub fn parse(inv: Invocation, main: &mut Command, subs: Vec<Command>) -> (Command, Vec<String>) {
    match dispatch(inv, main, subs) {
        Resolution::Dispatched { command, args } => (command, args),
        Resolution::Completed(candidates) => {
            let stdout = io::stdout();
            if let Err(e) = write_candidates(&mut stdout.lock(), &candidates) {
                debug!("failed to write completion candidates: {}", e);
            }
            process::exit(0)
        }
        Resolution::Failed { message, usage } => {
            if let Some(message) = message {
                eprintln!("{}", message);
            }
            eprint!("{}", usage);
            process::exit(1)
        }
    }
}

/// Fold the ungrouped flags into the main command's flag set, or hand the
/// ungrouped set to the main command when it has none of its own
fn merge_default_flags(main: &mut Command, defaults: FlagSet) {
    if main.has_flag_set() {
        let fs = main.flag_set();
        defaults.visit_all(|entry| fs.var(entry.value.clone(), &entry.name, &entry.usage));
        debug!(command = %main.name, merged = defaults.len(), "merged ungrouped flags");
    } else {
        debug!(command = %main.name, "adopting ungrouped flag set");
        main.adopt_flag_set(defaults);
    }
}

/// Restrict subcommand completions when the line ends in a dangling `=`
///
/// Right after `--flag=` the completion engine would offer subcommand names
/// instead of flag values. Only the subcommand already typed is kept: the
/// first completed word that is neither a root flag nor the separate value
/// of a root non-bool flag.
pub fn narrow_dangling_equals(tree: &mut CompletionCommand, line: &str) {
    if !line.ends_with('=') {
        return;
    }
    let args = Args::new(line);
    let mut words = args.completed.iter();
    let mut typed = "";
    while let Some(word) = words.next() {
        if word.starts_with('-') {
            // Bool keys carry `=0`/`=1`, so a bare key takes the next word.
            if tree.flags.contains_key(word.as_str()) {
                words.next();
            }
            continue;
        }
        typed = word;
        break;
    }
    tree.sub.retain(|name, _| name == typed);
    debug!(typed = %typed, kept = tree.sub.len(), "narrowed subcommands after dangling '='");
}

/// Usage text of the main command: description, flags, subcommand table and
/// the completion install hint
pub fn render_usage(
    program: &str,
    description: &str,
    subcommands: &[(String, String)],
    fs: &FlagSet,
) -> String {
    let mut out = format!("Usage of {}:\n", program);
    out.push_str(&ensure_newline(description));
    out.push_str(&fs.defaults_text());

    if !subcommands.is_empty() {
        out.push_str("\nSubcommands:\n");
        let width = subcommands
            .iter()
            .map(|(name, _)| name.chars().count() + 1)
            .max()
            .unwrap_or(0);
        for (name, usage_line) in subcommands {
            let label = format!("{}:", name);
            let line = format!("  {:<width$}  {}", label, usage_line.trim_end(), width = width);
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out.push_str("\nFor more information, use <subcommand> -h.\n");
    }

    out.push_str(&format!(
        "\nInstall bash completions by running:\n\tcomplete -C {} {}\n",
        program, program
    ));
    out
}
