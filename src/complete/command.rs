//! Completion specification of a command tree

use crate::complete::{Args, Predictor};
use std::collections::BTreeMap;

/// What can be completed for one command: its flags, its positional
/// arguments and its nested subcommands
#[derive(Debug, Clone, Default)]
pub struct CompletionCommand {
    /// Subcommands by name
    pub sub: BTreeMap<String, CompletionCommand>,
    /// Flag completion keys (e.g. `--timeout`, `-v=1`) and their value predictors
    pub flags: BTreeMap<String, Predictor>,
    /// Positional arguments
    pub args: Predictor,
}

impl CompletionCommand {
    /// Candidates for the last word of `a`, before prefix filtering
    pub fn predict(&self, a: &Args) -> Vec<String> {
        // The first completed word naming a subcommand hands prediction over
        // to it; searching further could match a sibling by accident.
        for (i, word) in a.completed.iter().enumerate() {
            if let Some(sub) = self.sub.get(word) {
                return sub.predict(&a.from(i));
            }
        }

        if let Some(predictor) = self.flags.get(&a.last_completed) {
            if !predictor.is_nothing() {
                return predictor.predict(a);
            }
        }

        let mut options: Vec<String> = self.sub.keys().cloned().collect();
        options.extend(self.flag_names(a));
        options.extend(self.args.predict(a));
        options
    }

    /// Flag keys, including dashed ones only once the user has typed a dash
    fn flag_names<'a>(&'a self, a: &'a Args) -> impl Iterator<Item = String> + 'a {
        let typing_flag = a.last.starts_with('-');
        self.flags
            .keys()
            .filter(move |flag| typing_flag || !flag.starts_with('-'))
            .cloned()
    }
}
