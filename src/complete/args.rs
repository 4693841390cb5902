//! Words of an in-progress command line

/// The already-typed words of a command line being completed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    /// All words except the program name, including the one being typed
    pub all: Vec<String>,
    /// Words that are complete (everything but the last)
    pub completed: Vec<String>,
    /// The word currently being typed, possibly empty
    pub last: String,
    /// The last complete word, possibly empty
    pub last_completed: String,
}

impl Args {
    /// Split a completion line into words
    ///
    /// A trailing space means a new, empty word is being typed. The word
    /// being typed is further split on `=` so `--name=val` completes `val`
    /// against the flag `--name`.
    pub fn new(line: &str) -> Self {
        let mut parts: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if line.chars().last().is_some_and(char::is_whitespace) {
            parts.push(String::new());
        }
        if let Some(word) = parts.pop() {
            parts.extend(word.split('=').map(str::to_string));
        }

        let all: Vec<String> = parts.iter().skip(1).cloned().collect();
        let completed = all[..all.len().saturating_sub(1)].to_vec();
        Args {
            last: parts.last().cloned().unwrap_or_default(),
            last_completed: completed.last().cloned().unwrap_or_default(),
            all,
            completed,
        }
    }

    /// Re-base onto the words following position `i`, used when descending
    /// into a subcommand found at that position
    pub fn from(&self, i: usize) -> Self {
        let mut next = self.clone();
        let skip = |words: &[String]| -> Vec<String> {
            let i = i.min(words.len().saturating_sub(1));
            words.get(i + 1..).map(<[String]>::to_vec).unwrap_or_default()
        };
        next.all = skip(&self.all);
        next.completed = skip(&self.completed);
        next
    }
}
