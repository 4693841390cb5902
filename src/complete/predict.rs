//! Completion candidate predictors

use crate::complete::Args;
use glob::Pattern;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

type PredictFn = dyn Fn(&Args) -> Vec<String>;

/// Produces completion candidates for the word being typed
///
/// The empty predictor ([`Predictor::nothing`]) is distinct from one that
/// merely returns no candidates ([`Predictor::anything`]): after a flag whose
/// predictor is empty, other flags and subcommands are still suggested.
#[derive(Clone, Default)]
pub struct Predictor(Option<Rc<PredictFn>>);

impl Predictor {
    /// Suggest nothing for this position
    pub fn nothing() -> Self {
        Predictor(None)
    }

    /// Accept any value without suggesting one
    pub fn anything() -> Self {
        Predictor::from_fn(|_| Vec::new())
    }

    pub fn from_fn(f: impl Fn(&Args) -> Vec<String> + 'static) -> Self {
        Predictor(Some(Rc::new(f)))
    }

    /// A fixed set of literal candidates
    pub fn set<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        Predictor::from_fn(move |_| options.clone())
    }

    /// Union of several predictors
    pub fn or(predictors: impl IntoIterator<Item = Predictor>) -> Self {
        let predictors: Vec<Predictor> = predictors.into_iter().collect();
        Predictor::from_fn(move |a| predictors.iter().flat_map(|p| p.predict(a)).collect())
    }

    /// Directory names
    pub fn dirs(pattern: &str) -> Self {
        path_predictor(pattern, false)
    }

    /// File names matching a glob pattern such as `*.yml`, plus directories
    /// to descend into
    pub fn files(pattern: &str) -> Self {
        path_predictor(pattern, true)
    }

    /// Paths from a fixed list that match the word being typed
    pub fn files_set<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let files: Vec<String> = files.into_iter().map(Into::into).collect();
        Predictor::from_fn(move |a| filter_paths(&files, &a.last))
    }

    pub fn is_nothing(&self) -> bool {
        self.0.is_none()
    }

    pub fn predict(&self, a: &Args) -> Vec<String> {
        match &self.0 {
            Some(f) => f(a),
            None => Vec::new(),
        }
    }
}

impl fmt::Debug for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Predictor(fn)"),
            None => f.write_str("Predictor(nothing)"),
        }
    }
}

fn path_predictor(pattern: &str, allow_files: bool) -> Predictor {
    // An invalid pattern matches no files; directories are still offered.
    let pattern = Pattern::new(pattern).ok();
    Predictor::from_fn(move |a| {
        let found = predict_paths(a, pattern.as_ref(), allow_files);
        // A single directory match is expanded one level so the shell
        // does not stop at the directory itself.
        if found.len() == 1 && Path::new(&found[0]).is_dir() {
            let mut deeper = a.clone();
            deeper.last = found[0].clone();
            return predict_paths(&deeper, pattern.as_ref(), allow_files);
        }
        found
    })
}

fn predict_paths(a: &Args, pattern: Option<&Pattern>, allow_files: bool) -> Vec<String> {
    if a.last.ends_with("/..") {
        return Vec::new();
    }
    let dir = directory(&a.last);
    let mut found = list_files(&dir, pattern, allow_files);
    found.push(dir);
    filter_paths(&found, &a.last)
}

fn list_files(dir: &str, pattern: Option<&Pattern>, allow_files: bool) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut found = BTreeSet::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = Path::new(dir).join(&name);
        let listed = path.is_dir() || (allow_files && pattern.is_some_and(|p| p.matches(&name)));
        if listed {
            found.insert(path.to_string_lossy().into_owned());
        }
    }
    found.into_iter().collect()
}

/// The directory the word being typed lives in
fn directory(last: &str) -> String {
    if !last.is_empty() && Path::new(last).is_dir() {
        return fix_path_form(last, last);
    }
    let parent = match Path::new(last).parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_string_lossy().into_owned(),
        _ => ".".to_string(),
    };
    if Path::new(&parent).is_dir() {
        return fix_path_form(last, &parent);
    }
    "./".to_string()
}

fn filter_paths(files: &[String], last: &str) -> Vec<String> {
    files
        .iter()
        .map(|f| fix_path_form(last, f))
        .filter(|f| match_file(f, last))
        .collect()
}

/// Present `file` in the same form the user is typing: keep `./` only when
/// the typed word starts with `.`, and mark directories with a trailing `/`
fn fix_path_form(last: &str, file: &str) -> String {
    let mut path = if Path::new(last).is_absolute() {
        file.to_string()
    } else {
        let mut rel = file;
        while let Some(rest) = rel.strip_prefix("./") {
            rel = rest;
        }
        let rel = if rel.is_empty() { "." } else { rel };
        if rel != "." && last.starts_with('.') && !rel.starts_with("./") {
            format!("./{}", rel)
        } else {
            rel.to_string()
        }
    };
    if !path.ends_with('/') && Path::new(&path).is_dir() {
        path.push('/');
    }
    path
}

fn match_file(file: &str, prefix: &str) -> bool {
    if file == "./" && (prefix == "." || prefix.is_empty()) {
        return true;
    }
    if prefix == "." && file.starts_with('.') {
        return true;
    }
    let file = file.strip_prefix("./").unwrap_or(file);
    let prefix = prefix.strip_prefix("./").unwrap_or(prefix);
    file.starts_with(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(last: &str) -> Args {
        Args {
            last: last.to_string(),
            ..Args::default()
        }
    }

    #[test]
    fn test_nothing_and_anything_differ() {
        assert!(Predictor::nothing().is_nothing());
        assert!(Predictor::default().is_nothing());
        assert!(!Predictor::anything().is_nothing());
        assert!(Predictor::anything().predict(&typed("x")).is_empty());
    }

    #[test]
    fn test_set_returns_all_options() {
        let p = Predictor::set(["fast", "slow"]);
        assert_eq!(p.predict(&typed("f")), vec!["fast", "slow"]);
    }

    #[test]
    fn test_or_unions_in_order() {
        let p = Predictor::or([
            Predictor::set(["a"]),
            Predictor::nothing(),
            Predictor::set(["b", "c"]),
        ]);
        assert_eq!(p.predict(&typed("")), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_from_fn_sees_args() {
        let p = Predictor::from_fn(|a| vec![format!("{}!", a.last)]);
        assert_eq!(p.predict(&typed("hi")), vec!["hi!"]);
    }

    #[test]
    fn test_match_file() {
        assert!(match_file("./", ""));
        assert!(match_file("./", "."));
        assert!(match_file(".hidden", "."));
        assert!(match_file("./src/", "sr"));
        assert!(match_file("src/", "./s"));
        assert!(!match_file("Cargo.toml", "src"));
    }

    #[test]
    fn test_fix_path_form_keeps_typed_dot_slash() {
        assert_eq!(fix_path_form("x", "./nope.txt"), "nope.txt");
        assert_eq!(fix_path_form("./x", "./nope.txt"), "./nope.txt");
        assert_eq!(fix_path_form("/abs", "/abs/nope.txt"), "/abs/nope.txt");
    }

    #[test]
    fn test_files_set_filters_by_prefix() {
        let p = Predictor::files_set(["alpha.txt", "beta.txt", "alps.md"]);
        assert_eq!(p.predict(&typed("al")), vec!["alpha.txt", "alps.md"]);
    }

    #[test]
    fn test_parent_traversal_stops() {
        let p = Predictor::files("*");
        assert!(p.predict(&typed("foo/..")).is_empty());
    }
}
