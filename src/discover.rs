use anyhow::{Context, Result};
use glob::{glob_with, MatchOptions, Pattern};
use std::{
    collections::BTreeSet,
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Recursively find files under `root` whose extension matches one of
/// `extensions`, ignoring case. Anything under `exclude` is left out.
///
/// Returns sorted absolute paths; an empty result is not an error.
pub fn discover(root: &Path, extensions: &[String], exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    let root = fs::canonicalize(root)
        .with_context(|| format!("resolving input directory {}", root.display()))?;
    let exclude = exclude.map(absolute).transpose()?;

    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let base = Pattern::escape(&root.to_string_lossy());

    let mut found = BTreeSet::new();
    for ext in extensions {
        let pattern = format!("{}/**/*.{}", base, Pattern::escape(ext));
        let entries = glob_with(&pattern, options)
            .with_context(|| format!("invalid glob pattern {}", pattern))?;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => {
                    if exclude.as_deref().is_some_and(|ex| path.starts_with(ex)) {
                        debug!(path = %path.display(), "inside output directory, skipped");
                        continue;
                    }
                    found.insert(path);
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "unreadable path skipped during discovery"),
            }
        }
    }

    Ok(found.into_iter().collect())
}

/// Expand command-line inputs: files are taken as given, directories are
/// searched with [`discover`].
pub fn collect_inputs(inputs: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(discover(input, extensions, None)?);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(p) => Ok(p),
        Err(_) if path.is_absolute() => Ok(path.to_path_buf()),
        Err(_) => Ok(env::current_dir()
            .context("reading current directory")?
            .join(path)),
    }
}
