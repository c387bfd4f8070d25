//! Input discovery. Each spec on the command line is one of:
//! the word `all`, an existing directory, an existing file, or a glob.
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const ALL_INPUTS: &str = "all";

/// Resolve input specs into concrete files, in first-seen order, without duplicates.
///
/// `pattern` is the program's input glob; `cwd` anchors relative specs.
pub fn discover(specs: &[String], pattern: &str, cwd: &Path) -> Result<Vec<PathBuf>> {
    let file_pattern = Pattern::new(pattern)?;
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for spec in specs {
        let matches = if spec == ALL_INPUTS {
            scan_dir(cwd, &file_pattern)?
        } else {
            let path = cwd.join(spec);
            if path.is_dir() {
                scan_dir(&path, &file_pattern)?
            } else if path.is_file() {
                vec![path]
            } else {
                expand_glob(&anchor_glob(spec, cwd))?
            }
        };

        if matches.is_empty() {
            warn!("No input files match '{}'", spec);
        }
        for m in matches {
            if seen.insert(m.clone()) {
                found.push(m);
            }
        }
    }

    if found.is_empty() {
        return Err(Error::NoInputs);
    }
    debug!("Discovered {} input file(s)", found.len());
    Ok(found)
}

fn scan_dir(dir: &Path, pattern: &Pattern) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matched = path
            .file_name()
            .map(|n| pattern.matches(&n.to_string_lossy()))
            .unwrap_or(false);
        if matched {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Relative globs are anchored at `cwd`, whose own characters are matched literally.
fn anchor_glob(spec: &str, cwd: &Path) -> String {
    if Path::new(spec).is_absolute() {
        spec.to_string()
    } else {
        let base = Pattern::escape(&cwd.to_string_lossy());
        format!("{}/{}", base.trim_end_matches('/'), spec)
    }
}

fn expand_glob(spec: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob::glob(spec)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable path: {}", e);
                None
            }
        })
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Job name derived from an input: the file name minus its last extension.
pub fn stem_jobname(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string_lossy().into_owned())
}
