use anyhow::Context;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::error::{Result, ScanError};

// Include default patterns at compile time
const DEFAULT_PATTERNS_BYTES: &[u8] = include_bytes!("../default_handle_patterns.txt");

/// File written by `--init`, as a starting point for `--patterns`.
pub const DEFAULT_PATTERN_FILE: &str = "handle_patterns.txt";

/// Load the embedded `letters+digits+` rule, followed by the patterns in
/// `pattern_file_path` when one is given. A custom file adds patterns; it
/// never removes the built-in rule.
pub fn load_handle_patterns(pattern_file_path: Option<&Path>) -> Result<Vec<Regex>> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "pattern_loading",
        "Starting handle pattern loading"
    );

    let mut patterns = default_patterns()?;

    if let Some(path) = pattern_file_path {
        info!(action = "load", component = "pattern_file", file_path = ?path, "Loading patterns from specified file");
        let content = read_pattern_file(path)?;
        let custom = parse_patterns(&content, &path.display().to_string())?;
        info!(action = "loaded", component = "pattern_file", pattern_count = custom.len(), file_path = ?path, "Loaded patterns from file");
        patterns.extend(custom);
    }

    info!(
        action = "complete",
        component = "pattern_loading",
        pattern_count = patterns.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Successfully compiled patterns"
    );
    Ok(patterns)
}

pub fn default_patterns() -> Result<Vec<Regex>> {
    let content = embedded_defaults()?;
    parse_patterns(content, "embedded defaults")
}

fn embedded_defaults() -> Result<&'static str> {
    std::str::from_utf8(DEFAULT_PATTERNS_BYTES).map_err(|e| ScanError::InvalidPattern {
        source_name: "embedded defaults".to_string(),
        line: 0,
        message: e.to_string(),
    })
}

fn read_pattern_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Compile one pattern per non-comment line, anchored at both ends. Each
/// line must be a valid regex on its own, so a line cannot close the
/// anchoring group and match outside it.
fn parse_patterns(content: &str, source_name: &str) -> Result<Vec<Regex>> {
    let mut patterns = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let invalid = |e: regex::Error| ScanError::InvalidPattern {
            source_name: source_name.to_string(),
            line: line_num + 1,
            message: e.to_string(),
        };
        Regex::new(line).map_err(invalid)?;
        patterns.push(Regex::new(&format!("^(?:{})$", line)).map_err(invalid)?);
    }
    Ok(patterns)
}

pub fn init_default_patterns(dir: &Path) -> anyhow::Result<PathBuf> {
    let default_file = dir.join(DEFAULT_PATTERN_FILE);

    if default_file.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first if you want to reinitialize.",
            DEFAULT_PATTERN_FILE
        );
    }

    let default_content = embedded_defaults()?;
    fs::write(&default_file, default_content)
        .with_context(|| format!("Failed to write {}", default_file.display()))?;

    Ok(default_file)
}
