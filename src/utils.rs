use std::path::{Path, PathBuf};
use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so `--format json` output stays parseable. `RUST_LOG`
/// overrides the verbosity flag.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn format_number(num: usize) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Keep the first and last character, mask the rest. Handles of two
/// characters or fewer are masked in full, since keeping both ends would
/// print them unchanged.
pub fn redact_handle(handle: &str) -> String {
    let chars: Vec<char> = handle.chars().collect();
    if chars.len() <= 2 {
        return "*".repeat(chars.len());
    }

    let mut result = String::with_capacity(handle.len());
    result.push(chars[0]);
    result.push_str(&"*".repeat(chars.len() - 2));
    result.push(chars[chars.len() - 1]);
    result
}

/// Truncate to `max` characters, marking the cut with an ellipsis.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// With several inputs each export gets the input's file stem as a prefix,
/// so `out.csv` becomes `posts_out.csv` next to the requested path.
pub fn export_path_for(output: &Path, input: &Path, multiple_inputs: bool) -> PathBuf {
    if !multiple_inputs {
        return output.to_path_buf();
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    let file_name = output
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{}_{}", stem, file_name))
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    if args.init {
        return Ok(());
    }

    if args.inputs.is_empty() {
        anyhow::bail!("at least one input file is required");
    }

    if let Some(top) = args.top {
        if top == 0 {
            anyhow::bail!("--top must be greater than 0");
        }
    }

    if args.top_weeks == 0 {
        anyhow::bail!("--top-weeks must be greater than 0");
    }

    if let Some(workers) = args.workers {
        if workers == 0 {
            anyhow::bail!("--workers must be greater than 0");
        }
    }

    Ok(())
}
