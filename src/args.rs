use clap::Parser;
use std::path::PathBuf;

use crate::export::DEFAULT_OUTPUT_FILE;
use crate::timeline::DEFAULT_TOP_WEEKS;

#[derive(Parser, Debug)]
#[command(
    name = "handlescan",
    about = "Flag letters-then-digits author handles in a JSON post dump and tally them",
    version,
    long_about = None
)]
pub struct Args {
    /// JSON files holding an array of posts
    #[arg(value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// CSV file for the suspicious handle table
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Do not write the CSV file
    #[arg(long)]
    pub no_export: bool,

    /// Number of table rows to display
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Also report the account creation timeline
    #[arg(long)]
    pub timeline: bool,

    /// Number of busiest creation weeks to list
    #[arg(long, default_value_t = DEFAULT_TOP_WEEKS)]
    pub top_weeks: usize,

    /// Extra handle pattern file, checked in addition to the built-in rule
    #[arg(short, long)]
    pub patterns: Option<PathBuf>,

    /// Output format for stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Mask handles in displayed output
    #[arg(long)]
    pub redact: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of worker threads
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Initialize handle_patterns.txt with default patterns
    #[arg(long)]
    pub init: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["handlescan", "posts.json"]);
        assert_eq!(args.inputs, vec![PathBuf::from("posts.json")]);
        assert_eq!(args.output, PathBuf::from(DEFAULT_OUTPUT_FILE));
        assert_eq!(args.top_weeks, 3);
        assert_eq!(args.format, OutputFormat::Table);
        assert!(!args.timeline);
        assert!(!args.no_export);
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "handlescan",
            "a.json",
            "b.json",
            "--timeline",
            "--top-weeks",
            "5",
            "-f",
            "json",
            "-w",
            "2",
            "--no-export",
        ]);
        assert_eq!(args.inputs.len(), 2);
        assert!(args.timeline);
        assert_eq!(args.top_weeks, 5);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.workers, Some(2));
        assert!(args.no_export);
    }
}
