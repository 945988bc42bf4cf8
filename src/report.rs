use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::stats::AnalysisResult;
use crate::timeline::CreationTimeline;
use crate::utils::{format_number, redact_handle, truncate_chars};
use crate::Args;

const BAR_WIDTH: usize = 40;

#[derive(Debug, Serialize)]
pub struct SourcedResult<'a> {
    pub source: &'a Path,
    #[serde(flatten)]
    pub result: &'a AnalysisResult,
}

pub fn render_json(results: &[SourcedResult<'_>]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

fn display_value(value: &Option<Value>) -> String {
    match value {
        None => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `1 account`, `2 accounts`, `1,024 accounts`.
fn plural(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{} {}{}", format_number(count), noun, suffix)
}

pub fn render_analysis_results(source: &Path, result: &AnalysisResult, args: &Args) -> String {
    let report = &result.report;
    let stats = &report.stats;
    let mut out = String::new();

    out.push_str(&format!("\n--- Suspicious Handle Analysis: {} ---\n", source.display()));
    out.push_str(&format!("Posts analyzed: {}\n", format_number(stats.total_posts)));
    out.push_str(&format!(
        "Suspicious posts: {} across {}\n",
        format_number(stats.suspicious_occurrences),
        plural(stats.distinct_handles, "handle")
    ));
    out.push_str(&format!(
        "Duplicate rows removed: {}\n",
        format_number(stats.duplicate_rows_removed)
    ));

    let shown = args
        .top
        .unwrap_or(report.entries.len())
        .min(report.entries.len());

    if report.entries.is_empty() {
        out.push_str("\nNo suspicious handles found.\n");
    } else {
        out.push_str(&format!(
            "\nSuspicious Handles with Metadata (Sorted by Count, {} of {}):\n",
            shown,
            plural(report.entries.len(), "row")
        ));
        out.push_str(&format!(
            "{:<20} {:>6}  {:<25} {:<40} {}\n",
            "screen_name", "count", "date", "description", "geolocation"
        ));
        for entry in report.entries.iter().take(shown) {
            let handle = if args.redact {
                redact_handle(&entry.screen_name)
            } else {
                entry.screen_name.clone()
            };
            out.push_str(&format!(
                "{:<20} {:>6}  {:<25} {:<40} {}\n",
                handle,
                format_number(entry.count),
                truncate_chars(&display_value(&entry.date), 25),
                truncate_chars(&display_value(&entry.description), 40),
                truncate_chars(&display_value(&entry.geolocation), 40)
            ));
        }
    }

    if let Some(timeline) = &result.timeline {
        render_timeline(&mut out, timeline);
    }

    out
}

fn render_timeline(out: &mut String, timeline: &CreationTimeline) {
    out.push_str(&format!(
        "\nAccount creation timeline ({}, {}):\n",
        plural(timeline.distinct_timestamps, "distinct timestamp"),
        plural(timeline.undated_authors, "undated author")
    ));

    if let Some(range) = &timeline.date_range {
        out.push_str(&format!(
            "Date range: {} to {} ({})\n",
            range.earliest.format("%B %-d, %Y"),
            range.latest.format("%B %-d, %Y"),
            plural(range.days_between.max(0) as usize, "day")
        ));
    }

    let max = timeline.monthly.iter().map(|m| m.count).max().unwrap_or(0);
    for month in &timeline.monthly {
        let bar_len = (month.count * BAR_WIDTH).div_ceil(max.max(1)).max(1);
        out.push_str(&format!(
            "  {} | {} {}\n",
            month.month,
            "#".repeat(bar_len),
            format_number(month.count)
        ));
    }

    if !timeline.top_weeks.is_empty() {
        out.push_str(&format!("\nTop {} creation weeks:\n", timeline.top_weeks.len()));
        for (rank, week) in timeline.top_weeks.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {}-W{:02} (week of {}): {}\n",
                rank + 1,
                week.iso_year,
                week.iso_week,
                week.week_start.format("%Y-%m-%d"),
                plural(week.count, "account")
            ));
        }
    }
}

pub fn print_analysis_results(source: &Path, result: &AnalysisResult, args: &Args) {
    print!("{}", render_analysis_results(source, result, args));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_dataset;
    use crate::classify::HandleClassifier;
    use clap::Parser;

    const POSTS: &str = r#"[
        {"author":{"screen_name":"abc123","date":"2020-01-06T10:00:00Z","description":"hi"}},
        {"author":{"screen_name":"abc123","date":"2020-01-06T10:00:00Z","description":"hi"}},
        {"author":{"screen_name":"real_name","date":"2020-03-01T00:00:00Z"}},
        {"author":{"screen_name":"xy9","date":"2020-01-07T00:00:00Z","geolocation":{"city":"Paris"}}}
    ]"#;

    fn run(argv: &[&str]) -> (AnalysisResult, Args) {
        let args = Args::parse_from(argv);
        let classifier = HandleClassifier::with_defaults().unwrap();
        let result = analyze_dataset(POSTS.as_bytes(), &classifier, &args).unwrap();
        (result, args)
    }

    #[test]
    fn test_table_lists_rows_in_order() {
        let (result, args) = run(&["handlescan", "posts.json"]);
        let text = render_analysis_results(Path::new("posts.json"), &result, &args);

        assert!(text.contains("Posts analyzed: 4"));
        assert!(text.contains("Suspicious posts: 3 across 2 handles"));
        let abc = text.find("abc123").unwrap();
        let xy = text.find("xy9").unwrap();
        assert!(abc < xy);
        assert!(text.contains(r#"{"city":"Paris"}"#));
        assert!(!text.contains("creation timeline"));
    }

    #[test]
    fn test_top_limits_rows_and_redact_masks() {
        let (result, args) = run(&["handlescan", "posts.json", "--top", "1", "--redact"]);
        let text = render_analysis_results(Path::new("posts.json"), &result, &args);
        assert!(text.contains("1 of 2 rows"));
        assert!(text.contains("a****3"));
        assert!(!text.contains("abc123"));
        assert!(!text.contains("x*9"));
    }

    #[test]
    fn test_timeline_section() {
        let (result, args) = run(&["handlescan", "posts.json", "--timeline"]);
        let text = render_analysis_results(Path::new("posts.json"), &result, &args);
        assert!(text.contains("3 distinct timestamps"));
        assert!(text.contains("  2020-01 | ######################################## 2"));
        assert!(text.contains("  2020-03 | #################### 1"));
        assert!(text.contains("1. 2020-W02 (week of 2020-01-06): 2 accounts"));
        assert!(text.contains("2. 2020-W09 (week of 2020-02-24): 1 account\n"));
        assert!(!text.contains("1 accounts"));
    }

    #[test]
    fn test_plural_counts() {
        assert_eq!(plural(0, "account"), "0 accounts");
        assert_eq!(plural(1, "account"), "1 account");
        assert_eq!(plural(1500, "row"), "1,500 rows");
    }

    #[test]
    fn test_json_rendering() {
        let (result, _) = run(&["handlescan", "posts.json", "--timeline"]);
        let json = render_json(&[SourcedResult {
            source: Path::new("posts.json"),
            result: &result,
        }])
        .unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["source"], "posts.json");
        assert_eq!(parsed[0]["report"]["entries"][0]["screen_name"], "abc123");
        assert_eq!(parsed[0]["report"]["entries"][0]["count"], 2);
        assert_eq!(parsed[0]["timeline"]["monthly"][0]["month"], "2020-01");
    }
}
