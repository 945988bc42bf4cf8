use std::time::Instant;
use tracing::info;

use crate::{
    aggregate, classify::HandleClassifier, dataset, error::Result, stats::AnalysisResult,
    timeline, Args,
};

/// Run the full pipeline over the raw bytes of one input file.
pub fn analyze_dataset(
    bytes: &[u8],
    classifier: &HandleClassifier,
    args: &Args,
) -> Result<AnalysisResult> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "analysis", byte_count = bytes.len(), "Starting dataset analysis");

    let posts = dataset::load_posts_from_slice(bytes)?;
    let report = aggregate::aggregate_suspicious_handles(&posts, classifier, args.workers)?;

    let timeline = if args.timeline {
        Some(timeline::build_creation_timeline(&posts, args.top_weeks)?)
    } else {
        None
    };

    info!(
        action = "complete",
        component = "analysis",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Analysis completed successfully"
    );

    Ok(AnalysisResult { report, timeline })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use clap::Parser;

    const POSTS: &str = r#"[
        {"author":{"screen_name":"abc123","date":"2020-01-06T10:00:00Z"}},
        {"author":{"screen_name":"abc123","date":"2020-01-06T10:00:00Z"}},
        {"author":{"screen_name":"real_name","date":"2020-02-01T00:00:00Z"}},
        {"author":{"screen_name":"xy9"}}
    ]"#;

    fn classifier() -> HandleClassifier {
        HandleClassifier::with_defaults().unwrap()
    }

    #[test]
    fn test_batch_mode_has_no_timeline() {
        let args = Args::parse_from(["handlescan", "posts.json"]);
        let result = analyze_dataset(POSTS.as_bytes(), &classifier(), &args).unwrap();
        assert_eq!(result.report.entries.len(), 2);
        assert!(result.timeline.is_none());
    }

    #[test]
    fn test_timeline_mode() {
        let args = Args::parse_from(["handlescan", "posts.json", "--timeline"]);
        let result = analyze_dataset(POSTS.as_bytes(), &classifier(), &args).unwrap();
        let timeline = result.timeline.unwrap();
        assert_eq!(timeline.distinct_timestamps, 2);
        assert_eq!(timeline.undated_authors, 1);
        assert_eq!(timeline.monthly.len(), 2);
    }

    #[test]
    fn test_bad_date_only_fails_with_timeline() {
        let posts = br#"[{"author":{"screen_name":"abc123","date":"soon"}}]"#;
        let batch = Args::parse_from(["handlescan", "posts.json"]);
        assert!(analyze_dataset(posts, &classifier(), &batch).is_ok());

        let with_timeline = Args::parse_from(["handlescan", "posts.json", "--timeline"]);
        assert!(matches!(
            analyze_dataset(posts, &classifier(), &with_timeline),
            Err(ScanError::UnparseableDate { .. })
        ));
    }

    #[test]
    fn test_missing_screen_name_aborts() {
        let args = Args::parse_from(["handlescan", "posts.json"]);
        let posts = br#"[{"author":{"screen_name":"abc123"}},{"author":{}}]"#;
        assert!(matches!(
            analyze_dataset(posts, &classifier(), &args),
            Err(ScanError::MissingField { index: 1, .. })
        ));
    }
}
