use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use tracing::info;

use crate::dataset::PostRecord;
use crate::error::{Result, ScanError};

pub const DEFAULT_TOP_WEEKS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyCount {
    pub iso_year: i32,
    pub iso_week: u32,
    /// Monday of the ISO week.
    pub week_start: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
    pub days_between: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreationTimeline {
    pub monthly: Vec<MonthlyCount>,
    pub top_weeks: Vec<WeeklyCount>,
    pub distinct_timestamps: usize,
    pub undated_authors: usize,
    pub date_range: Option<DateRange>,
}

/// Parse an author creation date. Accepts RFC 3339, naive ISO date-times
/// (read as UTC), bare dates (midnight UTC) and the legacy Twitter
/// `Wed Oct 10 20:19:24 +0000 2018` layout.
pub fn parse_author_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f%z", "%a %b %d %H:%M:%S %z %Y"] {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Bucket distinct author creation timestamps by month and ISO week.
/// Authors without a date are skipped; a date that does not parse fails
/// the whole timeline.
pub fn build_creation_timeline(posts: &[PostRecord], top_weeks: usize) -> Result<CreationTimeline> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "creation_timeline",
        post_count = posts.len(),
        "Building account creation timeline"
    );

    let mut timestamps: BTreeSet<DateTime<Utc>> = BTreeSet::new();
    let mut undated_authors = 0;

    for (index, post) in posts.iter().enumerate() {
        let Some(raw) = &post.author.date else {
            undated_authors += 1;
            continue;
        };
        match raw.as_str().and_then(parse_author_date) {
            Some(ts) => {
                timestamps.insert(ts);
            }
            None => {
                let value = match raw {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                return Err(ScanError::UnparseableDate { index, value });
            }
        }
    }

    let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    let mut weeks: BTreeMap<(i32, u32), (NaiveDate, usize)> = BTreeMap::new();

    for ts in &timestamps {
        *months.entry((ts.year(), ts.month())).or_insert(0) += 1;

        let date = ts.date_naive();
        let iso = date.iso_week();
        let week_start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        weeks
            .entry((iso.year(), iso.week()))
            .or_insert((week_start, 0))
            .1 += 1;
    }

    let monthly: Vec<MonthlyCount> = months
        .into_iter()
        .map(|((year, month), count)| MonthlyCount {
            month: format!("{:04}-{:02}", year, month),
            count,
        })
        .collect();

    // Weeks come out of the map in calendar order; the stable sort keeps the
    // earlier week first on equal counts.
    let mut ranked: Vec<WeeklyCount> = weeks
        .into_iter()
        .map(|((iso_year, iso_week), (week_start, count))| WeeklyCount {
            iso_year,
            iso_week,
            week_start,
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(top_weeks);

    let date_range = match (timestamps.first(), timestamps.last()) {
        (Some(&earliest), Some(&latest)) => Some(DateRange {
            earliest,
            latest,
            days_between: (latest - earliest).num_days(),
        }),
        _ => None,
    };

    let timeline = CreationTimeline {
        monthly,
        top_weeks: ranked,
        distinct_timestamps: timestamps.len(),
        undated_authors,
        date_range,
    };

    info!(
        action = "complete",
        component = "creation_timeline",
        distinct_timestamps = timeline.distinct_timestamps,
        months = timeline.monthly.len(),
        undated_authors,
        duration_ms = start_time.elapsed().as_millis(),
        "Account creation timeline built"
    );

    Ok(timeline)
}
