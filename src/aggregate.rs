use rayon::prelude::*;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::info;

use crate::classify::HandleClassifier;
use crate::dataset::PostRecord;
use crate::error::Result;
use crate::stats::{HandleCount, HandleReport, HandleStats, SuspiciousHandleEntry};

pub fn default_worker_count() -> usize {
    std::cmp::min(num_cpus::get(), 8)
}

/// Build the suspicious handle table: flag handles, count them over the
/// whole input, attach the totals to every matching post's author
/// metadata, drop rows identical in all five fields and order by count
/// (highest first, ties in input order).
pub fn aggregate_suspicious_handles(
    posts: &[PostRecord],
    classifier: &HandleClassifier,
    max_workers: Option<usize>,
) -> Result<HandleReport> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "handle_aggregation",
        post_count = posts.len(),
        "Starting suspicious handle aggregation"
    );

    let max_workers = max_workers.unwrap_or_else(default_worker_count);
    info!(action = "configure", component = "handle_aggregation", worker_count = max_workers, "Using workers for classification");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers)
        .build()?;

    let counts: HashMap<&str, usize> = pool.install(|| {
        posts
            .par_iter()
            .filter(|post| classifier.is_suspicious_value(&post.author.screen_name))
            .filter_map(|post| post.author.screen_name_str())
            .fold(HashMap::new, |mut acc, handle| {
                *acc.entry(handle).or_insert(0) += 1;
                acc
            })
            .reduce(HashMap::new, |mut all, batch| {
                for (handle, count) in batch {
                    *all.entry(handle).or_insert(0) += count;
                }
                all
            })
    });

    let classify_time = start_time.elapsed();

    let mut first_seen: Vec<&str> = Vec::with_capacity(counts.len());
    let mut seen_handles: HashSet<&str> = HashSet::with_capacity(counts.len());
    let mut seen_rows: HashSet<String> = HashSet::new();
    let mut entries = Vec::new();
    let mut duplicate_rows_removed = 0;

    for post in posts {
        let Some(handle) = post.author.screen_name_str() else {
            continue;
        };
        let Some(&count) = counts.get(handle) else {
            continue;
        };
        if seen_handles.insert(handle) {
            first_seen.push(handle);
        }

        let entry = SuspiciousHandleEntry {
            screen_name: handle.to_string(),
            date: post.author.date.clone(),
            description: post.author.description.clone(),
            geolocation: post.author.geolocation.clone(),
            count,
        };
        if seen_rows.insert(row_key(&entry)?) {
            entries.push(entry);
        } else {
            duplicate_rows_removed += 1;
        }
    }

    // Stable: equal counts keep first-seen order.
    entries.sort_by(|a, b| b.count.cmp(&a.count));

    let mut handle_counts: Vec<HandleCount> = first_seen
        .iter()
        .map(|handle| HandleCount {
            screen_name: handle.to_string(),
            count: counts[handle],
        })
        .collect();
    handle_counts.sort_by(|a, b| b.count.cmp(&a.count));

    let stats = HandleStats {
        total_posts: posts.len(),
        suspicious_occurrences: counts.values().sum(),
        distinct_handles: counts.len(),
        duplicate_rows_removed,
    };

    info!(
        action = "complete",
        component = "handle_aggregation",
        distinct_handles = stats.distinct_handles,
        suspicious_occurrences = stats.suspicious_occurrences,
        rows = entries.len(),
        duplicate_rows_removed,
        "Suspicious handle aggregation completed"
    );
    info!(
        action = "timing",
        component = "handle_aggregation",
        classification_time_ms = classify_time.as_millis(),
        total_time_ms = start_time.elapsed().as_millis(),
        "Suspicious handle aggregation timing"
    );

    Ok(HandleReport {
        entries,
        handle_counts,
        stats,
    })
}

// 2^53: above this an f64 no longer holds every integer exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Canonical text of a whole row. Object keys serialize sorted and integral
/// floats are rewritten as integers, so `{"lat":1}` and `{"lat":1.0}` share
/// a key.
fn row_key(entry: &SuspiciousHandleEntry) -> Result<String> {
    let mut value = serde_json::to_value(entry)?;
    normalize_numbers(&mut value);
    Ok(serde_json::to_string(&value)?)
}

fn normalize_numbers(value: &mut Value) {
    match value {
        Value::Number(n) => {
            let integral = n
                .as_f64()
                .filter(|f| n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_EXACT_INTEGER);
            if let Some(f) = integral {
                *value = Value::from(f as i64);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_numbers),
        Value::Object(map) => map.values_mut().for_each(normalize_numbers),
        _ => {}
    }
}
