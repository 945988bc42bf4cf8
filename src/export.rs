use serde_json::Value;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::error::{Result, ScanError};
use crate::stats::SuspiciousHandleEntry;

pub const DEFAULT_OUTPUT_FILE: &str = "suspicious_handles_with_metadata_no_duplicates.csv";

pub const CSV_HEADER: [&str; 5] = ["screen_name", "date", "description", "geolocation", "count"];

/// Absent values become empty cells, strings are written as-is and any
/// other JSON value as compact JSON.
fn cell(value: &Option<Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn write_entries_csv<W: io::Write>(writer: W, entries: &[SuspiciousHandleEntry]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    for entry in entries {
        let count = entry.count.to_string();
        wtr.write_record([
            entry.screen_name.as_str(),
            cell(&entry.date).as_str(),
            cell(&entry.description).as_str(),
            cell(&entry.geolocation).as_str(),
            count.as_str(),
        ])?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn export_csv(path: &Path, entries: &[SuspiciousHandleEntry]) -> Result<()> {
    let start_time = Instant::now();
    info!(action = "start", component = "csv_export", file_path = ?path, row_count = entries.len(), "Writing suspicious handle table");

    let file = File::create(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_entries_csv(BufWriter::new(file), entries)?;

    info!(
        action = "complete",
        component = "csv_export",
        duration_ms = start_time.elapsed().as_millis(),
        "CSV export completed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(
        name: &str,
        date: Option<Value>,
        description: Option<Value>,
        geolocation: Option<Value>,
        count: usize,
    ) -> SuspiciousHandleEntry {
        SuspiciousHandleEntry {
            screen_name: name.to_string(),
            date,
            description,
            geolocation,
            count,
        }
    }

    fn render(entries: &[SuspiciousHandleEntry]) -> String {
        let mut out = Vec::new();
        write_entries_csv(&mut out, entries).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_header_only_for_empty_table() {
        assert_eq!(render(&[]), "screen_name,date,description,geolocation,count\n");
    }

    #[test]
    fn test_rows_and_absent_fields() {
        let csv = render(&[
            entry("abc123", Some(json!("2020-01-01")), None, None, 2),
            entry("xy9", None, Some(json!("just a bot")), None, 1),
        ]);
        assert_eq!(
            csv,
            "screen_name,date,description,geolocation,count\n\
             abc123,2020-01-01,,,2\n\
             xy9,,just a bot,,1\n"
        );
    }

    #[test]
    fn test_quoting_and_json_cells() {
        let csv = render(&[entry(
            "bot7",
            None,
            Some(json!("hello, \"world\"")),
            Some(json!({"lat": 1.5})),
            3,
        )]);
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(line, r#"bot7,,"hello, ""world""","{""lat"":1.5}",3"#);
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT_FILE);
        export_csv(&path, &[entry("abc123", None, None, None, 1)]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, CSV_HEADER);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "abc123");
        assert_eq!(&rows[0][4], "1");
    }

    #[test]
    fn test_export_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        assert!(matches!(
            export_csv(&path, &[]),
            Err(ScanError::Io { .. })
        ));
    }
}
