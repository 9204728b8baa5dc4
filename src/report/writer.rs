//! Output generation.
//!
//! Sorts records by check name and writes them as delimited text (one
//! header row, one row per record) or as a JSON array.

use crate::error::{CacusError, Result};
use crate::models::{ColumnOrder, ComplianceRow};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Stable ascending sort by check name.
pub fn sort_by_name<T: ComplianceRow>(rows: &mut [T]) {
    rows.sort_by(|a, b| a.check_name().cmp(b.check_name()));
}

/// Write a header row and every record to `writer`.
///
/// Fields containing the delimiter, quotes or newlines are quoted; nothing
/// else is.
pub fn write_delimited<W, T>(
    writer: W,
    rows: &[T],
    delimiter: u8,
    order: ColumnOrder,
) -> std::io::Result<()>
where
    W: Write,
    T: ComplianceRow,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    csv_writer.write_record(order.headers())?;
    for row in rows {
        csv_writer.write_record(row.cells(order))?;
    }

    csv_writer.flush()
}

/// Write the records as delimited text to `path`.
pub fn write_output<T: ComplianceRow>(
    path: &Path,
    rows: &[T],
    delimiter: u8,
    order: ColumnOrder,
) -> Result<()> {
    let file = File::create(path).map_err(|e| CacusError::output_write(path, e))?;

    write_delimited(BufWriter::new(file), rows, delimiter, order)
        .map_err(|e| CacusError::output_write(path, e))?;

    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write the records as a pretty-printed JSON array to `path`.
pub fn write_json_output<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path).map_err(|e| CacusError::output_write(path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, rows)
        .map_err(|e| CacusError::output_write(path, e.into()))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| CacusError::output_write(path, e))?;

    debug!("Wrote {} JSON records to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AggregatedIssue, ComplianceIssue, ComplianceResult};

    fn create_test_issue(host: &str, name: &str, result: &str) -> ComplianceIssue {
        ComplianceIssue::new(
            host.to_string(),
            name.to_string(),
            "configured".to_string(),
            "expected".to_string(),
            "info".to_string(),
            "solution".to_string(),
            ComplianceResult::from(result),
        )
    }

    fn render<T: ComplianceRow>(rows: &[T], delimiter: u8, order: ColumnOrder) -> String {
        let mut out = Vec::new();
        write_delimited(&mut out, rows, delimiter, order).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn read_back(text: &str, delimiter: u8) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .from_reader(text.as_bytes())
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_sort_is_stable() {
        let mut rows = vec![
            create_test_issue("h1", "b", "PASSED"),
            create_test_issue("h2", "a", "PASSED"),
            create_test_issue("h3", "b", "FAILED"),
            create_test_issue("h4", "a", "FAILED"),
        ];

        sort_by_name(&mut rows);
        let order: Vec<_> = rows.iter().map(|r| r.hostname.as_str()).collect();
        assert_eq!(order, vec!["h2", "h4", "h1", "h3"]);
    }

    #[test]
    fn test_header_row_host_first() {
        let text = render::<ComplianceIssue>(&[], b',', ColumnOrder::HostFirst);
        assert_eq!(
            text.lines().next(),
            Some("Host,Check Name,Configured Value,Expected Value,Info,Solution,Result")
        );
    }

    #[test]
    fn test_header_row_check_first() {
        let text = render::<ComplianceIssue>(&[], b';', ColumnOrder::CheckFirst);
        assert_eq!(
            text.lines().next(),
            Some("Check Name;Host;Configured Value;Expected Value;Info;Solution;Result")
        );
    }

    #[test]
    fn test_minimal_quoting() {
        let mut issue = create_test_issue("host1", "plain name", "FAILED");
        issue.info = "has, comma".to_string();

        let text = render(&[issue], b',', ColumnOrder::HostFirst);
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("host1,plain name,configured,"));
        assert!(row.contains("\"has, comma\""));
    }

    #[test]
    fn test_round_trip_with_embedded_delimiters_and_newlines() {
        let issue = ComplianceIssue::new(
            "host1".to_string(),
            "Check; with delimiter".to_string(),
            "line one\nline two".to_string(),
            "say \"yes\"".to_string(),
            "info".to_string(),
            "fix; it".to_string(),
            ComplianceResult::Failed,
        );

        let text = render(&[issue.clone()], b';', ColumnOrder::HostFirst);
        let records = read_back(&text, b';');

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].len(), 7);
        assert_eq!(
            records[1],
            vec![
                issue.hostname,
                issue.name,
                issue.configured_value,
                issue.expected_value,
                issue.info,
                issue.solution,
                "FAILED".to_string(),
            ]
        );
    }

    #[test]
    fn test_aggregated_rows_stay_one_record() {
        let row = AggregatedIssue {
            hostname: "h1\n\nh2".to_string(),
            name: "check".to_string(),
            configured_value: "a\nb\n\nc".to_string(),
            expected_value: "x".to_string(),
            info: "i".to_string(),
            solution: "s".to_string(),
            result: ComplianceResult::Failed,
            host_count: 2,
        };

        let text = render(&[row], b'\t', ColumnOrder::CheckFirst);
        let records = read_back(&text, b'\t');
        assert_eq!(records.len(), 2);
        assert_eq!(records[1][0], "check");
        assert_eq!(records[1][1], "h1\n\nh2");
        assert_eq!(records[1][2], "a\nb\n\nc");
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_output(
            &path,
            &[create_test_issue("h1", "check", "PASSED")],
            b',',
            ColumnOrder::HostFirst,
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("h1,check,configured,expected,info,n/a,PASSED"));
    }

    #[test]
    fn test_write_output_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");

        let err = write_output::<ComplianceIssue>(&path, &[], b',', ColumnOrder::HostFirst)
            .unwrap_err();
        assert!(matches!(err, CacusError::OutputWrite { .. }));
    }

    #[test]
    fn test_write_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_json_output(&path, &[create_test_issue("h1", "check", "FAILED")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<ComplianceIssue> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].result, ComplianceResult::Failed);
        assert_eq!(parsed[0].solution, "solution");
    }
}
