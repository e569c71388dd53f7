// Loading extracted topics from disk.
//
// The extraction stage writes either a JSON array of records or JSON Lines
// (one record per line). Both are accepted; the first non-whitespace byte
// decides which.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::topics::record::TopicRecord;

/// Read topic records from `path`, preserving file order.
pub fn load_topics(path: &Path) -> Result<Vec<TopicRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read topics from {}", path.display()))?;

    let records = parse_topics(&raw)
        .with_context(|| format!("Failed to parse topics in {}", path.display()))?;

    info!(
        count = records.len(),
        path = %path.display(),
        "Loaded topic records"
    );

    Ok(records)
}

/// Parse a JSON array or JSON Lines document into records.
pub fn parse_topics(raw: &str) -> Result<Vec<TopicRecord>> {
    let trimmed = raw.trim_start();

    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("Invalid JSON array of topic records");
    }

    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str::<TopicRecord>(line)
                .with_context(|| format!("Invalid topic record on line {}", n + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_array() {
        let raw = r#"[
            {"id": "a", "text": "crash", "category": "issue", "date": "2025-12-21", "vector": [1.0, 0.0]},
            {"id": "b", "text": "dark mode", "category": "feature_request", "date": "2025-12-22", "vector": [0.0, 1.0]}
        ]"#;
        let records = parse_topics(raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, "b");
    }

    #[test]
    fn test_parse_json_lines_skips_blank_lines() {
        let raw = concat!(
            r#"{"id": "a", "text": "crash", "category": "issue", "date": "2025-12-21", "vector": [1.0]}"#,
            "\n\n",
            r#"{"id": "b", "text": "slow", "category": "other", "date": "2025-12-21T09:30:00", "vector": [0.5]}"#,
            "\n"
        );
        let records = parse_topics(raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].category.as_str(), "other");
    }

    #[test]
    fn test_parse_reports_line_number() {
        let raw = concat!(
            r#"{"id": "a", "text": "crash", "category": "issue", "date": "2025-12-21", "vector": [1.0]}"#,
            "\n",
            r#"{"id": "b", "text": "slow"}"#,
        );
        let err = parse_topics(raw).unwrap_err();
        assert!(format!("{err}").contains("line 2"), "got: {err}");
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse_topics("  \n").unwrap().is_empty());
    }
}
