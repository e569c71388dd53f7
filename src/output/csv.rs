// Artifact writers for the trend table and the cluster assignment.
//
// CSV layout for the trend table: `canonical_topic` followed by one ISO date
// column per window day, ascending. Fields are quoted per RFC 4180 only when
// they contain a comma, quote, or line break.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::OutputFormat;
use crate::pipeline::trend::TrendReport;
use crate::topics::label::ClusterAssignment;
use crate::trends::aggregate::TrendTable;

/// Quote a CSV field if it needs it.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Render the trend table as CSV.
pub fn trend_table_csv(table: &TrendTable) -> String {
    let mut out = String::from("canonical_topic");
    for date in &table.dates {
        let _ = write!(out, ",{}", date.format("%Y-%m-%d"));
    }
    out.push('\n');

    for row in &table.rows {
        out.push_str(&escape_field(&row.canonical_topic));
        for date in &table.dates {
            let count = row.count_on(*date).unwrap_or(0);
            let _ = write!(out, ",{count}");
        }
        out.push('\n');
    }

    out
}

/// Render the cluster assignment as CSV.
pub fn assignments_csv(rows: &[ClusterAssignment]) -> String {
    let mut out = String::from("topic_id,canonical_topic,cluster_id\n");
    for row in rows {
        let _ = writeln!(
            out,
            "{},{},{}",
            escape_field(&row.topic_id),
            escape_field(&row.canonical_topic),
            row.cluster_id
        );
    }
    out
}

/// Write the trend table to `path` in the given format.
pub fn write_trend_table(table: &TrendTable, path: &Path, format: OutputFormat) -> Result<()> {
    let body = match format {
        OutputFormat::Csv => trend_table_csv(table),
        OutputFormat::Json => serde_json::to_string_pretty(table)?,
    };
    write_file(path, &body)
}

/// Write the cluster assignment to `path` in the given format.
pub fn write_assignments(rows: &[ClusterAssignment], path: &Path, format: OutputFormat) -> Result<()> {
    let body = match format {
        OutputFormat::Csv => assignments_csv(rows),
        OutputFormat::Json => serde_json::to_string_pretty(rows)?,
    };
    write_file(path, &body)
}

/// Write both artifacts of a run into `dir` as `trend.<ext>` and
/// `clusters.<ext>`. Returns the two paths.
pub fn write_report(
    report: &TrendReport,
    dir: &Path,
    format: OutputFormat,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let trend_path = dir.join(format!("trend.{}", format.extension()));
    let clusters_path = dir.join(format!("clusters.{}", format.extension()));

    write_trend_table(&report.table, &trend_path, format)?;
    write_assignments(&report.deduplicated.assignments, &clusters_path, format)?;

    info!(
        trend = %trend_path.display(),
        clusters = %clusters_path.display(),
        "Wrote trend artifacts"
    );

    Ok((trend_path, clusters_path))
}

fn write_file(path: &Path, body: &str) -> Result<()> {
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))
}
