// Colored terminal output for trend tables and cluster listings.
//
// main.rs delegates all display here so the formatting stays in one place.

use colored::Colorize;

use crate::pipeline::trend::{Deduplicated, TrendReport};
use crate::trends::aggregate::{TrendRow, TrendTable};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Display the top `limit` rows of a trend table with per-day sparklines.
pub fn display_trend_table(table: &TrendTable, limit: usize) {
    println!(
        "\n{}",
        format!(
            "=== Topic Trends ({} to {}, {} canonical topics) ===",
            table.window.start,
            table.window.end,
            table.rows.len()
        )
        .bold()
    );
    println!();

    if table.is_empty() {
        println!("  No topics in this run.");
        return;
    }

    let grand_total = table.total().max(1) as f64;

    println!(
        "  {:>4}  {:<40} {:>6}  {}",
        "Rank".dimmed(),
        "Canonical topic".dimmed(),
        "Total".dimmed(),
        "Daily".dimmed(),
    );
    println!("  {}", "-".repeat(60 + table.dates.len()).dimmed());

    for (i, row) in table.rows.iter().take(limit).enumerate() {
        let share = row.total() as f64 / grand_total;
        let spark = sparkline(row);

        // Same banding as a weight bar: dominant topics stand out
        let colored_spark = if share >= 0.25 {
            spark.bright_green()
        } else if share >= 0.10 {
            spark.bright_yellow()
        } else {
            spark.bright_blue()
        };

        println!(
            "  {:>4}. {:<40} {:>6}  {}",
            i + 1,
            super::truncate_chars(&row.canonical_topic, 37),
            row.total(),
            colored_spark,
        );
    }

    if table.rows.len() > limit {
        println!(
            "\n  {}",
            format!("... and {} more topics", table.rows.len() - limit).dimmed()
        );
    }
}

/// Display each cluster with its members.
pub fn display_clusters(dedup: &Deduplicated) {
    println!(
        "\n{}",
        format!(
            "=== Canonical Topics ({} topics -> {} clusters) ===",
            dedup.topics.len(),
            dedup.clusters.len()
        )
        .bold()
    );
    println!();

    for lc in &dedup.clusters {
        println!(
            "  [{:>3}] {} {}",
            lc.cluster.id,
            lc.canonical_label.bold(),
            format!("({} members)", lc.cluster.len()).dimmed()
        );

        // Show the merged phrasings under the label
        for &index in lc.cluster.member_indices.iter().skip(1) {
            if let Some(topic) = dedup.topics.get(index) {
                let preview = super::truncate_chars(&topic.text, 80);
                println!("        {} {}", "=".dimmed(), preview.dimmed());
            }
        }
    }
    println!();
}

/// One-line run summary printed after the artifacts are written.
pub fn display_summary(report: &TrendReport) {
    let dedup = &report.deduplicated;
    let merged = dedup.topics.len().saturating_sub(dedup.clusters.len());
    let in_window = report.table.total();

    println!("\n{}", "Run summary".bold());
    println!("  Topics:           {}", dedup.topics.len());
    println!("  Canonical topics: {}", dedup.clusters.len());
    println!("  Merged as dupes:  {}", merged);
    println!(
        "  In window:        {} ({} days)",
        in_window,
        report.table.dates.len()
    );
}

/// Scale a row's daily counts to block characters relative to its own peak.
fn sparkline(row: &TrendRow) -> String {
    let peak = row.counts.values().copied().max().unwrap_or(0);
    row.counts
        .values()
        .map(|&c| {
            if c == 0 || peak == 0 {
                ' '
            } else {
                let level = (c as usize * (SPARK_LEVELS.len() - 1)) / peak as usize;
                SPARK_LEVELS[level]
            }
        })
        .collect()
}
