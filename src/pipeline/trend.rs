// End-to-end trend run over one batch of extracted topics.
//
// Order matters for greedy clustering, so the pipeline always sorts the
// batch chronologically (stable, so extraction order breaks same-day ties)
// before anything else sees it. The sorted batch is what the report keeps.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::TrendConfig;
use crate::error::Result;
use crate::topics::cluster::GreedyClusterer;
use crate::topics::label::{
    assignments, label_clusters, occurrences, CanonicalLabeler, ClusterAssignment,
    FirstMemberLabeler, LabeledCluster,
};
use crate::topics::record::{order_chronologically, TopicRecord};
use crate::trends::aggregate::{TrendAggregator, TrendTable};

/// Topics after clustering and labeling.
#[derive(Debug, Clone)]
pub struct Deduplicated {
    /// The input in processing order: by date, ties kept in input order.
    pub topics: Vec<TopicRecord>,
    pub clusters: Vec<LabeledCluster>,
    /// One row per topic, parallel to `topics` (processing order, not file order).
    pub assignments: Vec<ClusterAssignment>,
}

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct TrendReport {
    pub deduplicated: Deduplicated,
    pub table: TrendTable,
}

/// Cluster and label `records` with the default first-member labeler.
pub fn deduplicate(records: Vec<TopicRecord>, config: &TrendConfig) -> Result<Deduplicated> {
    deduplicate_with(records, config, &FirstMemberLabeler)
}

/// Cluster and label `records` with a caller-chosen labeler.
pub fn deduplicate_with(
    mut records: Vec<TopicRecord>,
    config: &TrendConfig,
    labeler: &dyn CanonicalLabeler,
) -> Result<Deduplicated> {
    if records.is_empty() {
        warn!("No topics supplied; trend table will be empty");
    }

    order_chronologically(&mut records);

    let clusters = GreedyClusterer::from_config(config).cluster(&records)?;
    let clusters = label_clusters(clusters, &records, labeler)?;
    let assignments = assignments(&clusters, &records)?;

    Ok(Deduplicated {
        topics: records,
        clusters,
        assignments,
    })
}

/// Full run: deduplicate, then count canonical topics per day over
/// [reference - window, reference].
pub fn run(
    records: Vec<TopicRecord>,
    config: &TrendConfig,
    reference: NaiveDate,
) -> Result<TrendReport> {
    // Every config error, calendar overflow included, surfaces before clustering
    let aggregator = TrendAggregator::new(config.window_days())?;
    let window = aggregator.window(reference)?;

    let deduplicated = deduplicate(records, config)?;
    let occurrences = occurrences(&deduplicated.clusters, &deduplicated.topics)?;
    let table = aggregator.aggregate_over(&occurrences, window);

    info!(
        topics = deduplicated.topics.len(),
        canonical = deduplicated.clusters.len(),
        rows = table.rows.len(),
        reference = %reference,
        "Trend run complete"
    );

    Ok(TrendReport {
        deduplicated,
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrendError;
    use crate::topics::record::Category;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_run_sorts_before_clustering() {
        // The later-dated record comes first in the input, but the earlier one
        // must anchor the cluster and therefore supply the label.
        let records = vec![
            TopicRecord::new("late", "crash on startup", Category::Issue, day("2025-12-22"), vec![1.0, 0.05]),
            TopicRecord::new("early", "app keeps crashing", Category::Issue, day("2025-12-21"), vec![1.0, 0.0]),
        ];
        let config = TrendConfig::new(0.85, 2).unwrap();
        let report = run(records, &config, day("2025-12-22")).unwrap();

        assert_eq!(report.deduplicated.clusters.len(), 1);
        assert_eq!(report.deduplicated.clusters[0].canonical_label, "app keeps crashing");
        assert_eq!(report.deduplicated.assignments[0].topic_id, "early");
        assert_eq!(report.table.rows[0].total(), 2);
    }

    #[test]
    fn test_window_overflow_reported_before_clustering() {
        // Mismatched dimensions would fail clustering; the window error must win
        let records = vec![
            TopicRecord::new("a", "crash", Category::Issue, NaiveDate::MIN, vec![1.0, 0.0]),
            TopicRecord::new("b", "slow", Category::Issue, NaiveDate::MIN, vec![1.0]),
        ];
        let config = TrendConfig::new(0.85, 1).unwrap();
        assert!(matches!(
            run(records, &config, NaiveDate::MIN),
            Err(TrendError::Configuration(_))
        ));
    }

    #[test]
    fn test_assignments_follow_processing_order() {
        let records = vec![
            TopicRecord::new("c", "third", Category::Issue, day("2025-12-22"), vec![1.0, 0.0]),
            TopicRecord::new("a", "first", Category::Issue, day("2025-12-20"), vec![0.0, 1.0]),
            TopicRecord::new("b", "second", Category::Issue, day("2025-12-20"), vec![-1.0, 0.0]),
        ];
        let config = TrendConfig::new(0.85, 2).unwrap();
        let dedup = deduplicate(records, &config).unwrap();

        let ids: Vec<&str> = dedup.assignments.iter().map(|a| a.topic_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let topic_ids: Vec<&str> = dedup.topics.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, topic_ids);
    }

    #[test]
    fn test_run_empty_input() {
        let config = TrendConfig::new(0.85, 7).unwrap();
        let report = run(Vec::new(), &config, day("2025-12-22")).unwrap();
        assert!(report.table.rows.is_empty());
        assert_eq!(report.table.dates.len(), 8);
        assert!(report.deduplicated.assignments.is_empty());
    }
}
