// Canonical labeling: one representative text per cluster.
//
// The trait lets the labeling policy change without touching the clusterer
// or the aggregator. The default labels a cluster with the text of the
// record that opened it, which is also the record whose vector anchored the
// similarity test. Label and anchor always come from the same record.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrendError};
use crate::trends::aggregate::Occurrence;

use super::cluster::{Cluster, ClusterId};
use super::record::TopicRecord;

/// Trait for choosing the canonical text of a cluster.
pub trait CanonicalLabeler {
    /// Pick the label for `cluster`. `topics` is the slice that was clustered.
    fn label(&self, cluster: &Cluster, topics: &[TopicRecord]) -> Result<String>;
}

/// Labels a cluster with its first member's text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMemberLabeler;

impl CanonicalLabeler for FirstMemberLabeler {
    fn label(&self, cluster: &Cluster, topics: &[TopicRecord]) -> Result<String> {
        let id = cluster
            .first_member()
            .ok_or_else(|| TrendError::UnknownTopic(format!("first member of cluster {}", cluster.id)))?;
        let first = cluster
            .member_indices
            .first()
            .and_then(|&i| topics.get(i))
            .filter(|t| t.id == id)
            .ok_or_else(|| TrendError::UnknownTopic(id.to_string()))?;
        Ok(first.text.clone())
    }
}

/// A cluster together with its canonical label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledCluster {
    #[serde(flatten)]
    pub cluster: Cluster,
    pub canonical_label: String,
}

/// One row of the cluster assignment artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub topic_id: String,
    pub canonical_topic: String,
    pub cluster_id: ClusterId,
}

/// Apply `labeler` to every cluster, keeping cluster order.
pub fn label_clusters(
    clusters: Vec<Cluster>,
    topics: &[TopicRecord],
    labeler: &dyn CanonicalLabeler,
) -> Result<Vec<LabeledCluster>> {
    clusters
        .into_iter()
        .map(|cluster| {
            let canonical_label = labeler.label(&cluster, topics)?;
            Ok(LabeledCluster {
                cluster,
                canonical_label,
            })
        })
        .collect()
}

/// Flatten labeled clusters into one assignment row per topic, in the
/// order of `topics`.
///
/// Fails if the clusters don't cover `topics` exactly, which would mean they
/// came from a different input.
pub fn assignments(
    labeled: &[LabeledCluster],
    topics: &[TopicRecord],
) -> Result<Vec<ClusterAssignment>> {
    let mut slots: Vec<Option<ClusterAssignment>> = vec![None; topics.len()];

    for lc in labeled {
        for &index in &lc.cluster.member_indices {
            let topic = topics
                .get(index)
                .ok_or_else(|| TrendError::UnknownTopic(format!("#{index}")))?;
            slots[index] = Some(ClusterAssignment {
                topic_id: topic.id.clone(),
                canonical_topic: lc.canonical_label.clone(),
                cluster_id: lc.cluster.id,
            });
        }
    }

    slots
        .into_iter()
        .zip(topics)
        .map(|(slot, topic)| slot.ok_or_else(|| TrendError::UnknownTopic(topic.id.clone())))
        .collect()
}

/// The (canonical topic, date) pairs the trend aggregator counts.
pub fn occurrences(labeled: &[LabeledCluster], topics: &[TopicRecord]) -> Result<Vec<Occurrence>> {
    let mut out = Vec::with_capacity(topics.len());
    for lc in labeled {
        for &index in &lc.cluster.member_indices {
            let topic = topics
                .get(index)
                .ok_or_else(|| TrendError::UnknownTopic(format!("#{index}")))?;
            out.push(Occurrence::new(lc.canonical_label.clone(), topic.date));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::cluster::cluster;
    use crate::topics::record::Category;
    use chrono::NaiveDate;

    fn topic(id: &str, text: &str, vector: Vec<f64>) -> TopicRecord {
        let date = NaiveDate::from_ymd_opt(2025, 12, 21).unwrap();
        TopicRecord::new(id, text, Category::Feedback, date, vector)
    }

    fn sample() -> Vec<TopicRecord> {
        vec![
            topic("1", "login issues", vec![1.0, 0.0]),
            topic("2", "dark mode please", vec![0.0, 1.0]),
            topic("3", "cannot log in", vec![0.99, 0.05]),
        ]
    }

    #[test]
    fn test_label_is_first_member_text() {
        let topics = sample();
        let clusters = cluster(&topics, 0.85).unwrap();
        let labeled = label_clusters(clusters, &topics, &FirstMemberLabeler).unwrap();
        assert_eq!(labeled.len(), 2);
        assert_eq!(labeled[0].canonical_label, "login issues");
        assert_eq!(labeled[1].canonical_label, "dark mode please");
    }

    #[test]
    fn test_assignments_follow_input_order() {
        let topics = sample();
        let clusters = cluster(&topics, 0.85).unwrap();
        let labeled = label_clusters(clusters, &topics, &FirstMemberLabeler).unwrap();
        let rows = assignments(&labeled, &topics).unwrap();

        let ids: Vec<&str> = rows.iter().map(|r| r.topic_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(rows[2].canonical_topic, "login issues");
        assert_eq!(rows[2].cluster_id, ClusterId(0));
        assert_eq!(rows[1].cluster_id, ClusterId(1));
    }

    #[test]
    fn test_assignments_detect_uncovered_topics() {
        let topics = sample();
        let clusters = cluster(&topics[..2], 0.85).unwrap();
        let labeled = label_clusters(clusters, &topics, &FirstMemberLabeler).unwrap();
        assert_eq!(
            assignments(&labeled, &topics).unwrap_err(),
            TrendError::UnknownTopic("3".to_string())
        );
    }

    #[test]
    fn test_labeler_rejects_foreign_topics() {
        let topics = sample();
        let clusters = cluster(&topics, 0.85).unwrap();
        let other = vec![topic("x", "unrelated", vec![1.0, 0.0])];
        assert!(matches!(
            label_clusters(clusters, &other, &FirstMemberLabeler),
            Err(TrendError::UnknownTopic(_))
        ));
    }

    #[test]
    fn test_empty_cluster_is_unknown_topic() {
        let topics = sample();
        let empty = Cluster {
            id: ClusterId(3),
            members: Vec::new(),
            member_indices: Vec::new(),
            representative: vec![1.0, 0.0].into(),
        };
        assert!(matches!(
            FirstMemberLabeler.label(&empty, &topics),
            Err(TrendError::UnknownTopic(_))
        ));
    }

    #[test]
    fn test_occurrences_one_per_member() {
        let topics = sample();
        let clusters = cluster(&topics, 0.85).unwrap();
        let labeled = label_clusters(clusters, &topics, &FirstMemberLabeler).unwrap();
        let occ = occurrences(&labeled, &topics).unwrap();
        assert_eq!(occ.len(), 3);
        assert_eq!(
            occ.iter().filter(|o| o.canonical_topic == "login issues").count(),
            2
        );
    }
}
