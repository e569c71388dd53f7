// Greedy online clustering of topic records.
//
// One pass over the input in the order given. Each topic joins the most
// similar existing cluster if that similarity clears the threshold,
// otherwise it opens a new cluster. Clusters live in an arena indexed by
// ClusterId and refer to their members by topic id.
//
// The result depends on input order. The pipeline fixes that order with
// `order_chronologically` before calling in here; this module never reorders.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{validate_threshold, TrendConfig};
use crate::error::{Result, TrendError};

use super::record::{Embedding, TopicRecord};
use super::similarity::{cosine_similarity, mean_embedding};

/// Index of a cluster in the arena. Also its creation rank: lower ids were
/// opened earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub usize);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a cluster's representative vector evolves as members join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentativePolicy {
    /// The first member's vector, never updated. Deterministic and O(1) per join.
    #[default]
    FirstMember,
    /// Mean of all member vectors, recomputed on every join. Higher recall,
    /// different results; only used when explicitly configured.
    Centroid,
}

impl RepresentativePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepresentativePolicy::FirstMember => "first_member",
            RepresentativePolicy::Centroid => "centroid",
        }
    }
}

impl FromStr for RepresentativePolicy {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "first_member" | "first" => Ok(RepresentativePolicy::FirstMember),
            "centroid" => Ok(RepresentativePolicy::Centroid),
            other => Err(TrendError::config(format!(
                "Unknown representative policy {other:?} (expected first_member or centroid)"
            ))),
        }
    }
}

impl fmt::Display for RepresentativePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A group of topics judged to be the same statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub id: ClusterId,
    /// Member topic ids in the order they joined. Never empty.
    pub members: Vec<String>,
    /// Positions of the members in the slice that was clustered, parallel to `members`.
    #[serde(skip)]
    pub member_indices: Vec<usize>,
    pub representative: Embedding,
}

impl Cluster {
    fn open(id: ClusterId, index: usize, topic: &TopicRecord) -> Self {
        Self {
            id,
            members: vec![topic.id.clone()],
            member_indices: vec![index],
            representative: topic.vector.clone(),
        }
    }

    /// Id of the topic that opened this cluster.
    pub fn first_member(&self) -> Option<&str> {
        self.members.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Single-pass threshold clusterer.
#[derive(Debug, Clone)]
pub struct GreedyClusterer {
    threshold: f64,
    policy: RepresentativePolicy,
}

impl GreedyClusterer {
    /// Build a clusterer, rejecting thresholds outside (-1, 1].
    pub fn new(threshold: f64) -> Result<Self> {
        validate_threshold(threshold)?;
        Ok(Self {
            threshold,
            policy: RepresentativePolicy::default(),
        })
    }

    pub fn from_config(config: &TrendConfig) -> Self {
        Self {
            threshold: config.similarity_threshold(),
            policy: config.representative_policy(),
        }
    }

    pub fn with_policy(mut self, policy: RepresentativePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn policy(&self) -> RepresentativePolicy {
        self.policy
    }

    /// Partition `topics` into clusters, processing them in slice order.
    ///
    /// Ties on the best similarity go to the earliest-created cluster.
    /// Empty input gives an empty list.
    pub fn cluster(&self, topics: &[TopicRecord]) -> Result<Vec<Cluster>> {
        ensure_unique_ids(topics)?;

        let mut clusters: Vec<Cluster> = Vec::new();

        for (index, topic) in topics.iter().enumerate() {
            let mut best: Option<(usize, f64)> = None;

            for (slot, cluster) in clusters.iter().enumerate() {
                let sim = cosine_similarity(&cluster.representative, &topic.vector)?;
                // Strict comparison keeps the lowest id on ties
                if best.map_or(true, |(_, best_sim)| sim > best_sim) {
                    best = Some((slot, sim));
                }
            }

            match best {
                Some((slot, sim)) if sim >= self.threshold => {
                    let cluster = &mut clusters[slot];
                    cluster.members.push(topic.id.clone());
                    cluster.member_indices.push(index);

                    if self.policy == RepresentativePolicy::Centroid {
                        let vectors: Vec<&Embedding> = cluster
                            .member_indices
                            .iter()
                            .map(|&i| &topics[i].vector)
                            .collect();
                        cluster.representative = mean_embedding(&vectors)?;
                    }

                    debug!(
                        topic = %topic.id,
                        cluster = %cluster.id,
                        similarity = sim,
                        "Topic joined cluster"
                    );
                }
                _ => {
                    let id = ClusterId(clusters.len());
                    debug!(topic = %topic.id, cluster = %id, "Opened new cluster");
                    clusters.push(Cluster::open(id, index, topic));
                }
            }
        }

        info!(
            topics = topics.len(),
            clusters = clusters.len(),
            threshold = self.threshold,
            policy = %self.policy,
            "Deduplicated {} topics to {} canonical topics",
            topics.len(),
            clusters.len()
        );

        Ok(clusters)
    }
}

/// Cluster with the default first-member policy.
pub fn cluster(topics: &[TopicRecord], threshold: f64) -> Result<Vec<Cluster>> {
    GreedyClusterer::new(threshold)?.cluster(topics)
}

fn ensure_unique_ids(topics: &[TopicRecord]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(topics.len());
    for topic in topics {
        if !seen.insert(topic.id.as_str()) {
            return Err(TrendError::DuplicateTopicId(topic.id.clone()));
        }
    }
    Ok(())
}
