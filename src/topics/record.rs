// TopicRecord: one topic extracted from one review, plus its embedding.
//
// Records arrive from the extraction stage fully formed. Nothing in this
// crate mutates a record after it is decoded; the clusterer reads vectors,
// the labeler reads text, and the aggregator reads dates.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Fixed-length dense vector for a topic's text.
///
/// Backed by a boxed slice rather than a Vec so the length is settled at
/// construction. Dimension checks are a single length comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Box<[f64]>);

impl Embedding {
    pub fn new(values: impl Into<Box<[f64]>>) -> Self {
        Self(values.into())
    }

    /// Number of components.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for Embedding {
    fn from(values: Vec<f64>) -> Self {
        Self(values.into_boxed_slice())
    }
}

impl<const N: usize> From<[f64; N]> for Embedding {
    fn from(values: [f64; N]) -> Self {
        Self(values.to_vec().into_boxed_slice())
    }
}

/// What kind of statement the extractor pulled out of a review.
///
/// Anything outside the three known kinds is kept verbatim in `Other`.
/// The extractor also emits "other", and we don't validate categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Issue,
    FeatureRequest,
    Feedback,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Issue => "issue",
            Category::FeatureRequest => "feature_request",
            Category::Feedback => "feedback",
            Category::Other(raw) => raw,
        }
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "issue" => Category::Issue,
            "feature_request" => Category::FeatureRequest,
            "feedback" => Category::Feedback,
            _ => Category::Other(raw),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single extracted topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    /// Unique within one run. Cluster membership refers to records by this id.
    pub id: String,
    /// Normalized topic statement, e.g. "app crashes on launch"
    pub text: String,
    pub category: Category,
    /// Calendar day of the source review. Timestamps are truncated on decode.
    #[serde(deserialize_with = "deserialize_day")]
    pub date: NaiveDate,
    pub vector: Embedding,
}

impl TopicRecord {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        category: Category,
        date: NaiveDate,
        vector: impl Into<Embedding>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category,
            date,
            vector: vector.into(),
        }
    }
}

/// Put records into the order the clusterer expects: by date ascending,
/// keeping the original sequence position for records on the same day.
///
/// Greedy clustering depends on processing order, so the pipeline always
/// goes through here instead of relying on whatever order the input had.
pub fn order_chronologically(records: &mut [TopicRecord]) {
    // sort_by_key is stable, which is what preserves extraction order on ties
    records.sort_by_key(|r| r.date);
}

/// Parse a calendar day from a bare date, a naive timestamp, or RFC 3339.
pub fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(day);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts.date());
        }
    }

    Err(format!("Unrecognized date {raw:?} (expected YYYY-MM-DD)"))
}

fn deserialize_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_day(&raw).map_err(serde::de::Error::custom)
}
