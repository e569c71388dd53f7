// Topic deduplication: records, similarity, greedy clustering, labeling.

pub mod record;
pub mod similarity;
pub mod cluster;
pub mod label;
