// topic-trends: deduplicate review topics and tabulate them by day.
//
// This is the library root. Modules follow the data flow: topic records are
// clustered and labeled (topics), counted into a trend table (trends), and
// written out (output). `pipeline` strings the stages together.

pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod topics;
pub mod trends;

pub use config::TrendConfig;
pub use error::TrendError;
pub use topics::record::{Category, Embedding, TopicRecord};
