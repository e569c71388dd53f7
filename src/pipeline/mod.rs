// Pipeline orchestration: deduplicate topics, then build the trend table.

pub mod trend;
