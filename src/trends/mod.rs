// Trend tables: daily counts of canonical topics over a trailing window.

pub mod window;
pub mod aggregate;
