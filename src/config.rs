use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::error::TrendError;
use crate::topics::cluster::RepresentativePolicy;

/// Default similarity threshold for merging two topics.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Default trailing window, in days (T-30 to T).
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Reject thresholds outside (-1, 1]. NaN is rejected too.
///
/// -1 itself is excluded: at -1 every pair of non-zero vectors would match.
pub fn validate_threshold(threshold: f64) -> crate::error::Result<()> {
    if threshold > -1.0 && threshold <= 1.0 {
        Ok(())
    } else {
        Err(TrendError::config(format!(
            "similarity threshold must be in (-1, 1], got {threshold}"
        )))
    }
}

/// Reject windows shorter than one day.
pub fn validate_window(window_days: u32) -> crate::error::Result<()> {
    if window_days >= 1 {
        Ok(())
    } else {
        Err(TrendError::config("window size must be at least 1 day"))
    }
}

/// The validated, immutable settings for one run of the core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendConfig {
    similarity_threshold: f64,
    window_days: u32,
    representative_policy: RepresentativePolicy,
}

impl TrendConfig {
    pub fn new(similarity_threshold: f64, window_days: u32) -> crate::error::Result<Self> {
        validate_threshold(similarity_threshold)?;
        validate_window(window_days)?;
        Ok(Self {
            similarity_threshold,
            window_days,
            representative_policy: RepresentativePolicy::default(),
        })
    }

    pub fn with_representative_policy(mut self, policy: RepresentativePolicy) -> Self {
        self.representative_policy = policy;
        self
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    pub fn representative_policy(&self) -> RepresentativePolicy {
        self.representative_policy
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            window_days: DEFAULT_WINDOW_DAYS,
            representative_policy: RepresentativePolicy::default(),
        }
    }
}

/// Settings loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy. Values here are raw;
/// CLI flags may override them before `trend_config()` validates.
#[derive(Debug, Clone)]
pub struct Config {
    /// TREND_SIMILARITY_THRESHOLD (default 0.85)
    pub similarity_threshold: f64,
    /// TREND_DAYS (default 30)
    pub window_days: u32,
    /// TREND_REPRESENTATIVE: first_member or centroid
    pub representative_policy: RepresentativePolicy,
    /// TREND_OUTPUT_DIR (default ./output)
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to defaults. Set-but-unparseable values are
    /// an error rather than silently ignored.
    pub fn load() -> Result<Self> {
        let similarity_threshold = match env::var("TREND_SIMILARITY_THRESHOLD") {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("TREND_SIMILARITY_THRESHOLD is not a number: {raw:?}"))?,
            Err(_) => DEFAULT_SIMILARITY_THRESHOLD,
        };

        let window_days = match env::var("TREND_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("TREND_DAYS is not a whole number of days: {raw:?}"))?,
            Err(_) => DEFAULT_WINDOW_DAYS,
        };

        let representative_policy = match env::var("TREND_REPRESENTATIVE") {
            Ok(raw) => raw.parse::<RepresentativePolicy>()?,
            Err(_) => RepresentativePolicy::default(),
        };

        Ok(Self {
            similarity_threshold,
            window_days,
            representative_policy,
            output_dir: env::var("TREND_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output")),
        })
    }

    /// Validate into the immutable config the core runs with.
    pub fn trend_config(&self) -> crate::error::Result<TrendConfig> {
        Ok(TrendConfig::new(self.similarity_threshold, self.window_days)?
            .with_representative_policy(self.representative_policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_bounds() {
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(0.85).is_ok());
        assert!(validate_threshold(-0.5).is_ok());
        assert!(validate_threshold(-1.0).is_err());
        assert!(validate_threshold(1.0001).is_err());
        assert!(validate_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_window_bounds() {
        assert!(validate_window(1).is_ok());
        assert!(validate_window(0).is_err());
    }

    #[test]
    fn test_trend_config_defaults() {
        let config = TrendConfig::default();
        assert_eq!(config.similarity_threshold(), 0.85);
        assert_eq!(config.window_days(), 30);
        assert_eq!(config.representative_policy(), RepresentativePolicy::FirstMember);
    }

    #[test]
    fn test_raw_config_validates() {
        let raw = Config {
            similarity_threshold: 2.0,
            window_days: 30,
            representative_policy: RepresentativePolicy::FirstMember,
            output_dir: PathBuf::from("output"),
        };
        assert!(matches!(raw.trend_config(), Err(TrendError::Configuration(_))));
    }
}
