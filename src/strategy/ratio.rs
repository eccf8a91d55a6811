use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{TorrentCandidate, Verdict};
use super::{Strategy, ValidationError};

/// Swarm-health bounds for [`RatioStrategy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioParams {
    /// Minimum seeder count before the torrent is considered at all.
    #[serde(default = "default_min_seeders")]
    pub min_seeders: u32,
    /// Lower bound on the leechers/seeders ratio.
    #[serde(default = "default_min_ratio")]
    pub min_ratio: f64,
    /// Upper bound on the leechers/seeders ratio.
    #[serde(default = "default_max_ratio")]
    pub max_ratio: f64,
    /// Multiplier applied to the ratio-closeness component of the priority.
    #[serde(default = "default_priority_weight")]
    pub priority_weight: f64,
    /// When set, more seeders always score higher (saturating at 100); when
    /// unset, a mid-sized swarm of around 50 seeders scores best.
    #[serde(default = "default_prefer_high_seeders")]
    pub prefer_high_seeders: bool,
}

impl Default for RatioParams {
    fn default() -> Self {
        Self {
            min_seeders: default_min_seeders(),
            min_ratio: default_min_ratio(),
            max_ratio: default_max_ratio(),
            priority_weight: default_priority_weight(),
            prefer_high_seeders: default_prefer_high_seeders(),
        }
    }
}

fn default_min_seeders() -> u32 {
    1
}

fn default_min_ratio() -> f64 {
    0.1
}

fn default_max_ratio() -> f64 {
    10.0
}

fn default_priority_weight() -> f64 {
    1.0
}

fn default_prefer_high_seeders() -> bool {
    true
}

/// Admits torrents whose leechers/seeders ratio sits inside a configured band.
#[derive(Debug, Clone)]
pub struct RatioStrategy {
    params: RatioParams,
}

impl RatioStrategy {
    pub fn new(params: RatioParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RatioParams {
        &self.params
    }

    // Ratio is defined as 0 for a seederless swarm.
    fn ratio(item: &TorrentCandidate) -> f64 {
        if item.seeders > 0 {
            item.leechers as f64 / item.seeders as f64
        } else {
            0.0
        }
    }
}

impl Strategy for RatioStrategy {
    fn name(&self) -> &str {
        "ratio"
    }

    fn evaluate(&self, item: &TorrentCandidate) -> Verdict {
        let ratio = Self::ratio(item);

        let verdict = if item.seeders < self.params.min_seeders {
            Verdict::reject(format!(
                "{} seeder(s) below minimum {}",
                item.seeders, self.params.min_seeders
            ))
        } else if ratio < self.params.min_ratio {
            Verdict::reject(format!(
                "leechers/seeders ratio {ratio:.2} below minimum {:.2}",
                self.params.min_ratio
            ))
        } else if ratio > self.params.max_ratio {
            Verdict::reject(format!(
                "leechers/seeders ratio {ratio:.2} above maximum {:.2}",
                self.params.max_ratio
            ))
        } else {
            Verdict::accept(format!(
                "{} seeders, {} leechers, ratio {ratio:.2} within bounds",
                item.seeders, item.leechers
            ))
        };

        debug!(
            strategy = self.name(),
            torrent = %item.id,
            accepted = verdict.accepted,
            reason = %verdict.reason,
            "ratio decision"
        );
        verdict
    }

    fn priority(&self, item: &TorrentCandidate) -> f64 {
        if item.seeders == 0 {
            return 0.0;
        }

        let ratio = Self::ratio(item);
        let optimal_ratio = (self.params.min_ratio + self.params.max_ratio) / 2.0;
        let ratio_score = if optimal_ratio > 0.0 {
            1.0 - (ratio - optimal_ratio).abs() / optimal_ratio
        } else {
            0.0
        };

        let seeders = item.seeders as f64;
        let seeder_score = if self.params.prefer_high_seeders {
            (seeders / 100.0).min(1.0)
        } else {
            1.0 - (seeders - 50.0).abs() / 50.0
        };

        let priority = ratio_score * self.params.priority_weight + seeder_score * 0.5;
        priority.clamp(0.0, 1.0)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.params.min_ratio < 0.0 {
            return Err(ValidationError::NegativeValue { field: "min_ratio" });
        }
        if self.params.max_ratio < 0.0 {
            return Err(ValidationError::NegativeValue { field: "max_ratio" });
        }
        if self.params.min_ratio > self.params.max_ratio {
            return Err(ValidationError::InvertedBounds {
                min_field: "min_ratio",
                max_field: "max_ratio",
            });
        }
        Ok(())
    }
}
