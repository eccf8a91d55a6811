use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{TorrentCandidate, Verdict};
use super::{Strategy, ValidationError};

const SECS_PER_HOUR: f64 = 3600.0;
const SECS_PER_DAY: f64 = 24.0 * SECS_PER_HOUR;

/// Freshness and discount-window settings for [`TimeStrategy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeParams {
    /// Oldest acceptable publish age, seconds.
    #[serde(default = "default_max_publish_age")]
    pub max_publish_age: u64,
    /// Least discount time that must remain when an expiry is known, seconds.
    #[serde(default = "default_min_free_time")]
    pub min_free_time: u64,
    /// Multiplier applied to the combined time score.
    #[serde(default = "default_priority_weight")]
    pub priority_weight: f64,
    /// When set, fresher torrents always score higher; when unset, torrents of
    /// around half the maximum age score best.
    #[serde(default = "default_prefer_new_torrents")]
    pub prefer_new_torrents: bool,
    /// Per-hour decay applied on top of the age score.
    #[serde(default = "default_time_decay_factor")]
    pub time_decay_factor: f64,
}

impl Default for TimeParams {
    fn default() -> Self {
        Self {
            max_publish_age: default_max_publish_age(),
            min_free_time: default_min_free_time(),
            priority_weight: default_priority_weight(),
            prefer_new_torrents: default_prefer_new_torrents(),
            time_decay_factor: default_time_decay_factor(),
        }
    }
}

fn default_max_publish_age() -> u64 {
    24 * 60 * 60
}

fn default_min_free_time() -> u64 {
    10 * 60 * 60
}

fn default_priority_weight() -> f64 {
    1.0
}

fn default_prefer_new_torrents() -> bool {
    true
}

fn default_time_decay_factor() -> f64 {
    0.1
}

/// Admits torrents that are fresh enough and still carry a usable discount.
#[derive(Debug, Clone)]
pub struct TimeStrategy {
    params: TimeParams,
}

impl TimeStrategy {
    pub fn new(params: TimeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TimeParams {
        &self.params
    }

    /// Evaluate against an explicit reference time. The trait implementation
    /// calls this with `Utc::now()`; tests and replaying hosts can pin `now`.
    pub fn evaluate_at(&self, item: &TorrentCandidate, now: DateTime<Utc>) -> Verdict {
        let Some(publish_time) = item.publish_time else {
            return Verdict::reject("publish time unknown");
        };

        let age_secs = (now - publish_time).num_seconds();
        if age_secs > self.params.max_publish_age as i64 {
            return Verdict::reject(format!(
                "published {:.1}h ago, over the {:.1}h window",
                age_secs as f64 / SECS_PER_HOUR,
                self.params.max_publish_age as f64 / SECS_PER_HOUR
            ));
        }

        if let Some(discount_end) = item.discount_end_time {
            let remaining_secs = (discount_end - now).num_seconds();
            if remaining_secs < self.params.min_free_time as i64 {
                return Verdict::reject(format!(
                    "only {:.1}h of discount left, need {:.1}h",
                    remaining_secs as f64 / SECS_PER_HOUR,
                    self.params.min_free_time as f64 / SECS_PER_HOUR
                ));
            }
        }

        Verdict::accept(format!(
            "published {:.1}h ago, within the window",
            age_secs as f64 / SECS_PER_HOUR
        ))
    }

    /// Priority against an explicit reference time; see [`Self::evaluate_at`].
    pub fn priority_at(&self, item: &TorrentCandidate, now: DateTime<Utc>) -> f64 {
        let Some(publish_time) = item.publish_time else {
            return 0.0;
        };

        let age_secs = (now - publish_time).num_seconds() as f64;
        let max_age = self.params.max_publish_age as f64;

        let age_score = if self.params.prefer_new_torrents {
            (1.0 - age_secs / max_age).max(0.0)
        } else {
            let optimal_age = max_age / 2.0;
            if optimal_age > 0.0 {
                1.0 - (age_secs - optimal_age).abs() / optimal_age
            } else {
                0.0
            }
        };

        // Remaining discount time saturates at a full day.
        let discount_score = item
            .discount_end_time
            .map(|end| ((end - now).num_seconds() as f64 / SECS_PER_DAY).clamp(0.0, 1.0))
            .unwrap_or(0.0);

        // Future-dated publish times must not zero out the decay denominator.
        let decay_age_hours = (age_secs / SECS_PER_HOUR).max(0.0);
        let decay = 1.0 / (1.0 + self.params.time_decay_factor * decay_age_hours);

        let priority =
            (age_score * 0.6 + discount_score * 0.4) * decay * self.params.priority_weight;
        priority.clamp(0.0, 1.0)
    }
}

impl Strategy for TimeStrategy {
    fn name(&self) -> &str {
        "time"
    }

    fn evaluate(&self, item: &TorrentCandidate) -> Verdict {
        let verdict = self.evaluate_at(item, Utc::now());
        debug!(
            strategy = self.name(),
            torrent = %item.id,
            accepted = verdict.accepted,
            reason = %verdict.reason,
            "time decision"
        );
        verdict
    }

    fn priority(&self, item: &TorrentCandidate) -> f64 {
        self.priority_at(item, Utc::now())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.params.time_decay_factor < 0.0 {
            return Err(ValidationError::NegativeValue {
                field: "time_decay_factor",
            });
        }
        Ok(())
    }
}
