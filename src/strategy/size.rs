use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{TorrentCandidate, Verdict};
use super::{Strategy, ValidationError};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

fn gib(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

/// Byte bounds and disk reserve for [`SizeStrategy`].
///
/// Every field has a default so a partial (or empty) parameter map still
/// constructs; bad combinations surface at validation instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeParams {
    /// Smallest acceptable torrent, bytes.
    #[serde(default = "default_min_size")]
    pub min_size: u64,
    /// Largest acceptable torrent, bytes.
    #[serde(default = "default_max_size")]
    pub max_size: u64,
    /// Storage headroom that must remain after the download completes, bytes.
    #[serde(default = "default_min_disk_space")]
    pub min_disk_space: u64,
    /// Multiplier applied to the size-closeness component of the priority.
    #[serde(default = "default_priority_weight")]
    pub priority_weight: f64,
}

impl Default for SizeParams {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            max_size: default_max_size(),
            min_disk_space: default_min_disk_space(),
            priority_weight: default_priority_weight(),
        }
    }
}

fn default_min_size() -> u64 {
    1 << 30 // 1 GiB
}

fn default_max_size() -> u64 {
    30 << 30
}

fn default_min_disk_space() -> u64 {
    80 << 30
}

fn default_priority_weight() -> f64 {
    1.0
}

/// Admits torrents whose size fits a configured band and leaves enough disk.
#[derive(Debug, Clone)]
pub struct SizeStrategy {
    params: SizeParams,
}

impl SizeStrategy {
    pub fn new(params: SizeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SizeParams {
        &self.params
    }
}

impl Strategy for SizeStrategy {
    fn name(&self) -> &str {
        "size"
    }

    fn evaluate(&self, item: &TorrentCandidate) -> Verdict {
        let size = item.size_bytes;

        let verdict = if size < self.params.min_size {
            Verdict::reject(format!(
                "size {:.2} GiB below minimum {:.2} GiB",
                gib(size),
                gib(self.params.min_size)
            ))
        } else if size > self.params.max_size {
            Verdict::reject(format!(
                "size {:.2} GiB above maximum {:.2} GiB",
                gib(size),
                gib(self.params.max_size)
            ))
        } else if item.disk_space_bytes.saturating_sub(size) < self.params.min_disk_space {
            Verdict::reject(format!(
                "download would leave {:.2} GiB free, below the {:.2} GiB reserve",
                gib(item.disk_space_bytes.saturating_sub(size)),
                gib(self.params.min_disk_space)
            ))
        } else {
            Verdict::accept(format!("size {:.2} GiB within bounds", gib(size)))
        };

        debug!(
            strategy = self.name(),
            torrent = %item.id,
            accepted = verdict.accepted,
            reason = %verdict.reason,
            "size decision"
        );
        verdict
    }

    fn priority(&self, item: &TorrentCandidate) -> f64 {
        let size = item.size_bytes as f64;
        let disk_space = item.disk_space_bytes as f64;

        // Mid-band torrents score highest; the score decays linearly with the
        // relative distance from the midpoint and may go negative before the
        // final clamp.
        let optimal_size = (self.params.min_size as f64 + self.params.max_size as f64) / 2.0;
        let size_score = if optimal_size > 0.0 {
            1.0 - (size - optimal_size).abs() / optimal_size
        } else {
            0.0
        };

        let space_utilization = if disk_space > 0.0 {
            1.0 - (disk_space - size) / disk_space
        } else {
            0.0
        };

        let priority = size_score * self.params.priority_weight + space_utilization * 0.5;
        priority.clamp(0.0, 1.0)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.params.min_size > self.params.max_size {
            return Err(ValidationError::InvertedBounds {
                min_field: "min_size",
                max_field: "max_size",
            });
        }
        Ok(())
    }
}
