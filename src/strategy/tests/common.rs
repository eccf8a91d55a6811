use chrono::{Duration, Utc};

use crate::strategy::{DiscountClass, Strategy, TorrentCandidate, ValidationError, Verdict};

pub(super) const GIB: u64 = 1024 * 1024 * 1024;

/// A healthy mid-sized candidate: 5 GiB, decent swarm, published two hours
/// ago with twenty hours of discount left, 100 GiB of headroom.
pub(super) fn sample_candidate() -> TorrentCandidate {
    let now = Utc::now();
    TorrentCandidate {
        id: "t-123".to_string(),
        name: "Example.Release.2160p".to_string(),
        size_bytes: 5 * GIB,
        discount: DiscountClass::Free,
        discount_end_time: Some(now + Duration::hours(20)),
        seeders: 10,
        leechers: 5,
        publish_time: Some(now - Duration::hours(2)),
        disk_space_bytes: 100 * GIB,
    }
}

/// Stand-in child strategy with a pinned verdict and score, for exercising
/// combination semantics in isolation.
#[derive(Debug)]
pub(super) struct FixedStrategy {
    pub accepted: bool,
    pub score: f64,
}

impl FixedStrategy {
    pub(super) fn boxed(accepted: bool, score: f64) -> Box<dyn Strategy> {
        Box::new(Self { accepted, score })
    }
}

impl Strategy for FixedStrategy {
    fn name(&self) -> &str {
        "fixed"
    }

    fn evaluate(&self, _item: &TorrentCandidate) -> Verdict {
        if self.accepted {
            Verdict::accept("fixed accept")
        } else {
            Verdict::reject("fixed reject")
        }
    }

    fn priority(&self, _item: &TorrentCandidate) -> f64 {
        self.score
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
