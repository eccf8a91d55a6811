use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Candidate torrent assembled by the feed poller for one evaluation pass.
///
/// The engine reads it and forgets it; nothing here is retained between calls.
/// `disk_space_bytes` is the storage headroom measured by the host right before
/// the batch was evaluated, not a property of the torrent itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentCandidate {
    pub id: String,
    pub name: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub discount: DiscountClass,
    #[serde(default)]
    pub discount_end_time: Option<DateTime<Utc>>,
    pub seeders: u32,
    pub leechers: u32,
    #[serde(default)]
    pub publish_time: Option<DateTime<Utc>>,
    pub disk_space_bytes: u64,
}

/// Promotion label attached to a feed entry by the tracker.
///
/// Evaluation only consults the expiry timestamp; the class itself is carried
/// for audit trails and host-side bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiscountClass {
    #[serde(rename = "FREE")]
    Free,
    #[serde(rename = "2xFREE")]
    DoubleFree,
    #[serde(rename = "50%")]
    Half,
    #[serde(rename = "2x50%")]
    DoubleHalf,
    #[serde(rename = "30%")]
    Thirty,
    #[default]
    #[serde(rename = "NONE")]
    None,
}

/// Accept/reject outcome plus the human-readable reason used for audit logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub accepted: bool,
    pub reason: String,
}

impl Verdict {
    pub fn accept(reason: impl Into<String>) -> Self {
        Self {
            accepted: true,
            reason: reason.into(),
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: reason.into(),
        }
    }
}
