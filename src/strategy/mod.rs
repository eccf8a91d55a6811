//! Torrent admission strategies and their runtime management.
//!
//! A [`Strategy`] answers two questions about a [`TorrentCandidate`]: whether it
//! should be downloaded and how preferred it is on a `[0.0, 1.0]` scale. The
//! three built-in leaf strategies look at size, swarm ratio, and timing;
//! [`CompositeStrategy`] folds any number of them into one verdict. The
//! [`StrategyFactory`] builds strategies from configuration and the
//! [`StrategyManager`] keeps the named registry the host evaluates against.

mod composite;
mod domain;
mod factory;
mod manager;
mod ratio;
mod size;
mod time;

#[cfg(test)]
mod tests;

pub use composite::{CombinationMode, CompositeStrategy};
pub use domain::{DiscountClass, TorrentCandidate, Verdict};
pub use factory::{FactoryError, StrategyFactory};
pub use manager::{ManagerError, StrategyInfo, StrategyManager};
pub use ratio::{RatioParams, RatioStrategy};
pub use size::{SizeParams, SizeStrategy};
pub use time::{TimeParams, TimeStrategy};

/// Contract every admission strategy satisfies.
///
/// `evaluate` and `priority` are pure functions of the candidate and the
/// strategy's own configuration; the only side effect is tracing. `validate`
/// is called by the factory before an instance is accepted into a registry.
pub trait Strategy: Send + Sync + std::fmt::Debug {
    /// Short kind label used in registries, logs, and diagnostics.
    fn name(&self) -> &str;

    /// Decide whether the candidate should be downloaded.
    fn evaluate(&self, item: &TorrentCandidate) -> Verdict;

    /// Preference for the candidate, normalized to `[0.0, 1.0]`.
    ///
    /// Scores are only comparable between candidates evaluated by the same
    /// strategy instance.
    fn priority(&self, item: &TorrentCandidate) -> f64;

    /// Check the configured parameters against the strategy's invariants.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Invariant violations detected by [`Strategy::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be negative")]
    NegativeValue { field: &'static str },
    #[error("{min_field} must not exceed {max_field}")]
    InvertedBounds {
        min_field: &'static str,
        max_field: &'static str,
    },
    #[error("combination weights must not be negative")]
    NegativeWeight,
    #[error("{weights} weight(s) configured for {children} child strategies")]
    WeightCountMismatch { weights: usize, children: usize },
}
