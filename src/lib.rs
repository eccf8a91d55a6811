//! Admission-control strategy engine for torrent feed candidates.
//!
//! The feed poller hands each discovered torrent to a [`strategy::StrategyManager`],
//! which answers two questions against the currently active strategy: should the
//! torrent be downloaded at all, and how strongly is it preferred relative to the
//! other candidates in the same batch. Strategies are built from declarative
//! configuration by a [`strategy::StrategyFactory`] and can be combined, swapped,
//! and reloaded at runtime without touching the polling loop.
//!
//! The engine performs no I/O of its own: feed parsing, download-client control,
//! and the administrative surface that edits strategy configuration all live in
//! the host process.

pub mod config;
pub mod strategy;

pub use config::{EngineConfig, StrategyConfig};
pub use strategy::{
    CombinationMode, CompositeStrategy, DiscountClass, FactoryError, ManagerError, RatioStrategy,
    SizeStrategy, Strategy, StrategyFactory, StrategyInfo, StrategyManager, TimeStrategy,
    TorrentCandidate, ValidationError, Verdict,
};
