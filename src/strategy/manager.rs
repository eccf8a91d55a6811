use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::EngineConfig;

use super::domain::{TorrentCandidate, Verdict};
use super::factory::StrategyFactory;
use super::Strategy;

/// Name the fallback strategy set is installed under when nothing else loads.
const FALLBACK_NAME: &str = "default";

/// Errors surfaced by the manager's administrative operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManagerError {
    #[error("strategy '{0}' is not registered")]
    UnknownStrategy(String),
}

/// Diagnostic snapshot of a registered strategy, for admin surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyInfo {
    pub name: String,
    pub kind: String,
    pub valid: bool,
}

/// Owns the named strategy registry and the single active entry.
///
/// Evaluation methods take `&self`; everything that mutates the registry takes
/// `&mut self`, so a multi-threaded host wraps the manager in a lock and a
/// reload is an all-or-nothing swap from any reader's point of view.
pub struct StrategyManager {
    factory: StrategyFactory,
    config: EngineConfig,
    strategies: BTreeMap<String, Box<dyn Strategy>>,
    active: Option<String>,
}

impl StrategyManager {
    /// Build a manager and load the given configuration immediately.
    pub fn new(config: EngineConfig) -> Self {
        let mut manager = Self {
            factory: StrategyFactory::new(),
            config,
            strategies: BTreeMap::new(),
            active: None,
        };
        manager.rebuild();
        manager
    }

    /// Replace the stored configuration and rebuild the registry from it.
    pub fn load(&mut self, config: EngineConfig) {
        self.config = config;
        self.rebuild();
    }

    /// Rebuild the registry from the stored configuration. A wholesale
    /// replacement: entries added via [`Self::insert`] do not survive.
    pub fn reload(&mut self) {
        info!("reloading strategy configuration");
        self.rebuild();
    }

    /// Access to the factory, e.g. to register additional strategy kinds
    /// before calling [`Self::reload`].
    pub fn factory_mut(&mut self) -> &mut StrategyFactory {
        &mut self.factory
    }

    fn rebuild(&mut self) {
        let mut strategies: BTreeMap<String, Box<dyn Strategy>> = BTreeMap::new();

        for (name, config) in &self.config.strategy_configs {
            match self.factory.create_from_config(config) {
                Ok(strategy) => {
                    info!(strategy = %name, kind = %config.kind, "loaded strategy");
                    strategies.insert(name.clone(), strategy);
                }
                Err(error) => {
                    warn!(strategy = %name, %error, "skipping strategy that failed to load");
                }
            }
        }

        let active = if strategies.contains_key(&self.config.default_strategy) {
            self.config.default_strategy.clone()
        } else if let Some(name) = strategies.keys().next() {
            warn!(
                requested = %self.config.default_strategy,
                fallback = %name,
                "configured default strategy is unavailable"
            );
            name.clone()
        } else {
            warn!("no strategy loaded, installing built-in default set");
            strategies.insert(
                FALLBACK_NAME.to_string(),
                Box::new(self.factory.default_strategy_set()),
            );
            FALLBACK_NAME.to_string()
        };

        info!(strategy = %active, "activated strategy");
        // Swap both fields at once so readers never see a half-built registry.
        self.strategies = strategies;
        self.active = Some(active);
    }

    /// Decide the candidate against the active strategy. Fails closed: with
    /// no active entry the candidate is rejected.
    pub fn evaluate(&self, item: &TorrentCandidate) -> Verdict {
        match self.active_entry() {
            Some((name, strategy)) => {
                let verdict = strategy.evaluate(item);
                info!(
                    strategy = %name,
                    torrent = %item.id,
                    accepted = verdict.accepted,
                    reason = %verdict.reason,
                    "evaluated candidate"
                );
                verdict
            }
            None => {
                warn!(torrent = %item.id, "no active strategy, rejecting candidate");
                Verdict::reject("no active strategy configured")
            }
        }
    }

    /// Score the candidate against the active strategy; 0.0 with none active.
    pub fn priority(&self, item: &TorrentCandidate) -> f64 {
        match self.active_entry() {
            Some((_, strategy)) => strategy.priority(item),
            None => 0.0,
        }
    }

    /// Switch the active entry; state is unchanged when `name` is unknown.
    pub fn activate(&mut self, name: &str) -> Result<(), ManagerError> {
        if !self.strategies.contains_key(name) {
            return Err(ManagerError::UnknownStrategy(name.to_string()));
        }
        self.active = Some(name.to_string());
        info!(strategy = %name, "activated strategy");
        Ok(())
    }

    /// Remove an entry. Removing the active entry falls over to an arbitrary
    /// survivor, or to no active entry when the registry empties.
    pub fn remove(&mut self, name: &str) -> Result<(), ManagerError> {
        if self.strategies.remove(name).is_none() {
            return Err(ManagerError::UnknownStrategy(name.to_string()));
        }

        if self.active.as_deref() == Some(name) {
            self.active = self.strategies.keys().next().cloned();
            match &self.active {
                Some(successor) => {
                    warn!(removed = %name, successor = %successor, "removed the active strategy")
                }
                None => warn!(removed = %name, "removed the last strategy, nothing active"),
            }
        }

        info!(strategy = %name, "removed strategy");
        Ok(())
    }

    /// Place a pre-built strategy into the registry, overwriting any entry of
    /// the same name.
    pub fn insert(&mut self, name: &str, strategy: Box<dyn Strategy>) {
        if self
            .strategies
            .insert(name.to_string(), strategy)
            .is_some()
        {
            warn!(strategy = %name, "overwrote existing strategy");
        } else {
            info!(strategy = %name, "inserted strategy");
        }
        if self.active.is_none() {
            self.active = Some(name.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Strategy> {
        self.strategies.get(name).map(Box::as_ref)
    }

    /// Name of the active entry, if any.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Registered strategy names, sorted.
    pub fn available_strategies(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }

    /// Diagnostic view of a named entry.
    pub fn strategy_info(&self, name: &str) -> Result<StrategyInfo, ManagerError> {
        let strategy = self
            .strategies
            .get(name)
            .ok_or_else(|| ManagerError::UnknownStrategy(name.to_string()))?;
        Ok(StrategyInfo {
            name: name.to_string(),
            kind: strategy.name().to_string(),
            valid: strategy.validate().is_ok(),
        })
    }

    fn active_entry(&self) -> Option<(&str, &dyn Strategy)> {
        let name = self.active.as_deref()?;
        let strategy = self.strategies.get(name)?;
        Some((name, strategy.as_ref()))
    }
}
