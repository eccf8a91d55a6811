use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::StrategyConfig;

use super::composite::{CombinationMode, CompositeStrategy};
use super::ratio::{RatioParams, RatioStrategy};
use super::size::{SizeParams, SizeStrategy};
use super::time::{TimeParams, TimeStrategy};
use super::{Strategy, ValidationError};

/// Builds a strategy from its raw parameter document. Receives the factory so
/// composite kinds can recurse into child construction.
pub type StrategyConstructor =
    Box<dyn Fn(&StrategyFactory, &Value) -> Result<Box<dyn Strategy>, FactoryError> + Send + Sync>;

/// Errors raised while turning configuration into strategy instances.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("unknown strategy kind '{0}'")]
    UnknownKind(String),
    #[error("invalid parameters for strategy kind '{kind}': {source}")]
    InvalidParameters {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("strategy kind '{kind}' failed validation: {source}")]
    Invalid {
        kind: String,
        #[source]
        source: ValidationError,
    },
    #[error("composite strategy produced no usable children")]
    NoUsableChildren,
}

/// Nested parameter document for the `composite` kind.
#[derive(Debug, Clone, serde::Deserialize)]
struct CompositeParams {
    #[serde(default)]
    children: Vec<StrategyConfig>,
    #[serde(default)]
    combination_type: CombinationMode,
    #[serde(default)]
    weights: Vec<f64>,
}

/// Registry mapping strategy kind names to constructors.
///
/// Seeded with the built-in kinds; hosts may register additional kinds under
/// new names as long as the implementation satisfies the [`Strategy`] trait.
pub struct StrategyFactory {
    constructors: BTreeMap<String, StrategyConstructor>,
}

impl Default for StrategyFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyFactory {
    pub fn new() -> Self {
        let mut factory = Self {
            constructors: BTreeMap::new(),
        };
        factory.register("size", |_, params| {
            let params: SizeParams = parse_params("size", params)?;
            Ok(Box::new(SizeStrategy::new(params)) as Box<dyn Strategy>)
        });
        factory.register("ratio", |_, params| {
            let params: RatioParams = parse_params("ratio", params)?;
            Ok(Box::new(RatioStrategy::new(params)) as Box<dyn Strategy>)
        });
        factory.register("time", |_, params| {
            let params: TimeParams = parse_params("time", params)?;
            Ok(Box::new(TimeStrategy::new(params)) as Box<dyn Strategy>)
        });
        factory.register("composite", |factory, params| {
            factory.create_composite(params)
        });
        factory
    }

    /// Register (or replace) a constructor under `kind`.
    pub fn register<F>(&mut self, kind: &str, constructor: F)
    where
        F: Fn(&StrategyFactory, &Value) -> Result<Box<dyn Strategy>, FactoryError>
            + Send
            + Sync
            + 'static,
    {
        if self
            .constructors
            .insert(kind.to_string(), Box::new(constructor))
            .is_some()
        {
            info!(kind, "replaced strategy constructor");
        }
    }

    /// Kind names currently constructible, in sorted order.
    pub fn available_kinds(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Build and validate a strategy of the named kind.
    ///
    /// An instance that fails validation is discarded rather than returned.
    pub fn create(&self, kind: &str, parameters: &Value) -> Result<Box<dyn Strategy>, FactoryError> {
        let constructor = self
            .constructors
            .get(kind)
            .ok_or_else(|| FactoryError::UnknownKind(kind.to_string()))?;

        let strategy = constructor(self, parameters)?;
        if let Err(source) = strategy.validate() {
            warn!(kind, error = %source, "discarding strategy that failed validation");
            return Err(FactoryError::Invalid {
                kind: kind.to_string(),
                source,
            });
        }
        Ok(strategy)
    }

    /// Build a composite from nested child configurations.
    ///
    /// Children that fail to build are logged and skipped; construction fails
    /// only when no child builds at all.
    pub fn create_composite(&self, parameters: &Value) -> Result<Box<dyn Strategy>, FactoryError> {
        let params: CompositeParams = parse_params("composite", parameters)?;

        let mut children: Vec<Box<dyn Strategy>> = Vec::new();
        for child_config in &params.children {
            match self.create_from_config(child_config) {
                Ok(child) => children.push(child),
                Err(error) => {
                    warn!(kind = %child_config.kind, %error, "skipping child strategy that failed to build");
                }
            }
        }

        if children.is_empty() {
            return Err(FactoryError::NoUsableChildren);
        }

        let composite = CompositeStrategy::new(children, params.combination_type, params.weights);
        if let Err(source) = composite.validate() {
            warn!(error = %source, "discarding composite that failed validation");
            return Err(FactoryError::Invalid {
                kind: "composite".to_string(),
                source,
            });
        }
        Ok(Box::new(composite))
    }

    /// Dispatch on the configured kind: composites recurse, everything else
    /// is built from the flat parameter map.
    pub fn create_from_config(
        &self,
        config: &StrategyConfig,
    ) -> Result<Box<dyn Strategy>, FactoryError> {
        if config.kind == "composite" {
            self.create_composite(&config.parameters)
        } else {
            self.create(&config.kind, &config.parameters)
        }
    }

    /// Canonical fallback: size + ratio + time under AND.
    ///
    /// Built from typed defaults, so it cannot fail and always validates.
    pub fn default_strategy_set(&self) -> CompositeStrategy {
        let children: Vec<Box<dyn Strategy>> = vec![
            Box::new(SizeStrategy::new(SizeParams::default())),
            Box::new(RatioStrategy::new(RatioParams::default())),
            Box::new(TimeStrategy::new(TimeParams::default())),
        ];
        CompositeStrategy::new(children, CombinationMode::And, vec![0.4, 0.3, 0.3])
    }
}

/// Deserialize a parameter document into a typed, defaulted parameter struct.
/// An absent document is treated as an empty map so defaults apply.
fn parse_params<P: DeserializeOwned>(kind: &str, parameters: &Value) -> Result<P, FactoryError> {
    let value = if parameters.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        parameters.clone()
    };
    serde_json::from_value(value).map_err(|source| FactoryError::InvalidParameters {
        kind: kind.to_string(),
        source,
    })
}
