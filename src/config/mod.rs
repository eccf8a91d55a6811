use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root configuration document consumed by the strategy manager.
///
/// The engine does not care where the document came from: the host may read it
/// from disk, an admin API, or embed it verbatim. By the time it reaches the
/// manager it is already parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Named strategy definitions, each built independently on load.
    #[serde(default)]
    pub strategy_configs: BTreeMap<String, StrategyConfig>,
    /// Name of the entry to activate after a successful load.
    #[serde(default = "default_strategy_name")]
    pub default_strategy: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy_configs: BTreeMap::new(),
            default_strategy: default_strategy_name(),
        }
    }
}

fn default_strategy_name() -> String {
    "default".to_string()
}

/// Declarative description of a single strategy.
///
/// `parameters` stays schemaless here; the factory deserializes it into the
/// typed parameter struct of whichever kind is named. Composite strategies
/// nest further `StrategyConfig` values inside their parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "empty_parameters")]
    pub parameters: Value,
}

impl StrategyConfig {
    pub fn new(kind: impl Into<String>, parameters: Value) -> Self {
        Self {
            kind: kind.into(),
            description: None,
            parameters,
        }
    }
}

fn empty_parameters() -> Value {
    Value::Object(serde_json::Map::new())
}
