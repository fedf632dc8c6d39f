//! Tuning knobs for the object manager and graph arenas.
//!
//! Both configs deserialize from JSON with every field optional; missing fields
//! take their [`Default`] values.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound accepted for any pre-sizing capacity.
pub const MAX_CAPACITY: usize = 1 << 24;

/// Configuration for an [`ObjectManager`](crate::ObjectManager).
///
/// Sub-pools never give memory back: every instance a type has ever needed stays
/// queued for reuse. That keeps steady-state churn allocation-free at the cost of
/// holding the high-water mark. `max_recycled` caps the queue for callers that
/// prefer the opposite trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Capacity reserved for each sub-pool's live registry and recycle queue.
    pub initial_capacity: usize,
    /// Maximum number of destroyed instances queued per type. `None` is unbounded.
    pub max_recycled: Option<usize>,
}

impl PoolConfig {
    /// Default per-type reservation.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = parse(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config to a JSON string.
    ///
    /// # Errors
    /// Propagates serializer failures.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_capacity("initial_capacity", self.initial_capacity)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            max_recycled: None,
        }
    }
}

/// Arena pre-sizing for a [`PoolGraph`](crate::PoolGraph).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// Node slots reserved up front.
    pub node_capacity: usize,
    /// Edge slots reserved up front.
    pub edge_capacity: usize,
}

impl GraphConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    /// Same as [`PoolConfig::from_json`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = parse(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_capacity("node_capacity", self.node_capacity)?;
        check_capacity("edge_capacity", self.edge_capacity)
    }
}

fn parse<T: DeserializeOwned>(json: &str) -> Result<T, ConfigError> {
    Ok(serde_json::from_str(json)?)
}

fn check_capacity(field: &str, value: usize) -> Result<(), ConfigError> {
    if value > MAX_CAPACITY {
        return Err(ConfigError::Invalid(format!(
            "{field} = {value} exceeds the maximum of {MAX_CAPACITY}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_config_defaults_fill_missing_fields() {
        let config = PoolConfig::from_json(r#"{ "max_recycled": 4 }"#).unwrap();
        assert_eq!(config.initial_capacity, PoolConfig::DEFAULT_INITIAL_CAPACITY);
        assert_eq!(config.max_recycled, Some(4));
    }

    #[test]
    fn pool_config_rejects_unknown_fields() {
        let err = PoolConfig::from_json(r#"{ "capacity": 4 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn graph_config_rejects_oversized_capacity() {
        let json = format!(r#"{{ "node_capacity": {} }}"#, MAX_CAPACITY + 1);
        let err = GraphConfig::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("node_capacity"));
    }
}
