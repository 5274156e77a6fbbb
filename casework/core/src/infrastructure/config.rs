// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Casework Service Configuration
//
// YAML-backed settings for the casework handlers: event bus sizing and the
// redelivery backoff hint surfaced to the hosting message layer alongside
// retryable errors. All fields default, so an absent or partial manifest is
// valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseworkConfig {
    /// Buffered capacity of the in-process event bus
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    /// Suggested delay before the platform redelivers a message rejected
    /// with a retryable not-found. Advisory only; the platform owns the
    /// actual redelivery schedule.
    #[serde(default = "default_redelivery_backoff", with = "humantime_serde")]
    pub redelivery_backoff_hint: Duration,
}

fn default_event_bus_capacity() -> usize {
    1000
}

fn default_redelivery_backoff() -> Duration {
    Duration::from_secs(30)
}

impl Default for CaseworkConfig {
    fn default() -> Self {
        Self {
            event_bus_capacity: default_event_bus_capacity(),
            redelivery_backoff_hint: default_redelivery_backoff(),
        }
    }
}

impl CaseworkConfig {
    /// Parse from YAML content
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CaseworkConfig::default();
        assert_eq!(config.event_bus_capacity, 1000);
        assert_eq!(config.redelivery_backoff_hint, Duration::from_secs(30));
    }

    #[test]
    fn test_partial_manifest_fills_defaults() {
        let config = CaseworkConfig::from_yaml_str("event_bus_capacity: 64\n").unwrap();
        assert_eq!(config.event_bus_capacity, 64);
        assert_eq!(config.redelivery_backoff_hint, Duration::from_secs(30));
    }

    #[test]
    fn test_humantime_duration_parsing() {
        let config =
            CaseworkConfig::from_yaml_str("redelivery_backoff_hint: 2m 30s\n").unwrap();
        assert_eq!(config.redelivery_backoff_hint, Duration::from_secs(150));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = CaseworkConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed = CaseworkConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.event_bus_capacity, config.event_bus_capacity);
    }
}
