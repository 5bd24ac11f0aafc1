//! Ledger configuration
//!
//! Supports defaults and environment variables:
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `GOLDBYTE_ADMINS` | comma-separated administrator accounts | none |
//! | `GOLDBYTE_RESERVE_CLASSES` | comma-separated known reserve classes | `Gold,Fiat` |
//! | `GOLDBYTE_DEFAULT_RESERVE` | class used when an issuance names none | `Gold` |
//! | `GOLDBYTE_EVENT_CAPACITY` | buffered events per live subscriber | `1024` |
//!
//! The fee rate and holding period are constants of the ledger and are
//! deliberately not configurable.

use goldbyte_types::{AccountId, ReserveClass};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Live event channel capacity used when none is configured
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Default reserve class {class} is not among the known classes")]
    UnknownDefaultClass { class: ReserveClass },

    #[error("At least one reserve class must be configured")]
    NoReserveClasses,
}

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Accounts allowed to register banks and manage fee exemptions
    #[serde(default)]
    pub admins: Vec<AccountId>,

    /// Reserve classes tokens may be issued against
    #[serde(default = "default_reserve_classes")]
    pub reserve_classes: Vec<ReserveClass>,

    /// Class used when an issuance request does not name one
    #[serde(default)]
    pub default_reserve_class: ReserveClass,

    /// Capacity of the live event channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            admins: Vec::new(),
            reserve_classes: default_reserve_classes(),
            default_reserve_class: ReserveClass::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl LedgerConfig {
    /// Default configuration administered by `admin`
    pub fn with_admin(admin: impl Into<AccountId>) -> Self {
        Self {
            admins: vec![admin.into()],
            ..Self::default()
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup (environment, `.env` map, ...)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(admins) = lookup("GOLDBYTE_ADMINS") {
            config.admins = split_list(&admins).map(AccountId::new).collect();
        }

        if let Some(classes) = lookup("GOLDBYTE_RESERVE_CLASSES") {
            config.reserve_classes = split_list(&classes)
                .map(|name| {
                    ReserveClass::parse(name).map_err(|e| ConfigError::InvalidValue {
                        key: "GOLDBYTE_RESERVE_CLASSES".to_string(),
                        message: e.to_string(),
                    })
                })
                .collect::<Result<_, _>>()?;
        }

        if let Some(class) = lookup("GOLDBYTE_DEFAULT_RESERVE") {
            config.default_reserve_class =
                ReserveClass::parse(&class).map_err(|e| ConfigError::InvalidValue {
                    key: "GOLDBYTE_DEFAULT_RESERVE".to_string(),
                    message: e.to_string(),
                })?;
        }

        if let Some(capacity) = lookup("GOLDBYTE_EVENT_CAPACITY") {
            config.event_capacity =
                capacity
                    .trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                        key: "GOLDBYTE_EVENT_CAPACITY".to_string(),
                        message: e.to_string(),
                    })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reserve_classes.is_empty() {
            return Err(ConfigError::NoReserveClasses);
        }
        if !self.reserve_classes.contains(&self.default_reserve_class) {
            return Err(ConfigError::UnknownDefaultClass {
                class: self.default_reserve_class.clone(),
            });
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "event_capacity".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn default_reserve_classes() -> Vec<ReserveClass> {
    vec![ReserveClass::gold(), ReserveClass::fiat()]
}

pub(crate) fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.admins.is_empty());
        assert_eq!(config.reserve_classes, vec![ReserveClass::gold(), ReserveClass::fiat()]);
        assert_eq!(config.default_reserve_class, ReserveClass::gold());
    }

    #[test]
    fn test_env_overrides() {
        let config = LedgerConfig::from_lookup(lookup(&[
            ("GOLDBYTE_ADMINS", "imf, 0xA341 ,"),
            ("GOLDBYTE_RESERVE_CLASSES", "gold,fiat,silver"),
            ("GOLDBYTE_DEFAULT_RESERVE", "silver"),
            ("GOLDBYTE_EVENT_CAPACITY", "16"),
        ]))
        .unwrap();

        assert_eq!(config.admins, vec![AccountId::new("imf"), AccountId::new("0xA341")]);
        assert_eq!(config.reserve_classes.len(), 3);
        assert_eq!(config.default_reserve_class.as_str(), "Silver");
        assert_eq!(config.event_capacity, 16);
    }

    #[test]
    fn test_default_class_must_be_known() {
        let result = LedgerConfig::from_lookup(lookup(&[
            ("GOLDBYTE_RESERVE_CLASSES", "Fiat"),
        ]));
        assert!(matches!(result, Err(ConfigError::UnknownDefaultClass { .. })));
    }

    #[test]
    fn test_bad_capacity() {
        let result = LedgerConfig::from_lookup(lookup(&[("GOLDBYTE_EVENT_CAPACITY", "lots")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
