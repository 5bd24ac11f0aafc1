//! Reserve classes backing issued tokens
//!
//! Every GB unit is minted against a locked unit of exactly one reserve
//! class. The ledger knows a configured set of classes; `Gold` and `Fiat`
//! are always part of the default set.

use crate::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named class of reserve asset (e.g. `Gold`, `Fiat`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReserveClass(String);

impl ReserveClass {
    /// Physical gold, one token per gram
    pub fn gold() -> Self {
        Self("Gold".to_string())
    }

    /// Fiat currency held in custody
    pub fn fiat() -> Self {
        Self("Fiat".to_string())
    }

    /// Parse a class name, normalising to title case (`"gold"` -> `"Gold"`)
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(LedgerError::UnknownReserveClass {
                class: name.to_string(),
            });
        }
        let lower = name.to_ascii_lowercase();
        let mut chars = lower.chars();
        let normalised = match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        };
        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ReserveClass {
    fn default() -> Self {
        Self::gold()
    }
}

impl fmt::Display for ReserveClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ReserveClass {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ReserveClass {
    type Error = LedgerError;

    fn try_from(name: String) -> Result<Self> {
        Self::parse(&name)
    }
}

impl From<ReserveClass> for String {
    fn from(class: ReserveClass) -> Self {
        class.0
    }
}
