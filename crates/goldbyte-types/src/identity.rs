//! Identity types for GoldByte
//!
//! All identifiers are strongly typed wrappers around strings to prevent
//! accidentally mixing an account with a bank code or a settlement wallet.

use crate::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate opaque string identifiers with common implementations
macro_rules! define_string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from any string-like value
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(AccountId, "Opaque address-like key of a token holder");
define_string_id!(WalletId, "Settlement wallet of a consortium bank");

/// Maximum length of a bank code
pub const MAX_BANK_CODE_LEN: usize = 8;

/// Short uppercase identifier of a consortium bank (e.g. `LBG`, `SBI`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BankCode(String);

impl BankCode {
    /// Parse and normalise a bank code.
    ///
    /// Codes are 1-8 ASCII alphanumerics and are stored uppercase, so
    /// `"lbg"` and `"LBG"` name the same bank.
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.is_empty()
            || code.len() > MAX_BANK_CODE_LEN
            || !code.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(LedgerError::UnknownBank {
                code: code.to_string(),
            });
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BankCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for BankCode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BankCode {
    type Error = LedgerError;

    fn try_from(code: String) -> Result<Self> {
        Self::parse(&code)
    }
}

impl From<BankCode> for String {
    fn from(code: BankCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_code_normalised() {
        let code = BankCode::parse(" lbg ").unwrap();
        assert_eq!(code.as_str(), "LBG");
        assert_eq!(code, "LBG".parse::<BankCode>().unwrap());
    }

    #[test]
    fn test_bank_code_rejects_garbage() {
        for bad in ["", "TOOLONGCODE", "L-B", "LB G"] {
            assert!(matches!(
                BankCode::parse(bad),
                Err(LedgerError::UnknownBank { .. })
            ));
        }
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let account = AccountId::new("0xA341");
        assert_eq!(serde_json::to_string(&account).unwrap(), "\"0xA341\"");

        let code: BankCode = serde_json::from_str("\"sbi\"").unwrap();
        assert_eq!(code.to_string(), "SBI");
        assert!(serde_json::from_str::<BankCode>("\"not a code\"").is_err());
    }
}
