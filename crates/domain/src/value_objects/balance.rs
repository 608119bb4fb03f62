use serde::{Deserialize, Serialize};
use std::fmt;

/// Wallet balance rendered by the provider as a decimal string. Empty means
/// the balance is not known yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance(pub String);

impl Balance {
    pub fn new(balance: impl Into<String>) -> Self {
        Self(balance.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Balance {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
