use crate::value_objects::{Address, Balance, NetworkId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One tracked piece of wallet state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceKind {
    Address,
    Network,
    Balance,
}

impl fmt::Display for SliceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceKind::Address => write!(f, "address"),
            SliceKind::Network => write!(f, "network"),
            SliceKind::Balance => write!(f, "balance"),
        }
    }
}

/// Whether a fetched value carries enough substance to overwrite a slice.
///
/// Bounded balance fetches discard absent values instead of applying them,
/// so a provider that briefly reports nothing cannot blank a known balance.
pub trait SliceValue {
    fn is_present(&self) -> bool {
        true
    }
}

impl SliceValue for Address {}

impl SliceValue for NetworkId {}

impl SliceValue for Balance {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: SliceValue> SliceValue for Option<T> {
    fn is_present(&self) -> bool {
        self.as_ref().is_some_and(SliceValue::is_present)
    }
}
