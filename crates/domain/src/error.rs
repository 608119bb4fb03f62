use crate::slice::SliceKind;
use thiserror::Error;

/// Errors surfaced while validating providers or syncing slices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A wallet connection failed the structural capability check.
    #[error("{field} must be of type {expected}")]
    CapabilityShape { field: String, expected: String },

    /// A poll-mode pull failed for a slice.
    #[error("error getting {slice} from state syncer: {reason}")]
    Fetch { slice: SliceKind, reason: String },
}

impl SyncError {
    pub fn capability_shape(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::CapabilityShape {
            field: field.into(),
            expected: expected.into(),
        }
    }

    pub fn fetch(slice: SliceKind, reason: impl Into<String>) -> Self {
        Self::Fetch {
            slice,
            reason: reason.into(),
        }
    }
}

/// Error produced by a provider capability when a pull rejects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl From<&str> for ProviderError {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}
