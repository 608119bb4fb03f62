use crate::connection::WalletConnection;
use tracing::error;
use wallet_sync_domain::error::SyncError;

fn shape_error(field: &str, expected: &str) -> SyncError {
    error!(field, expected, "wallet connection failed capability check");
    SyncError::capability_shape(field, expected)
}

/// Structural capability check run before a connection is bound.
///
/// Checks presence only, not value correctness: the name must be non-empty
/// and every slice syncer slot must be filled.
///
/// # Errors
///
/// Returns `SyncError::CapabilityShape` naming the first offending field.
pub fn validate_connection(connection: &WalletConnection) -> Result<(), SyncError> {
    if connection.name.trim().is_empty() {
        return Err(shape_error("name", "string"));
    }
    if connection.address.is_none() {
        return Err(shape_error("address", "syncer"));
    }
    if connection.network.is_none() {
        return Err(shape_error("network", "syncer"));
    }
    if connection.balance.is_none() {
        return Err(shape_error("balance", "syncer"));
    }
    Ok(())
}
