use crate::value_objects::{Address, Balance, NetworkId};
use serde::{Deserialize, Serialize};

/// Dapp metadata and UI flags tracked alongside wallet state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Identifier of the hosting dapp.
    pub dapp_id: Option<String>,
    /// Network the dapp expects to run against.
    pub network_id: u64,
    /// Engine version string.
    pub version: Option<String>,
    /// Whether the host renders on a mobile device.
    pub mobile_device: bool,
    /// Whether the host renders in dark mode.
    pub dark_mode: bool,
    /// Wallet selection has started.
    pub wallet_select_in_progress: bool,
    /// Wallet selection has finished.
    pub wallet_select_completed: bool,
    /// Wallet readiness check has started.
    pub wallet_ready_in_progress: bool,
    /// Wallet readiness check has finished.
    pub wallet_ready_completed: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dapp_id: None,
            network_id: 1,
            version: None,
            mobile_device: false,
            dark_mode: false,
            wallet_select_in_progress: false,
            wallet_select_completed: false,
            wallet_ready_in_progress: false,
            wallet_ready_completed: false,
        }
    }
}

/// Identity of the connected wallet, empty when nothing is connected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSummary {
    pub name: Option<String>,
}

impl WalletSummary {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Composed snapshot of everything a caller typically renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletState {
    pub address: Option<Address>,
    pub network: Option<NetworkId>,
    pub balance: Balance,
    pub wallet: WalletSummary,
    pub mobile_device: bool,
}
