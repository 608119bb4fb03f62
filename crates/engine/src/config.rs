use std::time::Duration;

use wallet_sync_domain::app::AppState;

/// Period between poll-mode pulls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Bound on a single balance fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(2000);

/// Network id assumed when the caller does not name one.
pub const DEFAULT_NETWORK_ID: u64 = 1;

/// Engine construction parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Period between poll-mode pulls.
    pub poll_interval: Duration,
    /// Bound on a single balance fetch.
    pub fetch_timeout: Duration,
    /// Dapp identifier reported in the app slice.
    pub dapp_id: Option<String>,
    /// Network the dapp expects to run against.
    pub network_id: u64,
    /// Version string reported in the app slice.
    pub version: Option<String>,
    /// Whether the host renders on a mobile device.
    pub mobile_device: bool,
    /// Whether the host renders in dark mode.
    pub dark_mode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            dapp_id: None,
            network_id: DEFAULT_NETWORK_ID,
            version: None,
            mobile_device: false,
            dark_mode: false,
        }
    }
}

impl EngineConfig {
    /// Initial app slice derived from this config.
    pub fn initial_app_state(&self) -> AppState {
        AppState {
            dapp_id: self.dapp_id.clone(),
            network_id: self.network_id,
            version: self.version.clone(),
            mobile_device: self.mobile_device,
            dark_mode: self.dark_mode,
            ..AppState::default()
        }
    }
}
