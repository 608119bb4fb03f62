use crate::syncer::Syncer;
use wallet_sync_domain::value_objects::{Address, Balance, NetworkId};

/// A connected wallet provider's capability surface.
///
/// All three syncer slots must be filled for the connection to pass
/// validation; the capabilities inside each syncer are optional. Address and
/// network syncers deliver `Option` values so a provider can report `None`
/// when the wallet locks or disconnects the account.
#[derive(Debug, Clone)]
pub struct WalletConnection {
    /// Provider name shown to the user.
    pub name: String,
    /// Address slice syncer.
    pub address: Option<Syncer<Option<Address>>>,
    /// Network slice syncer.
    pub network: Option<Syncer<Option<NetworkId>>>,
    /// Balance slice syncer.
    pub balance: Option<Syncer<Balance>>,
}

impl WalletConnection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            network: None,
            balance: None,
        }
    }

    #[must_use]
    pub fn with_address(mut self, syncer: Syncer<Option<Address>>) -> Self {
        self.address = Some(syncer);
        self
    }

    #[must_use]
    pub fn with_network(mut self, syncer: Syncer<Option<NetworkId>>) -> Self {
        self.network = Some(syncer);
        self
    }

    #[must_use]
    pub fn with_balance(mut self, syncer: Syncer<Balance>) -> Self {
        self.balance = Some(syncer);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_fills_slots_independently() {
        let connection = WalletConnection::new("metamask")
            .with_address(Syncer::inert())
            .with_balance(Syncer::inert());
        assert_eq!(connection.name, "metamask");
        assert!(connection.address.is_some());
        assert!(connection.network.is_none());
        assert!(connection.balance.is_some());
    }
}
