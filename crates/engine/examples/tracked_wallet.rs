//! Tracks a mock wallet through connect, confirmation, and disconnect.
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use wallet_sync_domain::prelude::*;
use wallet_sync_engine::prelude::*;
use wallet_sync_provider::mock::{PushHandle, ScriptedPull};
use wallet_sync_provider::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let notifier = Arc::new(InMemoryNotifier::new());
    let engine = WalletSyncEngine::with_notifier(EngineConfig::default(), notifier.clone());

    // The wallet pushes address changes; network and balance answer pulls.
    let address_push = PushHandle::new();
    let balance_pull = ScriptedPull::ok(Balance::new("1.2500"));
    let connection = WalletConnection::new("metamask")
        .with_address(address_push.syncer())
        .with_network(Syncer::from_pull(|| async { Ok(Some(NetworkId::new(1))) }))
        .with_balance(balance_pull.syncer());

    println!("🔌 Connecting provider...");
    engine.set_provider(connection).await?;

    address_push.emit(Some(Address::from("0xab5801a7d398351b8be11c439e05c5b3259aec9b")));
    sleep(Duration::from_millis(250)).await;
    println!(
        "📦 State after connect:\n{}",
        serde_json::to_string_pretty(&engine.state())?
    );

    println!("✅ Confirming a transaction...");
    balance_pull.set_result(Ok(Balance::new("1.1875")));
    notifier
        .confirm(
            &Address::from("0xab5801a7d398351b8be11c439e05c5b3259aec9b"),
            "0xfeed",
        )
        .await;
    sleep(Duration::from_millis(50)).await;
    println!("💰 Balance after confirmation: {}", engine.balance());
    println!(
        "📊 Sync status: {}",
        serde_json::to_string_pretty(&engine.status())?
    );

    println!("🔌 Disconnecting...");
    engine.clear_provider().await;
    println!(
        "📦 State after disconnect:\n{}",
        serde_json::to_string_pretty(&engine.state())?
    );

    engine.shutdown().await;
    Ok(())
}
