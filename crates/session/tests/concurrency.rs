//! Overlapping operations: stale loads, cancellation and disconnects while
//! work is in flight.
//!
//! Run with:
//! ```bash
//! cargo test --package session --test concurrency
//! ```

#[path = "mock.rs"]
mod mock;

use alloy_primitives::{B256, U256};
use client::WalletError;
use mock::{
    connected_session, vyoman_chain, GatedWallet, MockChain, MockToken, ACCOUNT, TOKEN_A, TOKEN_B,
};
use session::{Outcome, Phase, Session, SessionError};
use std::sync::Arc;

const RECIPIENT_STR: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
const TOKEN_A_STR: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const TOKEN_B_STR: &str = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512";

#[tokio::test]
async fn test_late_answer_to_abandoned_connect_is_ignored() {
    let (wallet, gates) = GatedWallet::new(vec![Err(WalletError::UserRejected), Ok(ACCOUNT)]);
    let session = Arc::new(Session::new(wallet, MockChain::new()));

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.connect().await }
    });
    gates[0].entered.notified().await;

    session.disconnect();
    let second = tokio::spawn({
        let session = session.clone();
        async move { session.connect().await }
    });
    gates[1].entered.notified().await;

    // The first request's rejection arrives while the second is pending.
    gates[0].release.notify_one();
    assert_eq!(first.await.unwrap(), Ok(Outcome::Superseded));
    let state = session.snapshot();
    assert!(matches!(state.phase, Phase::Connecting { .. }));
    assert_eq!(state.error, None);

    gates[1].release.notify_one();
    assert_eq!(second.await.unwrap(), Ok(Outcome::Committed(ACCOUNT)));

    let state = session.snapshot();
    assert_eq!(state.phase, Phase::Connected);
    assert_eq!(state.account, Some(ACCOUNT));
    assert_eq!(state.error, None);
}

fn two_token_chain() -> MockChain {
    let chain = vyoman_chain();
    chain.deploy(
        TOKEN_B,
        MockToken::new("USDV", 6).with_balance(ACCOUNT, U256::from(2_500_000u64)),
    );
    chain
}

#[tokio::test]
async fn test_later_load_wins() {
    let chain = two_token_chain();
    let session = Arc::new(connected_session(&chain).await);
    let gate = chain.gate_load(TOKEN_A);

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.load_token(TOKEN_A_STR).await }
    });
    gate.entered.notified().await;

    let second = session.load_token(TOKEN_B_STR).await.unwrap();
    assert_eq!(second.committed().map(|t| t.symbol), Some("USDV".to_string()));

    gate.release.notify_one();
    let first = first.await.unwrap().unwrap();
    assert!(first.is_superseded());

    let state = session.snapshot();
    assert_eq!(state.phase, Phase::TokenLoaded);
    assert_eq!(state.token.map(|t| t.address), Some(TOKEN_B));
    assert_eq!(state.error, None);

    // The superseded load stopped after its first read.
    let calls = chain.calls();
    assert!(calls.contains(&format!("name@{TOKEN_A}")));
    assert!(!calls.contains(&format!("symbol@{TOKEN_A}")));
    assert!(!calls.contains(&format!("balanceOf@{TOKEN_A}")));
}

#[tokio::test]
async fn test_superseded_load_failure_is_ignored() {
    let chain = two_token_chain();
    chain.set_revert_name(TOKEN_A);
    let session = Arc::new(connected_session(&chain).await);
    let gate = chain.gate_load(TOKEN_A);

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.load_token(TOKEN_A_STR).await }
    });
    gate.entered.notified().await;
    session.load_token(TOKEN_B_STR).await.unwrap();

    gate.release.notify_one();
    assert_eq!(first.await.unwrap(), Ok(Outcome::Superseded));

    let state = session.snapshot();
    assert_eq!(state.error, None);
    assert_eq!(state.token.map(|t| t.symbol), Some("USDV".to_string()));
}

#[tokio::test]
async fn test_cancel_load_restores_previous_token() {
    let chain = two_token_chain();
    let session = Arc::new(connected_session(&chain).await);
    let loaded = session
        .load_token(TOKEN_B_STR)
        .await
        .unwrap()
        .committed()
        .unwrap();
    assert!(!session.cancel_load());

    let gate = chain.gate_load(TOKEN_A);
    let load = tokio::spawn({
        let session = session.clone();
        async move { session.load_token(TOKEN_A_STR).await }
    });
    gate.entered.notified().await;
    assert!(matches!(
        session.snapshot().phase,
        Phase::TokenLoading { address, .. } if address == TOKEN_A
    ));

    assert!(session.cancel_load());
    let state = session.snapshot();
    assert_eq!(state.phase, Phase::TokenLoaded);
    assert_eq!(state.token, Some(loaded.clone()));

    gate.release.notify_one();
    assert!(load.await.unwrap().unwrap().is_superseded());
    assert_eq!(session.snapshot().token, Some(loaded));
}

#[tokio::test]
async fn test_cancel_first_load_returns_to_connected() {
    let chain = vyoman_chain();
    let session = Arc::new(connected_session(&chain).await);
    let gate = chain.gate_load(TOKEN_A);

    let load = tokio::spawn({
        let session = session.clone();
        async move { session.load_token(TOKEN_A_STR).await }
    });
    gate.entered.notified().await;

    assert!(session.cancel_load());
    gate.release.notify_one();
    assert!(load.await.unwrap().unwrap().is_superseded());

    let state = session.snapshot();
    assert_eq!(state.phase, Phase::Connected);
    assert_eq!(state.token, None);
}

#[tokio::test]
async fn test_disconnect_during_load() {
    let chain = vyoman_chain();
    let session = Arc::new(connected_session(&chain).await);
    let gate = chain.gate_load(TOKEN_A);

    let load = tokio::spawn({
        let session = session.clone();
        async move { session.load_token(TOKEN_A_STR).await }
    });
    gate.entered.notified().await;

    session.disconnect();
    gate.release.notify_one();
    assert!(load.await.unwrap().unwrap().is_superseded());

    let state = session.snapshot();
    assert_eq!(state.phase, Phase::Disconnected);
    assert_eq!(state.account, None);
    assert_eq!(state.token, None);
}

#[tokio::test]
async fn test_operations_refused_while_transfer_pending() {
    let chain = two_token_chain();
    let session = Arc::new(connected_session(&chain).await);
    session.load_token(TOKEN_A_STR).await.unwrap();
    let gate = chain.gate_confirm();

    let transfer = tokio::spawn({
        let session = session.clone();
        async move { session.transfer(RECIPIENT_STR, "0.5").await }
    });
    gate.entered.notified().await;

    let state = session.snapshot();
    assert!(state.is_busy());
    assert_eq!(
        state.pending_transfer().and_then(|p| p.hash),
        Some(B256::with_last_byte(1))
    );

    let err = session.transfer(RECIPIENT_STR, "0.1").await.unwrap_err();
    assert_eq!(
        err,
        SessionError::InvalidState {
            operation: "transfer".into(),
            phase: "transfer pending".into()
        }
    );
    let err = session.load_token(TOKEN_B_STR).await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidState { .. }));
    assert!(session.refresh_balance().await.is_err());
    assert!(!session.cancel_load());

    gate.release.notify_one();
    let record = transfer.await.unwrap().unwrap().committed().unwrap();
    assert_eq!(record.hash, B256::with_last_byte(1));

    let state = session.snapshot();
    assert_eq!(state.phase, Phase::TokenLoaded);
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.error, None);
    assert_eq!(chain.submitted().len(), 1);
    assert_eq!(state.token.map(|t| t.address), Some(TOKEN_A));
}

#[tokio::test]
async fn test_disconnect_during_transfer() {
    let chain = vyoman_chain();
    let session = Arc::new(connected_session(&chain).await);
    session.load_token(TOKEN_A_STR).await.unwrap();
    let gate = chain.gate_confirm();

    let transfer = tokio::spawn({
        let session = session.clone();
        async move { session.transfer(RECIPIENT_STR, "0.5").await }
    });
    gate.entered.notified().await;

    session.disconnect();
    gate.release.notify_one();
    assert_eq!(transfer.await.unwrap(), Ok(Outcome::Superseded));

    let state = session.snapshot();
    assert_eq!(state.phase, Phase::Disconnected);
    assert!(state.history.is_empty());
    assert_eq!(state.notice.as_deref(), Some("Disconnected"));
}

#[tokio::test]
async fn test_reconnect_does_not_revive_old_transfer() {
    let chain = vyoman_chain();
    let session = Arc::new(connected_session(&chain).await);
    session.load_token(TOKEN_A_STR).await.unwrap();
    let gate = chain.gate_confirm();

    let transfer = tokio::spawn({
        let session = session.clone();
        async move { session.transfer(RECIPIENT_STR, "0.5").await }
    });
    gate.entered.notified().await;

    session.disconnect();
    session.connect().await.unwrap();
    chain.deploy(
        TOKEN_B,
        MockToken::new("USDV", 6).with_balance(ACCOUNT, U256::from(1u64)),
    );
    session.load_token(TOKEN_B_STR).await.unwrap();

    gate.release.notify_one();
    assert!(transfer.await.unwrap().unwrap().is_superseded());

    let state = session.snapshot();
    assert_eq!(state.phase, Phase::TokenLoaded);
    assert!(state.history.is_empty());
    assert_eq!(state.token.map(|t| t.symbol), Some("USDV".to_string()));
}
