//! Trade Lifecycle and Settlement Integration Tests
//! Run with: cargo test --test trade_test

mod common;

use std::sync::Arc;

use common::Platform;
use creatoplay_core::{
    AccountService, CoreError, DocumentStore, FieldUpdate, Profile, RegistrationDefaults,
    SqliteStore, Trade, TradeService, TradeStatus, UserId, Value,
};

/// The everyday flow: a one-item gift, accepted, fully settled.
#[tokio::test]
async fn test_gift_trade_settles() {
    let platform = Platform::new();
    let alice = platform.register("u_alice", "alice").await;
    let bob = platform.register("u_bob", "bob").await;
    let sword = platform.give_item(&alice, "gear_sword").await;

    let trade_id = platform
        .trades
        .propose_trade(&alice, &bob, &[sword.clone()])
        .await
        .unwrap();
    platform.trades.accept_trade(&bob, &trade_id).await.unwrap();

    let alice_profile = platform.profile(&alice).await;
    let bob_profile = platform.profile(&bob).await;
    assert!(!alice_profile.owns(&sword));
    assert!(bob_profile.owns(&sword));

    let progress = platform.trades.settlement_progress(&trade_id).await.unwrap();
    assert_eq!(progress.status, TradeStatus::Completed);
    assert!(progress.is_settled());
}

/// Proposal validation: no self-trades, no empty offers, no offering what
/// you do not hold.
#[tokio::test]
async fn test_propose_validations() {
    let platform = Platform::new();
    let alice = platform.register("u_alice", "alice").await;
    let bob = platform.register("u_bob", "bob").await;
    let sword = platform.give_item(&alice, "gear_sword").await;

    let err = platform
        .trades
        .propose_trade(&alice, &alice, &[sword.clone()])
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidTarget));

    let err = platform
        .trades
        .propose_trade(&alice, &bob, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::EmptyOffer));

    let err = platform
        .trades
        .propose_trade(&bob, &alice, &[sword])
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ItemNotOwned(_)));
}

/// A two-sided trade swaps both item sets with nothing duplicated and
/// nothing lost.
#[tokio::test]
async fn test_two_way_trade_conserves_items() {
    let platform = Platform::new();
    let alice = platform.register("u_alice", "alice").await;
    let bob = platform.register("u_bob", "bob").await;
    let sword = platform.give_item(&alice, "gear_sword").await;
    let crown = platform.give_item(&bob, "hat_crown").await;

    let trade_id = platform
        .trades
        .propose_trade(&alice, &bob, &[sword.clone()])
        .await
        .unwrap();
    // The recipient answers the offer with an item of their own.
    platform
        .store
        .apply(
            Trade::COLLECTION,
            trade_id.as_str(),
            vec![FieldUpdate::set(
                "recipientItems",
                Value::list([crown.as_str()]),
            )],
        )
        .await
        .unwrap();

    platform.trades.accept_trade(&bob, &trade_id).await.unwrap();

    let alice_profile = platform.profile(&alice).await;
    let bob_profile = platform.profile(&bob).await;
    assert!(alice_profile.owns(&crown));
    assert!(!alice_profile.owns(&sword));
    assert!(bob_profile.owns(&sword));
    assert!(!bob_profile.owns(&crown));
    assert_eq!(alice_profile.inventory.len(), 1);
    assert_eq!(bob_profile.inventory.len(), 1);
}

/// Only the recipient may answer a trade; the proposer and bystanders are
/// turned away.
#[tokio::test]
async fn test_only_recipient_can_respond() {
    let platform = Platform::new();
    let alice = platform.register("u_alice", "alice").await;
    let bob = platform.register("u_bob", "bob").await;
    let carol = platform.register("u_carol", "carol").await;
    let sword = platform.give_item(&alice, "gear_sword").await;

    let trade_id = platform
        .trades
        .propose_trade(&alice, &bob, &[sword])
        .await
        .unwrap();

    let err = platform
        .trades
        .accept_trade(&alice, &trade_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotRecipient));
    let err = platform
        .trades
        .decline_trade(&carol, &trade_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotRecipient));
}

/// Settled trades refuse further responses.
#[tokio::test]
async fn test_response_to_settled_trade_fails() {
    let platform = Platform::new();
    let alice = platform.register("u_alice", "alice").await;
    let bob = platform.register("u_bob", "bob").await;
    let sword = platform.give_item(&alice, "gear_sword").await;

    let trade_id = platform
        .trades
        .propose_trade(&alice, &bob, &[sword])
        .await
        .unwrap();
    platform
        .trades
        .decline_trade(&bob, &trade_id)
        .await
        .unwrap();

    let err = platform
        .trades
        .accept_trade(&bob, &trade_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::TradeNotPending));
    let err = platform
        .trades
        .decline_trade(&bob, &trade_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::TradeNotPending));
}

/// An item that left the proposer's inventory after the proposal kills the
/// accept before any inventory write: the trade flips to declined and both
/// inventories stay put.
#[tokio::test]
async fn test_vanished_item_declines_without_inventory_writes() {
    let platform = Platform::new();
    let alice = platform.register("u_alice", "alice").await;
    let bob = platform.register("u_bob", "bob").await;
    let sword = platform.give_item(&alice, "gear_sword").await;
    let cape = platform.give_item(&alice, "acc_cape_red").await;

    let trade_id = platform
        .trades
        .propose_trade(&alice, &bob, &[sword.clone(), cape.clone()])
        .await
        .unwrap();
    // The sword leaves alice's inventory out from under the trade.
    platform
        .store
        .apply(
            Profile::COLLECTION,
            alice.as_str(),
            vec![Profile::revoke_item(&sword)],
        )
        .await
        .unwrap();

    let err = platform
        .trades
        .accept_trade(&bob, &trade_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ItemNoLongerAvailable(_)));

    let progress = platform.trades.settlement_progress(&trade_id).await.unwrap();
    assert_eq!(progress.status, TradeStatus::Declined);
    // The cape never moved even though it was still available.
    assert!(platform.profile(&alice).await.owns(&cape));
    assert!(platform.profile(&bob).await.inventory.is_empty());
}

/// Re-running an interrupted settlement finishes the remaining moves
/// without duplicating the ones that already landed.
#[tokio::test]
async fn test_interrupted_settlement_redrives() {
    let platform = Platform::new();
    let alice = platform.register("u_alice", "alice").await;
    let bob = platform.register("u_bob", "bob").await;
    let sword = platform.give_item(&alice, "gear_sword").await;
    let cape = platform.give_item(&alice, "acc_cape_red").await;

    let trade_id = platform
        .trades
        .propose_trade(&alice, &bob, &[sword.clone(), cape.clone()])
        .await
        .unwrap();
    // First item already moved, as if settlement died between items.
    platform
        .store
        .apply(
            Profile::COLLECTION,
            alice.as_str(),
            vec![Profile::revoke_item(&sword)],
        )
        .await
        .unwrap();
    platform
        .store
        .apply(
            Profile::COLLECTION,
            bob.as_str(),
            vec![Profile::grant_item(&sword)],
        )
        .await
        .unwrap();

    platform.trades.accept_trade(&bob, &trade_id).await.unwrap();

    let alice_profile = platform.profile(&alice).await;
    let bob_profile = platform.profile(&bob).await;
    assert!(alice_profile.inventory.is_empty());
    assert_eq!(bob_profile.inventory.len(), 2);
    assert!(bob_profile.owns(&sword));
    assert!(bob_profile.owns(&cape));
}

/// The progress report marks each item by where it currently sits.
#[tokio::test]
async fn test_settlement_progress_reports_partial_state() {
    let platform = Platform::new();
    let alice = platform.register("u_alice", "alice").await;
    let bob = platform.register("u_bob", "bob").await;
    let sword = platform.give_item(&alice, "gear_sword").await;
    let cape = platform.give_item(&alice, "acc_cape_red").await;

    let trade_id = platform
        .trades
        .propose_trade(&alice, &bob, &[sword.clone(), cape.clone()])
        .await
        .unwrap();
    platform
        .store
        .apply(
            Profile::COLLECTION,
            alice.as_str(),
            vec![Profile::revoke_item(&sword)],
        )
        .await
        .unwrap();
    platform
        .store
        .apply(
            Profile::COLLECTION,
            bob.as_str(),
            vec![Profile::grant_item(&sword)],
        )
        .await
        .unwrap();

    let progress = platform.trades.settlement_progress(&trade_id).await.unwrap();
    assert_eq!(progress.status, TradeStatus::Pending);
    assert!(!progress.is_settled());
    assert_eq!(progress.items.len(), 2);

    let sword_progress = progress.items.iter().find(|p| p.item == sword).unwrap();
    assert!(sword_progress.moved);
    assert_eq!(sword_progress.from, alice);
    assert_eq!(sword_progress.to, bob);
    let cape_progress = progress.items.iter().find(|p| p.item == cape).unwrap();
    assert!(!cape_progress.moved);
}

/// Declining never touches an inventory.
#[tokio::test]
async fn test_decline_leaves_inventories_alone() {
    let platform = Platform::new();
    let alice = platform.register("u_alice", "alice").await;
    let bob = platform.register("u_bob", "bob").await;
    let sword = platform.give_item(&alice, "gear_sword").await;

    let trade_id = platform
        .trades
        .propose_trade(&alice, &bob, &[sword.clone()])
        .await
        .unwrap();
    platform
        .trades
        .decline_trade(&bob, &trade_id)
        .await
        .unwrap();

    assert!(platform.profile(&alice).await.owns(&sword));
    assert!(platform.profile(&bob).await.inventory.is_empty());
}

/// Record deletion is for participants and terminal trades only.
#[tokio::test]
async fn test_delete_record_rules() {
    let platform = Platform::new();
    let alice = platform.register("u_alice", "alice").await;
    let bob = platform.register("u_bob", "bob").await;
    let carol = platform.register("u_carol", "carol").await;
    let sword = platform.give_item(&alice, "gear_sword").await;

    let trade_id = platform
        .trades
        .propose_trade(&alice, &bob, &[sword])
        .await
        .unwrap();

    let err = platform
        .trades
        .delete_trade_record(&alice, &trade_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::TradeStillOpen));

    platform.trades.accept_trade(&bob, &trade_id).await.unwrap();

    let err = platform
        .trades
        .delete_trade_record(&carol, &trade_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotParticipant(_)));

    platform
        .trades
        .delete_trade_record(&alice, &trade_id)
        .await
        .unwrap();
    assert!(platform.trades.trades_for(&alice).await.unwrap().is_empty());
    let err = platform
        .trades
        .settlement_progress(&trade_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

/// The trade listing covers both roles and comes back newest first.
#[tokio::test]
async fn test_trades_listed_newest_first() {
    let platform = Platform::new();
    let alice = platform.register("u_alice", "alice").await;
    let bob = platform.register("u_bob", "bob").await;
    let carol = platform.register("u_carol", "carol").await;
    let sword = platform.give_item(&alice, "gear_sword").await;
    let crown = platform.give_item(&bob, "hat_crown").await;
    platform.give_item(&carol, "gear_staff").await;

    let first = platform
        .trades
        .propose_trade(&alice, &bob, &[sword])
        .await
        .unwrap();
    let second = platform
        .trades
        .propose_trade(&bob, &alice, &[crown])
        .await
        .unwrap();

    let listed = platform.trades.trades_for(&alice).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second);
    assert_eq!(listed[1].id, first);
    // Carol is party to none of them.
    assert!(platform.trades.trades_for(&carol).await.unwrap().is_empty());
}

/// A second accept of the same trade is refused; the first settlement
/// stands.
#[tokio::test]
async fn test_double_accept_converges() {
    let platform = Platform::new();
    let alice = platform.register("u_alice", "alice").await;
    let bob = platform.register("u_bob", "bob").await;
    let sword = platform.give_item(&alice, "gear_sword").await;

    let trade_id = platform
        .trades
        .propose_trade(&alice, &bob, &[sword.clone()])
        .await
        .unwrap();
    platform.trades.accept_trade(&bob, &trade_id).await.unwrap();
    let err = platform
        .trades
        .accept_trade(&bob, &trade_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::TradeNotPending));

    let bob_profile = platform.profile(&bob).await;
    assert_eq!(bob_profile.inventory, vec![sword]);
}

/// The same flow end to end over the sqlite backend.
#[tokio::test]
async fn test_trade_flow_on_sqlite() {
    common::ensure_init();
    let store: Arc<dyn DocumentStore> =
        Arc::new(SqliteStore::open_in_memory().expect("in-memory sqlite should open"));
    let accounts = AccountService::new(store.clone(), RegistrationDefaults::default());
    let trades = TradeService::new(store.clone());

    let alice = UserId::new("u_alice");
    let bob = UserId::new("u_bob");
    accounts.register(&alice, "alice").await.unwrap();
    accounts.register(&bob, "bob").await.unwrap();

    let sword = creatoplay_core::ItemId::new("gear_sword");
    store
        .apply(
            Profile::COLLECTION,
            alice.as_str(),
            vec![Profile::grant_item(&sword)],
        )
        .await
        .unwrap();

    let trade_id = trades
        .propose_trade(&alice, &bob, &[sword.clone()])
        .await
        .unwrap();
    trades.accept_trade(&bob, &trade_id).await.unwrap();

    let bob_profile = accounts.profile(&bob).await.unwrap();
    assert!(bob_profile.owns(&sword));
    assert!(!accounts.profile(&alice).await.unwrap().owns(&sword));
    let progress = trades.settlement_progress(&trade_id).await.unwrap();
    assert_eq!(progress.status, TradeStatus::Completed);
    assert!(progress.is_settled());
}
