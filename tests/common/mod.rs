#![allow(dead_code)]

use std::sync::{Arc, Once};

use creatoplay_core::{
    platform_catalog, AccountService, ConversationService, DocumentStore, ItemId, MemoryStore,
    Profile, RegistrationDefaults, RelationshipService, ShopService, TradeService, UserId,
};

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });
}

/// One platform over a fresh in-memory store, every service wired to it.
pub struct Platform {
    pub store: Arc<MemoryStore>,
    pub accounts: AccountService,
    pub relationships: RelationshipService,
    pub trades: TradeService,
    pub conversations: ConversationService,
    pub shop: ShopService,
}

impl Platform {
    pub fn new() -> Self {
        Self::with_defaults(RegistrationDefaults::default())
    }

    pub fn with_defaults(defaults: RegistrationDefaults) -> Self {
        ensure_init();
        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn DocumentStore> = store.clone();
        Self {
            accounts: AccountService::new(shared.clone(), defaults),
            relationships: RelationshipService::new(shared.clone()),
            trades: TradeService::new(shared.clone()),
            conversations: ConversationService::new(shared.clone()),
            shop: ShopService::new(shared, platform_catalog()),
            store,
        }
    }

    pub async fn register(&self, id: &str, username: &str) -> UserId {
        let user = UserId::new(id);
        self.accounts
            .register(&user, username)
            .await
            .expect("registration should succeed");
        user
    }

    pub async fn profile(&self, user: &UserId) -> Profile {
        self.accounts
            .profile(user)
            .await
            .expect("profile should exist")
    }

    /// Set the balance outright, bypassing the shop.
    pub async fn set_robux(&self, user: &UserId, amount: u64) {
        self.store
            .apply(
                Profile::COLLECTION,
                user.as_str(),
                vec![Profile::set_balance(amount)],
            )
            .await
            .expect("balance update should succeed");
    }

    /// Drop an item straight into an inventory, bypassing the shop.
    pub async fn give_item(&self, user: &UserId, item: &str) -> ItemId {
        let item = ItemId::new(item);
        self.store
            .apply(
                Profile::COLLECTION,
                user.as_str(),
                vec![Profile::grant_item(&item)],
            )
            .await
            .expect("inventory update should succeed");
        item
    }
}
