//! creatoplay-core - Relationship and exchange consistency layer for the
//! Creatoplay platform
//!
//! The crate keeps friendships, item trades, and conversations consistent
//! on top of a document store that offers per-document atomicity and
//! nothing more. The presentation layer consumes it through the services
//! in `application::services` and a `DocumentStore` backend from
//! `infrastructure`.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::errors::{ConfigError, CoreError, SchemaError, StoreError};
pub use application::launch::LaunchLink;
pub use application::profiles::ProfileRepository;
pub use application::services::{
    AccountService, ConversationFeed, ConversationService, ItemProgress, MessageFeed,
    RegistrationDefaults, RelationshipService, SettlementProgress, ShopService, TradeService,
};
pub use domain::entities::{
    Avatar, ChatMessage, Conversation, ConversationId, Document, EquipSlot, FieldUpdate, Filter,
    ItemCatalog, ItemCategory, ItemId, ItemListing, MessageId, Presence, Profile, Rarity, Trade,
    TradeId, TradeStatus, UserId, Value,
};
pub use domain::traits::{DocumentStore, FixedIdentity, IdentityProvider, QueryRows, Subscription};
pub use infrastructure::catalog::platform_catalog;
pub use infrastructure::config::PlatformConfig;
pub use infrastructure::database::SqliteStore;
pub use infrastructure::storage::MemoryStore;
