//! Application services - Business logic orchestration

pub mod account_service;
pub mod conversation_service;
pub mod relationship_service;
pub mod shop_service;
pub mod trade_service;

pub use account_service::{AccountService, RegistrationDefaults};
pub use conversation_service::{ConversationFeed, ConversationService, MessageFeed};
pub use relationship_service::RelationshipService;
pub use shop_service::ShopService;
pub use trade_service::{ItemProgress, SettlementProgress, TradeService};
