//! Domain entities - Core business objects with no external dependencies

pub mod conversation;
pub mod document;
pub mod ids;
pub mod item;
pub mod profile;
pub mod trade;

pub use conversation::{ChatMessage, Conversation};
pub use document::{Document, FieldUpdate, Filter, Value};
pub use ids::{ConversationId, ItemId, MessageId, TradeId, UserId};
pub use item::{ItemCatalog, ItemCategory, ItemListing, Rarity};
pub use profile::{Avatar, EquipSlot, Presence, Profile};
pub use trade::{Trade, TradeStatus};
