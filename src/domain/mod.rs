//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Typed documents (Profile, Trade, Conversation, ChatMessage)
//! - Traits: Abstractions for infrastructure (DocumentStore, IdentityProvider)

pub mod entities;
pub mod traits;
