//! Application layer errors

use thiserror::Error;

/// Service-level errors surfaced to the presentation layer.
///
/// Every kind is recoverable: callers show a message and re-read state.
/// Multi-document flows never hide partial effects behind an error; the
/// services expose repair and progress entry points for them.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Operation cannot target yourself")]
    InvalidTarget,

    #[error("A trade must offer at least one item")]
    EmptyOffer,

    #[error("Message text is empty")]
    EmptyMessage,

    #[error("Item not owned: {0}")]
    ItemNotOwned(String),

    #[error("Item no longer available: {0}")]
    ItemNoLongerAvailable(String),

    #[error("No pending friend request from: {0}")]
    NoSuchRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Username must be 3-20 characters")]
    InvalidUsername,

    #[error("Username is already taken: {0}")]
    UsernameTaken(String),

    #[error("Item already owned: {0}")]
    AlreadyOwned(String),

    #[error("Not enough robux: need {need}, have {have}")]
    InsufficientFunds { need: u64, have: u64 },

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Only the trade recipient can respond to it")]
    NotRecipient,

    #[error("Not a participant: {0}")]
    NotParticipant(String),

    #[error("Trade is no longer pending")]
    TradeNotPending,

    #[error("Trade is still open")]
    TradeStillOpen,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Document store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Document missing: {0}")]
    Missing(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Typed-decode failures at the repository boundary.
///
/// Documents missing required fields are rejected here instead of being
/// defaulted silently further up.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Wrong kind for field: {0}")]
    WrongKind(&'static str),

    #[error("Unknown value in field {0}: {1}")]
    UnknownValue(&'static str, String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
