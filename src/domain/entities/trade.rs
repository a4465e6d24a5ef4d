//! Trade documents and their status lifecycle.

use chrono::{DateTime, Utc};

use crate::application::errors::SchemaError;
use crate::domain::entities::document::{Document, FieldUpdate, Filter, Value};
use crate::domain::entities::ids::{ItemId, TradeId, UserId};

/// Lifecycle of a trade. `Pending` transitions exactly once, by recipient
/// action, to one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Pending,
    Completed,
    Declined,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Pending => "pending",
            TradeStatus::Completed => "completed",
            TradeStatus::Declined => "declined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TradeStatus::Pending),
            "completed" => Some(TradeStatus::Completed),
            "declined" => Some(TradeStatus::Declined),
            _ => None,
        }
    }

    /// Terminal trades accept no further responses and may be deleted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TradeStatus::Completed | TradeStatus::Declined)
    }
}

/// One proposed exchange between two users.
///
/// The recipient's offered set may be empty (a gift). The status field is
/// the authoritative completion signal: settlement writes item moves first
/// and flips the status last, so a `pending` trade with partially moved
/// items is an interrupted settlement, safe to re-drive.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub id: TradeId,
    pub proposer: UserId,
    pub recipient: UserId,
    pub proposer_items: Vec<ItemId>,
    pub recipient_items: Vec<ItemId>,
    pub status: TradeStatus,
    pub created_at: DateTime<Utc>,
}

impl Trade {
    pub const COLLECTION: &'static str = "trades";

    /// Wire form of a new pending proposal. `createdAt` is stamped by the
    /// store; `participants` carries both ids for the "my trades" query.
    pub fn proposal_document(
        proposer: &UserId,
        recipient: &UserId,
        offered: &[ItemId],
    ) -> Document {
        Document::new()
            .with("proposer", proposer.as_str())
            .with("recipient", recipient.as_str())
            .with(
                "proposerItems",
                Value::list(offered.iter().map(ItemId::as_str)),
            )
            .with("recipientItems", Value::List(Vec::new()))
            .with(
                "participants",
                Value::list([proposer.as_str(), recipient.as_str()]),
            )
            .with("status", TradeStatus::Pending.as_str())
            .with("createdAt", Value::ServerTime)
    }

    pub fn from_document(id: &TradeId, doc: &Document) -> Result<Self, SchemaError> {
        let status = doc.require_text("status")?;
        let status = TradeStatus::parse(status)
            .ok_or_else(|| SchemaError::UnknownValue("status", status.to_string()))?;

        Ok(Self {
            id: id.clone(),
            proposer: UserId::new(doc.require_text("proposer")?),
            recipient: UserId::new(doc.require_text("recipient")?),
            proposer_items: doc
                .require_text_list("proposerItems")?
                .into_iter()
                .map(ItemId::new)
                .collect(),
            recipient_items: doc
                .require_text_list("recipientItems")?
                .into_iter()
                .map(ItemId::new)
                .collect(),
            status,
            created_at: doc.require_time("createdAt")?,
        })
    }

    pub fn is_participant(&self, user: &UserId) -> bool {
        self.proposer == *user || self.recipient == *user
    }

    pub fn set_status(status: TradeStatus) -> FieldUpdate {
        FieldUpdate::set("status", status.as_str())
    }

    /// All trades a user takes part in, on either side.
    pub fn involving(user: &UserId) -> Filter {
        Filter::contains("participants", user.as_str())
    }
}
