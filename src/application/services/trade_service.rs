use std::sync::Arc;

use crate::application::errors::CoreError;
use crate::application::profiles::ProfileRepository;
use crate::domain::entities::{ItemId, Profile, Trade, TradeId, TradeStatus, UserId};
use crate::domain::traits::DocumentStore;

/// Service for the trade proposal, response, and settlement lifecycle
///
/// Settlement is a sequence of independent per-document writes: each item
/// move is a remove on the source profile then a union on the destination,
/// and the terminal status write comes last. The status field is the only
/// authoritative completion signal; a `pending` trade with partially moved
/// items is an interrupted settlement, converged by calling `accept_trade`
/// again.
pub struct TradeService {
    store: Arc<dyn DocumentStore>,
    profiles: ProfileRepository,
}

impl TradeService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            profiles: ProfileRepository::new(store.clone()),
            store,
        }
    }

    /// Open a pending trade offering `offered` to `to`. Ownership of every
    /// offered item is read-verified at call time. The recipient's side of
    /// the exchange starts empty; settlement moves whatever both sides hold
    /// when the trade is accepted.
    pub async fn propose_trade(
        &self,
        from: &UserId,
        to: &UserId,
        offered: &[ItemId],
    ) -> Result<TradeId, CoreError> {
        if from == to {
            return Err(CoreError::InvalidTarget);
        }
        if offered.is_empty() {
            return Err(CoreError::EmptyOffer);
        }
        let proposer = self.profiles.require(from).await?;
        for item in offered {
            if !proposer.owns(item) {
                return Err(CoreError::ItemNotOwned(item.to_string()));
            }
        }
        self.profiles.require(to).await?;

        let id = TradeId::generate();
        let document = Trade::proposal_document(from, to, offered);
        self.store
            .create(Trade::COLLECTION, id.as_str(), document)
            .await?;
        tracing::info!("Trade {} proposed: {} offers {} item(s) to {}", id, from, offered.len(), to);
        Ok(id)
    }

    /// Accept a pending trade and settle it. Recipient only.
    ///
    /// Every offered item is re-verified first: an item absent from its
    /// offerer's inventory and from the counterparty's is gone, so the trade
    /// is marked declined before any inventory write. An item already with
    /// the counterparty is an earlier interrupted settlement of this trade
    /// and counts as satisfied.
    pub async fn accept_trade(&self, caller: &UserId, trade_id: &TradeId) -> Result<(), CoreError> {
        let trade = self.require_trade(trade_id).await?;
        if trade.recipient != *caller {
            return Err(CoreError::NotRecipient);
        }
        if trade.status != TradeStatus::Pending {
            return Err(CoreError::TradeNotPending);
        }

        let proposer = self.profiles.require(&trade.proposer).await?;
        let recipient = self.profiles.require(&trade.recipient).await?;
        for item in &trade.proposer_items {
            if !proposer.owns(item) && !recipient.owns(item) {
                return self.decline_unavailable(trade_id, item).await;
            }
        }
        for item in &trade.recipient_items {
            if !recipient.owns(item) && !proposer.owns(item) {
                return self.decline_unavailable(trade_id, item).await;
            }
        }

        for item in &trade.proposer_items {
            self.move_item(item, &trade.proposer, &trade.recipient).await?;
        }
        for item in &trade.recipient_items {
            self.move_item(item, &trade.recipient, &trade.proposer).await?;
        }

        self.store
            .apply(
                Trade::COLLECTION,
                trade_id.as_str(),
                vec![Trade::set_status(TradeStatus::Completed)],
            )
            .await?;
        tracing::info!("Trade {} completed", trade_id);
        Ok(())
    }

    /// Decline a pending trade. Recipient only; inventories are untouched.
    pub async fn decline_trade(&self, caller: &UserId, trade_id: &TradeId) -> Result<(), CoreError> {
        let trade = self.require_trade(trade_id).await?;
        if trade.recipient != *caller {
            return Err(CoreError::NotRecipient);
        }
        if trade.status != TradeStatus::Pending {
            return Err(CoreError::TradeNotPending);
        }
        self.store
            .apply(
                Trade::COLLECTION,
                trade_id.as_str(),
                vec![Trade::set_status(TradeStatus::Declined)],
            )
            .await?;
        tracing::info!("Trade {} declined by {}", trade_id, caller);
        Ok(())
    }

    /// Remove a settled or declined trade's record. Participants only;
    /// a pending trade must be responded to first.
    pub async fn delete_trade_record(
        &self,
        caller: &UserId,
        trade_id: &TradeId,
    ) -> Result<(), CoreError> {
        let trade = self.require_trade(trade_id).await?;
        if !trade.is_participant(caller) {
            return Err(CoreError::NotParticipant(caller.to_string()));
        }
        if !trade.status.is_terminal() {
            return Err(CoreError::TradeStillOpen);
        }
        self.store.delete(Trade::COLLECTION, trade_id.as_str()).await?;
        tracing::debug!("Trade {} record deleted by {}", trade_id, caller);
        Ok(())
    }

    /// Every trade the user takes part in, newest first.
    pub async fn trades_for(&self, user: &UserId) -> Result<Vec<Trade>, CoreError> {
        let rows = self
            .store
            .query(Trade::COLLECTION, &Trade::involving(user))
            .await?;
        let mut trades = Vec::with_capacity(rows.len());
        for (id, doc) in rows {
            let id = TradeId::new(id);
            trades.push(Trade::from_document(&id, &doc)?);
        }
        trades.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(trades)
    }

    /// Per-item settlement state computed from live inventories, so a caller
    /// interrupted mid-settlement can see which moves already committed.
    pub async fn settlement_progress(
        &self,
        trade_id: &TradeId,
    ) -> Result<SettlementProgress, CoreError> {
        let trade = self.require_trade(trade_id).await?;
        let proposer = self.profiles.require(&trade.proposer).await?;
        let recipient = self.profiles.require(&trade.recipient).await?;

        let mut items = Vec::with_capacity(trade.proposer_items.len() + trade.recipient_items.len());
        for item in &trade.proposer_items {
            items.push(ItemProgress {
                item: item.clone(),
                from: trade.proposer.clone(),
                to: trade.recipient.clone(),
                moved: recipient.owns(item),
            });
        }
        for item in &trade.recipient_items {
            items.push(ItemProgress {
                item: item.clone(),
                from: trade.recipient.clone(),
                to: trade.proposer.clone(),
                moved: proposer.owns(item),
            });
        }

        Ok(SettlementProgress {
            status: trade.status,
            items,
        })
    }

    async fn require_trade(&self, trade_id: &TradeId) -> Result<Trade, CoreError> {
        match self.store.get(Trade::COLLECTION, trade_id.as_str()).await? {
            Some(doc) => Ok(Trade::from_document(trade_id, &doc)?),
            None => Err(CoreError::NotFound(format!("trades/{}", trade_id))),
        }
    }

    async fn decline_unavailable(
        &self,
        trade_id: &TradeId,
        item: &ItemId,
    ) -> Result<(), CoreError> {
        self.store
            .apply(
                Trade::COLLECTION,
                trade_id.as_str(),
                vec![Trade::set_status(TradeStatus::Declined)],
            )
            .await?;
        tracing::warn!("Trade {} declined: item {} is gone from both sides", trade_id, item);
        Err(CoreError::ItemNoLongerAvailable(item.to_string()))
    }

    async fn move_item(&self, item: &ItemId, from: &UserId, to: &UserId) -> Result<(), CoreError> {
        self.profiles
            .apply(from, vec![Profile::revoke_item(item)])
            .await?;
        self.profiles
            .apply(to, vec![Profile::grant_item(item)])
            .await?;
        Ok(())
    }
}

/// Snapshot of how far a trade's settlement has progressed.
#[derive(Debug, Clone)]
pub struct SettlementProgress {
    pub status: TradeStatus,
    pub items: Vec<ItemProgress>,
}

impl SettlementProgress {
    /// True once every item sits with its destination.
    pub fn is_settled(&self) -> bool {
        self.items.iter().all(|item| item.moved)
    }
}

/// One item's position within a settlement.
#[derive(Debug, Clone)]
pub struct ItemProgress {
    pub item: ItemId,
    pub from: UserId,
    pub to: UserId,
    pub moved: bool,
}
