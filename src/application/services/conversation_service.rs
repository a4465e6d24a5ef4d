use std::sync::Arc;

use crate::application::errors::{CoreError, StoreError};
use crate::application::profiles::ProfileRepository;
use crate::domain::entities::{
    ChatMessage, Conversation, ConversationId, MessageId, UserId,
};
use crate::domain::traits::{DocumentStore, QueryRows, Subscription};

/// Service for conversations and their append-only message logs
///
/// Conversation ids are canonical pair keys, so two clients opening the
/// same chat converge on one document even when they race to create it.
/// Message order comes from server-assigned send times, strictly increasing
/// per store instance.
pub struct ConversationService {
    store: Arc<dyn DocumentStore>,
    profiles: ProfileRepository,
}

impl ConversationService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            profiles: ProfileRepository::new(store.clone()),
            store,
        }
    }

    /// The conversation for an unordered pair, created on first use. Losing
    /// a concurrent creation race just means reading the winner's document.
    pub async fn ensure_conversation(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Conversation, CoreError> {
        if a == b {
            return Err(CoreError::InvalidTarget);
        }
        self.profiles.require(a).await?;
        self.profiles.require(b).await?;

        let id = Conversation::pair_id(a, b);
        if let Some(doc) = self.store.get(Conversation::COLLECTION, id.as_str()).await? {
            return Ok(Conversation::from_document(&id, &doc)?);
        }

        let document = Conversation::creation_document(a, b);
        match self
            .store
            .create(Conversation::COLLECTION, id.as_str(), document)
            .await
        {
            Ok(doc) => {
                tracing::info!("Conversation {} created", id);
                Ok(Conversation::from_document(&id, &doc)?)
            }
            Err(StoreError::AlreadyExists(_)) => {
                let doc = self
                    .store
                    .get(Conversation::COLLECTION, id.as_str())
                    .await?
                    .ok_or_else(|| CoreError::NotFound(format!("conversations/{}", id)))?;
                Ok(Conversation::from_document(&id, &doc)?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Append a message, then update the conversation's denormalized
    /// preview with the message's own server-assigned timestamp.
    pub async fn send_message(
        &self,
        conversation_id: &ConversationId,
        sender: &UserId,
        text: &str,
    ) -> Result<ChatMessage, CoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::EmptyMessage);
        }
        let conversation = self.require_conversation(conversation_id).await?;
        if !conversation.has_participant(sender) {
            return Err(CoreError::NotParticipant(sender.to_string()));
        }

        let id = MessageId::generate();
        let document = ChatMessage::creation_document(conversation_id, sender, text);
        let stored = self
            .store
            .create(ChatMessage::COLLECTION, id.as_str(), document)
            .await?;
        let message = ChatMessage::from_document(&id, &stored)?;

        self.store
            .apply(
                Conversation::COLLECTION,
                conversation_id.as_str(),
                Conversation::preview_updates(&message),
            )
            .await?;
        tracing::debug!("Message {} sent in {}", id, conversation_id);
        Ok(message)
    }

    /// Full ordered message log of one conversation.
    pub async fn messages_in(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<ChatMessage>, CoreError> {
        let rows = self
            .store
            .query(
                ChatMessage::COLLECTION,
                &ChatMessage::in_conversation(conversation_id),
            )
            .await?;
        let mut messages = Vec::with_capacity(rows.len());
        for (id, doc) in rows {
            let id = MessageId::new(id);
            messages.push(ChatMessage::from_document(&id, &doc)?);
        }
        messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
        Ok(messages)
    }

    /// Live feed of one conversation's ordered messages.
    pub async fn subscribe(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<MessageFeed, CoreError> {
        let inner = self
            .store
            .watch_query(
                ChatMessage::COLLECTION,
                ChatMessage::in_conversation(conversation_id),
            )
            .await?;
        Ok(MessageFeed { inner })
    }

    /// Live feed of a user's conversations, most recent activity first.
    pub async fn subscribe_conversation_list(
        &self,
        user: &UserId,
    ) -> Result<ConversationFeed, CoreError> {
        let inner = self
            .store
            .watch_query(Conversation::COLLECTION, Conversation::involving(user))
            .await?;
        Ok(ConversationFeed { inner })
    }

    async fn require_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Conversation, CoreError> {
        match self.store.get(Conversation::COLLECTION, id.as_str()).await? {
            Some(doc) => Ok(Conversation::from_document(id, &doc)?),
            None => Err(CoreError::NotFound(format!("conversations/{}", id))),
        }
    }
}

/// Live, cancellable feed of one conversation's messages.
///
/// Each delivery is the full ordered log, latest-wins. Dropping the feed
/// stops delivery; reconnecting is a fresh `subscribe`.
pub struct MessageFeed {
    inner: Subscription<QueryRows>,
}

impl MessageFeed {
    /// Latest snapshot, immediately.
    pub fn current(&mut self) -> Vec<ChatMessage> {
        decode_messages(self.inner.current())
    }

    /// Next snapshot newer than the last seen. `None` once the store side
    /// is gone.
    pub async fn next(&mut self) -> Option<Vec<ChatMessage>> {
        self.inner.next().await.map(decode_messages)
    }

    pub fn cancel(self) {
        self.inner.cancel();
    }
}

/// Live, cancellable feed of a user's conversation list.
pub struct ConversationFeed {
    inner: Subscription<QueryRows>,
}

impl ConversationFeed {
    pub fn current(&mut self) -> Vec<Conversation> {
        decode_conversations(self.inner.current())
    }

    pub async fn next(&mut self) -> Option<Vec<Conversation>> {
        self.inner.next().await.map(decode_conversations)
    }

    pub fn cancel(self) {
        self.inner.cancel();
    }
}

/// A feed skips documents it cannot decode rather than dying mid-stream.
fn decode_messages(rows: QueryRows) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = rows
        .into_iter()
        .filter_map(|(id, doc)| {
            let id = MessageId::new(id);
            match ChatMessage::from_document(&id, &doc) {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::warn!("Skipping undecodable message {}: {}", id, e);
                    None
                }
            }
        })
        .collect();
    messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
    messages
}

fn decode_conversations(rows: QueryRows) -> Vec<Conversation> {
    let mut conversations: Vec<Conversation> = rows
        .into_iter()
        .filter_map(|(id, doc)| {
            let id = ConversationId::new(id);
            match Conversation::from_document(&id, &doc) {
                Ok(conversation) => Some(conversation),
                Err(e) => {
                    tracing::warn!("Skipping undecodable conversation {}: {}", id, e);
                    None
                }
            }
        })
        .collect();
    conversations.sort_by(|a, b| b.last_message_time.cmp(&a.last_message_time));
    conversations
}
