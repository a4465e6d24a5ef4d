//! Conversation and message documents.
//!
//! A conversation between two users has a deterministic id derived from the
//! pair, so any two clients that open the same chat converge on one document
//! without coordination. Messages live in their own flat collection keyed
//! back to the conversation.

use chrono::{DateTime, Utc};

use crate::application::errors::SchemaError;
use crate::domain::entities::document::{Document, FieldUpdate, Filter, Value};
use crate::domain::entities::ids::{ConversationId, MessageId, UserId};

/// One two-party conversation with a denormalized preview of its latest
/// message for list rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: [UserId; 2],
    pub last_message: String,
    pub last_message_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub const COLLECTION: &'static str = "conversations";

    /// Canonical id for the pair: the two user ids sorted and joined with
    /// `__`. Both orderings of the same pair produce the same id.
    pub fn pair_id(a: &UserId, b: &UserId) -> ConversationId {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        ConversationId::new(format!("{}__{}", low.as_str(), high.as_str()))
    }

    /// Wire form of a fresh conversation with an empty preview.
    pub fn creation_document(a: &UserId, b: &UserId) -> Document {
        Document::new()
            .with("participants", Value::list([a.as_str(), b.as_str()]))
            .with("lastMessage", "")
            .with("lastMessageTime", Value::ServerTime)
            .with("createdAt", Value::ServerTime)
    }

    pub fn from_document(id: &ConversationId, doc: &Document) -> Result<Self, SchemaError> {
        let participants = doc.require_text_list("participants")?;
        let participants: [UserId; 2] = match <[String; 2]>::try_from(participants) {
            Ok([a, b]) => [UserId::new(a), UserId::new(b)],
            Err(_) => return Err(SchemaError::WrongKind("participants")),
        };

        Ok(Self {
            id: id.clone(),
            participants,
            last_message: doc.require_text("lastMessage")?.to_string(),
            last_message_time: doc.require_time("lastMessageTime")?,
            created_at: doc.require_time("createdAt")?,
        })
    }

    pub fn has_participant(&self, user: &UserId) -> bool {
        self.participants.iter().any(|p| p == user)
    }

    /// The peer of `user` in this conversation, if `user` is in it at all.
    pub fn other_participant(&self, user: &UserId) -> Option<&UserId> {
        match &self.participants {
            [a, b] if a == user => Some(b),
            [a, b] if b == user => Some(a),
            _ => None,
        }
    }

    /// Preview updates after a message lands. Reuses the message's resolved
    /// send time so list ordering agrees with the message itself.
    pub fn preview_updates(message: &ChatMessage) -> Vec<FieldUpdate> {
        vec![
            FieldUpdate::set("lastMessage", message.text.as_str()),
            FieldUpdate::set("lastMessageTime", message.sent_at),
        ]
    }

    /// All conversations a user takes part in.
    pub fn involving(user: &UserId) -> Filter {
        Filter::contains("participants", user.as_str())
    }
}

/// One message inside a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender: UserId,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub const COLLECTION: &'static str = "messages";

    /// Wire form of an outgoing message. `sentAt` is stamped by the store.
    pub fn creation_document(
        conversation: &ConversationId,
        sender: &UserId,
        text: &str,
    ) -> Document {
        Document::new()
            .with("conversationId", conversation.as_str())
            .with("senderId", sender.as_str())
            .with("text", text)
            .with("sentAt", Value::ServerTime)
    }

    pub fn from_document(id: &MessageId, doc: &Document) -> Result<Self, SchemaError> {
        Ok(Self {
            id: id.clone(),
            conversation_id: ConversationId::new(doc.require_text("conversationId")?),
            sender: UserId::new(doc.require_text("senderId")?),
            text: doc.require_text("text")?.to_string(),
            sent_at: doc.require_time("sentAt")?,
        })
    }

    /// Every message of one conversation.
    pub fn in_conversation(conversation: &ConversationId) -> Filter {
        Filter::eq("conversationId", conversation.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_id_is_order_independent() {
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        assert_eq!(
            Conversation::pair_id(&alice, &bob),
            Conversation::pair_id(&bob, &alice)
        );
        assert_eq!(
            Conversation::pair_id(&alice, &bob).as_str(),
            "alice__bob"
        );
    }

    #[test]
    fn conversation_round_trips() {
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        let id = Conversation::pair_id(&alice, &bob);
        let mut doc = Conversation::creation_document(&alice, &bob);
        doc.resolve_server_time(Utc::now());

        let convo = Conversation::from_document(&id, &doc).unwrap();
        assert!(convo.has_participant(&alice));
        assert!(convo.has_participant(&bob));
        assert_eq!(convo.other_participant(&alice), Some(&bob));
        assert_eq!(convo.other_participant(&UserId::new("carol")), None);
        assert_eq!(convo.last_message, "");
        assert!(Conversation::involving(&bob).matches(&doc));
    }

    #[test]
    fn three_participants_rejected() {
        let doc = Document::new()
            .with("participants", Value::list(["a", "b", "c"]))
            .with("lastMessage", "")
            .with("lastMessageTime", Utc::now())
            .with("createdAt", Utc::now());
        assert!(matches!(
            Conversation::from_document(&ConversationId::new("a__b"), &doc),
            Err(SchemaError::WrongKind("participants"))
        ));
    }

    #[test]
    fn preview_follows_message() {
        let t = Utc::now();
        let convo = ConversationId::new("alice__bob");
        let mut doc = ChatMessage::creation_document(&convo, &UserId::new("alice"), "hey!");
        doc.resolve_server_time(t);
        let message = ChatMessage::from_document(&MessageId::generate(), &doc).unwrap();
        assert_eq!(message.sent_at, t);

        let updates = Conversation::preview_updates(&message);
        assert!(updates.contains(&FieldUpdate::set("lastMessage", "hey!")));
        assert!(updates.contains(&FieldUpdate::set("lastMessageTime", t)));
    }
}
