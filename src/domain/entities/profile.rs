//! User profile documents.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::errors::SchemaError;
use crate::domain::entities::document::{Document, FieldUpdate, Filter, Value};
use crate::domain::entities::ids::{ItemId, UserId};

/// Avatar body colors as hex strings with a leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Avatar {
    pub head_color: String,
    pub torso_color: String,
    pub arms_color: String,
    pub legs_color: String,
}

impl Default for Avatar {
    fn default() -> Self {
        Self {
            head_color: "#f5c469".to_string(),
            torso_color: "#4a90d9".to_string(),
            arms_color: "#f5c469".to_string(),
            legs_color: "#2d5a8a".to_string(),
        }
    }
}

impl Avatar {
    fn to_value(&self) -> Value {
        let mut map = BTreeMap::new();
        map.insert("headColor".to_string(), Value::Text(self.head_color.clone()));
        map.insert(
            "torsoColor".to_string(),
            Value::Text(self.torso_color.clone()),
        );
        map.insert("armsColor".to_string(), Value::Text(self.arms_color.clone()));
        map.insert("legsColor".to_string(), Value::Text(self.legs_color.clone()));
        Value::Map(map)
    }

    fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let map = value.as_map().ok_or(SchemaError::WrongKind("avatar"))?;
        let color = |key: &str| -> Result<String, SchemaError> {
            map.get(key)
                .and_then(Value::as_text)
                .map(str::to_string)
                .ok_or(SchemaError::WrongKind("avatar"))
        };
        Ok(Self {
            head_color: color("headColor")?,
            torso_color: color("torsoColor")?,
            arms_color: color("armsColor")?,
            legs_color: color("legsColor")?,
        })
    }
}

/// Equipment slot on an avatar; each holds at most one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EquipSlot {
    Hat,
    Face,
    Accessory,
    Gear,
}

impl EquipSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipSlot::Hat => "hat",
            EquipSlot::Face => "face",
            EquipSlot::Accessory => "accessory",
            EquipSlot::Gear => "gear",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hat" => Some(EquipSlot::Hat),
            "face" => Some(EquipSlot::Face),
            "accessory" => Some(EquipSlot::Accessory),
            "gear" => Some(EquipSlot::Gear),
            _ => None,
        }
    }
}

/// Online presence recorded on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Online,
    Offline,
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Presence::Online => "online",
            Presence::Offline => "offline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "online" => Some(Presence::Online),
            "offline" => Some(Presence::Offline),
            _ => None,
        }
    }
}

/// One user's profile: identity, inventory, social edges and balance.
///
/// Friendship edges are symmetric by invariant: `friends` on two profiles
/// either both carry the other id or, transiently while an accept or removal
/// is in flight, differ by exactly the in-flight edge. `friend_requests` is
/// disjoint from `friends`.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    pub avatar: Avatar,
    pub bio: String,
    pub robux: u64,
    pub inventory: Vec<ItemId>,
    pub equipped: BTreeMap<EquipSlot, ItemId>,
    pub friends: Vec<UserId>,
    pub friend_requests: Vec<UserId>,
    pub status: Presence,
    pub last_online: DateTime<Utc>,
    pub games_played: u64,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub const COLLECTION: &'static str = "users";

    /// Wire form of a freshly registered profile. `lastOnline` and
    /// `createdAt` are stamped by the store when the document is created.
    pub fn registration_document(
        username: &str,
        starting_balance: u64,
        bio: &str,
        avatar: &Avatar,
    ) -> Document {
        Document::new()
            .with("username", username)
            .with("usernameLookup", username.to_lowercase())
            .with("avatar", avatar.to_value())
            .with("bio", bio)
            .with("robux", starting_balance)
            .with("inventory", Value::List(Vec::new()))
            .with("equipped", Value::Map(BTreeMap::new()))
            .with("friends", Value::List(Vec::new()))
            .with("friendRequests", Value::List(Vec::new()))
            .with("status", Presence::Offline.as_str())
            .with("lastOnline", Value::ServerTime)
            .with("gamesPlayed", 0u64)
            .with("createdAt", Value::ServerTime)
    }

    /// Decode a stored profile, rejecting documents with missing or mistyped
    /// required fields.
    pub fn from_document(id: &UserId, doc: &Document) -> Result<Self, SchemaError> {
        let avatar = Avatar::from_value(
            doc.get("avatar")
                .ok_or(SchemaError::MissingField("avatar"))?,
        )?;

        let mut equipped = BTreeMap::new();
        for (slot, item) in doc.require_map("equipped")? {
            let slot = EquipSlot::parse(slot)
                .ok_or_else(|| SchemaError::UnknownValue("equipped", slot.clone()))?;
            let item = item.as_text().ok_or(SchemaError::WrongKind("equipped"))?;
            equipped.insert(slot, ItemId::new(item));
        }

        let status = doc.require_text("status")?;
        let status = Presence::parse(status)
            .ok_or_else(|| SchemaError::UnknownValue("status", status.to_string()))?;

        Ok(Self {
            id: id.clone(),
            username: doc.require_text("username")?.to_string(),
            avatar,
            bio: doc.require_text("bio")?.to_string(),
            robux: doc.require_uint("robux")?,
            inventory: doc
                .require_text_list("inventory")?
                .into_iter()
                .map(ItemId::new)
                .collect(),
            equipped,
            friends: doc
                .require_text_list("friends")?
                .into_iter()
                .map(UserId::new)
                .collect(),
            friend_requests: doc
                .require_text_list("friendRequests")?
                .into_iter()
                .map(UserId::new)
                .collect(),
            status,
            last_online: doc.require_time("lastOnline")?,
            games_played: doc.require_uint("gamesPlayed")?,
            created_at: doc.require_time("createdAt")?,
        })
    }

    pub fn owns(&self, item: &ItemId) -> bool {
        self.inventory.contains(item)
    }

    pub fn is_friend(&self, user: &UserId) -> bool {
        self.friends.contains(user)
    }

    pub fn has_request_from(&self, user: &UserId) -> bool {
        self.friend_requests.contains(user)
    }

    pub fn equipped_in(&self, slot: EquipSlot) -> Option<&ItemId> {
        self.equipped.get(&slot)
    }

    // ----- field-level updates the managers sequence -----

    pub fn add_friend(user: &UserId) -> FieldUpdate {
        FieldUpdate::union("friends", user.as_str())
    }

    pub fn remove_friend(user: &UserId) -> FieldUpdate {
        FieldUpdate::remove("friends", user.as_str())
    }

    pub fn add_friend_request(from: &UserId) -> FieldUpdate {
        FieldUpdate::union("friendRequests", from.as_str())
    }

    pub fn remove_friend_request(from: &UserId) -> FieldUpdate {
        FieldUpdate::remove("friendRequests", from.as_str())
    }

    pub fn grant_item(item: &ItemId) -> FieldUpdate {
        FieldUpdate::union("inventory", item.as_str())
    }

    pub fn revoke_item(item: &ItemId) -> FieldUpdate {
        FieldUpdate::remove("inventory", item.as_str())
    }

    pub fn set_balance(robux: u64) -> FieldUpdate {
        FieldUpdate::set("robux", robux)
    }

    pub fn set_bio(bio: &str) -> FieldUpdate {
        FieldUpdate::set("bio", bio)
    }

    pub fn set_avatar(avatar: &Avatar) -> FieldUpdate {
        FieldUpdate::Set("avatar".to_string(), avatar.to_value())
    }

    pub fn set_equipment(equipped: &BTreeMap<EquipSlot, ItemId>) -> FieldUpdate {
        let map = equipped
            .iter()
            .map(|(slot, item)| (slot.as_str().to_string(), Value::Text(item.to_string())))
            .collect();
        FieldUpdate::Set("equipped".to_string(), Value::Map(map))
    }

    pub fn set_games_played(count: u64) -> FieldUpdate {
        FieldUpdate::set("gamesPlayed", count)
    }

    /// Status change plus the `lastOnline` stamp, issued as one batch.
    pub fn presence_updates(status: Presence) -> Vec<FieldUpdate> {
        vec![
            FieldUpdate::set("status", status.as_str()),
            FieldUpdate::Set("lastOnline".to_string(), Value::ServerTime),
        ]
    }

    /// Case-normalized username lookup.
    pub fn with_username(username: &str) -> Filter {
        Filter::eq("usernameLookup", username.to_lowercase())
    }
}
