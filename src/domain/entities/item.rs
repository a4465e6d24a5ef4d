use crate::domain::entities::ids::ItemId;
use crate::domain::entities::profile::EquipSlot;

/// Shop category of an item. Each category equips into one avatar slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemCategory {
    Hats,
    Faces,
    Accessories,
    Gear,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Hats => "hats",
            ItemCategory::Faces => "faces",
            ItemCategory::Accessories => "accessories",
            ItemCategory::Gear => "gear",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hats" => Some(ItemCategory::Hats),
            "faces" => Some(ItemCategory::Faces),
            "accessories" => Some(ItemCategory::Accessories),
            "gear" => Some(ItemCategory::Gear),
            _ => None,
        }
    }

    /// The avatar slot items of this category occupy when equipped.
    pub fn slot(&self) -> EquipSlot {
        match self {
            ItemCategory::Hats => EquipSlot::Hat,
            ItemCategory::Faces => EquipSlot::Face,
            ItemCategory::Accessories => EquipSlot::Accessory,
            ItemCategory::Gear => EquipSlot::Gear,
        }
    }
}

/// Rarity tier of a catalog item, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "common" => Some(Rarity::Common),
            "uncommon" => Some(Rarity::Uncommon),
            "rare" => Some(Rarity::Rare),
            "epic" => Some(Rarity::Epic),
            "legendary" => Some(Rarity::Legendary),
            _ => None,
        }
    }
}

/// One purchasable storefront item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemListing {
    pub id: ItemId,
    pub name: String,
    pub category: ItemCategory,
    pub price: u64,
    pub rarity: Rarity,
}

impl ItemListing {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: ItemCategory,
        price: u64,
        rarity: Rarity,
    ) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.into(),
            category,
            price,
            rarity,
        }
    }
}

/// Item catalog for pricing and categorizing shop items
#[derive(Debug, Default)]
pub struct ItemCatalog {
    items: Vec<ItemListing>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, item: ItemListing) {
        self.items.push(item);
    }

    pub fn find(&self, id: &ItemId) -> Option<&ItemListing> {
        self.items.iter().find(|item| item.id == *id)
    }

    /// Listings in storefront order.
    pub fn all(&self) -> impl Iterator<Item = &ItemListing> {
        self.items.iter()
    }

    pub fn by_category(&self, category: ItemCategory) -> Vec<&ItemListing> {
        self.items
            .iter()
            .filter(|item| item.category == category)
            .collect()
    }

    pub fn by_rarity(&self, rarity: Rarity) -> Vec<&ItemListing> {
        self.items
            .iter()
            .filter(|item| item.rarity == rarity)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
