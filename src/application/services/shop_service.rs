use std::sync::Arc;

use crate::application::errors::CoreError;
use crate::application::profiles::ProfileRepository;
use crate::domain::entities::{EquipSlot, ItemCatalog, ItemId, Profile, UserId};
use crate::domain::traits::DocumentStore;

/// Service for storefront purchases and avatar equipment
pub struct ShopService {
    profiles: ProfileRepository,
    catalog: &'static ItemCatalog,
}

impl ShopService {
    pub fn new(store: Arc<dyn DocumentStore>, catalog: &'static ItemCatalog) -> Self {
        Self {
            profiles: ProfileRepository::new(store),
            catalog,
        }
    }

    /// Buy a catalog item: one atomic update debiting the balance and
    /// granting the item.
    pub async fn buy_item(&self, user_id: &UserId, item_id: &ItemId) -> Result<(), CoreError> {
        let listing = self
            .catalog
            .find(item_id)
            .ok_or_else(|| CoreError::UnknownItem(item_id.to_string()))?;
        let profile = self.profiles.require(user_id).await?;
        if profile.owns(item_id) {
            return Err(CoreError::AlreadyOwned(item_id.to_string()));
        }
        if profile.robux < listing.price {
            return Err(CoreError::InsufficientFunds {
                need: listing.price,
                have: profile.robux,
            });
        }

        self.profiles
            .apply(
                user_id,
                vec![
                    Profile::set_balance(profile.robux - listing.price),
                    Profile::grant_item(item_id),
                ],
            )
            .await?;
        tracing::info!("{} bought {} for {} robux", user_id, item_id, listing.price);
        Ok(())
    }

    /// Equip an owned item into its category's slot, replacing whatever was
    /// there.
    pub async fn equip(&self, user_id: &UserId, item_id: &ItemId) -> Result<(), CoreError> {
        let listing = self
            .catalog
            .find(item_id)
            .ok_or_else(|| CoreError::UnknownItem(item_id.to_string()))?;
        let profile = self.profiles.require(user_id).await?;
        if !profile.owns(item_id) {
            return Err(CoreError::ItemNotOwned(item_id.to_string()));
        }

        let mut equipped = profile.equipped.clone();
        equipped.insert(listing.category.slot(), item_id.clone());
        self.profiles
            .apply(user_id, vec![Profile::set_equipment(&equipped)])
            .await?;
        tracing::debug!("{} equipped {} as {}", user_id, item_id, listing.category.slot().as_str());
        Ok(())
    }

    /// Clear one equipment slot. Idempotent.
    pub async fn unequip(&self, user_id: &UserId, slot: EquipSlot) -> Result<(), CoreError> {
        let profile = self.profiles.require(user_id).await?;
        let mut equipped = profile.equipped.clone();
        if equipped.remove(&slot).is_none() {
            return Ok(());
        }
        self.profiles
            .apply(user_id, vec![Profile::set_equipment(&equipped)])
            .await?;
        tracing::debug!("{} cleared slot {}", user_id, slot.as_str());
        Ok(())
    }
}
