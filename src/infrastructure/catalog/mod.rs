//! The platform's static item catalog

use once_cell::sync::Lazy;

use crate::domain::entities::item::{ItemCatalog, ItemCategory, ItemListing, Rarity};

static CATALOG: Lazy<ItemCatalog> = Lazy::new(|| {
    use ItemCategory::{Accessories, Faces, Gear, Hats};
    use Rarity::{Common, Epic, Legendary, Rare, Uncommon};

    let mut catalog = ItemCatalog::new();

    catalog.register(ItemListing::new("hat_cap_red", "Red Cap", Hats, 50, Common));
    catalog.register(ItemListing::new("hat_cap_blue", "Blue Cap", Hats, 50, Common));
    catalog.register(ItemListing::new("hat_tophat", "Top Hat", Hats, 200, Rare));
    catalog.register(ItemListing::new("hat_crown", "Golden Crown", Hats, 1000, Legendary));
    catalog.register(ItemListing::new("hat_beanie", "Purple Beanie", Hats, 75, Common));
    catalog.register(ItemListing::new("hat_cowboy", "Cowboy Hat", Hats, 150, Uncommon));

    catalog.register(ItemListing::new("face_happy", "Happy Face", Faces, 25, Common));
    catalog.register(ItemListing::new("face_cool", "Cool Shades", Faces, 100, Uncommon));
    catalog.register(ItemListing::new("face_angry", "Angry Face", Faces, 25, Common));
    catalog.register(ItemListing::new("face_surprised", "Surprised Face", Faces, 25, Common));
    catalog.register(ItemListing::new("face_wink", "Wink Face", Faces, 50, Uncommon));
    catalog.register(ItemListing::new("face_star", "Star Eyes", Faces, 500, Epic));

    catalog.register(ItemListing::new("acc_wings_white", "Angel Wings", Accessories, 750, Epic));
    catalog.register(ItemListing::new("acc_wings_dark", "Dark Wings", Accessories, 750, Epic));
    catalog.register(ItemListing::new("acc_backpack", "Backpack", Accessories, 100, Common));
    catalog.register(ItemListing::new("acc_cape_red", "Red Cape", Accessories, 300, Rare));

    catalog.register(ItemListing::new("gear_sword", "Steel Sword", Gear, 200, Uncommon));
    catalog.register(ItemListing::new("gear_sword_gold", "Golden Sword", Gear, 1500, Legendary));
    catalog.register(ItemListing::new("gear_shield", "Knight Shield", Gear, 250, Rare));
    catalog.register(ItemListing::new("gear_staff", "Magic Staff", Gear, 500, Epic));

    catalog
});

/// The storefront catalog every shop flow prices against.
pub fn platform_catalog() -> &'static ItemCatalog {
    &CATALOG
}
