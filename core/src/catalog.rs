//! Cosmetic Store Catalog
//!
//! The skin catalog is static client configuration: ownership and equip
//! state live in [`UserState`](crate::model::UserState), names, prices and
//! artwork live here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coins charged per roulette spin
pub const ROULETTE_COST: u32 = 100;

/// Identifier of the always-owned base skin
pub const DEFAULT_SKIN: &str = "default";

/// Skin identifier ("default", "skin_1", ...)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkinId(pub String);

impl SkinId {
    /// Create a skin id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Whether this is the base skin
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_SKIN
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SkinId {
    fn default() -> Self {
        Self(DEFAULT_SKIN.to_string())
    }
}

impl From<&str> for SkinId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SkinId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SkinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A purchasable cosmetic
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreItem {
    /// Skin id
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Price in coins
    pub cost: u32,
    /// Artwork path
    pub image: &'static str,
}

impl StoreItem {
    /// Skin id as an owned [`SkinId`]
    pub fn skin_id(&self) -> SkinId {
        SkinId::from(self.id)
    }
}

/// Every skin the client knows how to display
pub const STORE_ITEMS: &[StoreItem] = &[
    StoreItem {
        id: DEFAULT_SKIN,
        name: "Original",
        cost: 0,
        image: "/static/img/IMG_8442.PNG",
    },
    StoreItem {
        id: "skin_1",
        name: "Variant Alpha",
        cost: 100,
        image: "/static/img/skins/IMG_8473.PNG",
    },
    StoreItem {
        id: "skin_2",
        name: "Variant Beta",
        cost: 100,
        image: "/static/img/skins/IMG_8474.PNG",
    },
    StoreItem {
        id: "skin_3",
        name: "Variant Gamma",
        cost: 100,
        image: "/static/img/skins/IMG_8475.PNG",
    },
    StoreItem {
        id: "skin_4",
        name: "Variant Delta",
        cost: 100,
        image: "/static/img/skins/IMG_8476.PNG",
    },
    StoreItem {
        id: "skin_5",
        name: "Variant Epsilon",
        cost: 100,
        image: "/static/img/skins/IMG_8477.PNG",
    },
    StoreItem {
        id: "skin_6",
        name: "Variant Zeta",
        cost: 100,
        image: "/static/img/skins/IMG_8478.PNG",
    },
];

/// Look up a catalog entry
pub fn find_item(skin: &SkinId) -> Option<&'static StoreItem> {
    STORE_ITEMS.iter().find(|item| item.id == skin.as_str())
}

/// Artwork for a skin, falling back to the base skin for unknown ids
pub fn skin_image(skin: &SkinId) -> &'static str {
    find_item(skin)
        .or_else(|| STORE_ITEMS.first())
        .map_or("", |item| item.image)
}

/// Display name for a skin, falling back to the raw id
pub fn skin_name(skin: &SkinId) -> String {
    find_item(skin).map_or_else(|| skin.to_string(), |item| item.name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let item = find_item(&SkinId::from("skin_3")).unwrap();
        assert_eq!(item.name, "Variant Gamma");
        assert_eq!(item.cost, 100);
        assert!(find_item(&SkinId::from("skin_99")).is_none());
    }

    #[test]
    fn test_skin_fallbacks() {
        assert_eq!(
            skin_image(&SkinId::from("nope")),
            "/static/img/IMG_8442.PNG"
        );
        assert_eq!(skin_name(&SkinId::from("nope")), "nope");
        assert_eq!(skin_name(&SkinId::default()), "Original");
    }

    #[test]
    fn test_skin_id_serde_is_plain_string() {
        let json = serde_json::to_string(&SkinId::from("skin_1")).unwrap();
        assert_eq!(json, r#""skin_1""#);
    }
}
