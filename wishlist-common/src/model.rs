//! Wishlist data model.
//!
//! Labels and field names mirror the on-disk JSON written by earlier versions of the
//! app, so existing `wishlist.json` files load without migration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::WishlistError;

/// Title used when nothing usable could be extracted.
pub const UNKNOWN_TITLE: &str = "Unknown Item";
/// Title used when the target site served a block page.
pub const ACCESS_DENIED_TITLE: &str = "Access Denied";
/// Upper bound on normalized title length, in characters.
pub const MAX_TITLE_CHARS: usize = 140;

/// Closed set of wishlist categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    Shoes,
    Jacket,
    Shirts,
    Outerwear,
    Menswear,
    #[serde(rename = "Graphic Tee", alias = "GraphicTee")]
    GraphicTee,
    Toys,
    #[serde(rename = "UNT Merch", alias = "UNTMerch")]
    UNTMerch,
    Amazon,
    #[default]
    Misc,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Shoes,
        Category::Jacket,
        Category::Shirts,
        Category::Outerwear,
        Category::Menswear,
        Category::GraphicTee,
        Category::Toys,
        Category::UNTMerch,
        Category::Amazon,
        Category::Misc,
    ];

    /// Human-readable label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Category::Shoes => "Shoes",
            Category::Jacket => "Jacket",
            Category::Shirts => "Shirts",
            Category::Outerwear => "Outerwear",
            Category::Menswear => "Menswear",
            Category::GraphicTee => "Graphic Tee",
            Category::Toys => "Toys",
            Category::UNTMerch => "UNT Merch",
            Category::Amazon => "Amazon",
            Category::Misc => "Misc",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = WishlistError;

    /// Accepts either the label (`"Graphic Tee"`) or the variant name (`"GraphicTee"`),
    /// ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| {
                c.label().eq_ignore_ascii_case(wanted)
                    || format!("{c:?}").eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| WishlistError::UnknownCategory(s.to_string()))
    }
}

/// How much the user wants an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        f.write_str(s)
    }
}

impl FromStr for Priority {
    type Err = WishlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| WishlistError::UnknownPriority(s.to_string()))
    }
}

/// Output of a single metadata extraction.
///
/// Built fresh per call and immediately folded into a [`WishlistItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Single-line, whitespace-collapsed, at most [`MAX_TITLE_CHARS`]; never empty.
    pub title: String,
    /// Absolute `http(s)` URL, or empty when no image was found.
    pub image_url: String,
    pub category: Category,
}

/// A persisted wishlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub purchased: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl WishlistItem {
    /// Start a new, unpurchased item from freshly extracted metadata.
    pub fn from_metadata(url: impl Into<String>, meta: ItemMetadata, priority: Priority) -> Self {
        Self {
            name: meta.title,
            url: url.into(),
            image: meta.image_url,
            category: meta.category,
            priority,
            purchased: false,
            size: None,
            style: None,
            price: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_with_display_labels() {
        let json = serde_json::to_string(&Category::GraphicTee).unwrap();
        assert_eq!(json, "\"Graphic Tee\"");
        let back: Category = serde_json::from_str("\"UNT Merch\"").unwrap();
        assert_eq!(back, Category::UNTMerch);
        let alias: Category = serde_json::from_str("\"UNTMerch\"").unwrap();
        assert_eq!(alias, Category::UNTMerch);
    }

    #[test]
    fn category_parses_labels_and_variant_names() {
        assert_eq!("graphic tee".parse::<Category>().unwrap(), Category::GraphicTee);
        assert_eq!("GraphicTee".parse::<Category>().unwrap(), Category::GraphicTee);
        assert_eq!("  shoes ".parse::<Category>().unwrap(), Category::Shoes);
        assert!("Furniture".parse::<Category>().is_err());
    }

    #[test]
    fn priority_round_trips_through_display() {
        for p in Priority::ALL {
            assert_eq!(p.to_string().parse::<Priority>().unwrap(), p);
        }
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn legacy_item_json_loads() {
        let raw = r#"{
            "name": "Hoodie",
            "url": "https://example.com/hoodie",
            "image": "",
            "category": "Outerwear",
            "priority": "Low",
            "purchased": true,
            "size": "L",
            "style": "",
            "price": null
        }"#;
        let item: WishlistItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.category, Category::Outerwear);
        assert_eq!(item.priority, Priority::Low);
        assert!(item.purchased);
        assert_eq!(item.size.as_deref(), Some("L"));
        assert_eq!(item.price, None);
    }
}
