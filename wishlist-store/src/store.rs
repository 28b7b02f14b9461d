use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wishlist_common::{Result, WishlistError, WishlistItem};

use crate::filter::ItemFilter;

/// Everything persisted for one wishlist.
///
/// Every key is optional on load so partially written or older files still open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WishlistStore {
    /// Free-form user preferences; carried through untouched.
    #[serde(default)]
    pub preferences: Map<String, Value>,
    #[serde(default)]
    pub items: Vec<WishlistItem>,
    /// Last item entered for each URL, kept even after the item is removed.
    #[serde(default)]
    pub archive: BTreeMap<String, WishlistItem>,
}

impl WishlistStore {
    /// Append `item` and remember it in the archive under its URL.
    ///
    /// Returns the new item's index.
    pub fn add_item(&mut self, item: WishlistItem) -> Result<usize> {
        if item.url.trim().is_empty() {
            return Err(WishlistError::MissingField("URL"));
        }
        if item.name.trim().is_empty() {
            return Err(WishlistError::MissingField("name"));
        }
        self.archive.insert(item.url.clone(), item.clone());
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    /// Defaults for a repeat entry of `url`: the archived record, reset to unpurchased.
    pub fn prefill(&self, url: &str) -> Option<WishlistItem> {
        self.archive.get(url).map(|archived| WishlistItem {
            purchased: false,
            ..archived.clone()
        })
    }

    pub fn get(&self, index: usize) -> Result<&WishlistItem> {
        self.items
            .get(index)
            .ok_or(WishlistError::ItemNotFound(index))
    }

    pub fn set_purchased(&mut self, index: usize, purchased: bool) -> Result<&WishlistItem> {
        let item = self
            .items
            .get_mut(index)
            .ok_or(WishlistError::ItemNotFound(index))?;
        item.purchased = purchased;
        Ok(item)
    }

    /// Remove an item from the list. Its archive entry is kept.
    pub fn remove(&mut self, index: usize) -> Result<WishlistItem> {
        if index >= self.items.len() {
            return Err(WishlistError::ItemNotFound(index));
        }
        Ok(self.items.remove(index))
    }

    /// Items passing `filter`, paired with their index in [`items`](Self::items).
    pub fn filtered<'a>(
        &'a self,
        filter: &'a ItemFilter,
    ) -> impl Iterator<Item = (usize, &'a WishlistItem)> + 'a {
        self.items
            .iter()
            .enumerate()
            .filter(move |(_, item)| filter.matches(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wishlist_common::{Category, Priority};

    fn item(name: &str, url: &str) -> WishlistItem {
        WishlistItem {
            name: name.into(),
            url: url.into(),
            image: String::new(),
            category: Category::Misc,
            priority: Priority::Medium,
            purchased: false,
            size: None,
            style: None,
            price: None,
        }
    }

    #[test]
    fn add_item_archives_by_url() {
        let mut store = WishlistStore::default();
        let idx = store.add_item(item("Hoodie", "https://shop.test/h")).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(store.items.len(), 1);
        assert_eq!(store.archive["https://shop.test/h"].name, "Hoodie");
    }

    #[test]
    fn add_item_requires_url_and_name() {
        let mut store = WishlistStore::default();
        assert!(matches!(
            store.add_item(item("Hoodie", "  ")),
            Err(WishlistError::MissingField("URL"))
        ));
        assert!(matches!(
            store.add_item(item("", "https://shop.test/h")),
            Err(WishlistError::MissingField("name"))
        ));
        assert!(store.items.is_empty());
        assert!(store.archive.is_empty());
    }

    #[test]
    fn prefill_survives_removal_and_resets_purchased() {
        let mut store = WishlistStore::default();
        let mut first = item("Air Max", "https://www.nike.com/t/am");
        first.size = Some("10".into());
        first.price = Some(129.99);
        store.add_item(first).unwrap();
        store.set_purchased(0, true).unwrap();
        // the archive holds the record as entered, not later edits
        assert!(!store.archive["https://www.nike.com/t/am"].purchased);

        store.remove(0).unwrap();
        let again = store.prefill("https://www.nike.com/t/am").unwrap();
        assert_eq!(again.name, "Air Max");
        assert_eq!(again.size.as_deref(), Some("10"));
        assert_eq!(again.price, Some(129.99));
        assert!(!again.purchased);
        assert!(store.prefill("https://www.nike.com/t/other").is_none());
    }

    #[test]
    fn out_of_range_indices_are_item_not_found() {
        let mut store = WishlistStore::default();
        assert!(matches!(store.set_purchased(3, true), Err(WishlistError::ItemNotFound(3))));
        assert!(matches!(store.remove(0), Err(WishlistError::ItemNotFound(0))));
        assert!(matches!(store.get(1), Err(WishlistError::ItemNotFound(1))));
    }

    #[test]
    fn filtered_keeps_original_indices() {
        let mut store = WishlistStore::default();
        store.add_item(item("Lego Castle", "https://a.test/1")).unwrap();
        store.add_item(item("Hoodie", "https://a.test/2")).unwrap();
        store.add_item(item("Lego Ship", "https://a.test/3")).unwrap();

        let filter = ItemFilter {
            search: Some("lego".into()),
            ..ItemFilter::default()
        };
        let hits: Vec<usize> = store.filtered(&filter).map(|(i, _)| i).collect();
        assert_eq!(hits, vec![0, 2]);
    }

    #[test]
    fn missing_keys_default_on_load() {
        let store: WishlistStore = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(store.preferences.is_empty());
        assert!(store.archive.is_empty());
        let store: WishlistStore = serde_json::from_str("{}").unwrap();
        assert_eq!(store, WishlistStore::default());
    }
}
