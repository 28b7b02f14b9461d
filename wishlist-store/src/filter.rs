use wishlist_common::{Category, Priority, Result, WishlistError, WishlistItem};

/// Narrowing applied when listing items. Empty sets and `None` bounds match everything.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub categories: Vec<Category>,
    pub priorities: Vec<Priority>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Case-insensitive substring of the item name.
    pub search: Option<String>,
}

impl ItemFilter {
    pub fn matches(&self, item: &WishlistItem) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&item.category) {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&item.priority) {
            return false;
        }
        // an item without a price never satisfies a price bound
        if let Some(min) = self.min_price {
            if !item.price.is_some_and(|p| p >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if !item.price.is_some_and(|p| p <= max) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => item
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }
}

/// Parse a user-entered price such as `129.99`, `$129.99` or `$1,299`.
///
/// Blank input is `Ok(None)`.
///
/// ```
/// use wishlist_store::parse_price;
///
/// assert_eq!(parse_price(" $1,299.50 ").unwrap(), Some(1299.5));
/// assert_eq!(parse_price("").unwrap(), None);
/// assert!(parse_price("cheap").is_err());
/// ```
pub fn parse_price(text: &str) -> Result<Option<f64>> {
    let raw = text.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let cleaned = raw.replace(['$', ','], "");
    match cleaned.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(WishlistError::InvalidPrice(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, category: Category, priority: Priority, price: Option<f64>) -> WishlistItem {
        WishlistItem {
            name: name.into(),
            url: format!("https://shop.test/{name}"),
            image: String::new(),
            category,
            priority,
            purchased: false,
            size: None,
            style: None,
            price,
        }
    }

    #[test]
    fn default_filter_matches_everything() {
        let f = ItemFilter::default();
        assert!(f.matches(&item("x", Category::Misc, Priority::Low, None)));
    }

    #[test]
    fn category_and_priority_sets() {
        let f = ItemFilter {
            categories: vec![Category::Shoes, Category::Toys],
            priorities: vec![Priority::High],
            ..ItemFilter::default()
        };
        assert!(f.matches(&item("a", Category::Toys, Priority::High, None)));
        assert!(!f.matches(&item("b", Category::Toys, Priority::Low, None)));
        assert!(!f.matches(&item("c", Category::Jacket, Priority::High, None)));
    }

    #[test]
    fn price_bounds_are_inclusive_and_exclude_unpriced() {
        let f = ItemFilter {
            min_price: Some(50.0),
            max_price: Some(100.0),
            ..ItemFilter::default()
        };
        assert!(f.matches(&item("a", Category::Misc, Priority::Medium, Some(50.0))));
        assert!(f.matches(&item("b", Category::Misc, Priority::Medium, Some(100.0))));
        assert!(!f.matches(&item("c", Category::Misc, Priority::Medium, Some(100.01))));
        assert!(!f.matches(&item("d", Category::Misc, Priority::Medium, None)));
    }

    #[test]
    fn search_is_case_insensitive_and_blank_is_ignored() {
        let hoodie = item("Mean Green Hoodie", Category::UNTMerch, Priority::Medium, None);
        let f = ItemFilter {
            search: Some("GREEN".into()),
            ..ItemFilter::default()
        };
        assert!(f.matches(&hoodie));
        let f = ItemFilter {
            search: Some("   ".into()),
            ..ItemFilter::default()
        };
        assert!(f.matches(&hoodie));
    }

    #[test]
    fn parses_prices() {
        assert_eq!(parse_price("129.99").unwrap(), Some(129.99));
        assert_eq!(parse_price("$129.99").unwrap(), Some(129.99));
        assert_eq!(parse_price("$ 45").unwrap(), Some(45.0));
        assert_eq!(parse_price("   ").unwrap(), None);
    }

    #[test]
    fn rejects_unparseable_prices_with_hint() {
        let err = parse_price(" about $20 ").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not understand price: 'about $20'. Use 129.99 or $129.99."
        );
        assert!(parse_price("inf").is_err());
        assert!(parse_price("$").is_err());
    }
}
