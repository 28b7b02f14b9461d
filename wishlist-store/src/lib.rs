//! Wishlist persistence and in-memory operations.
//!
//! [`WishlistStore`] is the whole persisted document: the item list, a URL-keyed
//! archive used to pre-fill repeat entries, and opaque user preferences.
//! [`StoreBackend`] abstracts where it lives; [`JsonFileStore`] keeps it in a
//! single JSON file compatible with earlier `wishlist.json` files.
//!
//! ```
//! use wishlist_common::{Category, ItemMetadata, Priority, WishlistItem};
//! use wishlist_store::{JsonFileStore, StoreBackend};
//!
//! # fn main() -> wishlist_common::Result<()> {
//! let dir = tempfile::tempdir()?;
//! let backend = JsonFileStore::new(dir.path().join("wishlist.json"));
//!
//! let mut store = backend.load()?;
//! let meta = ItemMetadata {
//!     title: "Lego Castle".into(),
//!     image_url: String::new(),
//!     category: Category::Toys,
//! };
//! store.add_item(WishlistItem::from_metadata("https://www.amazon.com/dp/B0", meta, Priority::High))?;
//! backend.save(&store)?;
//!
//! assert!(backend.load()?.prefill("https://www.amazon.com/dp/B0").is_some());
//! # Ok(())
//! # }
//! ```

mod filter;
mod json_file;
mod store;

pub use filter::{ItemFilter, parse_price};
pub use json_file::JsonFileStore;
pub use store::WishlistStore;

use wishlist_common::Result;

/// Load/save collaborator for a [`WishlistStore`].
pub trait StoreBackend {
    /// Read the stored wishlist. A store that does not exist yet loads as empty.
    fn load(&self) -> Result<WishlistStore>;

    fn save(&self, store: &WishlistStore) -> Result<()>;
}
