//! Common types and utilities shared across wishlist crates.
//!
//! This crate defines the wishlist data model, observability helpers, and the shared
//! error type used throughout the workspace. It is intentionally lightweight so that
//! every crate can depend on it without introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`ItemMetadata`]: output of one metadata extraction
//! - [`Category`]: the closed category set every item falls into
//! - [`WishlistItem`] and [`Priority`]: the persisted, user-facing record
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`WishlistError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! Folding extracted metadata into a new item:
//!
//! ```rust
//! use wishlist_common::{Category, ItemMetadata, Priority, WishlistItem};
//!
//! let meta = ItemMetadata {
//!     title: "Air Max 90".into(),
//!     image_url: String::new(),
//!     category: Category::Shoes,
//! };
//! let item = WishlistItem::from_metadata("https://www.nike.com/t/air-max", meta, Priority::High);
//! assert_eq!(item.name, "Air Max 90");
//! assert!(!item.purchased);
//! ```

pub mod model;
pub mod observability;

pub use model::{
    Category, ItemMetadata, Priority, WishlistItem, ACCESS_DENIED_TITLE, MAX_TITLE_CHARS,
    UNKNOWN_TITLE,
};

/// Error types used across the wishlist workspace.
#[derive(thiserror::Error, Debug)]
pub enum WishlistError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The persistence backend could not load or save the store.
    #[error("Store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// User supplied a price string that could not be understood.
    #[error("Could not understand price: '{0}'. Use 129.99 or $129.99.")]
    InvalidPrice(String),

    /// A referenced item index does not exist.
    #[error("Item not found: #{0}")]
    ItemNotFound(usize),

    /// A required item field was empty.
    #[error("Please enter an item {0}.")]
    MissingField(&'static str),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown priority: {0}")]
    UnknownPriority(String),
}

/// Convenient alias for results that use [`WishlistError`].
pub type Result<T> = std::result::Result<T, WishlistError>;
