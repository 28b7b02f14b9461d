use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use wishlist_common::{ItemMetadata, Priority, WishlistItem};
use wishlist_config::WishlistConfig;
use wishlist_extract::{Extractor, HttpFetcher, classify};
use wishlist_store::{ItemFilter, JsonFileStore, StoreBackend, parse_price};

use crate::{AddArgs, ListArgs};

/// Wiring shared by every subcommand.
pub struct App {
    extractor: Extractor,
    backend: JsonFileStore,
}

impl App {
    pub fn new(cfg: &WishlistConfig, store_path: PathBuf) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(cfg).context("failed to build HTTP client")?;
        if cfg.proxy.api_key().is_none() {
            tracing::debug!("app.proxy.disabled");
        }
        Ok(Self {
            extractor: Extractor::new(Arc::new(fetcher)),
            backend: JsonFileStore::new(store_path),
        })
    }

    pub async fn extract(&self, url: &str, as_json: bool) -> Result<()> {
        let meta = self.extractor.extract(url).await;
        if as_json {
            println!("{}", serde_json::to_string_pretty(&meta)?);
        } else {
            print_metadata(&meta);
        }
        Ok(())
    }

    pub async fn add(&self, args: AddArgs) -> Result<()> {
        let mut store = self.backend.load()?;
        let price = args.price.as_deref().map(parse_price).transpose()?.flatten();

        let mut item = match store.prefill(&args.url) {
            Some(previous) => {
                tracing::info!(url = %args.url, "add.prefill.archive");
                previous
            }
            None if args.no_fetch => {
                let name = args.name.clone().unwrap_or_default();
                let meta = ItemMetadata {
                    category: classify(&args.url, &name),
                    title: name,
                    image_url: String::new(),
                };
                WishlistItem::from_metadata(args.url.clone(), meta, Priority::default())
            }
            None => {
                let meta = self.extractor.extract(&args.url).await;
                WishlistItem::from_metadata(args.url.clone(), meta, Priority::default())
            }
        };

        if let Some(name) = args.name {
            item.name = name;
        }
        if let Some(category) = args.category {
            item.category = category;
        }
        if let Some(priority) = args.priority {
            item.priority = priority;
        }
        if args.size.is_some() {
            item.size = args.size;
        }
        if args.style.is_some() {
            item.style = args.style;
        }
        if price.is_some() {
            item.price = price;
        }

        let index = store.add_item(item)?;
        self.backend.save(&store)?;
        tracing::info!(index, url = %args.url, "add.saved");

        println!("Added [{index}]");
        print_item(index, store.get(index)?);
        Ok(())
    }

    pub fn list(&self, args: ListArgs) -> Result<()> {
        let store = self.backend.load()?;
        let filter = ItemFilter {
            categories: args.category,
            priorities: args.priority,
            min_price: args.min_price.as_deref().map(parse_price).transpose()?.flatten(),
            max_price: args.max_price.as_deref().map(parse_price).transpose()?.flatten(),
            search: args.search,
        };

        if args.json {
            let hits: Vec<_> = store
                .filtered(&filter)
                .map(|(index, item)| json!({ "index": index, "item": item }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&hits)?);
            return Ok(());
        }

        let mut shown = 0usize;
        for (index, item) in store.filtered(&filter) {
            print_item(index, item);
            shown += 1;
        }
        if shown == 0 {
            println!("No items.");
        }
        Ok(())
    }

    pub fn set_purchased(&self, index: usize, purchased: bool) -> Result<()> {
        let mut store = self.backend.load()?;
        store.set_purchased(index, purchased)?;
        self.backend.save(&store)?;
        print_item(index, store.get(index)?);
        Ok(())
    }

    pub fn remove(&self, index: usize) -> Result<()> {
        let mut store = self.backend.load()?;
        let removed = store.remove(index)?;
        self.backend.save(&store)?;
        tracing::info!(index, url = %removed.url, "remove.saved");
        println!("Removed: {}", removed.name);
        Ok(())
    }
}

fn print_metadata(meta: &ItemMetadata) {
    println!("Title:    {}", meta.title);
    println!("Category: {}", meta.category);
    if meta.image_url.is_empty() {
        println!("Image:    (none)");
    } else {
        println!("Image:    {}", meta.image_url);
    }
}

fn print_item(index: usize, item: &WishlistItem) {
    let mark = if item.purchased { "x" } else { " " };
    println!("[{index}] [{mark}] {}", item.name);
    println!("      {} | {}", item.category, item.priority);
    if let Some(size) = item.size.as_deref().filter(|s| !s.is_empty()) {
        println!("      Size: {size}");
    }
    if let Some(style) = item.style.as_deref().filter(|s| !s.is_empty()) {
        println!("      Style/Color: {style}");
    }
    if let Some(price) = item.price {
        println!("      Price: ${}", format_price(price));
    }
    if !item.url.is_empty() {
        println!("      {}", item.url);
    }
}

/// Two decimals with thousands separators, e.g. `1,299.50`.
fn format_price(price: f64) -> String {
    let fixed = format!("{:.2}", price.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if price < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}
