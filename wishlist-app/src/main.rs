use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use wishlist_common::observability::init_logging;
use wishlist_common::{Category, Priority, WishlistError};
use wishlist_config::{WishlistConfig, WishlistConfigLoader};

mod commands;

const DEFAULT_CONFIG_FILE: &str = "wishlist.yaml";

#[derive(Parser)]
#[command(name = "wishlist")]
#[command(about = "Keep a wishlist of products, filled in from their pages")]
#[command(version)]
struct Cli {
    /// YAML configuration file (default: ./wishlist.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Wishlist JSON file, overriding `store.path`
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a product page and print its title, image and category
    Extract {
        url: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add an item, pre-filled from the archive or from the product page
    Add(AddArgs),

    /// List items, optionally filtered
    List(ListArgs),

    /// Mark an item purchased (or not)
    Purchased {
        index: usize,
        /// Clear the purchased flag instead
        #[arg(long)]
        unset: bool,
    },

    /// Remove an item; its archive entry is kept
    Remove { index: usize },
}

#[derive(clap::Args)]
pub struct AddArgs {
    pub url: String,
    #[arg(long)]
    pub name: Option<String>,
    /// e.g. "Shoes", "Graphic Tee"
    #[arg(long)]
    pub category: Option<Category>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long)]
    pub style: Option<String>,
    /// e.g. 129.99 or $129.99
    #[arg(long)]
    pub price: Option<String>,
    /// Do not fetch the page; requires --name unless the URL is archived
    #[arg(long)]
    pub no_fetch: bool,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Repeat to allow several categories
    #[arg(long)]
    pub category: Vec<Category>,
    #[arg(long)]
    pub priority: Vec<Priority>,
    #[arg(long)]
    pub min_price: Option<String>,
    #[arg(long)]
    pub max_price: Option<String>,
    /// Case-insensitive name search
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub json: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<WishlistConfig> {
    // env wins over either file
    let loader = match path {
        Some(p) => WishlistConfigLoader::new().with_file(p),
        None => WishlistConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    loader
        .load()
        .map_err(|e| WishlistError::Config(e.to_string()).into())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_ref())?;

    let log_path = init_logging(cfg.logging.to_log_config("wishlist"))?;
    tracing::debug!(log = %log_path.display(), "app.start");

    let store_path = cli.store.unwrap_or_else(|| cfg.store.path.clone());
    let app = commands::App::new(&cfg, store_path)?;

    match cli.command {
        Command::Extract { url, json } => app.extract(&url, json).await,
        Command::Add(args) => app.add(args).await,
        Command::List(args) => app.list(args),
        Command::Purchased { index, unset } => app.set_purchased(index, !unset),
        Command::Remove { index } => app.remove(index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_labels() {
        let cli = Cli::try_parse_from([
            "wishlist",
            "add",
            "https://www.nike.com/t/x",
            "--category",
            "Graphic Tee",
            "--priority",
            "high",
            "--price",
            "$49.99",
            "--no-fetch",
        ])
        .unwrap();
        match cli.command {
            Command::Add(args) => {
                assert_eq!(args.category, Some(Category::GraphicTee));
                assert_eq!(args.priority, Some(Priority::High));
                assert_eq!(args.price.as_deref(), Some("$49.99"));
                assert!(args.no_fetch);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn parses_repeated_list_filters_and_global_store() {
        let cli = Cli::try_parse_from([
            "wishlist",
            "list",
            "--category",
            "Shoes",
            "--category",
            "toys",
            "--store",
            "/tmp/w.json",
        ])
        .unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/w.json")));
        match cli.command {
            Command::List(args) => {
                assert_eq!(args.category, vec![Category::Shoes, Category::Toys]);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(Cli::try_parse_from(["wishlist", "list", "--category", "Furniture"]).is_err());
    }
}
