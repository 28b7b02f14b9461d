use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use wishlist_common::{Result, WishlistError};

use crate::{StoreBackend, WishlistStore};

/// [`StoreBackend`] keeping the whole wishlist in one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StoreBackend for JsonFileStore {
    fn load(&self) -> Result<WishlistStore> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(target: "store", path = %self.path.display(), "store.load.missing");
                return Ok(WishlistStore::default());
            }
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(WishlistStore::default());
        }
        let store: WishlistStore = serde_json::from_str(&raw).map_err(|e| {
            WishlistError::Store(format!("{} is not a valid wishlist: {e}", self.path.display()))
        })?;
        tracing::debug!(
            target: "store",
            path = %self.path.display(),
            items = store.items.len(),
            archived = store.archive.len(),
            "store.load"
        );
        Ok(store)
    }

    /// Write to a sibling temp file, then rename over the target so readers never
    /// see a half-written file.
    fn save(&self, store: &WishlistStore) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(store)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| WishlistError::Io(e.error))?;

        tracing::debug!(
            target: "store",
            path = %self.path.display(),
            items = store.items.len(),
            bytes = json.len(),
            "store.save"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wishlist_common::{Category, Priority, WishlistItem};

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope.json")).load().unwrap();
        assert_eq!(store, WishlistStore::default());
    }

    #[test]
    fn save_creates_parent_dirs_and_round_trips() {
        let dir = tempdir().unwrap();
        let backend = JsonFileStore::new(dir.path().join("nested/deeper/wishlist.json"));

        let mut store = WishlistStore::default();
        store
            .preferences
            .insert("theme".into(), serde_json::json!("dark"));
        store
            .add_item(WishlistItem {
                name: "Eagle Tee".into(),
                url: "https://untbookstore.com/tee".into(),
                image: String::new(),
                category: Category::UNTMerch,
                priority: Priority::High,
                purchased: false,
                size: Some("M".into()),
                style: None,
                price: Some(24.99),
            })
            .unwrap();
        backend.save(&store).unwrap();

        let text = std::fs::read_to_string(backend.path()).unwrap();
        assert!(text.contains("\n  \"items\""), "pretty-printed: {text}");
        assert!(text.contains("\"UNT Merch\""));

        assert_eq!(backend.load().unwrap(), store);
    }

    #[test]
    fn save_replaces_existing_file_without_leftovers() {
        let dir = tempdir().unwrap();
        let backend = JsonFileStore::new(dir.path().join("wishlist.json"));
        backend.save(&WishlistStore::default()).unwrap();
        backend.save(&WishlistStore::default()).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn corrupt_file_is_a_store_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wishlist.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, WishlistError::Store(_)));
    }

    #[test]
    fn empty_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wishlist.json");
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(JsonFileStore::new(&path).load().unwrap(), WishlistStore::default());
    }
}
