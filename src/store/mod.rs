/// Whole-file JSON record store
///
/// Each collection is one JSON document on disk: a single object with one
/// named array field matching the collection name, e.g.
/// `users.json` -> `{"users": [...]}`. Every load re-reads the document from
/// disk and every save rewrites it wholesale; in-memory copies are advisory
/// snapshots only. There is no locking: two concurrent load-mutate-save
/// sequences against the same collection race, and the later save wins.
use crate::error::{AppError, AppResult};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Store handle, opened once at process start
#[derive(Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub async fn open(dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Internal(format!("Failed to create data directory {:?}: {}", dir, e))
        })?;
        Ok(Self { dir })
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", collection))
    }

    /// Load every record of a collection.
    ///
    /// A missing document is initialized to an empty collection and persisted
    /// before returning. A malformed document is reported with a recovery
    /// alert and degrades to an empty sequence; the on-disk file is left
    /// untouched so the damage can still be inspected by hand.
    pub async fn load<T: DeserializeOwned>(&self, collection: &str) -> AppResult<Vec<T>> {
        let path = self.collection_path(collection);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.save::<Value>(collection, &[]).await?;
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "Failed to read collection '{}': {}",
                    collection, e
                )))
            }
        };

        match Self::parse_document(collection, &bytes) {
            Ok(records) => Ok(records),
            Err(err @ AppError::CorruptData(_)) => {
                tracing::error!(
                    collection = collection,
                    path = %path.display(),
                    "{}; proceeding with an empty collection — manual recovery required",
                    err
                );
                Ok(Vec::new())
            }
            Err(other) => Err(other),
        }
    }

    /// Persist the whole collection, replacing the previous document.
    ///
    /// The document is written to a temporary sibling and renamed into place,
    /// so a reader never observes a truncated or mixed-version file.
    pub async fn save<T: Serialize>(&self, collection: &str, records: &[T]) -> AppResult<()> {
        let path = self.collection_path(collection);
        let tmp = self.dir.join(format!("{}.json.tmp", collection));

        let mut document = serde_json::Map::new();
        document.insert(
            collection.to_string(),
            serde_json::to_value(records)
                .map_err(|e| AppError::Internal(format!("Failed to serialize records: {}", e)))?,
        );
        let bytes = serde_json::to_vec_pretty(&Value::Object(document))
            .map_err(|e| AppError::Internal(format!("Failed to serialize document: {}", e)))?;

        fs::write(&tmp, &bytes).await.map_err(|e| {
            AppError::Internal(format!("Failed to write collection '{}': {}", collection, e))
        })?;
        fs::rename(&tmp, &path).await.map_err(|e| {
            AppError::Internal(format!("Failed to replace collection '{}': {}", collection, e))
        })?;

        Ok(())
    }

    fn parse_document<T: DeserializeOwned>(collection: &str, bytes: &[u8]) -> AppResult<Vec<T>> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|_| AppError::CorruptData(collection.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| AppError::CorruptData(collection.to_string()))?;

        // A well-formed document with the array field absent reads as empty
        let records = match object.get(collection) {
            Some(array) => array.clone(),
            None => return Ok(Vec::new()),
        };

        serde_json::from_value(records).map_err(|_| AppError::CorruptData(collection.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn test_missing_file_initializes_empty_collection() {
        let dir = tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();

        let items: Vec<Item> = store.load("widgets").await.unwrap();
        assert!(items.is_empty());

        // The empty document was persisted
        let on_disk = std::fs::read_to_string(dir.path().join("widgets.json")).unwrap();
        let value: Value = serde_json::from_str(&on_disk).unwrap();
        assert_eq!(value["widgets"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();

        let items = vec![
            Item {
                name: "a".to_string(),
                count: 1,
            },
            Item {
                name: "b".to_string(),
                count: 2,
            },
        ];
        store.save("widgets", &items).await.unwrap();

        let loaded: Vec<Item> = store.load("widgets").await.unwrap();
        assert_eq!(loaded, items);
    }

    #[tokio::test]
    async fn test_corrupt_document_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();

        std::fs::write(dir.path().join("widgets.json"), b"{not json").unwrap();

        let items: Vec<Item> = store.load("widgets").await.unwrap();
        assert!(items.is_empty());

        // The damaged file is preserved for manual recovery
        let on_disk = std::fs::read(dir.path().join("widgets.json")).unwrap();
        assert_eq!(on_disk, b"{not json");
    }

    #[tokio::test]
    async fn test_document_with_missing_field_reads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();

        std::fs::write(dir.path().join("widgets.json"), b"{\"other\": []}").unwrap();

        let items: Vec<Item> = store.load("widgets").await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_save_replaces_whole_document() {
        let dir = tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();

        let first = vec![Item {
            name: "long-lived-record-with-a-rather-long-name".to_string(),
            count: 1,
        }];
        store.save("widgets", &first).await.unwrap();

        let second = vec![Item {
            name: "b".to_string(),
            count: 2,
        }];
        store.save("widgets", &second).await.unwrap();

        let loaded: Vec<Item> = store.load("widgets").await.unwrap();
        assert_eq!(loaded, second);

        // No temporary sibling is left behind
        assert!(!dir.path().join("widgets.json.tmp").exists());
    }
}
