// Content store module
// Reads and rewrites the content document as a single JSON file

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::document::ContentDocument;
use super::error::StoreError;
use super::form::ContentUpdate;

const TEMP_PREFIX: &str = ".content-";
const TEMP_SUFFIX: &str = ".tmp";

/// File-backed content document
///
/// There is no locking: two concurrent read-merge-write cycles race and
/// the last write wins.
#[derive(Debug, Clone)]
pub struct ContentStore {
    path: PathBuf,
}

impl ContentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted document; a missing file reads as empty
    pub async fn read(&self) -> Result<ContentDocument, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ContentDocument::new()),
            Err(source) => return Err(io_error(&self.path, source)),
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the persisted document.
    ///
    /// Output is indented by two spaces and keeps non-ASCII text literal.
    /// Each write goes to its own uniquely named temp file in the target's
    /// directory, which is then renamed over the target.
    pub async fn write(&self, document: &ContentDocument) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(document).map_err(StoreError::Serialize)?;
        bytes.push(b'\n');

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .await
            .map_err(|source| io_error(dir, source))?;

        let temp_path = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)
            .map_err(|source| io_error(dir, source))?
            .into_temp_path();
        fs::write(&temp_path, bytes)
            .await
            .map_err(|source| io_error(&temp_path, source))?;
        temp_path
            .persist(&self.path)
            .map_err(|e| io_error(&self.path, e.error))?;
        Ok(())
    }

    /// Read, merge `update` into the document, and write it back
    pub async fn apply(&self, update: ContentUpdate) -> Result<ContentDocument, StoreError> {
        let mut document = self.read().await?;
        document.apply(update);
        self.write(&document).await?;
        Ok(document)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::form::build_update;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ContentStore {
        ContentStore::new(dir.path().join("data").join("content.json"))
    }

    fn leftover_temp_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter(|entry| {
                let name = entry.as_ref().unwrap().file_name();
                name.to_string_lossy().ends_with(TEMP_SUFFIX)
            })
            .count()
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let document: ContentDocument = serde_json::from_value(json!({
            "hero": {"title": "Привет", "count": 3, "nested": {"deep": [1, null]}},
            "footer": "© 2024",
            "flag": false
        }))
        .unwrap();

        store.write(&document).await.unwrap();
        assert_eq!(store.read().await.unwrap(), document);
    }

    #[tokio::test]
    async fn test_write_is_indented_and_keeps_unicode() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let document: ContentDocument =
            serde_json::from_value(json!({"hero": {"title": "café"}})).unwrap();

        store.write(&document).await.unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("café"));
        assert!(text.contains("\n  \"hero\": {\n    \"title\""));
        assert_eq!(leftover_temp_files(store.path().parent().unwrap()), 0);
    }

    #[tokio::test]
    async fn test_write_overwrites_previous_content() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let big: ContentDocument =
            serde_json::from_value(json!({"a": "x".repeat(500), "b": "y"})).unwrap();
        let small: ContentDocument = serde_json::from_value(json!({"c": "z"})).unwrap();

        store.write(&big).await.unwrap();
        store.write(&small).await.unwrap();
        assert_eq!(store.read().await.unwrap(), small);
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{\"hero\": ").unwrap();

        assert!(matches!(
            store.read().await,
            Err(StoreError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_non_object_root_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "[1, 2]").unwrap();

        assert!(matches!(
            store.read().await,
            Err(StoreError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_apply_persists_merge() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let seed: ContentDocument = serde_json::from_value(json!({
            "hero": {"title": "A", "subtitle": "B"},
            "about": {"text": "keep"}
        }))
        .unwrap();
        store.write(&seed).await.unwrap();

        let update = build_update(vec![("hero[title]".to_string(), "X".to_string())]).unwrap();
        let merged = store.apply(update).await.unwrap();

        let on_disk: Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(
            on_disk,
            json!({"hero": {"title": "X", "subtitle": "B"}, "about": {"text": "keep"}})
        );
        assert_eq!(store.read().await.unwrap(), merged);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_all_succeed() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let handles: Vec<_> = (0..32)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    let document: ContentDocument =
                        serde_json::from_value(json!({"hero": {"title": format!("v{n}")}}))
                            .unwrap();
                    store.write(&document).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let document = store.read().await.unwrap();
        assert_eq!(document.len(), 1);
        assert_eq!(leftover_temp_files(store.path().parent().unwrap()), 0);
    }

    #[tokio::test]
    async fn test_io_error_names_failing_path() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("data");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = store_in(&dir);
        let document: ContentDocument = serde_json::from_value(json!({"a": "b"})).unwrap();

        match store.write(&document).await {
            Err(StoreError::Io { path, .. }) => assert_eq!(path, blocker),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }
}
