//! Process-local artifact store for local development and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{ArtifactStore, StorageError};

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
    is_public: bool,
}

/// In-memory artifact store. URLs use a `memory://` scheme and are
/// only meaningful within the owning process.
#[derive(Default)]
pub struct InMemoryArtifactStore {
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an object exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    /// Stored bytes, content type, and visibility for `path`.
    pub fn object(&self, path: &str) -> Option<(Vec<u8>, String, bool)> {
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .map(|o| (o.bytes.clone(), o.content_type.clone(), o.is_public))
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        is_public: bool,
    ) -> Result<String, StorageError> {
        self.objects.lock().unwrap().insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
                is_public,
            },
        );
        Ok(path.to_string())
    }

    async fn get_url(&self, path: &str, _is_public: bool) -> Result<String, StorageError> {
        let objects = self.objects.lock().unwrap();
        if objects.contains_key(path) {
            Ok(format!("memory://{path}"))
        } else {
            Err(StorageError::NotFound(path.to_string()))
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.objects.lock().unwrap().remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_url_and_delete() {
        let store = InMemoryArtifactStore::new();

        let path = store
            .put("items/1/variants/2/final.png", vec![1, 2, 3], "image/png", false)
            .await
            .unwrap();
        assert_eq!(path, "items/1/variants/2/final.png");
        assert!(store.contains(&path));

        let url = store.get_url(&path, false).await.unwrap();
        assert_eq!(url, "memory://items/1/variants/2/final.png");

        store.delete(&path).await.unwrap();
        assert!(!store.contains(&path));
    }

    #[tokio::test]
    async fn get_url_for_missing_object_is_not_found() {
        let store = InMemoryArtifactStore::new();
        let err = store.get_url("missing.png", true).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_of_missing_object_is_ok() {
        let store = InMemoryArtifactStore::new();
        assert!(store.delete("never-uploaded.png").await.is_ok());
    }

    #[tokio::test]
    async fn put_overwrites_existing_object() {
        let store = InMemoryArtifactStore::new();
        store.put("a", vec![1], "image/png", true).await.unwrap();
        store.put("a", vec![2, 3], "image/png", true).await.unwrap();
        assert_eq!(store.len(), 1);

        let (bytes, content_type, is_public) = store.object("a").unwrap();
        assert_eq!(bytes, vec![2, 3]);
        assert_eq!(content_type, "image/png");
        assert!(is_public);
    }
}
