use super::traits::Storage;
use crate::common::error::Result;
use crate::database::DatabaseManager;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Database storage implementation using Turso/libSQL
pub struct DatabaseStorage {
    db: Arc<DatabaseManager>,
}

impl DatabaseStorage {
    /// Connect and bring the schema up to date.
    pub async fn connect(url: &str, auth_token: Option<&str>) -> Result<Self> {
        let db_manager = DatabaseManager::connect(url, auth_token).await?;
        db_manager.run_migrations().await?;

        Ok(Self {
            db: Arc::new(db_manager),
        })
    }

    pub fn from_manager(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn put_document(&self, kind: &str, id: &str, data: &str) -> Result<()> {
        self.db.upsert_document(kind, id, data).await?;
        debug!("Upserted {} document {}", kind, id);
        Ok(())
    }

    async fn put_documents(&self, kind: &str, docs: &[(String, String)]) -> Result<()> {
        self.db.upsert_documents(kind, docs).await?;
        debug!("Upserted {} {} documents in one transaction", docs.len(), kind);
        Ok(())
    }

    async fn get_document(&self, kind: &str, id: &str) -> Result<Option<String>> {
        self.db.get_document(kind, id).await
    }

    async fn list_documents(&self, kind: &str) -> Result<Vec<String>> {
        self.db.get_documents_by_kind(kind).await
    }

    async fn delete_document(&self, kind: &str, id: &str) -> Result<bool> {
        let removed = self.db.delete_document(kind, id).await?;
        debug!("Deleted {} document {}: {}", kind, id, removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_backed_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("folio.db");
        let storage = DatabaseStorage::connect(path.to_str().unwrap(), None)
            .await
            .unwrap();

        storage
            .put_document("skill", "a", r#"{"id":"a","name":"Rust"}"#)
            .await
            .unwrap();
        storage
            .put_document("skill", "a", r#"{"id":"a","name":"Rust 2021"}"#)
            .await
            .unwrap();

        let stored = storage.get_document("skill", "a").await.unwrap();
        assert_eq!(stored.as_deref(), Some(r#"{"id":"a","name":"Rust 2021"}"#));
        assert_eq!(storage.list_documents("skill").await.unwrap().len(), 1);
        assert!(storage.list_documents("project").await.unwrap().is_empty());

        assert!(storage.delete_document("skill", "a").await.unwrap());
        assert!(!storage.delete_document("skill", "a").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected_by_index() {
        let storage = DatabaseStorage::connect(":memory:", None).await.unwrap();
        storage
            .put_document("project", "1", r#"{"id":"1","slug":"same"}"#)
            .await
            .unwrap();
        let duplicate = storage
            .put_document("project", "2", r#"{"id":"2","slug":"same"}"#)
            .await;
        assert!(duplicate.is_err());

        // Same slug under another kind is fine.
        storage
            .put_document("blog_post", "3", r#"{"id":"3","slug":"same"}"#)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_batch_write_is_atomic() {
        let storage = DatabaseStorage::connect(":memory:", None).await.unwrap();
        storage
            .put_document("project", "1", r#"{"id":"1","slug":"taken"}"#)
            .await
            .unwrap();

        let batch = vec![
            ("2".to_string(), r#"{"id":"2","slug":"fresh"}"#.to_string()),
            ("3".to_string(), r#"{"id":"3","slug":"taken"}"#.to_string()),
        ];
        assert!(storage.put_documents("project", &batch).await.is_err());
        assert!(storage.get_document("project", "2").await.unwrap().is_none());
    }
}
