use crate::common::error::Result;
use async_trait::async_trait;

/// Storage trait for persisting content documents.
///
/// Every entity is stored as a JSON body under a `kind` label and an id;
/// typed access goes through [`super::Repository`].
#[async_trait]
pub trait Storage: Send + Sync {
    async fn put_document(&self, kind: &str, id: &str, data: &str) -> Result<()>;

    /// Write several documents atomically.
    async fn put_documents(&self, kind: &str, docs: &[(String, String)]) -> Result<()>;

    async fn get_document(&self, kind: &str, id: &str) -> Result<Option<String>>;

    async fn list_documents(&self, kind: &str) -> Result<Vec<String>>;

    /// Returns `false` when nothing was stored under the id.
    async fn delete_document(&self, kind: &str, id: &str) -> Result<bool>;
}
