use super::traits::Storage;
use crate::common::error::{FolioError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

type Documents = BTreeMap<(String, String), String>;

/// In-memory storage implementation for development/testing
#[derive(Default)]
pub struct InMemoryStorage {
    documents: Mutex<Documents>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Documents>> {
        self.documents
            .lock()
            .map_err(|_| FolioError::database("in-memory storage lock poisoned"))
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn put_document(&self, kind: &str, id: &str, data: &str) -> Result<()> {
        self.lock()?
            .insert((kind.to_string(), id.to_string()), data.to_string());
        debug!("Stored {} document {}", kind, id);
        Ok(())
    }

    async fn put_documents(&self, kind: &str, docs: &[(String, String)]) -> Result<()> {
        let mut documents = self.lock()?;
        for (id, data) in docs {
            documents.insert((kind.to_string(), id.clone()), data.clone());
        }
        Ok(())
    }

    async fn get_document(&self, kind: &str, id: &str) -> Result<Option<String>> {
        Ok(self
            .lock()?
            .get(&(kind.to_string(), id.to_string()))
            .cloned())
    }

    async fn list_documents(&self, kind: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()?
            .iter()
            .filter(|((k, _), _)| k == kind)
            .map(|(_, data)| data.clone())
            .collect())
    }

    async fn delete_document(&self, kind: &str, id: &str) -> Result<bool> {
        Ok(self
            .lock()?
            .remove(&(kind.to_string(), id.to_string()))
            .is_some())
    }
}
