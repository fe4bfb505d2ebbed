use super::traits::Storage;
use crate::common::error::{FolioError, Result};
use crate::domain::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

/// A content entity persisted as one JSON document.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Storage label.
    const KIND: &'static str;
    /// Human-readable name used in "not found" messages.
    const ENTITY: &'static str;

    fn key(&self) -> String;
}

macro_rules! uuid_document {
    ($ty:ty, $kind:literal, $entity:literal) => {
        impl Document for $ty {
            const KIND: &'static str = $kind;
            const ENTITY: &'static str = $entity;

            fn key(&self) -> String {
                self.id.to_string()
            }
        }
    };
}

uuid_document!(Project, "project", "Project");
uuid_document!(BlogPost, "blog_post", "Post");
uuid_document!(Skill, "skill", "Skill");
uuid_document!(Experience, "experience", "Experience");
uuid_document!(Education, "education", "Education");
uuid_document!(Certification, "certification", "Certification");
uuid_document!(Hero, "hero", "Hero");
uuid_document!(ContactMessage, "contact_message", "Message");

impl Document for SiteSettings {
    const KIND: &'static str = "site_settings";
    const ENTITY: &'static str = "Site settings";

    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Typed view over [`Storage`] for one document kind.
pub struct Repository<T> {
    storage: Arc<dyn Storage>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> Repository<T> {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            _marker: PhantomData,
        }
    }

    fn to_data(doc: &T) -> Result<String> {
        serde_json::to_string(doc).map_err(|e| {
            FolioError::database(format!("Failed to serialize {}: {e}", T::KIND))
        })
    }

    fn from_data(data: &str) -> Result<T> {
        serde_json::from_str(data).map_err(|e| {
            FolioError::database(format!("Failed to deserialize {}: {e}", T::KIND))
        })
    }

    pub async fn all(&self) -> Result<Vec<T>> {
        self.storage
            .list_documents(T::KIND)
            .await?
            .iter()
            .map(|data| Self::from_data(data))
            .collect()
    }

    pub async fn find(&self, key: &str) -> Result<Option<T>> {
        match self.storage.get_document(T::KIND, key).await? {
            Some(data) => Self::from_data(&data).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`Repository::find`] but a missing document is an error.
    pub async fn get(&self, key: &str) -> Result<T> {
        self.find(key)
            .await?
            .ok_or_else(|| FolioError::not_found(T::ENTITY))
    }

    pub async fn find_by<F>(&self, predicate: F) -> Result<Option<T>>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.all().await?.into_iter().find(|doc| predicate(doc)))
    }

    pub async fn filter<F>(&self, predicate: F) -> Result<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|doc| predicate(doc))
            .collect())
    }

    pub async fn count<F>(&self, predicate: F) -> Result<usize>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.all().await?.iter().filter(|doc| predicate(doc)).count())
    }

    pub async fn save(&self, doc: &T) -> Result<()> {
        let data = Self::to_data(doc)?;
        self.storage.put_document(T::KIND, &doc.key(), &data).await
    }

    /// Save every document or none of them.
    pub async fn save_all(&self, docs: &[T]) -> Result<()> {
        let rows = docs
            .iter()
            .map(|doc| Ok((doc.key(), Self::to_data(doc)?)))
            .collect::<Result<Vec<_>>>()?;
        self.storage.put_documents(T::KIND, &rows).await
    }

    pub async fn delete(&self, key: &str) -> Result<bool> {
        self.storage.delete_document(T::KIND, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use chrono::Utc;
    use uuid::Uuid;

    fn message(name: &str, read: bool) -> ContactMessage {
        ContactMessage {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: "someone@example.com".to_string(),
            subject: String::new(),
            message: "Hello there, nice site".to_string(),
            read,
            archived: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_typed_round_trip_and_filters() {
        let repo: Repository<ContactMessage> = Repository::new(Arc::new(InMemoryStorage::new()));
        let first = message("Ada", false);
        let second = message("Grace", true);
        repo.save_all(&[first.clone(), second.clone()]).await.unwrap();

        assert_eq!(repo.get(&first.key()).await.unwrap(), first);
        assert_eq!(repo.count(|m| !m.read).await.unwrap(), 1);
        assert_eq!(
            repo.find_by(|m| m.name == "Grace").await.unwrap(),
            Some(second.clone())
        );

        assert!(repo.delete(&second.key()).await.unwrap());
        assert!(matches!(
            repo.get(&second.key()).await,
            Err(FolioError::NotFound { entity: "Message" })
        ));
    }
}
