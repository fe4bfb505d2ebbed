pub mod images;

pub use images::{Folder, ProcessedImage, Variant};

use crate::config::{StorageBackend, StorageConfig};
use futures_util::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

const CACHE_CONTROL: &str = "max-age=31536000, immutable";

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Object store error: {0}")]
    Store(#[from] object_store::Error),

    #[error("Invalid object key: {0}")]
    Key(#[from] object_store::path::Error),

    #[error("Could not read image: {0}")]
    Decode(String),

    #[error("Image is {width}x{height}; at most {max_side}px per side and {max_pixels} pixels are accepted")]
    TooLarge {
        width: u32,
        height: u32,
        max_side: u32,
        max_pixels: u64,
    },

    #[error("Could not encode image: {0}")]
    Encode(String),

    #[error("entityId is required for {0} uploads")]
    MissingEntityId(Folder),

    #[error("Storage setup failed: {0}")]
    Setup(String),
}

/// Public-URL-aware wrapper over the configured object store.
#[derive(Clone)]
pub struct MediaStore {
    store: Arc<dyn ObjectStore>,
    cdn_url: String,
    /// The local filesystem backend rejects object attributes.
    with_attributes: bool,
}

impl MediaStore {
    pub fn new(store: Arc<dyn ObjectStore>, cdn_url: &str, with_attributes: bool) -> Self {
        Self {
            store,
            cdn_url: cdn_url.trim_end_matches('/').to_string(),
            with_attributes,
        }
    }

    pub fn in_memory(cdn_url: &str) -> Self {
        Self::new(Arc::new(InMemory::new()), cdn_url, true)
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, MediaError> {
        match config.backend {
            StorageBackend::S3 => {
                let mut builder = AmazonS3Builder::from_env()
                    .with_bucket_name(&config.bucket)
                    .with_region(&config.region);
                if let (Some(key), Some(secret)) =
                    (&config.access_key_id, &config.secret_access_key)
                {
                    builder = builder
                        .with_access_key_id(key)
                        .with_secret_access_key(secret);
                }
                info!("Using S3 bucket '{}' for media", config.bucket);
                Ok(Self::new(Arc::new(builder.build()?), &config.cdn_url, true))
            }
            StorageBackend::Local => {
                std::fs::create_dir_all(&config.local_dir)
                    .map_err(|e| MediaError::Setup(e.to_string()))?;
                let store = LocalFileSystem::new_with_prefix(&config.local_dir)?;
                info!("Using local directory {:?} for media", config.local_dir);
                Ok(Self::new(Arc::new(store), &config.cdn_url, false))
            }
            StorageBackend::Memory => Ok(Self::in_memory(&config.cdn_url)),
        }
    }

    pub fn url(&self, key: &str) -> String {
        format!("{}/{}", self.cdn_url, key)
    }

    /// Store `bytes` under `key` and return its public URL.
    pub async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &'static str,
    ) -> Result<String, MediaError> {
        let path = Path::parse(key)?;
        let mut options = PutOptions::default();
        if self.with_attributes {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.into());
            attributes.insert(Attribute::CacheControl, CACHE_CONTROL.into());
            options.attributes = attributes;
        }
        let size = bytes.len();
        self.store
            .put_opts(&path, PutPayload::from(bytes), options)
            .await?;
        debug!("Stored {} ({} bytes)", key, size);
        Ok(self.url(key))
    }

    pub async fn get(&self, key: &str) -> Result<Vec<u8>, MediaError> {
        let path = Path::parse(key)?;
        let bytes = self.store.get(&path).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Delete one object; a missing object is not an error.
    pub async fn delete(&self, key: &str) -> Result<(), MediaError> {
        let path = Path::parse(key)?;
        match self.store.delete(&path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every rendition that shares `key`'s base id.
    pub async fn delete_variants(&self, key: &str) -> Result<(), MediaError> {
        let Some((dir, base)) = images::variant_base(key) else {
            return self.delete(key).await;
        };
        let deletions = images::VARIANT_PREFIXES
            .iter()
            .map(|prefix| self.delete_quietly(format!("{dir}{prefix}{base}")));
        futures_util::future::join_all(deletions).await;
        Ok(())
    }

    async fn delete_quietly(&self, key: String) {
        if let Err(e) = self.delete(&key).await {
            debug!("Ignoring failed variant delete for {}: {}", key, e);
        }
    }

    /// Delete everything under `prefix`, returning how many objects went.
    pub async fn delete_folder(&self, prefix: &str) -> Result<usize, MediaError> {
        let prefix = Path::parse(prefix.trim_end_matches('/'))?;
        let objects: Vec<_> = self.store.list(Some(&prefix)).try_collect().await?;
        for object in &objects {
            self.delete(object.location.as_ref()).await?;
        }
        if !objects.is_empty() {
            info!("Deleted {} objects under {}", objects.len(), prefix);
        }
        Ok(objects.len())
    }

    pub async fn content_type(&self, key: &str) -> Result<Option<String>, MediaError> {
        let path = Path::parse(key)?;
        let result = self.store.get(&path).await?;
        Ok(result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| AsRef::<str>::as_ref(value).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_returns_cdn_url_with_attributes() {
        let media = MediaStore::in_memory("https://cdn.example.com/");
        let url = media
            .put("projects/thumb_a.webp", vec![1, 2, 3], images::WEBP)
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/projects/thumb_a.webp");
        assert_eq!(media.get("projects/thumb_a.webp").await.unwrap(), vec![1, 2, 3]);
        assert_eq!(
            media.content_type("projects/thumb_a.webp").await.unwrap().as_deref(),
            Some("image/webp")
        );
    }

    #[tokio::test]
    async fn test_delete_variants_removes_siblings_only() {
        let media = MediaStore::in_memory("https://cdn");
        for key in [
            "projects/p/thumb_x.webp",
            "projects/p/med_x.webp",
            "projects/p/orig_x.webp",
            "projects/p/thumb_y.webp",
        ] {
            media.put(key, vec![0], images::WEBP).await.unwrap();
        }

        media.delete_variants("projects/p/med_x.webp").await.unwrap();

        assert!(media.get("projects/p/thumb_x.webp").await.is_err());
        assert!(media.get("projects/p/orig_x.webp").await.is_err());
        assert!(media.get("projects/p/thumb_y.webp").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_plain_key_and_missing_key() {
        let media = MediaStore::in_memory("https://cdn");
        media
            .put(images::RESUME_KEY, vec![0], images::PDF)
            .await
            .unwrap();
        media.delete_variants(images::RESUME_KEY).await.unwrap();
        assert!(media.get(images::RESUME_KEY).await.is_err());
        media.delete("resume/never-existed.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_folder() {
        let media = MediaStore::in_memory("https://cdn");
        media.put("blog/post-1/featured_a.webp", vec![0], images::WEBP).await.unwrap();
        media.put("blog/post-1/orig_a.webp", vec![0], images::WEBP).await.unwrap();
        media.put("blog/post-2/orig_b.webp", vec![0], images::WEBP).await.unwrap();

        assert_eq!(media.delete_folder("blog/post-1/").await.unwrap(), 2);
        assert_eq!(media.delete_folder("blog/post-1/").await.unwrap(), 0);
        assert!(media.get("blog/post-2/orig_b.webp").await.is_ok());
    }

    #[tokio::test]
    async fn test_local_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::Local,
            local_dir: dir.path().to_path_buf(),
            cdn_url: "http://localhost/media".into(),
            ..StorageConfig::default()
        };
        let media = MediaStore::from_config(&config).unwrap();
        let url = media
            .put("logos/company_a_b.webp", vec![9], images::WEBP)
            .await
            .unwrap();
        assert_eq!(url, "http://localhost/media/logos/company_a_b.webp");
        assert_eq!(media.get("logos/company_a_b.webp").await.unwrap(), vec![9]);
    }
}
