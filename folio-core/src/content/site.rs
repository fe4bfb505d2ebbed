use crate::common::error::{FolioError, Result};
use crate::domain::{Hero, SiteSettings, SETTINGS_ID};
use crate::storage::{Document, Repository, Storage};
use crate::validation::{HeroInput, SiteSettingsInput};
use chrono::Utc;
use std::sync::Arc;

/// The hero and site-settings singletons.
#[derive(Clone)]
pub struct SiteService {
    hero: Repository<Hero>,
    settings: Repository<SiteSettings>,
}

impl SiteService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            hero: Repository::new(Arc::clone(&storage)),
            settings: Repository::new(storage),
        }
    }

    /// The stored hero, if one was ever saved.
    pub async fn find_hero(&self) -> Result<Option<Hero>> {
        Ok(self.hero.all().await?.into_iter().next())
    }

    pub async fn hero(&self) -> Result<Hero> {
        self.find_hero()
            .await?
            .ok_or_else(|| FolioError::not_found(Hero::ENTITY))
    }

    pub async fn put_hero(&self, input: HeroInput) -> Result<Hero> {
        input.validate()?;
        let hero = input.upsert(self.find_hero().await?, Utc::now());
        self.hero.save(&hero).await?;
        Ok(hero)
    }

    pub async fn find_settings(&self) -> Result<Option<SiteSettings>> {
        self.settings.find(SETTINGS_ID).await
    }

    /// Stored settings or the built-in defaults.
    pub async fn settings(&self) -> Result<SiteSettings> {
        Ok(self
            .find_settings()
            .await?
            .unwrap_or_else(SiteSettings::fallback))
    }

    pub async fn put_settings(&self, input: SiteSettingsInput) -> Result<SiteSettings> {
        input.validate()?;
        let settings = input.upsert(self.find_settings().await?, Utc::now());
        self.settings.save(&settings).await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use serde_json::json;

    #[tokio::test]
    async fn test_hero_singleton() {
        let site = SiteService::new(Arc::new(InMemoryStorage::new()));
        assert!(matches!(site.hero().await, Err(FolioError::NotFound { entity: "Hero" })));

        let first = site
            .put_hero(serde_json::from_value(json!({ "headline": "Hi", "bio": "Me" })).unwrap())
            .await
            .unwrap();
        let second = site
            .put_hero(serde_json::from_value(json!({ "headline": "Hey", "bio": "Me" })).unwrap())
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(site.hero().await.unwrap().headline, "Hey");
    }

    #[tokio::test]
    async fn test_settings_fallback_then_upsert() {
        let site = SiteService::new(Arc::new(InMemoryStorage::new()));
        let fallback = site.settings().await.unwrap();
        assert_eq!(fallback.site_name, "Portfolio");
        assert_eq!(fallback.id, "default");

        let input = serde_json::from_value(json!({ "siteName": "Folio", "email": "me@example.com" })).unwrap();
        site.put_settings(input).await.unwrap();
        let stored = site.settings().await.unwrap();
        assert_eq!(stored.site_name, "Folio");
        assert_eq!(stored.social_links, None);
    }

    #[tokio::test]
    async fn test_invalid_settings_are_not_stored() {
        let site = SiteService::new(Arc::new(InMemoryStorage::new()));
        let input = serde_json::from_value(json!({ "siteName": "", "email": "me@example.com" })).unwrap();
        assert!(matches!(site.put_settings(input).await, Err(FolioError::Validation(_))));
        assert!(site.find_settings().await.unwrap().is_none());
    }
}
