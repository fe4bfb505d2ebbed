use super::{nullable, FieldErrors, Mode};
use crate::common::error::Result;
use crate::domain::{CtaButton, Hero, SiteSettings, SocialLinks, SETTINGS_ID};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

const MAX_CTA_BUTTONS: usize = 4;

/// Full replacement payload for the hero singleton.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroInput {
    pub headline: Option<String>,
    pub subheadline: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub resume_url: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub cta_buttons: Option<Option<Vec<CtaButton>>>,
}

impl HeroInput {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.text(Mode::Create, "headline", &self.headline, 1, Some(200));
        errors.optional_text("subheadline", &self.subheadline, 300);
        errors.text(Mode::Create, "bio", &self.bio, 1, None);
        errors.optional_url("profileImage", &self.profile_image);
        errors.optional_url("resumeUrl", &self.resume_url);
        if let Some(Some(buttons)) = &self.cta_buttons {
            if buttons.len() > MAX_CTA_BUTTONS {
                errors.add("ctaButtons", format!("At most {MAX_CTA_BUTTONS} buttons are allowed"));
            }
            for (i, button) in buttons.iter().enumerate() {
                errors.length(&format!("ctaButtons.{i}.label"), &button.label, 1, Some(50));
                errors.length(&format!("ctaButtons.{i}.url"), &button.url, 1, None);
            }
        }
        errors.into_result()
    }

    /// Create the hero or update the stored one. Omitted optional fields keep
    /// their stored values; omitted or null buttons clear them.
    pub fn upsert(self, existing: Option<Hero>, now: DateTime<Utc>) -> Hero {
        let cta_buttons = self.cta_buttons.flatten();
        match existing {
            Some(mut hero) => {
                hero.headline = self.headline.unwrap_or(hero.headline);
                hero.bio = self.bio.unwrap_or(hero.bio);
                if self.subheadline.is_some() {
                    hero.subheadline = self.subheadline;
                }
                if let Some(image) = self.profile_image {
                    hero.profile_image = image;
                }
                if self.resume_url.is_some() {
                    hero.resume_url = self.resume_url;
                }
                hero.cta_buttons = cta_buttons;
                hero.updated_at = now;
                hero
            }
            None => Hero {
                id: Uuid::new_v4(),
                headline: self.headline.unwrap_or_default(),
                subheadline: self.subheadline,
                bio: self.bio.unwrap_or_default(),
                profile_image: self.profile_image.unwrap_or_default(),
                resume_url: self.resume_url,
                cta_buttons,
                created_at: now,
                updated_at: now,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettingsInput {
    pub site_name: Option<String>,
    pub site_description: Option<String>,
    pub social_links: Option<SocialLinks>,
    pub email: Option<String>,
    pub google_analytics_id: Option<String>,
}

impl SiteSettingsInput {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.text(Mode::Create, "siteName", &self.site_name, 1, Some(200));
        errors.optional_text("siteDescription", &self.site_description, 500);
        if let Some(links) = &self.social_links {
            errors.optional_url("socialLinks.github", &links.github);
            errors.optional_url("socialLinks.linkedin", &links.linkedin);
            errors.optional_url("socialLinks.twitter", &links.twitter);
            errors.optional_url("socialLinks.youtube", &links.youtube);
            errors.optional_url("socialLinks.website", &links.website);
        }
        errors.email(Mode::Create, "email", &self.email);
        errors.optional_text("googleAnalyticsId", &self.google_analytics_id, 50);
        errors.into_result()
    }

    /// Empty social links are dropped; a payload without any leaves `null`.
    pub fn upsert(self, existing: Option<SiteSettings>, now: DateTime<Utc>) -> SiteSettings {
        let social_links = self.social_links.and_then(SocialLinks::without_empty);
        match existing {
            Some(mut settings) => {
                settings.site_name = self.site_name.unwrap_or(settings.site_name);
                settings.email = self.email.unwrap_or(settings.email);
                if self.site_description.is_some() {
                    settings.site_description = self.site_description;
                }
                if self.google_analytics_id.is_some() {
                    settings.google_analytics_id = self.google_analytics_id;
                }
                settings.social_links = social_links;
                settings.updated_at = now;
                settings
            }
            None => SiteSettings {
                id: SETTINGS_ID.to_string(),
                site_name: self.site_name.unwrap_or_default(),
                site_description: self.site_description,
                social_links,
                email: self.email.unwrap_or_default(),
                google_analytics_id: self.google_analytics_id,
                updated_at: now,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CtaVariant;
    use serde_json::json;

    fn hero_input(value: serde_json::Value) -> HeroInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_hero_button_limits() {
        let button = json!({ "label": "Go", "url": "/projects", "variant": "primary" });
        let ok = hero_input(json!({ "headline": "Hi", "bio": "Me", "ctaButtons": [button] }));
        assert!(ok.validate().is_ok());

        let too_many = hero_input(json!({
            "headline": "Hi", "bio": "Me",
            "ctaButtons": [button, button, button, button, button]
        }));
        assert!(too_many.validate().is_err());
    }

    #[test]
    fn test_hero_upsert_keeps_image_and_clears_buttons() {
        let now = Utc::now();
        let created = hero_input(json!({
            "headline": "Hi", "bio": "Me",
            "profileImage": "https://cdn.example.com/profile/headshot_a.webp",
            "ctaButtons": [{ "label": "Go", "url": "/", "variant": "secondary" }]
        }))
        .upsert(None, now);
        assert_eq!(
            created.cta_buttons.as_ref().map(|b| b[0].variant),
            Some(CtaVariant::Secondary)
        );

        let updated = hero_input(json!({ "headline": "Hello", "bio": "Me" })).upsert(Some(created.clone()), now);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.headline, "Hello");
        assert_eq!(updated.profile_image, created.profile_image);
        assert_eq!(updated.cta_buttons, None);
    }

    #[test]
    fn test_hero_profile_image_defaults_to_empty() {
        let hero = hero_input(json!({ "headline": "Hi", "bio": "Me" })).upsert(None, Utc::now());
        assert_eq!(hero.profile_image, "");
    }

    #[test]
    fn test_settings_social_links() {
        let input: SiteSettingsInput = serde_json::from_value(json!({
            "siteName": "Folio",
            "email": "me@example.com",
            "socialLinks": { "github": "https://github.com/me", "twitter": "" }
        }))
        .unwrap();
        input.validate().unwrap();
        let settings = input.upsert(None, Utc::now());
        let links = settings.social_links.unwrap();
        assert_eq!(links.github.as_deref(), Some("https://github.com/me"));
        assert_eq!(links.twitter, None);

        let empty: SiteSettingsInput = serde_json::from_value(json!({
            "siteName": "Folio", "email": "me@example.com", "socialLinks": { "github": "" }
        }))
        .unwrap();
        assert_eq!(empty.upsert(None, Utc::now()).social_links, None);
    }

    #[test]
    fn test_settings_rejects_bad_email() {
        let input: SiteSettingsInput =
            serde_json::from_value(json!({ "siteName": "Folio", "email": "nope" })).unwrap();
        assert!(input.validate().is_err());
    }
}
