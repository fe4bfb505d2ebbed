use super::{nullable, EntityInput, FieldErrors, Mode};
use crate::common::dates;
use crate::common::error::Result;
use crate::domain::{Certification, Education, Experience, ProficiencyLevel, Skill};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

macro_rules! set {
    ($target:expr, $value:expr) => {
        if let Some(v) = $value {
            $target = v;
        }
    };
}

macro_rules! set_some {
    ($target:expr, $value:expr) => {
        if $value.is_some() {
            $target = $value;
        }
    };
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub proficiency_level: Option<Option<ProficiencyLevel>>,
    pub display_order: Option<i64>,
    pub visible: Option<bool>,
}

impl EntityInput for SkillInput {
    type Entity = Skill;

    fn validate(&self, mode: Mode) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.text(mode, "name", &self.name, 1, Some(100));
        errors.text(mode, "category", &self.category, 1, Some(100));
        errors.optional_text("icon", &self.icon, 100);
        errors.into_result()
    }

    fn build(self, now: DateTime<Utc>) -> Skill {
        Skill {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            icon: self.icon,
            proficiency_level: self.proficiency_level.flatten(),
            display_order: self.display_order.unwrap_or(0),
            visible: self.visible.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(self, skill: &mut Skill, now: DateTime<Utc>) {
        set!(skill.name, self.name);
        set!(skill.category, self.category);
        set_some!(skill.icon, self.icon);
        set!(skill.proficiency_level, self.proficiency_level);
        set!(skill.display_order, self.display_order);
        set!(skill.visible, self.visible);
        skill.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceInput {
    pub company: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "dates::flexible::deserialize")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "dates::nullable_flexible::deserialize")]
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub description: Option<String>,
    pub highlights: Option<Vec<String>>,
    pub logo_url: Option<String>,
    pub company_url: Option<String>,
    pub display_order: Option<i64>,
    pub visible: Option<bool>,
}

impl EntityInput for ExperienceInput {
    type Entity = Experience;

    fn validate(&self, mode: Mode) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.text(mode, "company", &self.company, 1, Some(200));
        errors.text(mode, "role", &self.role, 1, Some(200));
        errors.optional_text("location", &self.location, 200);
        errors.present(mode, "startDate", &self.start_date);
        errors.text(mode, "description", &self.description, 1, None);
        if let Some(highlights) = &self.highlights {
            errors.each_max("highlights", highlights, 500);
        }
        errors.optional_url("logoUrl", &self.logo_url);
        errors.optional_url("companyUrl", &self.company_url);
        errors.into_result()
    }

    fn build(self, now: DateTime<Utc>) -> Experience {
        Experience {
            id: Uuid::new_v4(),
            company: self.company.unwrap_or_default(),
            role: self.role.unwrap_or_default(),
            location: self.location,
            start_date: self.start_date.unwrap_or(now),
            end_date: self.end_date.flatten(),
            description: self.description.unwrap_or_default(),
            highlights: self.highlights.unwrap_or_default(),
            logo_url: self.logo_url,
            company_url: self.company_url,
            display_order: self.display_order.unwrap_or(0),
            visible: self.visible.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(self, experience: &mut Experience, now: DateTime<Utc>) {
        set!(experience.company, self.company);
        set!(experience.role, self.role);
        set_some!(experience.location, self.location);
        set!(experience.start_date, self.start_date);
        set!(experience.end_date, self.end_date);
        set!(experience.description, self.description);
        set!(experience.highlights, self.highlights);
        set_some!(experience.logo_url, self.logo_url);
        set_some!(experience.company_url, self.company_url);
        set!(experience.display_order, self.display_order);
        set!(experience.visible, self.visible);
        experience.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationInput {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field: Option<String>,
    #[serde(default, deserialize_with = "dates::nullable_flexible::deserialize")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "dates::nullable_flexible::deserialize")]
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub achievements: Option<String>,
    pub logo_url: Option<String>,
    pub display_order: Option<i64>,
    pub visible: Option<bool>,
}

impl EntityInput for EducationInput {
    type Entity = Education;

    fn validate(&self, mode: Mode) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.text(mode, "institution", &self.institution, 1, Some(200));
        errors.text(mode, "degree", &self.degree, 1, Some(200));
        errors.text(mode, "field", &self.field, 1, Some(200));
        errors.optional_text("achievements", &self.achievements, 5000);
        errors.optional_url("logoUrl", &self.logo_url);
        errors.into_result()
    }

    fn build(self, now: DateTime<Utc>) -> Education {
        Education {
            id: Uuid::new_v4(),
            institution: self.institution.unwrap_or_default(),
            degree: self.degree.unwrap_or_default(),
            field: self.field.unwrap_or_default(),
            start_date: self.start_date.flatten(),
            end_date: self.end_date.flatten(),
            achievements: self.achievements,
            logo_url: self.logo_url,
            display_order: self.display_order.unwrap_or(0),
            visible: self.visible.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(self, education: &mut Education, now: DateTime<Utc>) {
        set!(education.institution, self.institution);
        set!(education.degree, self.degree);
        set!(education.field, self.field);
        set!(education.start_date, self.start_date);
        set!(education.end_date, self.end_date);
        set_some!(education.achievements, self.achievements);
        set_some!(education.logo_url, self.logo_url);
        set!(education.display_order, self.display_order);
        set!(education.visible, self.visible);
        education.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationInput {
    pub name: Option<String>,
    pub issuer: Option<String>,
    #[serde(default, deserialize_with = "dates::flexible::deserialize")]
    pub date_earned: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "dates::nullable_flexible::deserialize")]
    pub expiration_date: Option<Option<DateTime<Utc>>>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub badge_image: Option<String>,
    pub display_order: Option<i64>,
    pub visible: Option<bool>,
}

impl EntityInput for CertificationInput {
    type Entity = Certification;

    fn validate(&self, mode: Mode) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.text(mode, "name", &self.name, 1, Some(200));
        errors.text(mode, "issuer", &self.issuer, 1, Some(200));
        errors.present(mode, "dateEarned", &self.date_earned);
        errors.optional_text("credentialId", &self.credential_id, 200);
        errors.optional_url("credentialUrl", &self.credential_url);
        errors.optional_url("badgeImage", &self.badge_image);
        errors.into_result()
    }

    fn build(self, now: DateTime<Utc>) -> Certification {
        Certification {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_default(),
            issuer: self.issuer.unwrap_or_default(),
            date_earned: self.date_earned.unwrap_or(now),
            expiration_date: self.expiration_date.flatten(),
            credential_id: self.credential_id,
            credential_url: self.credential_url,
            badge_image: self.badge_image,
            display_order: self.display_order.unwrap_or(0),
            visible: self.visible.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(self, certification: &mut Certification, now: DateTime<Utc>) {
        set!(certification.name, self.name);
        set!(certification.issuer, self.issuer);
        set!(certification.date_earned, self.date_earned);
        set!(certification.expiration_date, self.expiration_date);
        set_some!(certification.credential_id, self.credential_id);
        set_some!(certification.credential_url, self.credential_url);
        set_some!(certification.badge_image, self.badge_image);
        set!(certification.display_order, self.display_order);
        set!(certification.visible, self.visible);
        certification.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FolioError;
    use serde_json::json;

    #[test]
    fn test_skill_defaults_visible() {
        let input: SkillInput =
            serde_json::from_value(json!({ "name": "Rust", "category": "Languages" })).unwrap();
        input.validate(Mode::Create).unwrap();
        let skill = input.build(Utc::now());
        assert!(skill.visible);
        assert_eq!(skill.display_order, 0);
        assert_eq!(skill.proficiency_level, None);
    }

    #[test]
    fn test_skill_patch_can_clear_proficiency() {
        let mut skill: Skill = serde_json::from_value::<SkillInput>(json!({
            "name": "Rust", "category": "Languages", "proficiencyLevel": "EXPERT"
        }))
        .unwrap()
        .build(Utc::now());
        assert_eq!(skill.proficiency_level, Some(ProficiencyLevel::Expert));

        let patch: SkillInput = serde_json::from_value(json!({ "proficiencyLevel": null })).unwrap();
        patch.apply(&mut skill, Utc::now());
        assert_eq!(skill.proficiency_level, None);
    }

    #[test]
    fn test_experience_requires_start_date() {
        let input: ExperienceInput = serde_json::from_value(json!({
            "company": "Acme", "role": "Engineer", "description": "Built things"
        }))
        .unwrap();
        match input.validate(Mode::Create) {
            Err(FolioError::Validation(errors)) => {
                assert_eq!(errors.field_errors.keys().collect::<Vec<_>>(), vec!["startDate"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_experience_end_date_can_be_cleared() {
        let mut experience = serde_json::from_value::<ExperienceInput>(json!({
            "company": "Acme", "role": "Engineer", "description": "d",
            "startDate": "2021-01-01", "endDate": "2022-06-30"
        }))
        .unwrap()
        .build(Utc::now());
        assert!(experience.end_date.is_some());

        serde_json::from_value::<ExperienceInput>(json!({ "endDate": null }))
            .unwrap()
            .apply(&mut experience, Utc::now());
        assert_eq!(experience.end_date, None);
    }

    #[test]
    fn test_certification_url_rules() {
        let input: CertificationInput = serde_json::from_value(json!({
            "name": "AWS SA", "issuer": "AWS", "dateEarned": "2023-04-01",
            "credentialUrl": "", "badgeImage": "nope"
        }))
        .unwrap();
        match input.validate(Mode::Create) {
            Err(FolioError::Validation(errors)) => {
                assert_eq!(errors.field_errors.keys().collect::<Vec<_>>(), vec!["badgeImage"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
