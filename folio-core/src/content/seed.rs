//! Sample content for a fresh database. Running it twice changes nothing.

use super::Content;
use crate::common::error::Result;
use crate::domain::*;
use crate::storage::{Document, Repository, Storage};
use crate::validation::{
    BlogPostInput, CertificationInput, EducationInput, EntityInput, ExperienceInput, HeroInput, Mode,
    ProjectInput, SiteSettingsInput, SkillInput,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// How many documents each seeding step inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub settings: usize,
    pub hero: usize,
    pub projects: usize,
    pub posts: usize,
    pub skills: usize,
    pub experience: usize,
    pub education: usize,
    pub certifications: usize,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.settings
            + self.hero
            + self.projects
            + self.posts
            + self.skills
            + self.experience
            + self.education
            + self.certifications
    }
}

fn parse<I: DeserializeOwned>(value: Value) -> Result<I> {
    Ok(serde_json::from_value(value)?)
}

/// Insert each sample entity unless a matching one already exists.
async fn insert_missing<I, F>(repo: &Repository<I::Entity>, samples: Vec<Value>, exists: F) -> Result<usize>
where
    I: EntityInput,
    I::Entity: Document,
    F: Fn(&I::Entity, &I::Entity) -> bool,
{
    let existing = repo.all().await?;
    let mut inserted = 0;
    for sample in samples {
        let input: I = parse(sample)?;
        input.validate(Mode::Create)?;
        let entity = input.build(Utc::now());
        if existing.iter().any(|e| exists(e, &entity)) {
            continue;
        }
        repo.save(&entity).await?;
        inserted += 1;
    }
    Ok(inserted)
}

pub async fn seed(storage: Arc<dyn Storage>) -> Result<SeedReport> {
    let content = Content::new(Arc::clone(&storage));
    let mut report = SeedReport::default();

    if content.site.find_settings().await?.is_none() {
        let input: SiteSettingsInput = parse(json!({
            "siteName": "John Doe | Portfolio",
            "siteDescription": "Full-stack developer portfolio showcasing projects and skills",
            "email": "hello@example.com",
            "socialLinks": {
                "github": "https://github.com/johndoe",
                "linkedin": "https://linkedin.com/in/johndoe"
            }
        }))?;
        content.site.put_settings(input).await?;
        report.settings = 1;
    }

    if content.site.find_hero().await?.is_none() {
        let input: HeroInput = parse(json!({
            "headline": "Full-Stack Developer",
            "subheadline": "Building modern web applications with React, Node.js, and AWS",
            "bio": "I'm a passionate developer with experience building production-grade web applications. I love solving complex problems and creating intuitive user experiences.",
            "profileImage": "https://via.placeholder.com/400x400",
            "ctaButtons": [
                { "label": "View Projects", "url": "/projects", "variant": "primary" },
                { "label": "Contact Me", "url": "/contact", "variant": "secondary" }
            ]
        }))?;
        content.site.put_hero(input).await?;
        report.hero = 1;
    }

    report.projects = insert_missing::<ProjectInput, _>(
        &Repository::new(Arc::clone(&storage)),
        vec![
            json!({
                "slug": "ecommerce-platform",
                "title": "E-Commerce Platform",
                "shortDescription": "A full-featured online store with payment processing and inventory management.",
                "description": "Built a modern e-commerce platform from scratch...",
                "techTags": ["Next.js", "TypeScript", "Stripe", "PostgreSQL", "Tailwind CSS"],
                "images": [{ "url": "https://via.placeholder.com/800x600", "alt": "E-Commerce Dashboard", "order": 0 }],
                "thumbnailImage": "https://via.placeholder.com/400x300",
                "liveUrl": "https://example.com",
                "repoUrl": "https://github.com/johndoe/ecommerce",
                "featured": true,
                "displayOrder": 0,
                "status": "PUBLISHED"
            }),
            json!({
                "slug": "task-management-app",
                "title": "Task Management App",
                "shortDescription": "A collaborative task management tool with real-time updates.",
                "description": "Designed and developed a Kanban-style task manager...",
                "techTags": ["React", "Node.js", "Socket.io", "MongoDB"],
                "images": [{ "url": "https://via.placeholder.com/800x600", "alt": "Task Board", "order": 0 }],
                "thumbnailImage": "https://via.placeholder.com/400x300",
                "featured": false,
                "displayOrder": 1,
                "status": "PUBLISHED"
            }),
        ],
        |a: &Project, b: &Project| a.slug == b.slug,
    )
    .await?;

    report.posts = insert_missing::<BlogPostInput, _>(
        &Repository::new(Arc::clone(&storage)),
        vec![json!({
            "slug": "getting-started-with-rust-web-services",
            "title": "Getting Started with Rust Web Services",
            "content": "# Getting Started with Rust Web Services\n\nAxum and Tokio make a small, fast HTTP backend...",
            "excerpt": "A short guide to building a JSON API with axum and tokio.",
            "tags": ["Rust", "axum", "tokio"],
            "status": "PUBLISHED",
            "publishedAt": "2026-01-15"
        })],
        |a: &BlogPost, b: &BlogPost| a.slug == b.slug,
    )
    .await?;

    let skills = [
        ("TypeScript", "Languages", "EXPERT", 0),
        ("Rust", "Languages", "ADVANCED", 1),
        ("Python", "Languages", "ADVANCED", 2),
        ("React", "Frontend", "EXPERT", 0),
        ("Next.js", "Frontend", "EXPERT", 1),
        ("Tailwind CSS", "Frontend", "ADVANCED", 2),
        ("Node.js", "Backend", "ADVANCED", 0),
        ("PostgreSQL", "Backend", "ADVANCED", 1),
        ("AWS", "DevOps", "INTERMEDIATE", 0),
    ];
    report.skills = insert_missing::<SkillInput, _>(
        &Repository::new(Arc::clone(&storage)),
        skills
            .iter()
            .map(|(name, category, level, order)| {
                json!({ "name": name, "category": category, "proficiencyLevel": level, "displayOrder": order })
            })
            .collect(),
        |a: &Skill, b: &Skill| a.name == b.name,
    )
    .await?;

    report.experience = insert_missing::<ExperienceInput, _>(
        &Repository::new(Arc::clone(&storage)),
        vec![json!({
            "company": "Tech Company Inc.",
            "role": "Senior Frontend Developer",
            "location": "Remote",
            "startDate": "2023-01-01",
            "description": "Led frontend development for the main product, improving performance and user experience.",
            "highlights": [
                "Led migration of legacy system to modern React/Next.js stack",
                "Reduced page load times by 60% through image optimization and CDN implementation",
                "Implemented CI/CD pipeline with automated testing"
            ],
            "displayOrder": 1
        })],
        |a: &Experience, b: &Experience| a.company == b.company && a.role == b.role,
    )
    .await?;

    report.education = insert_missing::<EducationInput, _>(
        &Repository::new(Arc::clone(&storage)),
        vec![json!({
            "institution": "State University",
            "degree": "Bachelor of Science",
            "field": "Computer Science",
            "startDate": "2018-09-01",
            "endDate": "2022-05-01",
            "achievements": "Dean's List, Senior Capstone Award",
            "displayOrder": 1
        })],
        |a: &Education, b: &Education| a.institution == b.institution && a.degree == b.degree,
    )
    .await?;

    report.certifications = insert_missing::<CertificationInput, _>(
        &Repository::new(storage),
        vec![json!({
            "name": "AWS Certified Cloud Practitioner",
            "issuer": "Amazon Web Services",
            "dateEarned": "2025-06-01",
            "credentialUrl": "https://aws.amazon.com/certification/",
            "displayOrder": 1
        })],
        |a: &Certification, b: &Certification| a.name == b.name,
    )
    .await?;

    info!("Seeded {} documents", report.total());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
        let first = seed(Arc::clone(&storage)).await.unwrap();
        assert_eq!(first.settings, 1);
        assert_eq!(first.hero, 1);
        assert_eq!(first.projects, 2);
        assert_eq!(first.posts, 1);
        assert_eq!(first.skills, 9);
        assert_eq!(first.experience, 1);
        assert_eq!(first.education, 1);
        assert_eq!(first.certifications, 1);

        let second = seed(Arc::clone(&storage)).await.unwrap();
        assert_eq!(second.total(), 0);

        let content = Content::new(storage);
        let home = content.public.home().await.unwrap();
        assert_eq!(home.settings.site_name, "John Doe | Portfolio");
        assert_eq!(home.featured_projects.len(), 1);
        assert_eq!(home.recent_posts.len(), 1);
    }
}
