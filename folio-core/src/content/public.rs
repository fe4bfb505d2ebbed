//! Read model for the public pages. Only published and visible content leaves here.

use super::{sort_by_order, SkillGroups, Visibility};
use crate::common::dates::{format_date_range, format_month_year, format_range};
use crate::common::error::Result;
use crate::domain::*;
use crate::markdown::markdown_to_html;
use crate::storage::{Repository, Storage};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

const FEATURED_ON_HOME: usize = 4;
const RECENT_ON_HOME: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProject {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub short_description: String,
    pub tech_tags: Vec<String>,
    pub thumbnail_image: String,
    pub featured: bool,
    pub display_order: i64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub live_url: Option<String>,
    pub repo_url: Option<String>,
}

impl From<&Project> for PublicProject {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id,
            slug: p.slug.clone(),
            title: p.title.clone(),
            short_description: p.short_description.clone(),
            tech_tags: p.tech_tags.clone(),
            thumbnail_image: p.thumbnail_image.clone(),
            featured: p.featured,
            display_order: p.display_order,
            start_date: p.start_date,
            end_date: p.end_date,
            live_url: p.live_url.clone(),
            repo_url: p.repo_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPost {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub featured_image: Option<String>,
    pub tags: Vec<String>,
    pub read_time: u32,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<&BlogPost> for PublicPost {
    fn from(p: &BlogPost) -> Self {
        Self {
            id: p.id,
            slug: p.slug.clone(),
            title: p.title.clone(),
            excerpt: p.excerpt.clone(),
            featured_image: p.featured_image.clone(),
            tags: p.tags.clone(),
            read_time: p.read_time,
            published_at: p.published_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectLink {
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    pub project: Project,
    pub description_html: String,
    pub prev: Option<ProjectLink>,
    pub next: Option<ProjectLink>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub post: BlogPost,
    pub content_html: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub hero: Option<Hero>,
    pub settings: SiteSettings,
    pub featured_projects: Vec<PublicProject>,
    pub recent_posts: Vec<PublicPost>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlogIndex {
    pub posts: Vec<PublicPost>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(flatten)]
    pub experience: Experience,
    pub date_range: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(flatten)]
    pub education: Education,
    pub date_range: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationEntry {
    #[serde(flatten)]
    pub certification: Certification,
    pub earned: String,
    pub expires: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AboutPage {
    pub skills: SkillGroups,
    pub experiences: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<CertificationEntry>,
}

#[derive(Clone)]
pub struct PublicService {
    projects: Repository<Project>,
    posts: Repository<BlogPost>,
    skills: Repository<Skill>,
    experience: Repository<Experience>,
    education: Repository<Education>,
    certifications: Repository<Certification>,
    hero: Repository<Hero>,
    settings: Repository<SiteSettings>,
}

impl PublicService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            projects: Repository::new(Arc::clone(&storage)),
            posts: Repository::new(Arc::clone(&storage)),
            skills: Repository::new(Arc::clone(&storage)),
            experience: Repository::new(Arc::clone(&storage)),
            education: Repository::new(Arc::clone(&storage)),
            certifications: Repository::new(Arc::clone(&storage)),
            hero: Repository::new(Arc::clone(&storage)),
            settings: Repository::new(storage),
        }
    }

    async fn published_projects(&self) -> Result<Vec<Project>> {
        let mut projects = self.projects.filter(|p| p.status.is_published()).await?;
        sort_by_order(&mut projects);
        Ok(projects)
    }

    async fn published_posts(&self) -> Result<Vec<BlogPost>> {
        let mut posts = self.posts.filter(|p| p.status.is_published()).await?;
        posts.sort_by_key(|p| Reverse(p.published_at));
        Ok(posts)
    }

    async fn visible<T: super::Listed>(&self, repo: &Repository<T>) -> Result<Vec<T>> {
        let mut items = repo.filter(|item| Visibility::Visible.matches(item.visible())).await?;
        sort_by_order(&mut items);
        Ok(items)
    }

    pub async fn home(&self) -> Result<HomePage> {
        let featured_projects = self
            .published_projects()
            .await?
            .iter()
            .filter(|p| p.featured)
            .take(FEATURED_ON_HOME)
            .map(PublicProject::from)
            .collect();
        let recent_posts = self
            .published_posts()
            .await?
            .iter()
            .take(RECENT_ON_HOME)
            .map(PublicPost::from)
            .collect();
        Ok(HomePage {
            hero: self.hero.all().await?.into_iter().next(),
            settings: self
                .settings
                .find(SETTINGS_ID)
                .await?
                .unwrap_or_else(SiteSettings::fallback),
            featured_projects,
            recent_posts,
        })
    }

    pub async fn projects(&self) -> Result<Vec<PublicProject>> {
        Ok(self
            .published_projects()
            .await?
            .iter()
            .map(PublicProject::from)
            .collect())
    }

    /// A published project with rendered description and its neighbours by display order.
    pub async fn project(&self, slug: &str) -> Result<Option<ProjectDetail>> {
        let projects = self.published_projects().await?;
        let Some(project) = projects.iter().find(|p| p.slug == slug).cloned() else {
            return Ok(None);
        };
        let link = |p: &Project| ProjectLink {
            slug: p.slug.clone(),
            title: p.title.clone(),
        };
        let prev = projects
            .iter()
            .filter(|p| p.display_order < project.display_order)
            .last()
            .map(link);
        let next = projects
            .iter()
            .find(|p| p.display_order > project.display_order)
            .map(link);
        Ok(Some(ProjectDetail {
            description_html: markdown_to_html(&project.description),
            project,
            prev,
            next,
        }))
    }

    pub async fn blog(&self, tag: Option<&str>) -> Result<BlogIndex> {
        let posts = self.published_posts().await?;
        let tags: BTreeSet<String> = posts.iter().flat_map(|p| p.tags.iter().cloned()).collect();
        let posts = posts
            .iter()
            .filter(|p| tag.map_or(true, |t| p.tags.iter().any(|pt| pt == t)))
            .map(PublicPost::from)
            .collect();
        Ok(BlogIndex {
            posts,
            tags: tags.into_iter().collect(),
        })
    }

    pub async fn post(&self, slug: &str) -> Result<Option<PostDetail>> {
        let post = self
            .posts
            .find_by(|p| p.slug == slug && p.status.is_published())
            .await?;
        Ok(post.map(|post| PostDetail {
            content_html: markdown_to_html(&post.content),
            post,
        }))
    }

    pub async fn about(&self) -> Result<AboutPage> {
        let experiences = self
            .visible(&self.experience)
            .await?
            .into_iter()
            .map(|experience| ExperienceEntry {
                date_range: format_date_range(Some(&experience.start_date), experience.end_date.as_ref()),
                experience,
            })
            .collect();
        let education = self
            .visible(&self.education)
            .await?
            .into_iter()
            .map(|education| EducationEntry {
                date_range: format_range(education.start_date.as_ref(), education.end_date.as_ref(), "%Y"),
                education,
            })
            .collect();
        let certifications = self
            .visible(&self.certifications)
            .await?
            .into_iter()
            .map(|certification| CertificationEntry {
                earned: format_month_year(Some(&certification.date_earned)),
                expires: certification
                    .expiration_date
                    .as_ref()
                    .map(|d| format_month_year(Some(d))),
                certification,
            })
            .collect();
        Ok(AboutPage {
            skills: SkillGroups::from_skills(self.visible(&self.skills).await?),
            experiences,
            education,
            certifications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;
    use crate::storage::InMemoryStorage;
    use serde_json::json;

    async fn seeded() -> Content {
        let content = Content::new(Arc::new(InMemoryStorage::new()));
        for (slug, order, featured, status) in [
            ("one", 0, true, "PUBLISHED"),
            ("two", 1, false, "DRAFT"),
            ("three", 2, true, "PUBLISHED"),
            ("four", 3, false, "PUBLISHED"),
        ] {
            content
                .projects
                .create(
                    serde_json::from_value(json!({
                        "title": slug.to_uppercase(), "slug": slug,
                        "shortDescription": "s", "description": "# Intro\n\nBody",
                        "techTags": ["Rust"], "featured": featured,
                        "displayOrder": order, "status": status
                    }))
                    .unwrap(),
                )
                .await
                .unwrap();
        }
        for (slug, date, tags, status) in [
            ("first", "2023-01-01", vec!["rust"], "PUBLISHED"),
            ("second", "2024-01-01", vec!["web", "rust"], "PUBLISHED"),
            ("hidden", "2024-06-01", vec!["secret"], "DRAFT"),
        ] {
            content
                .blog
                .create(
                    serde_json::from_value(json!({
                        "title": slug, "slug": slug, "content": "Some *markdown*",
                        "excerpt": "e", "tags": tags, "status": status, "publishedAt": date
                    }))
                    .unwrap(),
                )
                .await
                .unwrap();
        }
        content
    }

    #[tokio::test]
    async fn test_home() {
        let content = seeded().await;
        let home = content.public.home().await.unwrap();
        assert!(home.hero.is_none());
        assert_eq!(home.settings.site_name, "Portfolio");
        let featured: Vec<_> = home.featured_projects.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(featured, vec!["one", "three"]);
        let recent: Vec<_> = home.recent_posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(recent, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_project_neighbours_skip_drafts() {
        let content = seeded().await;
        let detail = content.public.project("three").await.unwrap().unwrap();
        assert_eq!(detail.prev.map(|p| p.slug), Some("one".to_string()));
        assert_eq!(detail.next.map(|p| p.slug), Some("four".to_string()));
        assert!(detail.description_html.contains(r#"<h1 id="intro">"#));

        assert!(content.public.project("two").await.unwrap().is_none());
        let first = content.public.project("one").await.unwrap().unwrap();
        assert!(first.prev.is_none());
    }

    #[tokio::test]
    async fn test_blog_tags_and_detail() {
        let content = seeded().await;
        let index = content.public.blog(None).await.unwrap();
        assert_eq!(index.tags, vec!["rust", "web"]);
        assert_eq!(index.posts.len(), 2);
        let web = content.public.blog(Some("web")).await.unwrap();
        assert_eq!(web.posts.len(), 1);

        let post = content.public.post("first").await.unwrap().unwrap();
        assert!(post.content_html.contains("<em>markdown</em>"));
        assert!(content.public.post("hidden").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_about_formats_ranges() {
        let content = seeded().await;
        content
            .experience
            .create(
                serde_json::from_value(json!({
                    "company": "Acme", "role": "Engineer", "description": "d",
                    "startDate": "2021-01-15"
                }))
                .unwrap(),
            )
            .await
            .unwrap();
        content
            .education
            .create(
                serde_json::from_value(json!({
                    "institution": "Uni", "degree": "BSc", "field": "CS",
                    "startDate": "2014-09-01", "endDate": "2018-06-01"
                }))
                .unwrap(),
            )
            .await
            .unwrap();
        content
            .certifications
            .create(
                serde_json::from_value(json!({
                    "name": "Cert", "issuer": "Org", "dateEarned": "2022-03-10", "visible": false
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        let about = content.public.about().await.unwrap();
        assert_eq!(about.experiences[0].date_range, "Jan 2021 – Present");
        assert_eq!(about.education[0].date_range, "2014 – 2018");
        assert!(about.certifications.is_empty());

        let value = serde_json::to_value(&about.experiences[0]).unwrap();
        assert_eq!(value["company"], "Acme");
        assert_eq!(value["dateRange"], "Jan 2021 – Present");
    }
}
