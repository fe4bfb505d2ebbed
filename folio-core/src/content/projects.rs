use super::{contains_ci, delete_by_id, entity_key, paginate, parse_number, reorder, sort_by_order, total_pages, StatusFilter};
use crate::common::error::{FolioError, Result};
use crate::domain::Project;
use crate::storage::{Repository, Storage};
use crate::validation::{EntityInput, Mode, ProjectInput, ReorderInput};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const DEFAULT_LIMIT: usize = 20;

/// Raw `GET /api/projects` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectQuery {
    pub status: Option<String>,
    pub featured: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ProjectQuery {
    pub fn status(&self) -> Result<StatusFilter> {
        StatusFilter::parse(self.status.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPageMeta {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone)]
pub struct ProjectPage {
    pub data: Vec<Project>,
    pub meta: ProjectPageMeta,
}

#[derive(Clone)]
pub struct ProjectService {
    repo: Repository<Project>,
}

impl ProjectService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            repo: Repository::new(storage),
        }
    }

    pub async fn list(&self, query: &ProjectQuery) -> Result<ProjectPage> {
        let status = query.status()?;
        let featured_only = query.featured.as_deref() == Some("true");
        let search = query
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| (s.to_string(), s.to_lowercase()));
        let page = parse_number(query.page.as_deref(), 1).max(1);
        let limit = parse_number(query.limit.as_deref(), DEFAULT_LIMIT).max(1);

        let mut projects = self
            .repo
            .filter(|p| {
                status.matches(p.status)
                    && (!featured_only || p.featured)
                    && search.as_ref().map_or(true, |(raw, lower)| {
                        contains_ci(&p.title, lower)
                            || contains_ci(&p.short_description, lower)
                            || p.tech_tags.iter().any(|t| t == raw)
                    })
            })
            .await?;
        sort_by_order(&mut projects);

        let total = projects.len();
        Ok(ProjectPage {
            data: paginate(projects, page, limit),
            meta: ProjectPageMeta {
                total,
                page,
                limit,
                total_pages: total_pages(total, limit),
            },
        })
    }

    pub async fn get(&self, id: &str) -> Result<Project> {
        self.repo.get(&entity_key::<Project>(id)?).await
    }

    pub async fn create(&self, input: ProjectInput) -> Result<Project> {
        input.validate(Mode::Create)?;
        let project = input.build(Utc::now());
        self.ensure_slug_free(&project.slug, None).await?;
        self.repo.save(&project).await?;
        info!("Created project {} ({})", project.slug, project.id);
        Ok(project)
    }

    pub async fn update(&self, id: &str, input: ProjectInput) -> Result<Project> {
        let mut project = self.get(id).await?;
        input.validate(Mode::Update)?;
        if let Some(slug) = input.slug.as_deref().filter(|s| *s != project.slug) {
            self.ensure_slug_free(slug, Some(project.id)).await?;
        }
        input.apply(&mut project, Utc::now());
        self.repo.save(&project).await?;
        Ok(project)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        delete_by_id(&self.repo, id).await
    }

    pub async fn reorder(&self, input: &ReorderInput) -> Result<usize> {
        reorder(&self.repo, input).await
    }

    async fn ensure_slug_free(&self, slug: &str, except: Option<Uuid>) -> Result<()> {
        let taken = self
            .repo
            .find_by(|p| p.slug == slug && Some(p.id) != except)
            .await?;
        match taken {
            Some(_) => Err(FolioError::Conflict(
                "A project with this slug already exists".to_string(),
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PublishStatus;
    use crate::storage::InMemoryStorage;
    use serde_json::json;

    fn service() -> ProjectService {
        ProjectService::new(Arc::new(InMemoryStorage::new()))
    }

    fn input(slug: &str, status: &str, order: i64, tags: &[&str]) -> ProjectInput {
        serde_json::from_value(json!({
            "title": format!("Project {slug}"),
            "slug": slug,
            "shortDescription": format!("About {slug}"),
            "description": "Long form",
            "techTags": tags,
            "status": status,
            "displayOrder": order,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let service = service();
        service.create(input("gamma", "PUBLISHED", 2, &["Rust"])).await.unwrap();
        service.create(input("alpha", "PUBLISHED", 0, &["Go"])).await.unwrap();
        service.create(input("draft", "DRAFT", 1, &["Rust"])).await.unwrap();

        let published = service.list(&ProjectQuery::default()).await.unwrap();
        let slugs: Vec<_> = published.data.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["alpha", "gamma"]);
        assert_eq!(published.meta.total, 2);
        assert_eq!(published.meta.limit, 20);
        assert_eq!(published.meta.total_pages, 1);

        let all = service
            .list(&ProjectQuery {
                status: Some("all".into()),
                search: Some("Rust".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let slugs: Vec<_> = all.data.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["draft", "gamma"]);

        let by_title = service
            .list(&ProjectQuery {
                search: Some("ALPHA".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_title.data.len(), 1);
    }

    #[tokio::test]
    async fn test_pagination_meta() {
        let service = service();
        for i in 0..5 {
            service
                .create(input(&format!("p{i}"), "PUBLISHED", i, &["x"]))
                .await
                .unwrap();
        }
        let page = service
            .list(&ProjectQuery {
                page: Some("2".into()),
                limit: Some("2".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.data[0].slug, "p2");
        assert_eq!(page.meta.total, 5);
        assert_eq!(page.meta.total_pages, 3);
    }

    #[tokio::test]
    async fn test_slug_conflicts() {
        let service = service();
        let first = service.create(input("taken", "DRAFT", 0, &["x"])).await.unwrap();
        let second = service.create(input("free", "DRAFT", 1, &["x"])).await.unwrap();

        assert!(matches!(
            service.create(input("taken", "DRAFT", 2, &["x"])).await,
            Err(FolioError::Conflict(_))
        ));

        let rename = ProjectInput {
            slug: Some("taken".into()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&second.id.to_string(), rename).await,
            Err(FolioError::Conflict(_))
        ));

        // Re-sending its own slug is fine.
        let same = ProjectInput {
            slug: Some("taken".into()),
            status: Some(PublishStatus::Published),
            ..Default::default()
        };
        let updated = service.update(&first.id.to_string(), same).await.unwrap();
        assert_eq!(updated.status, PublishStatus::Published);
        assert!(updated.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn test_reorder_is_all_or_nothing() {
        let service = service();
        let a = service.create(input("a", "PUBLISHED", 5, &["x"])).await.unwrap();
        let b = service.create(input("b", "PUBLISHED", 6, &["x"])).await.unwrap();

        let bad: ReorderInput = serde_json::from_value(json!({
            "orderedIds": [b.id.to_string(), Uuid::new_v4().to_string()]
        }))
        .unwrap();
        assert!(matches!(service.reorder(&bad).await, Err(FolioError::NotFound { .. })));
        assert_eq!(service.get(&b.id.to_string()).await.unwrap().display_order, 6);

        let good: ReorderInput = serde_json::from_value(json!({
            "orderedIds": [b.id.to_string(), a.id.to_string()]
        }))
        .unwrap();
        assert_eq!(service.reorder(&good).await.unwrap(), 2);
        assert_eq!(service.get(&b.id.to_string()).await.unwrap().display_order, 0);
        assert_eq!(service.get(&a.id.to_string()).await.unwrap().display_order, 1);
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let service = service();
        assert!(matches!(
            service.delete(&Uuid::new_v4().to_string()).await,
            Err(FolioError::NotFound { entity: "Project" })
        ));
    }
}
