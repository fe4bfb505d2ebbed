use crate::common::error::Result;
use crate::domain::{BlogPost, ContactMessage, Project, PublishStatus};
use crate::storage::{Repository, Storage};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Reverse;
use std::sync::Arc;
use uuid::Uuid;

const RECENT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentItem {
    pub id: Uuid,
    pub title: String,
    pub status: PublishStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub project_count: usize,
    pub post_count: usize,
    pub unread_messages: usize,
    pub recent_projects: Vec<RecentItem>,
    pub recent_posts: Vec<RecentItem>,
}

#[derive(Clone)]
pub struct DashboardService {
    projects: Repository<Project>,
    posts: Repository<BlogPost>,
    messages: Repository<ContactMessage>,
}

impl DashboardService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            projects: Repository::new(Arc::clone(&storage)),
            posts: Repository::new(Arc::clone(&storage)),
            messages: Repository::new(storage),
        }
    }

    pub async fn summary(&self) -> Result<DashboardSummary> {
        let projects = self.projects.all().await?;
        let posts = self.posts.all().await?;

        let mut recent_projects: Vec<RecentItem> = projects
            .iter()
            .map(|p| RecentItem {
                id: p.id,
                title: p.title.clone(),
                status: p.status,
                updated_at: p.updated_at,
            })
            .collect();
        recent_projects.sort_by_key(|item| Reverse(item.updated_at));
        recent_projects.truncate(RECENT);

        let mut recent_posts: Vec<RecentItem> = posts
            .iter()
            .map(|p| RecentItem {
                id: p.id,
                title: p.title.clone(),
                status: p.status,
                updated_at: p.updated_at,
            })
            .collect();
        recent_posts.sort_by_key(|item| Reverse(item.updated_at));
        recent_posts.truncate(RECENT);

        Ok(DashboardSummary {
            project_count: projects.len(),
            post_count: posts.len(),
            unread_messages: self.messages.count(|m| !m.read && !m.archived).await?,
            recent_projects,
            recent_posts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;
    use crate::storage::InMemoryStorage;
    use serde_json::json;

    #[tokio::test]
    async fn test_summary_counts_and_recency() {
        let content = Content::new(Arc::new(InMemoryStorage::new()));
        let mut ids = Vec::new();
        for i in 0..7 {
            let project = content
                .projects
                .create(
                    serde_json::from_value(json!({
                        "title": format!("P{i}"), "slug": format!("p{i}"),
                        "shortDescription": "s", "description": "d", "techTags": ["x"]
                    }))
                    .unwrap(),
                )
                .await
                .unwrap();
            ids.push(project.id);
        }
        // Touch the first project so it becomes the most recent.
        content
            .projects
            .update(&ids[0].to_string(), serde_json::from_value(json!({ "title": "Fresh" })).unwrap())
            .await
            .unwrap();

        let summary = content.dashboard.summary().await.unwrap();
        assert_eq!(summary.project_count, 7);
        assert_eq!(summary.post_count, 0);
        assert_eq!(summary.unread_messages, 0);
        assert_eq!(summary.recent_projects.len(), 5);
        assert_eq!(summary.recent_projects[0].title, "Fresh");
    }
}
