// SPDX-License-Identifier: MIT
//! Issue SQLite operations.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::model::{CreateIssueParams, IssueFilter, IssueRow, IssueUpdate};

/// Storage-layer error. Callers that must hide the distinction between
/// "no such row" and an infrastructure failure (the update/delete wire
/// contract) still see which one occurred here, for logging.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("issue not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

pub struct IssueStorage {
    pub(crate) pool: SqlitePool,
}

impl IssueStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List issues for a project, narrowed by the provided exact-match
    /// filters (conjunctive). Filterable fields are the enumerated set on
    /// [`IssueFilter`]; nothing else reaches the query.
    pub async fn find(
        &self,
        project: &str,
        filter: &IssueFilter,
    ) -> Result<Vec<IssueRow>, StoreError> {
        let mut clauses = vec!["project = ?"];
        if filter.id.is_some() {
            clauses.push("id = ?");
        }
        if filter.issue_title.is_some() {
            clauses.push("issue_title = ?");
        }
        if filter.issue_text.is_some() {
            clauses.push("issue_text = ?");
        }
        if filter.created_by.is_some() {
            clauses.push("created_by = ?");
        }
        if filter.assigned_to.is_some() {
            clauses.push("assigned_to = ?");
        }
        if filter.status_text.is_some() {
            clauses.push("status_text = ?");
        }
        if filter.open.is_some() {
            clauses.push("open = ?");
        }

        let sql = format!(
            "SELECT * FROM issues WHERE {} ORDER BY created_on ASC",
            clauses.join(" AND ")
        );

        let mut query = sqlx::query_as::<_, IssueRow>(&sql).bind(project);
        if let Some(id) = &filter.id {
            query = query.bind(id);
        }
        if let Some(title) = &filter.issue_title {
            query = query.bind(title);
        }
        if let Some(text) = &filter.issue_text {
            query = query.bind(text);
        }
        if let Some(created_by) = &filter.created_by {
            query = query.bind(created_by);
        }
        if let Some(assigned_to) = &filter.assigned_to {
            query = query.bind(assigned_to);
        }
        if let Some(status_text) = &filter.status_text {
            query = query.bind(status_text);
        }
        if let Some(open) = filter.open {
            query = query.bind(open);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Insert a new issue. The id and both timestamps are minted here;
    /// `created_on` and `updated_on` start equal.
    pub async fn create(
        &self,
        project: &str,
        params: CreateIssueParams,
    ) -> Result<IssueRow, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO issues \
             (id, project, issue_title, issue_text, created_by, assigned_to, status_text, open, created_on, updated_on) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(&id)
        .bind(project)
        .bind(&params.issue_title)
        .bind(&params.issue_text)
        .bind(&params.created_by)
        .bind(&params.assigned_to)
        .bind(&params.status_text)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get(&id).await?.ok_or(StoreError::NotFound(id))
    }

    pub async fn get(&self, id: &str) -> Result<Option<IssueRow>, StoreError> {
        Ok(sqlx::query_as("SELECT * FROM issues WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Apply a partial update by id, stamping `updated_on`. The update is
    /// keyed by id alone; no project constraint is applied. Returns whether
    /// a row matched.
    pub async fn update(&self, id: &str, fields: &IssueUpdate) -> Result<bool, StoreError> {
        let now = Utc::now().to_rfc3339();

        let mut sets = vec!["updated_on = ?"];
        if fields.issue_title.is_some() {
            sets.push("issue_title = ?");
        }
        if fields.issue_text.is_some() {
            sets.push("issue_text = ?");
        }
        if fields.created_by.is_some() {
            sets.push("created_by = ?");
        }
        if fields.assigned_to.is_some() {
            sets.push("assigned_to = ?");
        }
        if fields.status_text.is_some() {
            sets.push("status_text = ?");
        }
        if fields.open.is_some() {
            sets.push("open = ?");
        }

        let sql = format!("UPDATE issues SET {} WHERE id = ?", sets.join(", "));

        let mut query = sqlx::query(&sql).bind(&now);
        if let Some(title) = &fields.issue_title {
            query = query.bind(title);
        }
        if let Some(text) = &fields.issue_text {
            query = query.bind(text);
        }
        if let Some(created_by) = &fields.created_by {
            query = query.bind(created_by);
        }
        if let Some(assigned_to) = &fields.assigned_to {
            query = query.bind(assigned_to);
        }
        if let Some(status_text) = &fields.status_text {
            query = query.bind(status_text);
        }
        if let Some(open) = fields.open {
            query = query.bind(open);
        }

        let result = query.bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an issue by id. Returns whether a row was deleted.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let rows = sqlx::query("DELETE FROM issues WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqliteConnectOptions;
    use std::str::FromStr;

    async fn make_pool() -> SqlitePool {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opts).await.unwrap();
        // Run the migration SQL directly
        let migration = include_str!("../storage/migrations/0001_issues.sql");
        for stmt in migration.split(';') {
            let stmt = stmt.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&pool).await.unwrap();
            }
        }
        pool
    }

    fn storage(pool: SqlitePool) -> IssueStorage {
        IssueStorage::new(pool)
    }

    fn params(title: &str, created_by: &str) -> CreateIssueParams {
        CreateIssueParams {
            issue_title: title.to_string(),
            issue_text: "text".to_string(),
            created_by: created_by.to_string(),
            assigned_to: String::new(),
            status_text: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_issue() {
        let s = storage(make_pool().await);
        let issue = s.create("apitest", params("First", "Alice")).await.unwrap();
        assert_eq!(issue.project, "apitest");
        assert_eq!(issue.issue_title, "First");
        assert_eq!(issue.assigned_to, "");
        assert_eq!(issue.status_text, "");
        assert!(issue.open);
        assert!(crate::issues::model::valid_issue_id(&issue.id));
        assert_eq!(issue.created_on, issue.updated_on);
    }

    #[tokio::test]
    async fn test_find_scopes_by_project() {
        let s = storage(make_pool().await);
        s.create("p1", params("A", "Alice")).await.unwrap();
        s.create("p1", params("B", "Bob")).await.unwrap();
        s.create("p2", params("C", "Carol")).await.unwrap();

        let p1 = s.find("p1", &IssueFilter::default()).await.unwrap();
        assert_eq!(p1.len(), 2);
        let p2 = s.find("p2", &IssueFilter::default()).await.unwrap();
        assert_eq!(p2.len(), 1);
        assert_eq!(p2[0].issue_title, "C");
        let empty = s.find("p3", &IssueFilter::default()).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_find_with_conjunctive_filters() {
        let s = storage(make_pool().await);
        let a = s.create("p1", params("A", "Alice")).await.unwrap();
        let b = s.create("p1", params("B", "Alice")).await.unwrap();
        s.create("p1", params("C", "Bob")).await.unwrap();

        // Close issue B
        let closed = IssueUpdate {
            open: Some(false),
            ..Default::default()
        };
        assert!(s.update(&b.id, &closed).await.unwrap());

        let filter = IssueFilter {
            created_by: Some("Alice".to_string()),
            open: Some(true),
            ..Default::default()
        };
        let rows = s.find("p1", &filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, a.id);

        let by_id = IssueFilter {
            id: Some(b.id.clone()),
            ..Default::default()
        };
        let rows = s.find("p1", &by_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].open);
    }

    #[tokio::test]
    async fn test_update_changes_only_named_fields() {
        let s = storage(make_pool().await);
        let created = s.create("p1", params("Original", "Alice")).await.unwrap();

        let update = IssueUpdate {
            issue_text: Some("revised text".to_string()),
            ..Default::default()
        };
        assert!(s.update(&created.id, &update).await.unwrap());

        let after = s.get(&created.id).await.unwrap().expect("should exist");
        assert_eq!(after.issue_text, "revised text");
        assert_eq!(after.issue_title, "Original");
        assert_eq!(after.created_by, "Alice");
        assert_eq!(after.created_on, created.created_on);
        assert!(after.updated_on >= created.updated_on);
        assert_ne!(after.updated_on, created.updated_on);
    }

    #[tokio::test]
    async fn test_update_missing_row_matches_nothing() {
        let s = storage(make_pool().await);
        let update = IssueUpdate {
            open: Some(false),
            ..Default::default()
        };
        let matched = s
            .update(&Uuid::new_v4().to_string(), &update)
            .await
            .unwrap();
        assert!(!matched);
    }

    #[tokio::test]
    async fn test_delete_issue() {
        let s = storage(make_pool().await);
        let issue = s.create("p1", params("ToDelete", "Alice")).await.unwrap();
        assert!(s.delete(&issue.id).await.unwrap());
        assert!(s.get(&issue.id).await.unwrap().is_none());
        // Deleting again returns false
        assert!(!s.delete(&issue.id).await.unwrap());
    }
}
