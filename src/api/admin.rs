//! Admin and auditor listings. These are read directly and never cached.

use serde::Deserialize;

use super::ApiClient;
use crate::error::Result;
use crate::models::{AdminUser, AuditFilter, AuditLog, Page, Pagination};

#[derive(Debug, Deserialize)]
struct UsersEnvelope {
    #[serde(default)]
    users: Vec<AdminUser>,
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct AuditEnvelope {
    #[serde(default)]
    logs: Vec<AuditLog>,
    pagination: Option<Pagination>,
}

impl ApiClient {
    /// `GET /admin/users?page=&limit=`
    pub async fn admin_users(&self, page: u32, limit: u32) -> Result<Page<AdminUser>> {
        let envelope: UsersEnvelope = self
            .get_json_query(
                &["admin", "users"],
                &[("page", page.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(Page::new(envelope.users, page, envelope.pagination))
    }

    /// `GET /admin/users/search/:term`
    pub async fn search_users(&self, term: &str) -> Result<Vec<AdminUser>> {
        self.get_json(&["admin", "users", "search", term.trim()]).await
    }

    /// `GET /auditor/audit?page=&limit=&<filters>`
    pub async fn audit_logs(
        &self,
        filter: &AuditFilter,
        page: u32,
        limit: u32,
    ) -> Result<Page<AuditLog>> {
        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        query.extend(filter.query_pairs());

        let envelope: AuditEnvelope = self.get_json_query(&["auditor", "audit"], &query).await?;
        Ok(Page::new(envelope.logs, page, envelope.pagination))
    }
}
