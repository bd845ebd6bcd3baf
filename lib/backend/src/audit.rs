//! Admin audit log client.

use crate::client::BackendClient;
use crate::context::ApiContext;
use crate::error::ApiError;
use chrono::NaiveDateTime;
use reqwest::Method;
use saerok_admin_core::{AuditLogId, ReportId, UserId};
use serde::{Deserialize, Serialize};

/// Typed client for the backend's admin audit log API.
#[derive(Debug, Clone)]
pub struct AuditLogClient {
    backend: BackendClient,
}

impl AuditLogClient {
    /// Creates an audit log client on top of the shared backend client.
    #[must_use]
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Lists audit log entries, newest first.
    ///
    /// Pagination is forwarded only when both `page` and `size` are given,
    /// matching the backend's contract.
    pub async fn list_audit_logs(
        &self,
        ctx: &ApiContext,
        page: Option<u32>,
        size: Option<u32>,
    ) -> Result<AuditLogListResponse, ApiError> {
        let mut request = self
            .backend
            .request(Method::GET, &["admin", "audit", "logs"])?;
        if let (Some(page), Some(size)) = (page, size) {
            request = request
                .with_query("page", &page.to_string())
                .with_query("size", &size.to_string());
        }
        self.backend.expect_json(ctx, request).await
    }
}

/// Response for the audit log list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogListResponse {
    pub items: Vec<AuditLogItem>,
}

/// One audit log entry: which admin did what to which target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogItem {
    pub id: AuditLogId,
    pub created_at: Option<NaiveDateTime>,
    pub admin: Option<AuditLogAdmin>,
    pub action: Option<String>,
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    pub report_id: Option<ReportId>,
    pub metadata: Option<serde_json::Value>,
}

/// The acting admin on an audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogAdmin {
    pub id: Option<UserId>,
    pub nickname: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use httptest::matchers::{contains, key, not, request, url_decoded};
    use httptest::responders::json_encoded;
    use httptest::{Expectation, Server, all_of};
    use saerok_admin_session::{LoginSession, SessionStore};
    use serde_json::json;
    use std::sync::Arc;

    fn client_and_ctx(server: &Server) -> (AuditLogClient, ApiContext) {
        let props = crate::ApiProps::new(server.url_str("/"), None).expect("valid props");
        let backend = BackendClient::new(&props).expect("client builds");
        let store = Arc::new(SessionStore::new(Duration::minutes(30)));
        let id = store.create();
        store.establish(&id, LoginSession::new("token").expect("valid token"));
        (AuditLogClient::new(backend), ApiContext::new(store, id))
    }

    #[tokio::test]
    async fn pagination_requires_both_parameters() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/admin/audit/logs"),
                request::query(url_decoded(not(contains(key("page"))))),
            ])
            .respond_with(json_encoded(json!({"items": []}))),
        );

        let (client, ctx) = client_and_ctx(&server);
        // Only one side supplied; neither parameter is forwarded.
        client
            .list_audit_logs(&ctx, Some(2), None)
            .await
            .expect("list succeeds");
    }

    #[tokio::test]
    async fn pagination_forwards_page_and_size() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/admin/audit/logs"),
                request::query(url_decoded(contains(("page", "2")))),
                request::query(url_decoded(contains(("size", "50")))),
            ])
            .respond_with(json_encoded(json!({
                "items": [{
                    "id": 99,
                    "createdAt": "2024-06-01T09:00:00",
                    "admin": {"id": 1, "nickname": "staff"},
                    "action": "COLLECTION_DELETE",
                    "targetType": "COLLECTION",
                    "targetId": 7,
                    "reportId": 11,
                    "metadata": {"reason": "policy violation"}
                }]
            }))),
        );

        let (client, ctx) = client_and_ctx(&server);
        let response = client
            .list_audit_logs(&ctx, Some(2), Some(50))
            .await
            .expect("list succeeds");

        assert_eq!(response.items.len(), 1);
        let item = &response.items[0];
        assert_eq!(item.id, AuditLogId::new(99));
        assert_eq!(item.action.as_deref(), Some("COLLECTION_DELETE"));
        assert_eq!(item.report_id, Some(ReportId::new(11)));
    }
}
