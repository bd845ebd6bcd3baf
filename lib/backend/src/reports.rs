//! Admin report review client.
//!
//! Users can report collections (bird sighting records) and comments. Staff
//! review each report and either ignore it or delete the reported content
//! with a reason; both actions are recorded by the backend's audit log.

use crate::client::BackendClient;
use crate::context::ApiContext;
use crate::error::ApiError;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Method;
use saerok_admin_core::{CollectionId, CommentId, ReportId, UserId};
use serde::{Deserialize, Serialize};

const ADMIN_REPORTS_SEGMENTS: [&str; 2] = ["admin", "reports"];

/// Typed client for the backend's admin report API.
#[derive(Debug, Clone)]
pub struct ReportClient {
    backend: BackendClient,
}

impl ReportClient {
    /// Creates a report client on top of the shared backend client.
    #[must_use]
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Lists open reports against collections.
    pub async fn list_collection_reports(
        &self,
        ctx: &ApiContext,
    ) -> Result<ReportedCollectionListResponse, ApiError> {
        self.get(ctx, &["collections"]).await
    }

    /// Lists open reports against comments.
    pub async fn list_comment_reports(
        &self,
        ctx: &ApiContext,
    ) -> Result<ReportedCommentListResponse, ApiError> {
        self.get(ctx, &["comments"]).await
    }

    /// Fetches the review detail for a collection report.
    pub async fn collection_report_detail(
        &self,
        ctx: &ApiContext,
        report_id: ReportId,
    ) -> Result<ReportedCollectionDetailResponse, ApiError> {
        let id = report_id.to_string();
        self.get(ctx, &["collections", &id]).await
    }

    /// Fetches the review detail for a comment report.
    pub async fn comment_report_detail(
        &self,
        ctx: &ApiContext,
        report_id: ReportId,
    ) -> Result<ReportedCommentDetailResponse, ApiError> {
        let id = report_id.to_string();
        self.get(ctx, &["comments", &id]).await
    }

    /// Dismisses a collection report without touching the collection.
    pub async fn ignore_collection_report(
        &self,
        ctx: &ApiContext,
        report_id: ReportId,
    ) -> Result<(), ApiError> {
        let id = report_id.to_string();
        let request = self
            .backend
            .request(Method::POST, &join(&["collections", &id, "ignore"]))?;
        self.backend.expect_success(ctx, request).await
    }

    /// Deletes the reported collection, recording the given reason.
    pub async fn delete_collection_by_report(
        &self,
        ctx: &ApiContext,
        report_id: ReportId,
        reason: &str,
    ) -> Result<(), ApiError> {
        let id = report_id.to_string();
        self.delete_with_reason(ctx, &["collections", &id], reason)
            .await
    }

    /// Dismisses a comment report without touching the comment.
    pub async fn ignore_comment_report(
        &self,
        ctx: &ApiContext,
        report_id: ReportId,
    ) -> Result<(), ApiError> {
        let id = report_id.to_string();
        let request = self
            .backend
            .request(Method::POST, &join(&["comments", &id, "ignore"]))?;
        self.backend.expect_success(ctx, request).await
    }

    /// Deletes the reported comment, recording the given reason.
    pub async fn delete_comment_by_report(
        &self,
        ctx: &ApiContext,
        report_id: ReportId,
        reason: &str,
    ) -> Result<(), ApiError> {
        let id = report_id.to_string();
        self.delete_with_reason(ctx, &["comments", &id], reason).await
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        ctx: &ApiContext,
        segments: &[&str],
    ) -> Result<T, ApiError> {
        let request = self.backend.request(Method::GET, &join(segments))?;
        self.backend.expect_json(ctx, request).await
    }

    async fn delete_with_reason(
        &self,
        ctx: &ApiContext,
        segments: &[&str],
        reason: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .backend
            .request(Method::DELETE, &join(segments))?
            .with_json(&DeleteReasonRequest { reason })?;
        self.backend.expect_success(ctx, request).await
    }
}

fn join<'a>(segments: &[&'a str]) -> Vec<&'a str> {
    let mut all = Vec::with_capacity(ADMIN_REPORTS_SEGMENTS.len() + segments.len());
    all.extend_from_slice(&ADMIN_REPORTS_SEGMENTS);
    all.extend_from_slice(segments);
    all
}

#[derive(Serialize)]
struct DeleteReasonRequest<'a> {
    reason: &'a str,
}

/// A user referenced inside a report payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMini {
    pub user_id: Option<UserId>,
    pub nickname: Option<String>,
}

/// Response for the reported collection list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedCollectionListResponse {
    pub items: Vec<ReportedCollectionItem>,
}

/// One open report against a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedCollectionItem {
    pub report_id: ReportId,
    pub reported_at: Option<NaiveDateTime>,
    pub collection_id: Option<CollectionId>,
    pub reporter: Option<UserMini>,
    pub reported_user: Option<UserMini>,
}

/// Response for the reported comment list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedCommentListResponse {
    pub items: Vec<ReportedCommentItem>,
}

/// One open report against a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedCommentItem {
    pub report_id: ReportId,
    pub reported_at: Option<NaiveDateTime>,
    pub comment_id: Option<CommentId>,
    pub collection_id: Option<CollectionId>,
    pub content_preview: Option<String>,
    pub reporter: Option<UserMini>,
    pub reported_user: Option<UserMini>,
}

/// Review detail for a collection report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedCollectionDetailResponse {
    pub report_id: ReportId,
    pub collection: Option<CollectionDetail>,
    pub comments: Option<CollectionComments>,
}

/// Review detail for a comment report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedCommentDetailResponse {
    pub report_id: ReportId,
    pub comment: Option<ReportedComment>,
    pub collection: Option<CollectionDetail>,
    pub comments: Option<CollectionComments>,
}

/// The reported comment itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedComment {
    pub comment_id: CommentId,
    pub user_id: Option<UserId>,
    pub nickname: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// A collection as shown on the report review screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDetail {
    pub collection_id: CollectionId,
    pub image_url: Option<String>,
    pub discovered_date: Option<NaiveDate>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_alias: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    pub access_level: Option<String>,
    pub like_count: Option<i64>,
    pub comment_count: Option<i64>,
    pub bird: Option<BirdInfo>,
    pub user: Option<CollectionOwner>,
}

/// Bird identification attached to a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirdInfo {
    pub bird_id: Option<i64>,
    pub korean_name: Option<String>,
    pub scientific_name: Option<String>,
}

/// The collection owner's public profile fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionOwner {
    pub user_id: Option<UserId>,
    pub nickname: Option<String>,
    pub profile_image_url: Option<String>,
}

/// Comments on a collection, as shown on the review screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionComments {
    pub items: Vec<CollectionCommentItem>,
}

/// One comment on a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCommentItem {
    pub comment_id: CommentId,
    pub user_id: Option<UserId>,
    pub nickname: Option<String>,
    pub profile_image_url: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub like_count: i64,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use httptest::matchers::{eq, json_decoded, request};
    use httptest::responders::{json_encoded, status_code};
    use httptest::{Expectation, Server, all_of};
    use saerok_admin_session::{LoginSession, SessionStore};
    use serde_json::json;
    use std::sync::Arc;

    fn client_and_ctx(server: &Server) -> (ReportClient, ApiContext) {
        let props = crate::ApiProps::new(server.url_str("/"), None).expect("valid props");
        let backend = BackendClient::new(&props).expect("client builds");
        let store = Arc::new(SessionStore::new(Duration::minutes(30)));
        let id = store.create();
        store.establish(&id, LoginSession::new("token").expect("valid token"));
        (ReportClient::new(backend), ApiContext::new(store, id))
    }

    #[tokio::test]
    async fn lists_comment_reports() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/admin/reports/comments"))
                .respond_with(json_encoded(json!({
                    "items": [{
                        "reportId": 11,
                        "reportedAt": "2024-06-01T10:30:00",
                        "commentId": 42,
                        "collectionId": 7,
                        "contentPreview": "spam spam",
                        "reporter": {"userId": 1, "nickname": "a"},
                        "reportedUser": {"userId": 2, "nickname": "b"}
                    }]
                }))),
        );

        let (client, ctx) = client_and_ctx(&server);
        let response = client
            .list_comment_reports(&ctx)
            .await
            .expect("list succeeds");

        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].report_id, ReportId::new(11));
        assert_eq!(response.items[0].content_preview.as_deref(), Some("spam spam"));
    }

    #[tokio::test]
    async fn delete_by_report_sends_reason_body() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("DELETE", "/admin/reports/collections/11"),
                request::body(json_decoded(eq(json!({"reason": "policy violation"})))),
            ])
            .respond_with(status_code(204)),
        );

        let (client, ctx) = client_and_ctx(&server);
        client
            .delete_collection_by_report(&ctx, ReportId::new(11), "policy violation")
            .await
            .expect("delete succeeds");
    }

    #[tokio::test]
    async fn ignore_posts_to_ignore_path() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path(
                "POST",
                "/admin/reports/comments/11/ignore",
            ))
            .respond_with(status_code(200)),
        );

        let (client, ctx) = client_and_ctx(&server);
        client
            .ignore_comment_report(&ctx, ReportId::new(11))
            .await
            .expect("ignore succeeds");
    }
}
