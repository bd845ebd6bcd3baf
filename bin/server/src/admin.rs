//! Authenticated admin endpoints.
//!
//! Thin JSON handlers over the typed backend clients. Each handler drains
//! the request context's buffered `Set-Cookie` values into the response, so
//! a mid-request token refresh reaches the browser.

use crate::auth::{AppState, RequireAuth};
use crate::error::WebError;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use saerok_admin_backend::ads::PlacementItem;
use saerok_admin_backend::{AdminProfile, ApiContext, ServiceHealth, StatMetric};
use saerok_admin_core::{AdSlotId, ReportId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Dashboard view: backend health plus the logged-in admin's profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub health: ServiceHealth,
    pub profile: Option<AdminProfile>,
}

/// GET `/`: dashboard.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Response, WebError> {
    let health = state.health.check_health(&ctx).await?;
    let profile = state.profile.fetch_current_profile(&ctx).await?;
    Ok(respond_json(&ctx, DashboardView { health, profile }))
}

/// GET `/admin/ads`: ad creative list.
pub async fn list_ads(
    State(state): State<Arc<AppState>>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Response, WebError> {
    let response = state.ads.list_ads(&ctx).await?;
    Ok(respond_json(&ctx, response))
}

/// GET `/admin/ads/slots`: ad slot list.
pub async fn list_slots(
    State(state): State<Arc<AppState>>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Response, WebError> {
    let response = state.ads.list_slots(&ctx).await?;
    Ok(respond_json(&ctx, response))
}

/// Placements grouped per slot, with display shares.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementsView {
    pub groups: Vec<PlacementGroup>,
}

/// One slot's placements.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementGroup {
    pub slot_id: Option<AdSlotId>,
    pub slot_name: Option<String>,
    pub placements: Vec<PlacementView>,
}

/// One placement plus its computed display share.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementView {
    #[serde(flatten)]
    pub placement: PlacementItem,
    /// Probability of this placement being picked within its slot:
    /// `weight / Σ weight` over the slot's enabled placements.
    pub display_share: f64,
}

/// GET `/admin/ads/placements`: placements grouped by slot.
pub async fn list_placements(
    State(state): State<Arc<AppState>>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Response, WebError> {
    let response = state.ads.list_placements(&ctx).await?;
    let view = PlacementsView {
        groups: build_placement_groups(response.items),
    };
    Ok(respond_json(&ctx, view))
}

/// Groups placements by slot (first-seen order) and computes each enabled
/// placement's share of its slot's total selection weight.
fn build_placement_groups(items: Vec<PlacementItem>) -> Vec<PlacementGroup> {
    let mut groups: Vec<PlacementGroup> = Vec::new();
    for item in items {
        let position = groups
            .iter()
            .position(|group| group.slot_id == item.slot_id);
        let group = match position {
            Some(position) => &mut groups[position],
            None => {
                groups.push(PlacementGroup {
                    slot_id: item.slot_id,
                    slot_name: item.slot_name.clone(),
                    placements: Vec::new(),
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };
        group.placements.push(PlacementView {
            placement: item,
            display_share: 0.0,
        });
    }

    for group in &mut groups {
        let total: i64 = group
            .placements
            .iter()
            .filter(|view| view.placement.is_enabled())
            .map(|view| i64::from(view.placement.effective_weight().max(0)))
            .sum();
        if total == 0 {
            continue;
        }
        for view in &mut group.placements {
            if view.placement.is_enabled() {
                let weight = i64::from(view.placement.effective_weight().max(0));
                view.display_share = weight as f64 / total as f64;
            }
        }
    }

    groups
}

/// GET `/admin/reports/collections`: open collection reports.
pub async fn collection_reports(
    State(state): State<Arc<AppState>>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Response, WebError> {
    let response = state.reports.list_collection_reports(&ctx).await?;
    Ok(respond_json(&ctx, response))
}

/// GET `/admin/reports/collections/{id}`: collection report review detail.
pub async fn collection_report_detail(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<i64>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Response, WebError> {
    let response = state
        .reports
        .collection_report_detail(&ctx, ReportId::new(report_id))
        .await?;
    Ok(respond_json(&ctx, response))
}

/// GET `/admin/reports/comments`: open comment reports.
pub async fn comment_reports(
    State(state): State<Arc<AppState>>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Response, WebError> {
    let response = state.reports.list_comment_reports(&ctx).await?;
    Ok(respond_json(&ctx, response))
}

/// GET `/admin/reports/comments/{id}`: comment report review detail.
pub async fn comment_report_detail(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<i64>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Response, WebError> {
    let response = state
        .reports
        .comment_report_detail(&ctx, ReportId::new(report_id))
        .await?;
    Ok(respond_json(&ctx, response))
}

/// Query parameters for the audit log list.
#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    page: Option<u32>,
    size: Option<u32>,
}

/// GET `/admin/audit/logs`: audit log entries.
pub async fn audit_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuditLogQuery>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Response, WebError> {
    let response = state
        .audit
        .list_audit_logs(&ctx, query.page, query.size)
        .await?;
    Ok(respond_json(&ctx, response))
}

/// Query parameters for the stats series endpoint.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Comma-separated metric names; defaults to the dashboard's default
    /// set when absent.
    metrics: Option<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

/// GET `/admin/stats/series`: metric series.
pub async fn stats_series(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
    RequireAuth(ctx): RequireAuth,
) -> Result<Response, WebError> {
    let metrics = resolve_metrics(query.metrics.as_deref());
    let response = state
        .stats
        .fetch_series(&ctx, &metrics, query.from, query.to)
        .await?;
    Ok(respond_json(&ctx, response))
}

/// Parses the requested metrics, dropping unknown names and falling back to
/// the default dashboard set when nothing usable remains.
fn resolve_metrics(requested: Option<&str>) -> Vec<StatMetric> {
    let mut metrics: Vec<StatMetric> = Vec::new();
    for name in requested.unwrap_or_default().split(',') {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        match StatMetric::from_name(name) {
            Some(metric) if !metrics.contains(&metric) => metrics.push(metric),
            Some(_) => {}
            None => warn!(metric = name, "ignoring unknown stat metric"),
        }
    }
    if metrics.is_empty() {
        metrics = StatMetric::ALL
            .into_iter()
            .filter(StatMetric::default_active)
            .collect();
    }
    metrics
}

/// Serializes the body and appends any buffered refresh cookies, so a token
/// refresh that happened during this request reaches the browser.
fn respond_json<T: Serialize>(ctx: &ApiContext, body: T) -> Response {
    let mut response = Json(body).into_response();
    crate::auth::routes::append_set_cookies(&mut response, &ctx.take_set_cookies());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use saerok_admin_core::AdPlacementId;

    fn placement(
        id: i64,
        slot: Option<i64>,
        weight: Option<i16>,
        enabled: Option<bool>,
    ) -> PlacementItem {
        PlacementItem {
            id: AdPlacementId::new(id),
            ad_id: None,
            ad_name: None,
            ad_image_url: None,
            slot_id: slot.map(AdSlotId::new),
            slot_name: slot.map(|s| format!("slot-{s}")),
            start_date: None,
            end_date: None,
            weight,
            enabled,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn shares_are_weight_proportions_within_a_slot() {
        let groups = build_placement_groups(vec![
            placement(1, Some(10), Some(1), Some(true)),
            placement(2, Some(10), Some(3), Some(true)),
            placement(3, Some(20), Some(5), Some(true)),
        ]);

        assert_eq!(groups.len(), 2);
        let first = &groups[0];
        assert_eq!(first.slot_id, Some(AdSlotId::new(10)));
        assert!((first.placements[0].display_share - 0.25).abs() < 1e-9);
        assert!((first.placements[1].display_share - 0.75).abs() < 1e-9);
        // A slot with a single enabled placement gets the whole share.
        assert!((groups[1].placements[0].display_share - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disabled_placements_get_no_share_and_do_not_dilute() {
        let groups = build_placement_groups(vec![
            placement(1, Some(10), Some(1), Some(true)),
            placement(2, Some(10), Some(9), Some(false)),
        ]);

        assert_eq!(groups[0].placements[0].display_share, 1.0);
        assert_eq!(groups[0].placements[1].display_share, 0.0);
    }

    #[test]
    fn missing_weight_defaults_to_one() {
        let groups = build_placement_groups(vec![
            placement(1, Some(10), None, Some(true)),
            placement(2, Some(10), Some(1), Some(true)),
        ]);

        assert!((groups[0].placements[0].display_share - 0.5).abs() < 1e-9);
    }

    #[test]
    fn all_disabled_slot_has_zero_shares() {
        let groups = build_placement_groups(vec![
            placement(1, Some(10), Some(2), Some(false)),
            placement(2, Some(10), Some(2), None),
        ]);

        assert!(groups[0]
            .placements
            .iter()
            .all(|view| view.display_share == 0.0));
    }

    #[test]
    fn placements_without_a_slot_group_together() {
        let groups = build_placement_groups(vec![
            placement(1, None, Some(1), Some(true)),
            placement(2, None, Some(1), Some(true)),
            placement(3, Some(10), Some(1), Some(true)),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].slot_id, None);
        assert_eq!(groups[0].placements.len(), 2);
    }

    #[test]
    fn unknown_metrics_fall_back_to_defaults() {
        let metrics = resolve_metrics(Some("NOT_A_METRIC"));
        assert_eq!(
            metrics,
            [
                StatMetric::CollectionTotalCount,
                StatMetric::BirdIdResolvedCount
            ]
        );
    }

    #[test]
    fn requested_metrics_are_parsed_and_deduplicated() {
        let metrics = resolve_metrics(Some(
            "BIRD_ID_PENDING_COUNT, BIRD_ID_PENDING_COUNT,COLLECTION_PRIVATE_RATIO",
        ));
        assert_eq!(
            metrics,
            [
                StatMetric::BirdIdPendingCount,
                StatMetric::CollectionPrivateRatio
            ]
        );
    }
}
