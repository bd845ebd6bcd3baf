//! Admin ad management client.
//!
//! Covers the three ad resources the backend exposes under `/admin/ad`:
//! ad creatives, slots (the places ads can appear in the app) and
//! placements (an ad scheduled into a slot with a weight).

use crate::client::BackendClient;
use crate::context::ApiContext;
use crate::error::ApiError;
use chrono::{DateTime, FixedOffset, NaiveDate};
use reqwest::Method;
use saerok_admin_core::{AdId, AdPlacementId, AdSlotId};
use serde::{Deserialize, Serialize};

const ADMIN_AD_SEGMENTS: [&str; 2] = ["admin", "ad"];

/// Typed client for the backend's admin ad API.
#[derive(Debug, Clone)]
pub struct AdClient {
    backend: BackendClient,
}

impl AdClient {
    /// Creates an ad client on top of the shared backend client.
    #[must_use]
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Lists all ad creatives.
    pub async fn list_ads(&self, ctx: &ApiContext) -> Result<AdListResponse, ApiError> {
        self.get(ctx, &["list"]).await
    }

    /// Creates an ad creative.
    pub async fn create_ad(
        &self,
        ctx: &ApiContext,
        request: &CreateAdRequest,
    ) -> Result<AdItem, ApiError> {
        self.post(ctx, &["create"], request).await
    }

    /// Updates an ad creative.
    pub async fn update_ad(
        &self,
        ctx: &ApiContext,
        ad_id: AdId,
        request: &UpdateAdRequest,
    ) -> Result<AdItem, ApiError> {
        let id = ad_id.to_string();
        self.put(ctx, &[&id], request).await
    }

    /// Deletes an ad creative.
    pub async fn delete_ad(&self, ctx: &ApiContext, ad_id: AdId) -> Result<(), ApiError> {
        let id = ad_id.to_string();
        self.delete(ctx, &[&id]).await
    }

    /// Lists all ad slots.
    pub async fn list_slots(&self, ctx: &ApiContext) -> Result<SlotListResponse, ApiError> {
        self.get(ctx, &["slot"]).await
    }

    /// Creates an ad slot.
    pub async fn create_slot(
        &self,
        ctx: &ApiContext,
        request: &CreateSlotRequest,
    ) -> Result<SlotItem, ApiError> {
        self.post(ctx, &["slot"], request).await
    }

    /// Updates an ad slot.
    pub async fn update_slot(
        &self,
        ctx: &ApiContext,
        slot_id: AdSlotId,
        request: &UpdateSlotRequest,
    ) -> Result<SlotItem, ApiError> {
        let id = slot_id.to_string();
        self.put(ctx, &["slot", &id], request).await
    }

    /// Deletes an ad slot.
    pub async fn delete_slot(&self, ctx: &ApiContext, slot_id: AdSlotId) -> Result<(), ApiError> {
        let id = slot_id.to_string();
        self.delete(ctx, &["slot", &id]).await
    }

    /// Lists all ad placements.
    pub async fn list_placements(
        &self,
        ctx: &ApiContext,
    ) -> Result<PlacementListResponse, ApiError> {
        self.get(ctx, &["placement"]).await
    }

    /// Creates an ad placement.
    pub async fn create_placement(
        &self,
        ctx: &ApiContext,
        request: &CreatePlacementRequest,
    ) -> Result<PlacementItem, ApiError> {
        self.post(ctx, &["placement"], request).await
    }

    /// Updates an ad placement.
    pub async fn update_placement(
        &self,
        ctx: &ApiContext,
        placement_id: AdPlacementId,
        request: &UpdatePlacementRequest,
    ) -> Result<PlacementItem, ApiError> {
        let id = placement_id.to_string();
        self.put(ctx, &["placement", &id], request).await
    }

    /// Deletes an ad placement.
    pub async fn delete_placement(
        &self,
        ctx: &ApiContext,
        placement_id: AdPlacementId,
    ) -> Result<(), ApiError> {
        let id = placement_id.to_string();
        self.delete(ctx, &["placement", &id]).await
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        ctx: &ApiContext,
        segments: &[&str],
    ) -> Result<T, ApiError> {
        let request = self.backend.request(Method::GET, &join(segments))?;
        self.backend.expect_json(ctx, request).await
    }

    async fn post<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        ctx: &ApiContext,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self
            .backend
            .request(Method::POST, &join(segments))?
            .with_json(body)?;
        self.backend.expect_json(ctx, request).await
    }

    async fn put<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        ctx: &ApiContext,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self
            .backend
            .request(Method::PUT, &join(segments))?
            .with_json(body)?;
        self.backend.expect_json(ctx, request).await
    }

    async fn delete(&self, ctx: &ApiContext, segments: &[&str]) -> Result<(), ApiError> {
        let request = self.backend.request(Method::DELETE, &join(segments))?;
        self.backend.expect_success(ctx, request).await
    }
}

fn join<'a>(segments: &[&'a str]) -> Vec<&'a str> {
    let mut all = Vec::with_capacity(ADMIN_AD_SEGMENTS.len() + segments.len());
    all.extend_from_slice(&ADMIN_AD_SEGMENTS);
    all.extend_from_slice(segments);
    all
}

/// Response for the ad creative list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdListResponse {
    pub items: Vec<AdItem>,
}

/// One ad creative as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdItem {
    pub id: AdId,
    pub name: Option<String>,
    pub memo: Option<String>,
    pub image_url: Option<String>,
    pub content_type: Option<String>,
    pub target_url: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// Request body for creating an ad creative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdRequest {
    pub name: String,
    pub memo: Option<String>,
    pub image_url: Option<String>,
    pub content_type: Option<String>,
    pub target_url: Option<String>,
}

/// Request body for updating an ad creative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdRequest {
    pub name: String,
    pub memo: Option<String>,
    pub image_url: Option<String>,
    pub content_type: Option<String>,
    pub target_url: Option<String>,
}

/// Response for the slot list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotListResponse {
    pub items: Vec<SlotItem>,
}

/// One ad slot as returned by the backend.
///
/// `fallback_ratio` is the backend's 0..=1 share of requests that show the
/// fallback content instead of a placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotItem {
    pub id: AdSlotId,
    pub name: Option<String>,
    pub memo: Option<String>,
    pub fallback_ratio: Option<f64>,
    pub ttl_seconds: Option<i32>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// Request body for creating an ad slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotRequest {
    pub name: String,
    pub memo: Option<String>,
    pub fallback_ratio: f64,
    pub ttl_seconds: i32,
}

/// Request body for updating an ad slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSlotRequest {
    pub name: Option<String>,
    pub memo: Option<String>,
    pub fallback_ratio: f64,
    pub ttl_seconds: i32,
}

/// Response for the placement list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementListResponse {
    pub items: Vec<PlacementItem>,
}

/// One ad placement as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementItem {
    pub id: AdPlacementId,
    pub ad_id: Option<AdId>,
    pub ad_name: Option<String>,
    pub ad_image_url: Option<String>,
    pub slot_id: Option<AdSlotId>,
    pub slot_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub weight: Option<i16>,
    pub enabled: Option<bool>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl PlacementItem {
    /// Returns the effective selection weight (backend treats missing as 1).
    #[must_use]
    pub fn effective_weight(&self) -> i16 {
        self.weight.unwrap_or(1)
    }

    /// Returns true unless the backend explicitly disabled this placement.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled == Some(true)
    }
}

/// Request body for creating an ad placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlacementRequest {
    pub ad_id: AdId,
    pub slot_id: AdSlotId,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub weight: i16,
    pub enabled: bool,
}

/// Request body for updating an ad placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlacementRequest {
    pub slot_id: AdSlotId,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub weight: i16,
    pub enabled: bool,
}
