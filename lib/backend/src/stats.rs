//! Admin service statistics client.

use crate::client::BackendClient;
use crate::context::ApiContext;
use crate::error::ApiError;
use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A metric the backend can report a daily series for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatMetric {
    /// Total number of collections ever recorded.
    CollectionTotalCount,
    /// Share of collections marked private.
    CollectionPrivateRatio,
    /// Bird identification requests still open.
    BirdIdPendingCount,
    /// Bird identification requests resolved, cumulative.
    BirdIdResolvedCount,
    /// Time-to-resolution statistics for identification requests
    /// (multi-component series: min/max/avg/stddev hours).
    BirdIdResolutionStats,
}

impl StatMetric {
    /// Every metric the backend knows about.
    pub const ALL: [StatMetric; 5] = [
        StatMetric::CollectionTotalCount,
        StatMetric::CollectionPrivateRatio,
        StatMetric::BirdIdPendingCount,
        StatMetric::BirdIdResolvedCount,
        StatMetric::BirdIdResolutionStats,
    ];

    /// Returns the metric name as the backend expects it in query params.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CollectionTotalCount => "COLLECTION_TOTAL_COUNT",
            Self::CollectionPrivateRatio => "COLLECTION_PRIVATE_RATIO",
            Self::BirdIdPendingCount => "BIRD_ID_PENDING_COUNT",
            Self::BirdIdResolvedCount => "BIRD_ID_RESOLVED_COUNT",
            Self::BirdIdResolutionStats => "BIRD_ID_RESOLUTION_STATS",
        }
    }

    /// Returns true if the metric is plotted by default on the dashboard.
    #[must_use]
    pub fn default_active(&self) -> bool {
        matches!(
            self,
            Self::CollectionTotalCount | Self::BirdIdResolvedCount
        )
    }

    /// Parses a backend metric name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for StatMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed client for the backend's admin statistics API.
#[derive(Debug, Clone)]
pub struct StatClient {
    backend: BackendClient,
}

impl StatClient {
    /// Creates a stat client on top of the shared backend client.
    #[must_use]
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Fetches daily series for the given metrics.
    ///
    /// The period is passed as `period=start,end` with either side optional;
    /// omitting both leaves the range to the backend's default.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an empty metric list.
    pub async fn fetch_series(
        &self,
        ctx: &ApiContext,
        metrics: &[StatMetric],
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<StatSeriesResponse, ApiError> {
        if metrics.is_empty() {
            return Err(ApiError::InvalidRequest {
                details: "metrics must not be empty".to_string(),
            });
        }

        let mut request = self
            .backend
            .request(Method::GET, &["admin", "stats", "series"])?;
        for metric in metrics {
            request = request.with_query("metric", metric.as_str());
        }
        if start_date.is_some() || end_date.is_some() {
            let start = start_date.map(|d| d.to_string()).unwrap_or_default();
            let end = end_date.map(|d| d.to_string()).unwrap_or_default();
            request = request.with_query("period", &format!("{start},{end}"));
        }

        self.backend.expect_json(ctx, request).await
    }
}

/// Response for the metric series query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatSeriesResponse {
    pub series: Vec<StatSeries>,
}

/// One metric's series. Multi-component metrics carry their points per
/// component instead of at the top level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatSeries {
    pub metric: String,
    #[serde(default)]
    pub points: Vec<StatPoint>,
    #[serde(default)]
    pub components: Vec<ComponentSeries>,
}

/// A named component of a multi-component series (e.g. `avg_hours`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSeries {
    pub key: String,
    #[serde(default)]
    pub points: Vec<StatPoint>,
}

/// One daily data point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}
