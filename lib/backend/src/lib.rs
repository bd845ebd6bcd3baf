//! Typed client for the Saerok backend API.
//!
//! The admin console holds no data of its own: every screen is backed by
//! calls to the backend API, authenticated with a per-session bearer token.
//! This crate provides:
//!
//! - [`ApiProps`]: validated connection properties (base URL + optional
//!   path prefix normalization)
//! - [`BackendAuthClient`]: Kakao/Apple code exchange and token refresh
//! - [`BackendClient`]: the authorization layer: bearer attach plus a
//!   single transparent refresh-and-retry on 401
//! - [`ApiContext`]: explicit per-request call context (session handle,
//!   inbound refresh cookie, outbound `Set-Cookie` buffer)
//! - Typed domain clients: ads, reports, stats, audit logs, current admin
//!   profile, and service health

pub mod ads;
pub mod audit;
pub mod auth;
pub mod client;
pub mod context;
pub mod error;
pub mod health;
pub mod profile;
pub mod props;
pub mod reports;
pub mod stats;

pub use ads::AdClient;
pub use audit::AuditLogClient;
pub use auth::{BackendAuthClient, LoginSuccess, REFRESH_COOKIE_NAME};
pub use client::{ApiRequest, BackendClient};
pub use context::ApiContext;
pub use error::ApiError;
pub use health::{HealthClient, ServiceHealth};
pub use profile::{AdminProfile, ProfileClient};
pub use props::{ApiProps, InvalidApiProps};
pub use reports::ReportClient;
pub use stats::{StatClient, StatMetric};
