//! Core domain types for the Saerok admin console.
//!
//! This crate holds the strongly-typed backend entity IDs shared between the
//! backend API client library and the web server.

pub mod id;

pub use id::{
    AdId, AdPlacementId, AdSlotId, AuditLogId, CollectionId, CommentId, ReportId, UserId,
};
