//! Login session state for the Saerok admin console.
//!
//! This crate provides:
//! - The login session model ([`LoginSession`], [`SessionId`])
//! - An in-memory, idle-expiring [`SessionStore`]
//! - Single-use OAuth state tokens for the social-login round trip
//!
//! The admin console holds no state of its own beyond these sessions; all
//! real data lives in the backend API. A session carries exactly one thing:
//! the backend-issued bearer access token.
//!
//! # Example
//!
//! ```
//! use saerok_admin_session::{LoginSession, SessionStore};
//! use chrono::Duration;
//!
//! let store = SessionStore::new(Duration::minutes(30));
//! let session_id = store.create();
//!
//! // After a successful social login callback:
//! let login = LoginSession::new("backend-token").expect("non-empty token");
//! store.establish(&session_id, login);
//!
//! assert_eq!(store.access_token(&session_id).as_deref(), Some("backend-token"));
//! ```

pub mod session;
pub mod store;

pub use session::{InvalidAccessToken, LoginSession, SessionId};
pub use store::SessionStore;
