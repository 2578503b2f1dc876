//! Authentication module for the admin session.
//!
//! This module provides:
//! - `SessionController`: login/logout, privilege flag and bearer token
//! - `ExpiryTimer`: the one-shot inactivity timer behind session expiry
//!
//! Sessions live in memory only and end after 5 minutes without activity.

pub mod session;
pub mod timer;

pub use session::{AuthError, LogoutReason, SessionController, SessionTransition, SESSION_TIMEOUT};
pub use timer::ExpiryTimer;
