//! REST API client module for the credential service.
//!
//! This module provides the `ApiClient` for logging in, looking up agents by
//! extension, and adding agents with an admin bearer token.
//!
//! The base URL is resolved once by `ApiBase::resolve` and never changes
//! per request.

pub mod client;
pub mod endpoint;
pub mod error;

pub use client::{ApiClient, AuthToken, Authenticator, LookupOutcome};
pub use endpoint::{ApiBase, ConfigError, LOCAL_API_BASE};
pub use error::ApiError;
